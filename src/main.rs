use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};

use leave_desk::config::Config;
use leave_desk::db::init_store;
use leave_desk::docs::ApiDoc;
use leave_desk::routes::{self, RateLimits};

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, policy = ?config.policy, "Server starting...");

    let store = init_store(&config.database_url).await?;

    let limits = RateLimits {
        login_per_min: config.rate_login_per_min,
        register_per_min: config.rate_register_per_min,
    };
    let policy = config.policy;

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so the JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::from(store.clone()))
            .app_data(Data::new(policy))
            .configure(|cfg| routes::configure(cfg, limits))
    })
    .bind(&config.server_addr)?
    .run()
    .await?;

    Ok(())
}
