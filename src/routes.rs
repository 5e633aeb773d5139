use crate::{
    api::{leave, report, user},
    auth::handlers,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

/// Per-peer-IP request budgets for the public credential endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub login_per_min: u32,
    pub register_per_min: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            login_per_min: 60,
            register_per_min: 30,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Liveness", body = Object,
         example = json!({"message": "API running"}))
    ),
    tag = "Health"
)]
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "API running" }))
}

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, limits: RateLimits) {
    // malformed bodies and path segments answer in the same {message} shape
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    );

    cfg.service(index);

    // Registration & authentication
    cfg.service(
        web::resource("/register")
            .wrap(build_limiter(limits.register_per_min))
            .route(web::post().to(handlers::register)),
    )
    .service(
        web::resource("/login")
            .wrap(build_limiter(limits.login_per_min))
            .route(web::post().to(handlers::login)),
    );

    // Leave lifecycle
    cfg.service(web::resource("/apply_leave/{user_id}").route(web::post().to(leave::apply_leave)))
        .service(web::resource("/leaves").route(web::get().to(leave::all_leaves)))
        .service(web::resource("/my_leaves/{user_id}").route(web::get().to(leave::my_leaves)))
        .service(
            web::resource("/approve/{leave_id}/{approver_id}")
                .route(web::post().to(leave::approve_leave)),
        )
        .service(
            web::resource("/reject/{leave_id}/{approver_id}")
                .route(web::post().to(leave::reject_leave)),
        )
        .service(web::resource("/delete/{leave_id}").route(web::delete().to(leave::delete_leave)));

    cfg.service(web::resource("/users").route(web::get().to(user::list_users)));

    // Manager dashboard
    cfg.service(
        web::scope("/manager")
            .service(
                web::resource("/leaves/{manager_id}").route(web::get().to(leave::team_leaves)),
            )
            .service(
                web::resource("/stats/{manager_id}").route(web::get().to(report::manager_stats)),
            ),
    );

    // HR dashboard
    cfg.service(
        web::scope("/hr")
            .service(web::resource("/stats/users").route(web::get().to(report::total_users)))
            .service(web::resource("/stats/on-leave").route(web::get().to(report::users_on_leave)))
            .service(
                web::resource("/manager-team/{manager_id}")
                    .route(web::get().to(report::manager_team)),
            ),
    );

    cfg.service(
        web::resource("/leave-balance/{user_id}").route(web::get().to(report::leave_balance)),
    );
}
