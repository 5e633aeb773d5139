use anyhow::{Context, Result, bail};
use sqlx::MySqlPool;
use std::sync::Arc;

use crate::store::{MemoryStore, MySqlStore, Store};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// `mysql://…` connects and migrates; `memory://` keeps everything in-process.
pub async fn init_store(database_url: &str) -> Result<Arc<dyn Store>> {
    if database_url.starts_with("mysql://") {
        let pool = init_db(database_url).await?;
        Ok(Arc::new(MySqlStore::new(pool)))
    } else if database_url.starts_with("memory://") {
        tracing::warn!("Using the in-process store; data is lost on shutdown");
        Ok(Arc::new(MemoryStore::new()))
    } else {
        bail!("unsupported DATABASE_URL scheme: {database_url}")
    }
}
