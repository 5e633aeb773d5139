use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Default yearly allowance of approvable leave days.
pub const ANNUAL_LEAVE_QUOTA: i64 = 20;
/// Default number of employees a manager can be auto-assigned.
pub const MAX_EMPLOYEES_PER_MANAGER: i64 = 12;

/// Leave and assignment limits, handed to the handlers as app data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub annual_quota: i64,
    pub manager_capacity: i64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            annual_quota: ANNUAL_LEAVE_QUOTA,
            manager_capacity: MAX_EMPLOYEES_PER_MANAGER,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,

    pub policy: Policy,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parsed_or("RATE_REGISTER_PER_MIN", 30)?,

            policy: Policy {
                annual_quota: parsed_or("ANNUAL_LEAVE_QUOTA", ANNUAL_LEAVE_QUOTA)?,
                manager_capacity: parsed_or("MAX_EMPLOYEES_PER_MANAGER", MAX_EMPLOYEES_PER_MANAGER)?,
            },

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parsed_or("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value for {key} ({raw:?}): {e}")),
        Err(_) => Ok(default),
    }
}
