use crate::{
    auth::password::{hash_password, is_strong_password, verify_password},
    config::Policy,
    error::AppError,
    model::{NewUser, Role},
    policy::assignment::pick_manager,
    store::Store,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "employee_one")]
    pub username: String,
    #[schema(example = "Strong@123")]
    pub password: String,
    #[schema(example = "employee", value_type = Option<String>)]
    /// one of employee, manager, hr
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "employee_one")]
    pub username: String,
    #[schema(example = "Strong@123")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = 3)]
    pub id: u64,
    pub role: Role,
}

fn parse_role(raw: Option<&str>) -> Result<Role, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Err(AppError::bad_request("Role is required")),
        Some(r) => r
            .parse()
            .map_err(|_| AppError::bad_request("Invalid role selected")),
    }
}

/// User registration handler
#[utoipa::path(
    post,
    path = "/register",
    request_body(
        content = RegisterRequest,
        description = "New account",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "User registered", body = Object,
         example = json!({"message": "Registered successfully"})),
        (status = 400, description = "Weak password, bad role, duplicate username or no manager capacity",
         body = Object, example = json!({"message": "No manager available for assignment"}))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_register",
    skip(store, policy, payload),
    fields(username = %payload.username)
)]
pub async fn register(
    store: web::Data<dyn Store>,
    policy: web::Data<Policy>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let username = payload.username;

    if username.trim().is_empty() {
        return Err(AppError::bad_request("Username is required"));
    }

    if !is_strong_password(&payload.password) {
        return Err(AppError::bad_request(
            "Password must be at least 8 characters and include uppercase, lowercase, number, and special character",
        ));
    }

    let role = parse_role(payload.role.as_deref())?;

    // hash before opening the transaction so no locks are held meanwhile
    let password = payload.password;
    let hashed = web::block(move || hash_password(&password))
        .await?
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AppError::Internal
        })?;

    let mut tx = store.begin().await?;

    if tx.username_taken(&username).await? {
        return Err(AppError::bad_request("User already exists"));
    }

    let manager_id = if role == Role::Employee {
        let mut team_sizes = Vec::new();
        for manager_id in tx.lock_managers().await? {
            team_sizes.push((manager_id, tx.team_size(manager_id).await?));
        }
        debug!(?team_sizes, "Looking for a manager with capacity");

        let assigned = pick_manager(&team_sizes, policy.manager_capacity)
            .ok_or_else(|| AppError::bad_request("No manager available for assignment"))?;
        Some(assigned)
    } else {
        None
    };

    let user_id = tx
        .insert_user(NewUser {
            username,
            password: hashed,
            role,
            manager_id,
        })
        .await?;
    tx.commit().await?;

    info!(user_id, %role, ?manager_id, "User registered");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Registered successfully"
    })))
}

/// Credential check; returns the id and role the caller carries afterwards.
#[utoipa::path(
    post,
    path = "/login",
    request_body(
        content = LoginRequest,
        description = "Credentials",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = Object,
         example = json!({"message": "Invalid credentials"}))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, payload),
    fields(username = %payload.username)
)]
pub async fn login(
    store: web::Data<dyn Store>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let Some(user) = store.find_user_by_username(&payload.username).await? else {
        warn!("Invalid credentials: user not found");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    let password = payload.into_inner().password;
    let hashed = user.password.clone();
    let verified = web::block(move || verify_password(&password, &hashed)).await?;

    if !verified {
        warn!(user_id = user.id, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        role: user.role,
    }))
}
