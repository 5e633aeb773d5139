use crate::{
    config::Policy,
    error::AppError,
    model::{LeaveStatus, TeamMemberLeave, TeamStats},
    policy::balance::LeaveBalance,
    store::Store,
};
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/manager/stats/{manager_id}",
    params(
        ("manager_id" = u64, Path, description = "Manager whose team is summarised")
    ),
    responses(
        (status = 200, description = "Team size and leave counts", body = TeamStats)
    ),
    tag = "Manager"
)]
pub async fn manager_stats(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let stats = store.team_stats(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/hr/stats/users",
    responses(
        (status = 200, description = "Registered users", body = Object,
         example = json!({"total_users": 42}))
    ),
    tag = "HR"
)]
pub async fn total_users(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let total = store.count_users().await?;
    Ok(HttpResponse::Ok().json(json!({ "total_users": total })))
}

/// `on_leave` counts every approved leave ever recorded; `active_today` only
/// those whose range covers today.
#[utoipa::path(
    get,
    path = "/hr/stats/on-leave",
    responses(
        (status = 200, description = "Approved leave counts", body = Object,
         example = json!({"on_leave": 7, "active_today": 2}))
    ),
    tag = "HR"
)]
pub async fn users_on_leave(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let on_leave = store
        .count_leaves_with_status(LeaveStatus::Approved)
        .await?;
    let active_today = store
        .count_approved_covering(Local::now().date_naive())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "on_leave": on_leave,
        "active_today": active_today
    })))
}

#[utoipa::path(
    get,
    path = "/hr/manager-team/{manager_id}",
    params(
        ("manager_id" = u64, Path, description = "Manager whose team is listed")
    ),
    responses(
        (status = 200, description = "Team members with their leaves; members without leaves have null leave fields",
         body = Vec<TeamMemberLeave>)
    ),
    tag = "HR"
)]
pub async fn manager_team(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let rows = store.team_overview(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Balance for the current calendar year.
#[utoipa::path(
    get,
    path = "/leave-balance/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User whose balance is computed")
    ),
    responses(
        (status = 200, description = "Quota, days used and days remaining", body = LeaveBalance)
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    store: web::Data<dyn Store>,
    policy: web::Data<Policy>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leaves = store.leaves_for_user(path.into_inner()).await?;
    let year = Local::now().year();
    let balance = LeaveBalance::for_year(&leaves, year, policy.annual_quota);
    Ok(HttpResponse::Ok().json(balance))
}
