use crate::{
    config::Policy,
    error::AppError,
    model::{Leave, LeaveStatus, LeaveWithApplicant, NewLeave, User},
    policy::{
        balance::ensure_within_quota,
        review::{ReviewAction, authorize, ensure_responsible},
    },
    store::{Store, StoreTx},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "2026-01-20", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    /// inclusive
    #[schema(example = "2026-01-22", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Family function")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "Release week")]
    pub reason: String,
}

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/apply_leave/{user_id}",
    params(
        ("user_id" = u64, Path, description = "ID of the user applying")
    ),
    request_body(
        content = ApplyLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = Object,
         example = json!({"message": "Leave applied successfully"})),
        (status = 400, description = "to_date before from_date"),
        (status = 404, description = "User not found")
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<ApplyLeave>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let payload = payload.into_inner();

    if payload.to_date < payload.from_date {
        return Err(AppError::bad_request("to_date cannot be before from_date"));
    }

    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let leave_id = store
        .insert_leave(NewLeave {
            user_id,
            from_date: payload.from_date,
            to_date: payload.to_date,
            reason: payload.reason,
        })
        .await?;

    info!(leave_id, user_id, "Leave applied");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave applied successfully"
    })))
}

/// Every leave with applicant username and role.
#[utoipa::path(
    get,
    path = "/leaves",
    responses(
        (status = 200, description = "All leaves", body = Vec<LeaveWithApplicant>)
    ),
    tag = "Leave"
)]
pub async fn all_leaves(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let leaves = store.leaves_with_applicant(None).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/my_leaves/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Owner of the leaves")
    ),
    responses(
        (status = 200, description = "Leaves of the user", body = Vec<Leave>)
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leaves = store.leaves_for_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Leaves of the manager's direct reports.
#[utoipa::path(
    get,
    path = "/manager/leaves/{manager_id}",
    params(
        ("manager_id" = u64, Path, description = "Manager whose team is listed")
    ),
    responses(
        (status = 200, description = "Team leaves", body = Vec<LeaveWithApplicant>)
    ),
    tag = "Manager"
)]
pub async fn team_leaves(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leaves = store.leaves_with_applicant(Some(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Loads and locks the leave and both users, then checks team membership,
/// that the leave is still pending, and the approver's role.
async fn load_for_review(
    tx: &mut dyn StoreTx,
    leave_id: u64,
    approver_id: u64,
    action: ReviewAction,
) -> Result<(Leave, User), AppError> {
    let leave = tx
        .lock_leave(leave_id)
        .await?
        .ok_or_else(|| AppError::not_found("Leave not found"))?;
    let approver = tx
        .lock_user(approver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Approver not found"))?;
    let applicant = tx
        .lock_user(leave.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Applicant not found"))?;

    ensure_responsible(&approver, &applicant)?;

    if !leave.is_pending() {
        return Err(AppError::bad_request("Leave already processed"));
    }

    authorize(&approver, &applicant, action)?;

    Ok((leave, applicant))
}

/* =========================
Approve leave
========================= */
#[utoipa::path(
    post,
    path = "/approve/{leave_id}/{approver_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve"),
        ("approver_id" = u64, Path, description = "ID of the approving manager or hr")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object,
         example = json!({"message": "Leave approved"})),
        (status = 400, description = "Already processed or insufficient balance", body = Object,
         example = json!({"message": "Insufficient leave balance"})),
        (status = 403, description = "Approver may not act on this leave"),
        (status = 404, description = "Leave or user not found")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    store: web::Data<dyn Store>,
    policy: web::Data<Policy>,
    path: web::Path<(u64, u64)>,
) -> Result<HttpResponse, AppError> {
    let (leave_id, approver_id) = path.into_inner();

    let mut tx = store.begin().await?;
    let (leave, applicant) =
        load_for_review(tx.as_mut(), leave_id, approver_id, ReviewAction::Approve).await?;

    let approved = tx.approved_leaves(applicant.id).await?;
    ensure_within_quota(&leave, &approved, policy.annual_quota)?;

    tx.set_leave_status(leave.id, LeaveStatus::Approved, None)
        .await?;
    tx.commit().await?;

    info!(leave_id, approver_id, applicant_id = applicant.id, "Leave approved");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    post,
    path = "/reject/{leave_id}/{approver_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject"),
        ("approver_id" = u64, Path, description = "ID of the rejecting manager or hr")
    ),
    request_body(
        content = RejectLeave,
        description = "Why the leave is refused",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object,
         example = json!({"message": "Leave rejected"})),
        (status = 400, description = "Already processed or blank reason", body = Object,
         example = json!({"message": "Rejection reason required"})),
        (status = 403, description = "Approver may not act on this leave"),
        (status = 404, description = "Leave or user not found")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    store: web::Data<dyn Store>,
    path: web::Path<(u64, u64)>,
    payload: web::Json<RejectLeave>,
) -> Result<HttpResponse, AppError> {
    let (leave_id, approver_id) = path.into_inner();

    let mut tx = store.begin().await?;
    let (leave, applicant) =
        load_for_review(tx.as_mut(), leave_id, approver_id, ReviewAction::Reject).await?;

    let reason = payload.into_inner().reason;
    if reason.trim().is_empty() {
        return Err(AppError::bad_request("Rejection reason required"));
    }

    tx.set_leave_status(leave.id, LeaveStatus::Rejected, Some(reason))
        .await?;
    tx.commit().await?;

    info!(leave_id, approver_id, applicant_id = applicant.id, "Leave rejected");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave rejected"
    })))
}

/// Administrative removal; no ownership or status checks.
#[utoipa::path(
    delete,
    path = "/delete/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave to delete")
    ),
    responses(
        (status = 200, description = "Leave deleted", body = Object,
         example = json!({"message": "Deleted"})),
        (status = 404, description = "Leave not found")
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();

    if !store.delete_leave(leave_id).await? {
        return Err(AppError::not_found("Leave not found"));
    }

    info!(leave_id, "Leave deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Deleted"
    })))
}
