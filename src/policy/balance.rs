use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::{Leave, LeaveStatus};

/// Inclusive day span of a leave.
pub fn leave_days(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days() + 1
}

/// Days taken by approved leaves starting in `year`.
pub fn used_days<'a>(leaves: impl IntoIterator<Item = &'a Leave>, year: i32) -> i64 {
    leaves
        .into_iter()
        .filter(|l| l.status == LeaveStatus::Approved && l.from_date.year() == year)
        .map(Leave::days)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({"total": 20, "used": 3, "remaining": 17}))]
pub struct LeaveBalance {
    pub total: i64,
    pub used: i64,
    pub remaining: i64,
}

impl LeaveBalance {
    pub fn for_year<'a>(leaves: impl IntoIterator<Item = &'a Leave>, year: i32, quota: i64) -> Self {
        let used = used_days(leaves, year);
        Self {
            total: quota,
            used,
            remaining: (quota - used).max(0),
        }
    }
}

/// Fails when approving `leave` would take the applicant's approved days,
/// across all years, past `quota`.
pub fn ensure_within_quota(leave: &Leave, approved: &[Leave], quota: i64) -> Result<(), AppError> {
    let used: i64 = approved
        .iter()
        .filter(|l| l.status == LeaveStatus::Approved)
        .map(Leave::days)
        .sum();
    if used + leave.days() > quota {
        return Err(AppError::bad_request("Insufficient leave balance"));
    }
    Ok(())
}
