use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::role::Role;
use crate::policy::balance::leave_days;

/// Pending is the only non-terminal state.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display, AsRefStr, ToSchema,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 3,
    "from_date": "2026-01-20",
    "to_date": "2026-01-22",
    "reason": "Family function",
    "status": "Pending",
    "rejection_reason": null
}))]
pub struct Leave {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 3)]
    pub user_id: u64,
    #[schema(example = "2026-01-20", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    /// inclusive
    #[schema(example = "2026-01-22", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Family function")]
    pub reason: String,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
}

impl Leave {
    pub fn days(&self) -> i64 {
        leave_days(self.from_date, self.to_date)
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub user_id: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
}

/// Leave joined with its applicant, as listed for HR and managers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveWithApplicant {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "2026-01-20", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2026-01-22", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Family function")]
    pub reason: String,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
    #[schema(example = "employee_one")]
    pub username: String,
    pub role: Role,
    #[schema(example = 3)]
    pub user_id: u64,
}

/// One row of a manager's team overview. Team members without any leave
/// appear once with every leave field null.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamMemberLeave {
    #[schema(example = "employee_one")]
    pub username: String,
    #[schema(example = "2026-01-20", format = "date", value_type = Option<String>)]
    pub from_date: Option<NaiveDate>,
    #[schema(example = "2026-01-22", format = "date", value_type = Option<String>)]
    pub to_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub status: Option<LeaveStatus>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeamStats {
    #[schema(example = 4)]
    pub team_size: i64,
    /// approved leaves across the team
    #[schema(example = 2)]
    pub on_leave: i64,
    #[schema(example = 1)]
    pub pending: i64,
}
