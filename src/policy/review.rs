use strum_macros::Display;

use crate::error::AppError;
use crate::model::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// A manager only acts on members of their own team.
pub fn ensure_responsible(approver: &User, applicant: &User) -> Result<(), AppError> {
    if approver.role == Role::Manager && applicant.manager_id != Some(approver.id) {
        return Err(AppError::forbidden("You are not responsible for this employee"));
    }
    Ok(())
}

/// Who may decide on whose leave: managers on employees, hr on managers.
/// Nobody on their own leave.
pub fn authorize(approver: &User, applicant: &User, action: ReviewAction) -> Result<(), AppError> {
    if approver.id == applicant.id {
        return Err(AppError::forbidden(format!("Cannot {action} your own leave")));
    }

    match (approver.role, applicant.role) {
        (Role::Manager, Role::Employee) | (Role::Hr, Role::Manager) => Ok(()),
        _ => Err(AppError::forbidden(format!(
            "You are not authorized to {action} this leave"
        ))),
    }
}
