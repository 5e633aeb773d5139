pub mod leave;
pub mod role;
pub mod user;

pub use leave::{Leave, LeaveStatus, LeaveWithApplicant, NewLeave, TeamMemberLeave, TeamStats};
pub use role::Role;
pub use user::{NewUser, User, UserView};
