use crate::api::leave::{ApplyLeave, RejectLeave};
use crate::auth::handlers::{LoginRequest, LoginResponse, RegisterRequest};
use crate::model::{Leave, LeaveStatus, LeaveWithApplicant, Role, TeamMemberLeave, TeamStats, UserView};
use crate::policy::balance::LeaveBalance;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave Management

Registers employees, managers and hr staff, records leave requests and routes
them through a two-tier approval hierarchy.

### Key Features
- **Registration**
  - Password strength policy, automatic assignment of each employee to the
    first manager whose team is below capacity
- **Leave Lifecycle**
  - Apply, list (own / team / all), approve, reject and delete
  - Managers decide on their own team's employees, hr decides on managers
  - A yearly quota of approvable days per user
- **Reporting**
  - Team statistics, headcount, approved leave counts and per-user balances

### Security
No tokens are issued. `/login` returns the user's id and role and callers pass
their id in the path of subsequent requests.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::routes::index,

        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::leave::apply_leave,
        crate::api::leave::all_leaves,
        crate::api::leave::my_leaves,
        crate::api::leave::team_leaves,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::delete_leave,

        crate::api::user::list_users,

        crate::api::report::manager_stats,
        crate::api::report::total_users,
        crate::api::report::users_on_leave,
        crate::api::report::manager_team,
        crate::api::report::leave_balance
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ApplyLeave,
            RejectLeave,
            Role,
            LeaveStatus,
            Leave,
            LeaveWithApplicant,
            TeamMemberLeave,
            TeamStats,
            UserView,
            LeaveBalance
        )
    ),
    tags(
        (name = "Auth", description = "Registration and credential checks"),
        (name = "Leave", description = "Leave lifecycle APIs"),
        (name = "Manager", description = "Manager dashboard APIs"),
        (name = "HR", description = "HR dashboard APIs"),
        (name = "User", description = "User directory"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
