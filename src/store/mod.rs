//! Persistence seam for users and leaves.
//!
//! Single-statement reads go through [`Store`]. Anything that checks state and
//! then writes (registration, approve, reject) opens a [`StoreTx`]; rows read
//! through a transaction stay locked until it commits or is dropped, and a
//! dropped transaction discards its writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::Display;

use crate::model::{
    Leave, LeaveStatus, LeaveWithApplicant, NewLeave, NewUser, TeamMemberLeave, TeamStats, User,
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    /// unique key violation (username)
    #[display(fmt = "duplicate key")]
    Duplicate,
    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn count_users(&self) -> StoreResult<i64>;

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<u64>;
    async fn leaves_for_user(&self, user_id: u64) -> StoreResult<Vec<Leave>>;
    /// All leaves with applicant details, or only those of `manager_id`'s team.
    async fn leaves_with_applicant(
        &self,
        manager_id: Option<u64>,
    ) -> StoreResult<Vec<LeaveWithApplicant>>;
    async fn team_overview(&self, manager_id: u64) -> StoreResult<Vec<TeamMemberLeave>>;
    async fn team_stats(&self, manager_id: u64) -> StoreResult<TeamStats>;
    async fn count_leaves_with_status(&self, status: LeaveStatus) -> StoreResult<i64>;
    /// Approved leaves whose range covers `day`.
    async fn count_approved_covering(&self, day: NaiveDate) -> StoreResult<i64>;
    /// Returns false when no leave had that id.
    async fn delete_leave(&self, id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn username_taken(&mut self, username: &str) -> StoreResult<bool>;
    /// Ids of every manager in id order, locked for the rest of the transaction.
    async fn lock_managers(&mut self) -> StoreResult<Vec<u64>>;
    async fn team_size(&mut self, manager_id: u64) -> StoreResult<i64>;
    async fn insert_user(&mut self, user: NewUser) -> StoreResult<u64>;

    async fn lock_user(&mut self, id: u64) -> StoreResult<Option<User>>;
    async fn lock_leave(&mut self, id: u64) -> StoreResult<Option<Leave>>;
    async fn approved_leaves(&mut self, user_id: u64) -> StoreResult<Vec<Leave>>;
    async fn set_leave_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
        rejection_reason: Option<String>,
    ) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
