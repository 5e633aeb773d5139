//! In-process store. Transactions take the state lock for their whole
//! lifetime and work on a copy that replaces the shared state on commit.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, StoreError, StoreResult, StoreTx};
use crate::model::{
    Leave, LeaveStatus, LeaveWithApplicant, NewLeave, NewUser, TeamMemberLeave, TeamStats, User,
};

#[derive(Debug, Clone, Default)]
struct State {
    users: BTreeMap<u64, User>,
    leaves: BTreeMap<u64, Leave>,
    last_user_id: u64,
    last_leave_id: u64,
}

impl State {
    fn insert_user(&mut self, user: NewUser) -> StoreResult<u64> {
        if self.username_taken(&user.username) {
            return Err(StoreError::Duplicate);
        }
        self.last_user_id += 1;
        let id = self.last_user_id;
        self.users.insert(
            id,
            User {
                id,
                username: user.username,
                password: user.password,
                role: user.role,
                manager_id: user.manager_id,
            },
        );
        Ok(id)
    }

    fn insert_leave(&mut self, leave: NewLeave) -> u64 {
        self.last_leave_id += 1;
        let id = self.last_leave_id;
        self.leaves.insert(
            id,
            Leave {
                id,
                user_id: leave.user_id,
                from_date: leave.from_date,
                to_date: leave.to_date,
                reason: leave.reason,
                status: LeaveStatus::Pending,
                rejection_reason: None,
            },
        );
        id
    }

    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|u| u.username == username)
    }

    fn team(&self, manager_id: u64) -> impl Iterator<Item = &User> {
        self.users
            .values()
            .filter(move |u| u.manager_id == Some(manager_id))
    }

    fn leaves_of(&self, user_id: u64) -> impl Iterator<Item = &Leave> {
        self.leaves.values().filter(move |l| l.user_id == user_id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.lock().await.users.values().cloned().collect())
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.state.lock().await.users.len() as i64)
    }

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<u64> {
        Ok(self.state.lock().await.insert_leave(leave))
    }

    async fn leaves_for_user(&self, user_id: u64) -> StoreResult<Vec<Leave>> {
        let state = self.state.lock().await;
        Ok(state.leaves_of(user_id).cloned().collect())
    }

    async fn leaves_with_applicant(
        &self,
        manager_id: Option<u64>,
    ) -> StoreResult<Vec<LeaveWithApplicant>> {
        let state = self.state.lock().await;
        let rows = state
            .leaves
            .values()
            .filter_map(|leave| {
                let applicant = state.users.get(&leave.user_id)?;
                if manager_id.is_some() && applicant.manager_id != manager_id {
                    return None;
                }
                Some(LeaveWithApplicant {
                    id: leave.id,
                    from_date: leave.from_date,
                    to_date: leave.to_date,
                    reason: leave.reason.clone(),
                    status: leave.status,
                    rejection_reason: leave.rejection_reason.clone(),
                    username: applicant.username.clone(),
                    role: applicant.role,
                    user_id: applicant.id,
                })
            })
            .collect();
        Ok(rows)
    }

    async fn team_overview(&self, manager_id: u64) -> StoreResult<Vec<TeamMemberLeave>> {
        let state = self.state.lock().await;
        let mut rows = Vec::new();
        for member in state.team(manager_id) {
            let before = rows.len();
            rows.extend(state.leaves_of(member.id).map(|leave| TeamMemberLeave {
                username: member.username.clone(),
                from_date: Some(leave.from_date),
                to_date: Some(leave.to_date),
                reason: Some(leave.reason.clone()),
                status: Some(leave.status),
                rejection_reason: leave.rejection_reason.clone(),
            }));
            if rows.len() == before {
                rows.push(TeamMemberLeave {
                    username: member.username.clone(),
                    from_date: None,
                    to_date: None,
                    reason: None,
                    status: None,
                    rejection_reason: None,
                });
            }
        }
        Ok(rows)
    }

    async fn team_stats(&self, manager_id: u64) -> StoreResult<TeamStats> {
        let state = self.state.lock().await;
        let mut stats = TeamStats {
            team_size: 0,
            on_leave: 0,
            pending: 0,
        };
        for member in state.team(manager_id) {
            stats.team_size += 1;
            for leave in state.leaves_of(member.id) {
                match leave.status {
                    LeaveStatus::Approved => stats.on_leave += 1,
                    LeaveStatus::Pending => stats.pending += 1,
                    LeaveStatus::Rejected => {}
                }
            }
        }
        Ok(stats)
    }

    async fn count_leaves_with_status(&self, status: LeaveStatus) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state.leaves.values().filter(|l| l.status == status).count() as i64)
    }

    async fn count_approved_covering(&self, day: NaiveDate) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .leaves
            .values()
            .filter(|l| l.status == LeaveStatus::Approved && l.from_date <= day && day <= l.to_date)
            .count() as i64)
    }

    async fn delete_leave(&self, id: u64) -> StoreResult<bool> {
        Ok(self.state.lock().await.leaves.remove(&id).is_some())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn username_taken(&mut self, username: &str) -> StoreResult<bool> {
        Ok(self.working.username_taken(username))
    }

    async fn lock_managers(&mut self) -> StoreResult<Vec<u64>> {
        Ok(self
            .working
            .users
            .values()
            .filter(|u| u.role == crate::model::Role::Manager)
            .map(|u| u.id)
            .collect())
    }

    async fn team_size(&mut self, manager_id: u64) -> StoreResult<i64> {
        Ok(self.working.team(manager_id).count() as i64)
    }

    async fn insert_user(&mut self, user: NewUser) -> StoreResult<u64> {
        self.working.insert_user(user)
    }

    async fn lock_user(&mut self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn lock_leave(&mut self, id: u64) -> StoreResult<Option<Leave>> {
        Ok(self.working.leaves.get(&id).cloned())
    }

    async fn approved_leaves(&mut self, user_id: u64) -> StoreResult<Vec<Leave>> {
        Ok(self
            .working
            .leaves_of(user_id)
            .filter(|l| l.status == LeaveStatus::Approved)
            .cloned()
            .collect())
    }

    async fn set_leave_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
        rejection_reason: Option<String>,
    ) -> StoreResult<()> {
        if let Some(leave) = self.working.leaves.get_mut(&id) {
            leave.status = status;
            leave.rejection_reason = rejection_reason;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
