use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};
use std::str::FromStr;

use super::{Store, StoreError, StoreResult, StoreTx};
use crate::model::{
    Leave, LeaveStatus, LeaveWithApplicant, NewLeave, NewUser, Role, TeamMemberLeave, TeamStats,
    User,
};

const USER_COLUMNS: &str = "id, username, password, role, manager_id";
const LEAVE_COLUMNS: &str = "id, user_id, from_date, to_date, reason, status, rejection_reason";

#[derive(FromRow)]
struct UserSql {
    id: u64, // BIGINT UNSIGNED
    username: String,
    password: String,
    role: String,
    manager_id: Option<u64>,
}

#[derive(FromRow)]
struct LeaveSql {
    id: u64,
    user_id: u64,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reason: String,
    status: String,
    rejection_reason: Option<String>,
}

#[derive(FromRow)]
struct LeaveWithApplicantSql {
    id: u64,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reason: String,
    status: String,
    rejection_reason: Option<String>,
    username: String,
    role: String,
    user_id: u64,
}

#[derive(FromRow)]
struct TeamMemberLeaveSql {
    username: String,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    reason: Option<String>,
    status: Option<String>,
    rejection_reason: Option<String>,
}

fn parse<T: FromStr>(column: &str, raw: &str) -> StoreResult<T> {
    raw.parse()
        .map_err(|_| StoreError::Corrupt(format!("unexpected {column} value {raw:?}")))
}

impl TryFrom<UserSql> for User {
    type Error = StoreError;

    fn try_from(row: UserSql) -> StoreResult<Self> {
        Ok(User {
            role: parse("role", &row.role)?,
            id: row.id,
            username: row.username,
            password: row.password,
            manager_id: row.manager_id,
        })
    }
}

impl TryFrom<LeaveSql> for Leave {
    type Error = StoreError;

    fn try_from(row: LeaveSql) -> StoreResult<Self> {
        Ok(Leave {
            status: parse("status", &row.status)?,
            id: row.id,
            user_id: row.user_id,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
            rejection_reason: row.rejection_reason,
        })
    }
}

impl TryFrom<LeaveWithApplicantSql> for LeaveWithApplicant {
    type Error = StoreError;

    fn try_from(row: LeaveWithApplicantSql) -> StoreResult<Self> {
        Ok(LeaveWithApplicant {
            status: parse("status", &row.status)?,
            role: parse::<Role>("role", &row.role)?,
            id: row.id,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
            rejection_reason: row.rejection_reason,
            username: row.username,
            user_id: row.user_id,
        })
    }
}

impl TryFrom<TeamMemberLeaveSql> for TeamMemberLeave {
    type Error = StoreError;

    fn try_from(row: TeamMemberLeaveSql) -> StoreResult<Self> {
        Ok(TeamMemberLeave {
            status: row
                .status
                .as_deref()
                .map(|s| parse("status", s))
                .transpose()?,
            username: row.username,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
            rejection_reason: row.rejection_reason,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// MySQL-backed store over a shared connection pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlTx { tx }))
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, UserSql>(&sql)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO leaves (user_id, from_date, to_date, reason, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.user_id)
        .bind(leave.from_date)
        .bind(leave.to_date)
        .bind(&leave.reason)
        .bind(LeaveStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn leaves_for_user(&self, user_id: u64) -> StoreResult<Vec<Leave>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE user_id = ? ORDER BY id");
        let rows = sqlx::query_as::<_, LeaveSql>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn leaves_with_applicant(
        &self,
        manager_id: Option<u64>,
    ) -> StoreResult<Vec<LeaveWithApplicant>> {
        let mut sql = String::from(
            r#"
            SELECT l.id, l.from_date, l.to_date, l.reason, l.status, l.rejection_reason,
                   u.username, u.role, l.user_id
            FROM leaves l
            JOIN users u ON u.id = l.user_id
            "#,
        );
        if manager_id.is_some() {
            sql.push_str(" WHERE u.manager_id = ?");
        }
        sql.push_str(" ORDER BY l.id");

        let mut query = sqlx::query_as::<_, LeaveWithApplicantSql>(&sql);
        if let Some(manager_id) = manager_id {
            query = query.bind(manager_id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn team_overview(&self, manager_id: u64) -> StoreResult<Vec<TeamMemberLeave>> {
        let rows = sqlx::query_as::<_, TeamMemberLeaveSql>(
            r#"
            SELECT u.username, l.from_date, l.to_date, l.reason, l.status, l.rejection_reason
            FROM users u
            LEFT OUTER JOIN leaves l ON l.user_id = u.id
            WHERE u.manager_id = ?
            ORDER BY u.id, l.id
            "#,
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn team_stats(&self, manager_id: u64) -> StoreResult<TeamStats> {
        let team_size =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE manager_id = ?")
                .bind(manager_id)
                .fetch_one(&self.pool)
                .await?;

        let count_status = |status: LeaveStatus| {
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM leaves l
                JOIN users u ON u.id = l.user_id
                WHERE u.manager_id = ? AND l.status = ?
                "#,
            )
            .bind(manager_id)
            .bind(status.to_string())
            .fetch_one(&self.pool)
        };

        Ok(TeamStats {
            team_size,
            on_leave: count_status(LeaveStatus::Approved).await?,
            pending: count_status(LeaveStatus::Pending).await?,
        })
    }

    async fn count_leaves_with_status(&self, status: LeaveStatus) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leaves WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_approved_covering(&self, day: NaiveDate) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM leaves WHERE status = ? AND from_date <= ? AND to_date >= ?",
        )
        .bind(LeaveStatus::Approved.to_string())
        .bind(day)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete_leave(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM leaves WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

struct MySqlTx {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl StoreTx for MySqlTx {
    async fn username_taken(&mut self, username: &str) -> StoreResult<bool> {
        let matches = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(matches > 0)
    }

    async fn lock_managers(&mut self) -> StoreResult<Vec<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM users WHERE role = ? ORDER BY id FOR UPDATE",
        )
        .bind(Role::Manager.to_string())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(ids)
    }

    async fn team_size(&mut self, manager_id: u64) -> StoreResult<i64> {
        let size = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE manager_id = ?")
            .bind(manager_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(size)
    }

    async fn insert_user(&mut self, user: NewUser) -> StoreResult<u64> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, role, manager_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.role.to_string())
        .bind(user.manager_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn lock_user(&mut self, id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? FOR UPDATE");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn lock_leave(&mut self, id: u64) -> StoreResult<Option<Leave>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE id = ? FOR UPDATE");
        sqlx::query_as::<_, LeaveSql>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Leave::try_from)
            .transpose()
    }

    async fn approved_leaves(&mut self, user_id: u64) -> StoreResult<Vec<Leave>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE user_id = ? AND status = ?");
        let rows = sqlx::query_as::<_, LeaveSql>(&sql)
            .bind(user_id)
            .bind(LeaveStatus::Approved.to_string())
            .fetch_all(&mut *self.tx)
            .await?;
        convert_all(rows)
    }

    async fn set_leave_status(
        &mut self,
        id: u64,
        status: LeaveStatus,
        rejection_reason: Option<String>,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE leaves SET status = ?, rejection_reason = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(rejection_reason)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
