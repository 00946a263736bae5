//! PostgreSQL user store
//!
//! Authentication transactions lock the account row with `SELECT ... FOR
//! UPDATE`, so concurrent attempts against one account queue on the row lock
//! while other accounts proceed. A [`PgTransaction`] dropped without commit is
//! rolled back by sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::{NewAccount, StoreError, UserStore, UserTransaction};
use crate::account::{ProfileUpdate, Role, UserAccount, UserId};

const SELECT_COLUMNS: &str = "SELECT id, username, password, first_name, last_name, email, role, \
     failed_login_attempts, lockout_until FROM users";

/// Row shape of the `users` table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    role: String,
    failed_login_attempts: i32,
    lockout_until: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {}", row.id, e)))?;
        let failed_attempts = u32::try_from(row.failed_login_attempts).map_err(|_| {
            StoreError::Corrupt(format!(
                "user {}: negative failed_login_attempts {}",
                row.id, row.failed_login_attempts
            ))
        })?;

        Ok(UserAccount {
            id: row.id,
            username: row.username,
            credential: row.password,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role,
            failed_attempts,
            lockout_until: row.lockout_until,
        })
    }
}

fn counter_column(failed_attempts: u32) -> i32 {
    i32::try_from(failed_attempts).unwrap_or(i32::MAX)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// [`UserStore`] backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn begin(&self) -> Result<Box<dyn UserTransaction + '_>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx: Some(tx) }))
    }

    async fn insert_user(&self, account: NewAccount) -> Result<UserId, StoreError> {
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "INSERT INTO users (username, password, first_name, last_name, email, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&account.username)
        .bind(&account.credential)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((id,)) => Ok(id),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateUsername(account.username)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{} ORDER BY username", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserAccount::try_from).collect()
    }

    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET first_name = $1, last_name = $2, email = $3 WHERE id = $4",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlock(&self, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, lockout_until = NULL WHERE username = $1",
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Transaction over a [`PgUserStore`]
pub struct PgTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTransaction {
    fn open(&mut self) -> Result<&mut Transaction<'static, Postgres>, StoreError> {
        self.tx.as_mut().ok_or(StoreError::TransactionClosed)
    }

    async fn execute_update(&mut self, query: &str, id: UserId) -> Result<(), StoreError> {
        let tx = self.open()?;
        let result = sqlx::query(query).bind(id).execute(&mut **tx).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserTransaction for PgTransaction {
    async fn find_by_username(&mut self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let tx = self.open()?;
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE username = $1 FOR UPDATE", SELECT_COLUMNS))
                .bind(username)
                .fetch_optional(&mut **tx)
                .await?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn record_failed_attempt(
        &mut self,
        id: UserId,
        failed_attempts: u32,
        lockout_until: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let tx = self.open()?;
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = $1, lockout_until = $2 WHERE id = $3",
        )
        .bind(counter_column(failed_attempts))
        .bind(lockout_until)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }

    async fn reset_failed_attempts(&mut self, id: UserId) -> Result<(), StoreError> {
        self.execute_update(
            "UPDATE users SET failed_login_attempts = 0, lockout_until = NULL WHERE id = $1",
            id,
        )
        .await
    }

    async fn replace_credential(&mut self, id: UserId, credential: &str) -> Result<(), StoreError> {
        let tx = self.open()?;
        let result = sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(credential)
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(StoreError::TransactionClosed)?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(StoreError::TransactionClosed)?;
        tx.rollback().await?;
        Ok(())
    }
}
