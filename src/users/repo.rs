use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::MySqlPool;
use thiserror::Error;
use tracing::debug;

use super::{nullable::Nullable, repo_types::User};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("storage call exceeded {0:?}")]
    Timeout(Duration),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence port for users. Each call issues a single statement.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn ensure_schema(&self) -> RepoResult<()>;
    async fn list_all(&self) -> RepoResult<Vec<User>>;
    async fn get_by_id(&self, id: i64) -> RepoResult<User>;
    async fn get_by_username(&self, name: &str) -> RepoResult<User>;
    /// Inserts the user and returns it with the store-assigned id.
    async fn create(&self, user: User) -> RepoResult<User>;
    /// Fails with `NotFound` when no row has the user's id.
    async fn update(&self, user: User) -> RepoResult<User>;
    /// Fails with `NotFound` when no row has the user's id.
    async fn delete(&self, user: &User) -> RepoResult<()>;
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS `user` (
        id INT NOT NULL AUTO_INCREMENT,
        username VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        email VARCHAR(255),
        PRIMARY KEY (id)
    ) ENGINE=InnoDB
"#;

/// MySQL-backed repository. Owns the pool; every statement runs under
/// `statement_timeout`.
#[derive(Clone)]
pub struct MySqlUserRepo {
    db: MySqlPool,
    statement_timeout: Duration,
}

impl MySqlUserRepo {
    pub fn new(db: MySqlPool, statement_timeout: Duration) -> Self {
        Self {
            db,
            statement_timeout,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> RepoResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.statement_timeout, fut).await {
            Ok(res) => res.map_err(RepoError::from),
            Err(_) => Err(RepoError::Timeout(self.statement_timeout)),
        }
    }
}

#[async_trait]
impl UserRepo for MySqlUserRepo {
    async fn ensure_schema(&self) -> RepoResult<()> {
        self.bounded(sqlx::query(CREATE_TABLE).execute(&self.db)).await?;
        Ok(())
    }

    async fn list_all(&self) -> RepoResult<Vec<User>> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, password, email
                FROM `user`
                ORDER BY id
                "#,
            )
            .fetch_all(&self.db),
        )
        .await
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<User> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, password, email
                FROM `user`
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(&self.db),
        )
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn get_by_username(&self, name: &str) -> RepoResult<User> {
        self.bounded(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, password, email
                FROM `user`
                WHERE username = ?
                LIMIT 1
                "#,
            )
            .bind(name)
            .fetch_optional(&self.db),
        )
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn create(&self, mut user: User) -> RepoResult<User> {
        let done = self
            .bounded(
                sqlx::query(
                    r#"
                    INSERT INTO `user` (username, password, email)
                    VALUES (?, ?, ?)
                    "#,
                )
                .bind(&user.username)
                .bind(&user.password)
                .bind(&user.email)
                .execute(&self.db),
            )
            .await?;

        let id = i64::try_from(done.last_insert_id())
            .map_err(|e| RepoError::Storage(sqlx::Error::Decode(Box::new(e))))?;
        user.id = Nullable::present(id);
        debug!(user_id = id, "user inserted");
        Ok(user)
    }

    async fn update(&self, user: User) -> RepoResult<User> {
        let id = user.id().ok_or(RepoError::NotFound)?;
        // rows_affected counts matched rows: sqlx negotiates CLIENT_FOUND_ROWS.
        let done = self
            .bounded(
                sqlx::query(
                    r#"
                    UPDATE `user`
                    SET username = ?, password = ?, email = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&user.username)
                .bind(&user.password)
                .bind(&user.email)
                .bind(id)
                .execute(&self.db),
            )
            .await?;

        if done.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        debug!(user_id = id, "user updated");
        Ok(user)
    }

    async fn delete(&self, user: &User) -> RepoResult<()> {
        let id = user.id().ok_or(RepoError::NotFound)?;
        let done = self
            .bounded(
                sqlx::query("DELETE FROM `user` WHERE id = ?")
                    .bind(id)
                    .execute(&self.db),
            )
            .await?;

        if done.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        debug!(user_id = id, "user deleted");
        Ok(())
    }
}
