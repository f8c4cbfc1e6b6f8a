//! In-memory `UserRepo` used by the handler tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    nullable::Nullable,
    repo::{RepoError, RepoResult, UserRepo},
    repo_types::User,
};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

#[derive(Default)]
pub struct InMemoryUserRepo {
    table: Mutex<Table>,
}

/// Mirrors the NOT NULL constraints of the `user` table.
fn check_not_null(user: &User) -> RepoResult<()> {
    if user.username.is_present() && user.password.is_present() {
        Ok(())
    } else {
        Err(RepoError::Storage(sqlx::Error::Protocol(
            "username and password cannot be null".into(),
        )))
    }
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn row_count(&self) -> usize {
        self.table.lock().await.rows.len()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn ensure_schema(&self) -> RepoResult<()> {
        Ok(())
    }

    async fn list_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<User> {
        self.table
            .lock()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn get_by_username(&self, name: &str) -> RepoResult<User> {
        self.table
            .lock()
            .await
            .rows
            .values()
            .find(|u| u.username.get().map(String::as_str) == Some(name))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, mut user: User) -> RepoResult<User> {
        check_not_null(&user)?;
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let id = table.last_id;
        user.id = Nullable::present(id);
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> RepoResult<User> {
        let id = user.id().ok_or(RepoError::NotFound)?;
        check_not_null(&user)?;
        let mut table = self.table.lock().await;
        let row = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        *row = user.clone();
        Ok(user)
    }

    async fn delete(&self, user: &User) -> RepoResult<()> {
        let id = user.id().ok_or(RepoError::NotFound)?;
        self.table
            .lock()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            username: Nullable::present("alice".into()),
            password: Nullable::present("pw".into()),
            email: Nullable::present("a@x.com".into()),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_keeps_fields() {
        let repo = InMemoryUserRepo::new();
        let created = repo.create(alice()).await.unwrap();
        assert!(created.id().is_some());
        assert_eq!(created.username, alice().username);
        assert_eq!(created.email, alice().email);

        let fetched = repo.get_by_id(created.id().unwrap()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let repo = InMemoryUserRepo::new();
        assert!(matches!(
            repo.get_by_id(999_999).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(
            repo.get_by_username("nobody").await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = InMemoryUserRepo::new();
        let mut ghost = alice();
        ghost.id = Nullable::present(7);
        assert!(matches!(repo.update(ghost.clone()).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.delete(&ghost).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.update(alice()).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn null_credentials_are_rejected_like_the_table() {
        let repo = InMemoryUserRepo::new();
        let mut no_password = alice();
        no_password.password = Nullable::absent();
        assert!(matches!(
            repo.create(no_password).await,
            Err(RepoError::Storage(_))
        ));

        let created = repo.create(alice()).await.unwrap();
        let partial = User {
            id: created.id.clone(),
            email: Nullable::present("n@x.com".into()),
            ..User::default()
        };
        assert!(matches!(repo.update(partial).await, Err(RepoError::Storage(_))));
        assert_eq!(repo.get_by_id(created.id().unwrap()).await.unwrap(), created);
        assert_eq!(repo.row_count().await, 1);
    }

    #[tokio::test]
    async fn list_contains_every_created_user() {
        let repo = InMemoryUserRepo::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let mut u = alice();
            u.username = Nullable::present(name.into());
            ids.push(repo.create(u).await.unwrap().id().unwrap());
        }
        let listed: Vec<i64> = repo
            .list_all()
            .await
            .unwrap()
            .iter()
            .filter_map(User::id)
            .collect();
        for id in ids {
            assert!(listed.contains(&id));
        }
    }
}
