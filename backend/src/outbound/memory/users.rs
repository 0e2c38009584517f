//! In-memory `UserRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

/// User store enforcing the unique email constraint.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<UserId, User>, user: &User) -> bool {
    users
        .values()
        .any(|existing| existing.id != user.id && existing.email == user.email)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(UserPersistenceError::duplicate(format!("id {}", user.id)));
        }
        if email_taken(&users, user) {
            return Err(UserPersistenceError::duplicate("users_email_key"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if email_taken(&users, user) {
            return Err(UserPersistenceError::duplicate("users_email_key"));
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query(format!(
                "user {} does not exist",
                user.id
            ))),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{DisplayName, PasswordHash, Role};

    fn user(email: &str) -> User {
        User::local(
            DisplayName::new("Asha").expect("valid name"),
            Email::new(email).expect("valid email"),
            PasswordHash::new("$2b$04$hash"),
            [Role::Tenant].into_iter().collect(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn second_account_with_same_email_is_a_duplicate() {
        let repo = MemoryUserRepository::new();
        repo.insert(&user("asha@example.com")).await.expect("first insert");

        let error = repo
            .insert(&user("asha@example.com"))
            .await
            .expect_err("duplicate email");

        assert!(matches!(error, UserPersistenceError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn finds_by_email_after_update() {
        let repo = MemoryUserRepository::new();
        let mut stored = user("asha@example.com");
        repo.insert(&stored).await.expect("insert");
        stored.name = "Asha Rao".to_owned();
        repo.update(&stored).await.expect("update");

        let found = repo
            .find_by_email(&stored.email)
            .await
            .expect("lookup")
            .expect("present");

        assert_eq!(found.name, "Asha Rao");
    }
}
