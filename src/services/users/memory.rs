use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, User, UserDirectory, UserDirectoryError};

#[derive(Debug, Default)]
struct Tables {
    by_id: HashMap<String, User>,
    // email -> id
    by_email: HashMap<String, String>,
}

/// Process-local user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    tables: RwLock<Tables>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), UserDirectoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .by_id
            .get_mut(id)
            .ok_or(UserDirectoryError::NotFound)?;
        user.active = active;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create(&self, new: NewUser) -> Result<User, UserDirectoryError> {
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&new.email) {
            return Err(UserDirectoryError::AlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4().simple().to_string(),
            full_name: new.full_name,
            email: new.email,
            password_hash: new.password_hash,
            phone_number: new.phone_number,
            role: new.role,
            active: true,
            last_login: None,
            created_at: Utc::now(),
        };

        tables.by_email.insert(user.email.clone(), user.id.clone());
        tables.by_id.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserDirectoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserDirectoryError> {
        Ok(self.tables.read().await.by_id.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserDirectoryError> {
        let mut users: Vec<User> = self.tables.read().await.by_id.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), UserDirectoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .by_id
            .get_mut(id)
            .ok_or(UserDirectoryError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &str,
        full_name: Option<String>,
        phone_number: Option<String>,
    ) -> Result<User, UserDirectoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .by_id
            .get_mut(id)
            .ok_or(UserDirectoryError::NotFound)?;
        if let Some(name) = full_name {
            user.full_name = name;
        }
        if let Some(phone) = phone_number {
            user.phone_number = phone;
        }
        Ok(user.clone())
    }

    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: String,
    ) -> Result<(), UserDirectoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .by_id
            .get_mut(id)
            .ok_or(UserDirectoryError::NotFound)?;
        user.password_hash = password_hash;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone_number: String::new(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let dir = InMemoryUserDirectory::new();
        let user = dir.create(new_user("a@example.com")).await.unwrap();

        assert!(user.active);
        assert_eq!(
            dir.find_by_email("a@example.com").await.unwrap().unwrap().id,
            user.id
        );
        assert_eq!(dir.find_by_id(&user.id).await.unwrap().unwrap().email, "a@example.com");
        assert!(dir.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let dir = InMemoryUserDirectory::new();
        dir.create(new_user("a@example.com")).await.unwrap();
        assert_eq!(
            dir.create(new_user("a@example.com")).await.unwrap_err(),
            UserDirectoryError::AlreadyExists
        );
    }

    #[tokio::test]
    async fn touch_and_deactivate() {
        let dir = InMemoryUserDirectory::new();
        let user = dir.create(new_user("a@example.com")).await.unwrap();
        let at = Utc::now();

        dir.touch_last_login(&user.id, at).await.unwrap();
        dir.set_active(&user.id, false).await.unwrap();

        let stored = dir.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, Some(at));
        assert!(!stored.active);
        assert_eq!(
            dir.touch_last_login("missing", at).await.unwrap_err(),
            UserDirectoryError::NotFound
        );
    }

    #[tokio::test]
    async fn partial_profile_update_keeps_other_fields() {
        let dir = InMemoryUserDirectory::new();
        let user = dir.create(new_user("a@example.com")).await.unwrap();

        let renamed = dir
            .update_profile(&user.id, Some("Renamed".to_string()), None)
            .await
            .unwrap();
        assert_eq!(renamed.full_name, "Renamed");
        assert_eq!(renamed.phone_number, "");

        let rephoned = dir
            .update_profile(&user.id, None, Some("0911".to_string()))
            .await
            .unwrap();
        assert_eq!(rephoned.full_name, "Renamed");
        assert_eq!(rephoned.phone_number, "0911");

        dir.update_password_hash(&user.id, "new-hash".to_string())
            .await
            .unwrap();
        assert_eq!(
            dir.find_by_email("a@example.com").await.unwrap().unwrap().password_hash,
            "new-hash"
        );
        assert_eq!(
            dir.update_profile("missing", None, None).await.unwrap_err(),
            UserDirectoryError::NotFound
        );
    }
}
