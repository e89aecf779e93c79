//! In-memory directory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::directory::DirectoryService;
use crate::error::{DirectoryError, Result};
use crate::user::User;

struct Entry {
    user: User,
    password: String,
}

#[derive(Default)]
struct State {
    /// Entries keyed by distinguished name.
    entries: HashMap<String, Entry>,
    offline: bool,
}

impl State {
    fn check_online(&self) -> Result<()> {
        if self.offline {
            Err(DirectoryError::fault("directory server unreachable"))
        } else {
            Ok(())
        }
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.values().find(|e| e.user.user_name == name)
    }
}

/// Directory living in process memory.
///
/// User names compare exactly. Clones share the same entries.
#[derive(Clone)]
pub struct MemoryDirectory {
    base_dn: String,
    administrator: String,
    state: Arc<RwLock<State>>,
}

impl MemoryDirectory {
    /// Create an empty [`MemoryDirectory`].
    pub fn new(base_dn: impl Into<String>, administrator: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            administrator: administrator.into(),
            state: Arc::default(),
        }
    }

    /// Make every following call fault, as an unreachable server would.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    fn user_dn(&self, name: &str) -> String {
        format!("uid={name},{}", self.base_dn)
    }
}

#[async_trait]
impl DirectoryService for MemoryDirectory {
    async fn authenticate(
        &self,
        distinguished_name: &str,
        password: &str,
    ) -> Result<bool> {
        let state = self.state.read().await;
        state.check_online()?;

        Ok(state
            .entries
            .get(distinguished_name)
            .is_some_and(|e| !password.is_empty() && e.password == password))
    }

    async fn get_user_by_user_name(&self, name: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        state.check_online()?;

        Ok(state.find(name).map(|e| e.user.clone()))
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let state = self.state.read().await;
        state.check_online()?;

        Ok(state.entries.values().map(|e| e.user.clone()).collect())
    }

    async fn get_administrator(&self) -> Result<User> {
        self.get_user_by_user_name(&self.administrator)
            .await?
            .ok_or_else(|| DirectoryError::AdministratorNotFound(self.administrator.clone()))
    }

    async fn add_user(&self, user: &User, password: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_online()?;

        if user.user_name.is_empty() {
            return Err(DirectoryError::fault("invalid DN syntax"));
        }

        let dn = self.user_dn(&user.user_name);
        if state.entries.contains_key(&dn) || state.find(&user.user_name).is_some() {
            return Err(DirectoryError::fault("entry already exists"));
        }

        let user = User {
            distinguished_name: dn.clone(),
            ..user.clone()
        };
        state.entries.insert(
            dn,
            Entry {
                user,
                password: password.to_owned(),
            },
        );
        Ok(())
    }

    async fn delete_user(&self, distinguished_name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_online()?;

        state
            .entries
            .remove(distinguished_name)
            .map(|_| ())
            .ok_or_else(|| DirectoryError::fault("no such object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_assigns_dn() {
        let directory = MemoryDirectory::new("dc=example,dc=org", "admin");
        directory.add_user(&User::new("alice"), "pw").await.unwrap();

        let alice = directory.get_user_by_user_name("alice").await.unwrap().unwrap();
        assert_eq!(alice.distinguished_name, "uid=alice,dc=example,dc=org");
        assert!(directory.get_user_by_user_name("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_password_never_binds() {
        let directory = MemoryDirectory::new("dc=example,dc=org", "admin");
        directory.add_user(&User::new("bob"), "").await.unwrap();

        assert!(!directory.authenticate("uid=bob,dc=example,dc=org", "").await.unwrap());
    }

    #[tokio::test]
    async fn test_offline() {
        let directory = MemoryDirectory::new("dc=example,dc=org", "admin");
        directory.set_offline(true).await;

        assert!(directory.get_all_users().await.is_err());
        assert!(directory.authenticate("uid=a,dc=org", "pw").await.is_err());

        directory.set_offline(false).await;
        assert!(directory.get_all_users().await.unwrap().is_empty());
    }
}
