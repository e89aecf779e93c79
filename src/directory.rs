//! Interface for directory operations.

use async_trait::async_trait;

use crate::error::Result;
use crate::user::User;

/// Port for a directory service holding principals and their credentials.
///
/// Timeouts, retries, pooling and cancellation all belong to the implementer.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Try to bind as `distinguished_name` with `password`.
    async fn authenticate(
        &self,
        distinguished_name: &str,
        password: &str,
    ) -> Result<bool>;

    /// Find a single principal by exact user name.
    async fn get_user_by_user_name(&self, name: &str) -> Result<Option<User>>;

    /// Enumerate every principal.
    async fn get_all_users(&self) -> Result<Vec<User>>;

    /// Well-known administrative principal.
    async fn get_administrator(&self) -> Result<User>;

    /// Add a new principal with its initial credential.
    async fn add_user(&self, user: &User, password: &str) -> Result<()>;

    /// Remove a principal.
    async fn delete_user(&self, distinguished_name: &str) -> Result<()>;
}
