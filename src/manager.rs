//! User manager backed by a directory service.
//!
//! Nothing is stored locally: no password hash, no cached entry. Every
//! password check is a live bind and every lookup a directory round trip.

use async_trait::async_trait;

use crate::directory::DirectoryService;
use crate::error::Result;
use crate::telemetry;
use crate::user::{OperationResult, USER_CREATE_FAILED, USER_DELETE_FAILED, User};

const DEFAULT_CREATE_MESSAGE: &str = "The user could not be created.";
const DEFAULT_DELETE_MESSAGE: &str = "The user could not be deleted.";

/// Generic user-management contract expected by identity callers.
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Check `password` for `user`.
    async fn authenticate(&self, user: &User, password: &str) -> bool;

    /// Whether `user` has a password set.
    async fn has_credential(&self, user: &User) -> bool;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: &User, password: &str) -> OperationResult;

    async fn delete_user(&self, distinguished_name: &str) -> OperationResult;

    async fn administrator(&self) -> Result<User>;

    fn email<'a>(&self, user: &'a User) -> Option<&'a str>;

    fn user_id<'a>(&self, user: &'a User) -> &'a str;

    fn user_name<'a>(&self, user: &'a User) -> &'a str;

    fn phone_number<'a>(&self, user: &'a User) -> Option<&'a str>;

    /// Every user, materialized.
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// [`UserManager`] forwarding every operation to a [`DirectoryService`].
#[derive(Debug, Clone)]
pub struct DirectoryUserManager<D> {
    directory: D,
}

impl<D: DirectoryService> DirectoryUserManager<D> {
    /// Create a new [`DirectoryUserManager`].
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Underlying directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }
}

#[async_trait]
impl<D: DirectoryService> UserManager for DirectoryUserManager<D> {
    /// Rejected bind and unreachable directory both yield `false`.
    #[tracing::instrument(skip_all, fields(dn = %user.distinguished_name))]
    async fn authenticate(&self, user: &User, password: &str) -> bool {
        let authenticated = match self
            .directory
            .authenticate(&user.distinguished_name, password)
            .await
        {
            Ok(authenticated) => authenticated,
            Err(err) => {
                tracing::debug!(error = %err, "directory bind failed");
                false
            },
        };

        telemetry::record_authentication(authenticated);
        authenticated
    }

    /// Credentials live in the directory, so there is always one.
    async fn has_credential(&self, _user: &User) -> bool {
        true
    }

    /// Identifiers and user names share the same addressing scheme.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.find_by_name(id).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<User>> {
        self.directory.get_user_by_user_name(name).await
    }

    #[tracing::instrument(skip_all, fields(user_name = %user.user_name))]
    async fn create_user(&self, user: &User, password: &str) -> OperationResult {
        let result = match self.directory.add_user(user, password).await {
            Ok(()) => OperationResult::Success,
            Err(err) => {
                let message = err.message_or(DEFAULT_CREATE_MESSAGE);
                tracing::warn!(code = USER_CREATE_FAILED, %message, "user creation failed");
                OperationResult::failed(USER_CREATE_FAILED, message)
            },
        };

        telemetry::record_mutation("create", result.is_success());
        result
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, distinguished_name: &str) -> OperationResult {
        let result = match self.directory.delete_user(distinguished_name).await {
            Ok(()) => OperationResult::Success,
            Err(err) => {
                let message = err.message_or(DEFAULT_DELETE_MESSAGE);
                tracing::warn!(code = USER_DELETE_FAILED, %message, "user deletion failed");
                OperationResult::failed(USER_DELETE_FAILED, message)
            },
        };

        telemetry::record_mutation("delete", result.is_success());
        result
    }

    async fn administrator(&self) -> Result<User> {
        self.directory.get_administrator().await
    }

    fn email<'a>(&self, user: &'a User) -> Option<&'a str> {
        user.email.as_deref()
    }

    /// Same as [`UserManager::user_name`], so that `find_by_id` round-trips.
    fn user_id<'a>(&self, user: &'a User) -> &'a str {
        &user.user_name
    }

    fn user_name<'a>(&self, user: &'a User) -> &'a str {
        &user.user_name
    }

    fn phone_number<'a>(&self, user: &'a User) -> Option<&'a str> {
        user.phone_number.as_deref()
    }

    /// Re-enumerates the whole directory on each call.
    #[tracing::instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.directory.get_all_users().await?;
        tracing::debug!(count = users.len(), "directory enumerated");
        Ok(users)
    }
}
