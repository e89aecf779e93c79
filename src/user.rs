//! Directory principal as seen by the application.

/// Code returned when the directory refuses a new user.
pub const USER_CREATE_FAILED: &str = "LdapUserCreateFailed";
/// Code returned when the directory refuses a removal.
pub const USER_DELETE_FAILED: &str = "LdapUserDeleteFailed";

/// Projection of a directory entry.
///
/// Every instance is fetched on demand; nothing here is authoritative.
/// There is deliberately no password field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct User {
    /// Assigned by the directory on creation, empty before that.
    pub distinguished_name: String,
    pub user_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub display_name: Option<String>,
    /// Groups the entry is a member of (`memberOf`).
    pub groups: Vec<String>,
}

impl User {
    /// Create a new [`User`] not yet known to the directory.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    /// Update `distinguished_name` of [`User`].
    pub fn with_distinguished_name(mut self, dn: impl Into<String>) -> Self {
        self.distinguished_name = dn.into();
        self
    }

    /// Update `email` of [`User`].
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Update `phone_number` of [`User`].
    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    /// Update `display_name` of [`User`].
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Failure reported by a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub code: String,
    pub description: String,
}

/// Outcome of a mutating operation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Success,
    Failed(OperationError),
}

impl OperationResult {
    /// Create a failed [`OperationResult`].
    pub fn failed(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Failed(OperationError {
            code: code.into(),
            description: description.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Error carried by a failed result.
    pub fn error(&self) -> Option<&OperationError> {
        match self {
            Self::Success => None,
            Self::Failed(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let user = User::new("alice")
            .with_email("alice@example.com")
            .with_phone_number("+33 1 23 45 67 89");

        assert_eq!(user.user_name, "alice");
        assert!(user.distinguished_name.is_empty());
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.phone_number.as_deref(), Some("+33 1 23 45 67 89"));
        assert!(user.groups.is_empty());
    }

    #[test]
    fn test_operation_result() {
        assert!(OperationResult::Success.is_success());
        assert!(OperationResult::Success.error().is_none());

        let result = OperationResult::failed(USER_DELETE_FAILED, "no such object");
        assert!(!result.is_success());
        assert_eq!(
            result.error(),
            Some(&OperationError {
                code: "LdapUserDeleteFailed".into(),
                description: "no such object".into(),
            })
        );
    }
}
