//! Error handler for directory operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Faults raised by a directory collaborator.
///
/// Only the message matters to the user manager; variants exist so that
/// callers of the read paths can still tell an LDAP protocol error from a
/// misconfiguration.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Ldap(#[from] ldap3::LdapError),

    #[error("{0}")]
    Fault(String),

    #[error("invalid directory configuration, {0}")]
    Configuration(String),

    #[error("administrator `{0}` not found in directory")]
    AdministratorNotFound(String),
}

impl DirectoryError {
    /// Create an unstructured, message-bearing fault.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }

    /// Message of the fault, or `default` when it carries none.
    pub fn message_or(&self, default: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            default.to_owned()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_or_default() {
        assert_eq!(
            DirectoryError::fault("no such object").message_or("fallback"),
            "no such object"
        );
        assert_eq!(DirectoryError::fault("").message_or("fallback"), "fallback");
        assert_eq!(
            DirectoryError::fault("  ").message_or("fallback"),
            "fallback"
        );
    }

    #[test]
    fn test_administrator_message() {
        let err = DirectoryError::AdministratorNotFound("root".into());
        assert_eq!(err.to_string(), "administrator `root` not found in directory");
    }
}
