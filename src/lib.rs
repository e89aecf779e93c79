//! User manager answering identity callers from an LDAP directory.
//!
//! [`DirectoryUserManager`] implements the [`UserManager`] contract on top of
//! any [`DirectoryService`]. [`Ldap`] speaks to a real server,
//! [`MemoryDirectory`] keeps entries in process.
#![forbid(unsafe_code)]
#![deny(unused_mut)]

pub mod config;
pub mod directory;
pub mod error;
pub mod ldap;
pub mod manager;
pub mod memory;
pub mod telemetry;
pub mod user;

pub use directory::DirectoryService;
pub use error::{DirectoryError, Result};
pub use ldap::{Ldap, LdapConfig};
pub use manager::{DirectoryUserManager, UserManager};
pub use memory::MemoryDirectory;
pub use user::{OperationError, OperationResult, User};

/// Connect to the directory described by `config` and wrap it in a manager.
pub async fn initialize_manager(
    config: &config::Configuration,
) -> Result<DirectoryUserManager<Ldap>> {
    let Some(cfg) = &config.ldap else {
        return Err(DirectoryError::Configuration(
            "missing `ldap` entry on `config.yaml` file".into(),
        ));
    };

    let password = std::env::var("LDAP_PASSWORD").ok().or_else(|| cfg.password.clone());
    let ldap =
        Ldap::connect(cfg.to_ldap_config()?, cfg.user.as_deref(), password.as_deref())
            .await?;

    telemetry::describe_metrics();
    Ok(DirectoryUserManager::new(ldap))
}
