//! Configuration manager.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DirectoryError, Result};
use crate::ldap::LdapConfig;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default)]
    pub name: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to LDAP3 configuration.
    #[serde(skip_serializing)]
    pub ldap: Option<Ldap>,
}

/// LDAP configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ldap {
    /// Hostname:(?port) for LDAP instance.
    pub address: String,
    /// Admin DN credential to connect.
    pub user: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// DN for domain.
    pub base_dn: String,
    /// Template of user DN, `{uid}` is replaced by the user name.
    pub additional_users_dn: String,
    pub users_filter: Option<String>,
    /// User name of the well-known administrator.
    pub administrator: Option<String>,
    #[serde(default)]
    pub starttls: bool,
    /// Connection timeout, in seconds.
    pub timeout: Option<u64>,
}

impl Ldap {
    /// Build the [`LdapConfig`] used to connect.
    pub fn to_ldap_config(&self) -> Result<LdapConfig> {
        let address = normalize_url(&self.address)?;
        let mut config =
            LdapConfig::new(address, &self.base_dn, &self.additional_users_dn)?
                .starttls(self.starttls);

        if let Some(filter) = &self.users_filter {
            config = config.users_filter(filter);
        }
        if let Some(administrator) = &self.administrator {
            config = config.administrator(administrator);
        }
        if let Some(timeout) = self.timeout {
            config = config.timeout(Duration::from_secs(timeout));
        }

        Ok(config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Self {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "cannot read `config.yaml` file");
        Self::default()
    }
}

/// Normalizes an address by ensuring it starts with an LDAP scheme.
fn normalize_url(address: &str) -> Result<String> {
    let with_scheme = if address.contains("://") {
        address.to_owned()
    } else {
        format!("ldap://{address}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|err| DirectoryError::Configuration(format!("`{address}`: {err}")))?;

    match url.scheme() {
        "ldap" | "ldaps" => Ok(url.to_string()),
        scheme => Err(DirectoryError::Configuration(format!(
            "unsupported scheme `{scheme}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
name: Example
ldap:
  address: ldap.example.org:389
  user: cn=admin,dc=example,dc=org
  password: secret
  base_dn: dc=example,dc=org
  additional_users_dn: uid={uid},ou=people,dc=example,dc=org
  administrator: root
  timeout: 3
"#;

    #[test]
    fn test_parse() {
        let config: Configuration = serde_yaml::from_str(CONFIG).unwrap();
        let ldap = config.ldap.unwrap();
        assert_eq!(config.name, "Example");
        assert_eq!(ldap.user.as_deref(), Some("cn=admin,dc=example,dc=org"));
        assert!(!ldap.starttls);

        let ldap = ldap.to_ldap_config().unwrap();
        assert_eq!(ldap.addr, "ldap://ldap.example.org:389");
        assert_eq!(ldap.administrator, "root");
        assert_eq!(ldap.users_filter, "(objectClass=inetOrgPerson)");
        assert_eq!(ldap.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("ldaps://ldap.example.org").unwrap(), "ldaps://ldap.example.org");
        assert_eq!(normalize_url("localhost:389").unwrap(), "ldap://localhost:389");
        assert!(normalize_url("https://example.org").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Configuration::default()
            .path(PathBuf::from("/nonexistent/config.yaml"))
            .read();
        assert_eq!(config, Configuration::default());
    }
}
