//! LDAP support.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{
    Ldap as Ldap3, LdapConnAsync, LdapConnSettings, LdapResult, Scope, SearchEntry,
};

use crate::directory::DirectoryService;
use crate::error::{DirectoryError, Result};
use crate::user::User;

/// `invalidCredentials` result code.
const INVALID_CREDENTIALS: u32 = 49;
const DEFAULT_USERS_FILTER: &str = "(objectClass=inetOrgPerson)";
const USER_ATTRIBUTES: [&str; 6] =
    ["uid", "cn", "mail", "telephoneNumber", "displayName", "memberOf"];

#[derive(Debug, Clone)]
pub struct LdapConfig {
    pub addr: String,
    pub base_dn: String,
    pub user_dn_template: String,
    pub users_filter: String,
    /// User name of the well-known administrator.
    pub administrator: String,
    pub starttls: bool,
    pub timeout: Option<Duration>,
}

impl LdapConfig {
    /// Create a new [`LdapConfig`].
    pub fn new(
        addr: impl Into<String>,
        base_dn: impl Into<String>,
        user_dn_template: impl Into<String>,
    ) -> Result<Self> {
        let template = user_dn_template.into();

        if !template.contains("{uid}") {
            return Err(DirectoryError::Configuration(format!(
                "user DN template `{template}` lacks `{{uid}}`"
            )));
        }

        Ok(Self {
            addr: addr.into(),
            base_dn: base_dn.into(),
            user_dn_template: template,
            users_filter: DEFAULT_USERS_FILTER.to_owned(),
            administrator: "admin".to_owned(),
            starttls: false,
            timeout: None,
        })
    }

    /// Update filter matching every user entry.
    ///
    /// A bare item such as `objectClass=person` gets parenthesized.
    pub fn users_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        let filter = filter.trim();
        self.users_filter = if filter.starts_with('(') {
            filter.to_owned()
        } else {
            format!("({filter})")
        };
        self
    }

    /// Update administrator user name.
    pub fn administrator(mut self, name: impl Into<String>) -> Self {
        self.administrator = name.into();
        self
    }

    /// Upgrade plain `ldap://` connections with StartTLS.
    pub fn starttls(mut self, enabled: bool) -> Self {
        self.starttls = enabled;
        self
    }

    /// Limit connection establishment time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configure LDAP `dn` for user identifier.
    pub fn user_dn(&self, uid: &str) -> String {
        self.user_dn_template.replace("{uid}", &escape_dn(uid))
    }

    /// Filter matching a single user by exact `uid`.
    pub fn user_filter(&self, uid: &str) -> String {
        format!("(&{}(uid={}))", self.users_filter, escape_ldap(uid))
    }

    fn settings(&self) -> LdapConnSettings {
        let settings = LdapConnSettings::new().set_starttls(self.starttls);
        match self.timeout {
            Some(timeout) => settings.set_conn_timeout(timeout),
            None => settings,
        }
    }
}

/// LDAP manager to create connection.
#[derive(Clone, Debug)]
pub struct Ldap {
    conn: Ldap3,
    config: LdapConfig,
}

impl Ldap {
    /// Create a new [`Ldap3`] connection.
    ///
    /// The service account, if any, is used for every search and mutation.
    pub async fn connect(
        config: LdapConfig,
        bind_dn: Option<&str>,
        bind_password: Option<&str>,
    ) -> Result<Self> {
        let (handle, mut conn) =
            LdapConnAsync::with_settings(config.settings(), &config.addr).await?;
        ldap3::drive!(handle);

        if let Some(dn) = bind_dn {
            let password = bind_password.ok_or_else(|| {
                DirectoryError::Configuration(format!("missing password for `{dn}`"))
            })?;

            conn.simple_bind(dn, password).await?.success()?;
            tracing::info!(%dn, addr = %config.addr, "bound to directory");
        }

        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    async fn search(&self, filter: &str) -> Result<Vec<User>> {
        let mut conn = self.conn.clone();
        let (entries, _) = conn
            .search(
                &self.config.base_dn,
                Scope::Subtree,
                filter,
                USER_ATTRIBUTES.to_vec(),
            )
            .await?
            .success()?;

        Ok(entries
            .into_iter()
            .map(|entry| into_user(SearchEntry::construct(entry)))
            .collect())
    }
}

#[async_trait]
impl DirectoryService for Ldap {
    /// Bind on a dedicated connection so the service one keeps its identity.
    async fn authenticate(
        &self,
        distinguished_name: &str,
        password: &str,
    ) -> Result<bool> {
        if anonymous_bind(password) {
            return Ok(false);
        }

        let (handle, mut conn) =
            LdapConnAsync::with_settings(self.config.settings(), &self.config.addr)
                .await?;
        ldap3::drive!(handle);

        let outcome = bind_outcome(conn.simple_bind(distinguished_name, password).await?);
        settle_bind(outcome, conn.unbind().await)
    }

    async fn get_user_by_user_name(&self, name: &str) -> Result<Option<User>> {
        let mut users = self.search(&self.config.user_filter(name)).await?;

        // `uid` is expected to be unique, ambiguity is treated as absence.
        if users.len() == 1 { Ok(users.pop()) } else { Ok(None) }
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        self.search(&self.config.users_filter).await
    }

    async fn get_administrator(&self) -> Result<User> {
        let name = &self.config.administrator;
        self.get_user_by_user_name(name)
            .await?
            .ok_or_else(|| DirectoryError::AdministratorNotFound(name.clone()))
    }

    /// Create a new entry on [`Ldap3`].
    async fn add_user(&self, user: &User, password: &str) -> Result<()> {
        let dn = self.config.user_dn(&user.user_name);
        let common_name = user.display_name.as_deref().unwrap_or(&user.user_name);

        let mut attrs: Vec<(&str, HashSet<&str>)> = vec![
            (
                "objectClass",
                ["top", "person", "organizationalPerson", "inetOrgPerson"]
                    .into_iter()
                    .collect(),
            ),
            ("uid", [user.user_name.as_str()].into_iter().collect()),
            ("cn", [common_name].into_iter().collect()),
            ("sn", [user.user_name.as_str()].into_iter().collect()),
            ("userPassword", [password].into_iter().collect()),
        ];

        let optional = [
            ("mail", user.email.as_deref()),
            ("telephoneNumber", user.phone_number.as_deref()),
            ("displayName", user.display_name.as_deref()),
        ];
        for (attr, value) in optional {
            if let Some(value) = value {
                attrs.push((attr, [value].into_iter().collect()));
            }
        }

        let mut conn = self.conn.clone();
        conn.add(&dn, attrs).await?.success()?;
        tracing::info!(%dn, "directory entry added");
        Ok(())
    }

    async fn delete_user(&self, distinguished_name: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.delete(distinguished_name).await?.success()?;
        tracing::info!(dn = %distinguished_name, "directory entry deleted");
        Ok(())
    }
}

/// An empty simple bind is anonymous and would succeed.
fn anonymous_bind(password: &str) -> bool {
    password.is_empty()
}

/// Whether a bind accepted the credential.
///
/// Wrong credentials are a regular answer, any other failure a fault.
fn bind_outcome(result: LdapResult) -> Result<bool> {
    match result.rc {
        INVALID_CREDENTIALS => Ok(false),
        _ => {
            result.success()?;
            Ok(true)
        },
    }
}

/// Keep the bind outcome whatever happens on unbind.
fn settle_bind(
    outcome: Result<bool>,
    unbind: std::result::Result<(), ldap3::LdapError>,
) -> Result<bool> {
    if let Err(err) = unbind {
        tracing::debug!(error = %err, "unbind after password check failed");
    }
    outcome
}

/// Project a search entry into a [`User`].
fn into_user(mut entry: SearchEntry) -> User {
    let mut first = |attr: &str| {
        entry
            .attrs
            .get_mut(attr)
            .filter(|values| !values.is_empty())
            .map(|values| values.swap_remove(0))
    };

    let user_name = first("uid").unwrap_or_default();
    let email = first("mail");
    let phone_number = first("telephoneNumber");
    let display_name = first("displayName");
    let groups = entry.attrs.remove("memberOf").unwrap_or_default();

    User {
        distinguished_name: entry.dn,
        user_name,
        email,
        phone_number,
        display_name,
        groups,
    }
}

/// Escape a filter assertion value (RFC 4515).
fn escape_ldap(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '*' => out.push_str(r"\2a"),
            '(' => out.push_str(r"\28"),
            ')' => out.push_str(r"\29"),
            '\\' => out.push_str(r"\5c"),
            '\0' => out.push_str(r"\00"),
            c => out.push(c),
        }
    }
    out
}

/// Escape an attribute value inside a DN (RFC 4514).
fn escape_dn(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let last = input.chars().count().saturating_sub(1);
    for (i, c) in input.chars().enumerate() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            },
            '#' if i == 0 => out.push_str(r"\#"),
            ' ' if i == 0 || i == last => out.push_str(r"\ "),
            '\0' => out.push_str(r"\00"),
            c => out.push(c),
        }
    }
    out
}
