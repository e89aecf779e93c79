use std::path::PathBuf;

use ldap_identity::UserManager;
use ldap_identity::config::Configuration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ldap_identity::telemetry::setup_tracing()?;

    let path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_default();
    let config = Configuration::default().path(path).read();

    let manager = ldap_identity::initialize_manager(&config).await?;

    let administrator = manager.administrator().await?;
    tracing::info!(dn = %administrator.distinguished_name, "administrator found");

    let users = manager.list_users().await?;
    tracing::info!(count = users.len(), name = %config.name, "directory reachable");

    Ok(())
}
