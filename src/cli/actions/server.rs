use crate::{
    accounts::{Accounts, CredentialStore, MemoryStore, PostgresStore},
    session::{SessionConfig, SessionStore},
    web,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub static_dir: Option<PathBuf>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the credential store cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store = open_store(args.dsn.as_ref()).await?;

    let accounts = store
        .list()
        .await
        .context("Failed to enumerate accounts")?
        .len();
    info!(
        "Credential store ready ({} backend, {} accounts)",
        store.backend(),
        accounts
    );

    if let Some(dir) = &args.static_dir {
        if dir.is_dir() {
            debug!("Serving static files from {}", dir.display());
        } else {
            warn!("Static directory {} does not exist", dir.display());
        }
    }

    let sessions = SessionStore::new(
        SessionConfig::new()
            .with_ttl_seconds(args.session_ttl_seconds)
            .with_cookie_secure(args.cookie_secure),
    );

    web::new(
        args.port,
        Arc::new(Accounts::new(store)),
        sessions,
        args.static_dir,
    )
    .await
}

async fn open_store(dsn: Option<&SecretString>) -> Result<Arc<dyn CredentialStore>> {
    let Some(dsn) = dsn else {
        info!("No DSN configured, accounts are kept in memory");
        return Ok(Arc::new(MemoryStore::new()));
    };

    info!("Connecting to {}", redact_dsn(dsn.expose_secret()));

    let store = PostgresStore::connect(dsn)
        .await
        .context("Failed to open PostgreSQL credential store")?;

    Ok(Arc::new(store))
}

/// DSN without its password, for logs.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                // Only fails for URLs that cannot carry credentials.
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable dsn>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_dsn_hides_password() {
        assert_eq!(
            redact_dsn("postgres://sesame:hunter2@db:5432/sesame"),
            "postgres://sesame:***@db:5432/sesame"
        );
    }

    #[test]
    fn redact_dsn_without_password() {
        assert_eq!(
            redact_dsn("postgres://sesame@db/sesame"),
            "postgres://sesame@db/sesame"
        );
    }

    #[test]
    fn redact_dsn_unparseable() {
        assert_eq!(redact_dsn("host=db user=sesame"), "<unparseable dsn>");
    }

    #[tokio::test]
    async fn open_store_defaults_to_memory() {
        let store = open_store(None).await;
        assert!(store.is_ok_and(|store| store.backend() == "memory"));
    }
}
