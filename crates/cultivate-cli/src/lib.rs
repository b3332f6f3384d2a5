//! # cultivate-cli: CultivateCo command-line client
//!
//! Thin front end over `cultivate-client`. The session lives in a JSON file
//! (default `~/.cultivate/session.json`) so it survives between invocations.
//!
//! ## Subcommands
//!
//! - `login` / `logout` / `whoami`: session management
//! - `request`: raw authenticated call to any endpoint
//! - `facilities` / `compliance` / `inventory`: dashboard listings
//!
//! Results are printed as pretty JSON on stdout. Exit codes: 0 on success,
//! 1 on any error, 3 when the session expired and the user must log in again.

pub mod auth;
pub mod dashboard;
pub mod request;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use cultivate_client::{ApiError, ClientConfig, CultivateClient, FileStore};
use serde::Serialize;

pub const EXIT_OK: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_SESSION_EXPIRED: u8 = 3;

/// Session file used when `--store` is not given.
///
/// Falls back to the working directory when `HOME` is unset.
pub fn default_store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cultivate")
        .join("session.json")
}

/// Build a client over the session file at `store_path`.
///
/// `api_url` overrides `CULTIVATE_API_URL`; the timeout always comes from
/// the environment.
pub fn connect(api_url: Option<&str>, store_path: &Path) -> Result<CultivateClient> {
    let env_config = ClientConfig::from_env().context("invalid client configuration")?;
    let config = match api_url {
        Some(url) => ClientConfig::new(url)
            .with_context(|| format!("invalid --api-url {url:?}"))?
            .with_timeout(env_config.timeout_secs),
        None => env_config,
    };
    tracing::debug!(base_url = %config.base_url, store = %store_path.display(), "connecting");
    let store = Arc::new(FileStore::new(store_path));
    CultivateClient::new(config, store)
        .with_context(|| format!("failed to open session store {}", store_path.display()))
}

/// Map a command failure to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let expired = err
        .chain()
        .any(|cause| cause.downcast_ref::<ApiError>().is_some_and(ApiError::is_session_expired));
    if expired {
        EXIT_SESSION_EXPIRED
    } else {
        EXIT_ERROR
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expired_maps_to_exit_3() {
        let err = anyhow::Error::new(ApiError::SessionExpired {
            endpoint: "/facilities".into(),
            message: "jwt expired".into(),
        });
        assert_eq!(exit_code(&err), EXIT_SESSION_EXPIRED);
    }

    #[test]
    fn session_expired_behind_context_still_maps_to_exit_3() {
        let err = anyhow::Error::new(ApiError::SessionExpired {
            endpoint: "/facilities".into(),
            message: "jwt expired".into(),
        })
        .context("failed to list facilities");
        assert_eq!(exit_code(&err), EXIT_SESSION_EXPIRED);
    }

    #[test]
    fn other_errors_map_to_exit_1() {
        let err = anyhow::Error::new(ApiError::Status {
            endpoint: "/auth/me".into(),
            category: cultivate_client::ErrorCategory::Authentication,
            status: 401,
            message: "Authentication required".into(),
        });
        assert_eq!(exit_code(&err), EXIT_ERROR);
        assert_eq!(exit_code(&anyhow::anyhow!("bad input")), EXIT_ERROR);
    }

    #[test]
    fn default_store_lives_under_dot_cultivate() {
        let path = default_store_path();
        assert!(path.ends_with(".cultivate/session.json"));
    }
}
