//! # Session Subcommands
//!
//! - `login`: exchange email/password for a session and store it.
//! - `logout`: end the session; the local file is cleared even if the
//!   server cannot be reached.
//! - `whoami`: print the authenticated user.

use anyhow::{Context, Result};
use clap::Args;
use cultivate_client::CultivateClient;

use crate::{print_json, EXIT_OK};

/// Arguments for `cultivate login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,

    /// Account password.
    #[arg(long, env = "CULTIVATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run_login(args: &LoginArgs, client: &CultivateClient) -> Result<u8> {
    let user = client
        .auth()
        .login(&args.email, &args.password)
        .await
        .context("login failed")?;
    eprintln!("Logged in as {}", user.display_name());
    print_json(&user)?;
    Ok(EXIT_OK)
}

/// Always clears the session file, including a leftover user entry when no
/// token is held.
pub async fn run_logout(client: &CultivateClient) -> Result<u8> {
    let was_authenticated = client.auth().is_authenticated();
    client.auth().logout().await.context("failed to clear session")?;
    if was_authenticated {
        eprintln!("Logged out.");
    } else {
        eprintln!("Not logged in; local session cleared.");
    }
    Ok(EXIT_OK)
}

pub async fn run_whoami(client: &CultivateClient) -> Result<u8> {
    let user = client
        .auth()
        .current_user()
        .await
        .context("failed to fetch current user")?;
    print_json(&user)?;
    Ok(EXIT_OK)
}
