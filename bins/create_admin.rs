//! Bootstrap an administrator account.
//!
//! Usage: `create-admin <username> <password>`, or `create-admin <username>`
//! with the password on stdin.

use std::io::BufRead;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use tracing::info;

fn read_credentials() -> Result<(String, String)> {
    let mut args = std::env::args().skip(1);
    let username = args.next().ok_or_else(|| anyhow!("usage: create-admin <username> [password]"))?;
    let password = match args.next() {
        Some(p) => p,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).context("reading password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    Ok((username, password))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let (username, password) = read_credentials()?;
    let cfg = configs::AppConfig::load_and_validate()?;
    if cfg.database.is_memory() {
        return Err(anyhow!("database.url points at the in-memory store; an admin created there would not persist"));
    }
    let state = server::build_state(&cfg).await?;
    let credentials = service::auth::domain::Credentials { username, password };
    let admin = state.services.auth.bootstrap_admin(&credentials).await?;
    info!(user_id = admin.id, username = %admin.username, "admin created");
    Ok(())
}
