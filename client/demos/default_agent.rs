//! Default Agent Example
//!
//! Plays battles by answering every decision with `default`, letting the
//! server pick the first legal option.
//!
//! Configuration comes from the JSON file named by `SEER_CONFIG`, or from
//! `PS_USERNAME`, `PS_PASSWORD` and `PS_FORMAT` when no file is given.
//! Set `RUST_LOG=seer_client=debug` to see every frame sent.

use anyhow::{Context, Result};
use seer_client::{ConnectorConfig, DefaultPolicy, Session, play};
use tracing_subscriber::EnvFilter;

fn load_config() -> Result<ConnectorConfig> {
    if let Ok(path) = std::env::var("SEER_CONFIG") {
        return ConnectorConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load {}", path));
    }

    let username = std::env::var("PS_USERNAME").context("Set PS_USERNAME or SEER_CONFIG")?;
    let password = std::env::var("PS_PASSWORD").context("Set PS_PASSWORD or SEER_CONFIG")?;
    let format = std::env::var("PS_FORMAT").unwrap_or_else(|_| "gen9randombattle".to_string());
    Ok(ConnectorConfig::new(username, password, format))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    println!("Default Agent");
    println!("=============");
    println!(
        "Playing {} battle(s) of {} as {}",
        config.total_battles, config.target_format, config.username
    );

    let mut session = Session::connect(config).await?;
    let termination = play(&mut session, &mut DefaultPolicy).await;

    println!("Session ended: {}", termination);
    Ok(())
}
