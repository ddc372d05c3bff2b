//! Check command - validate configuration without binding any socket

use std::path::PathBuf;

use anyhow::Context;

use crate::config::{AppConfig, GatewayConfig};

/// Load and validate the application config and gateway table, then print
/// a summary. Exits non-zero on the first problem found.
pub fn run(table: Option<PathBuf>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("invalid application configuration")?;

    let table_path = table.unwrap_or_else(|| PathBuf::from(&config.gateway.table_path));
    let gateway = GatewayConfig::from_path(&table_path)?;

    let store = gateway.build_credential_store()?;
    let routes = gateway.build_route_table()?;

    println!(
        "{}: {} credential(s), {} route(s) - OK",
        table_path.display(),
        store.len(),
        routes.len()
    );

    Ok(())
}
