//! Serve command - bind the front door and run the gateway

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::api::router::create_router;
use crate::config::{AppConfig, GatewayConfig};
use crate::infrastructure::{logging, observability, tls};

/// Run the gateway until the process is stopped.
pub async fn run(table: Option<PathBuf>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let table_path = table.unwrap_or_else(|| PathBuf::from(&config.gateway.table_path));
    let gateway = GatewayConfig::from_path(&table_path)
        .with_context(|| format!("loading gateway table {}", table_path.display()))?;

    let state = crate::create_app_state(&config, &gateway)?;
    info!(
        credentials = state.credentials.len(),
        routes = state.routes.len(),
        "Gateway table loaded"
    );

    let metrics = match observability::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder unavailable: {}", e);
            None
        }
    };

    let app = create_router(state, metrics);
    let host: IpAddr = config.server.host.parse().context("invalid server.host")?;

    if config.tls.enabled {
        let https_addr = SocketAddr::from((host, config.server.https_port));
        let http_addr = SocketAddr::from((host, config.server.http_port));

        let rustls = RustlsConfig::from_pem_file(&config.tls.cert_path, &config.tls.key_path)
            .await
            .with_context(|| {
                format!(
                    "loading TLS certificate from {} / {}",
                    config.tls.cert_path, config.tls.key_path
                )
            })?;

        spawn_redirect_listener(
            http_addr,
            config.server.host.clone(),
            config.server.https_port,
        );

        info!("HTTPS gateway listening on {}", https_addr);
        axum_server::bind_rustls(https_addr, rustls)
            .serve(app.into_make_service())
            .await?;
    } else {
        let addr = SocketAddr::from((host, config.server.http_port));

        info!("HTTP gateway listening on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
    }

    Ok(())
}

/// Plaintext companion listener: every request gets a 308 to its
/// `https://` equivalent.
fn spawn_redirect_listener(addr: SocketAddr, fallback_host: String, https_port: u16) {
    let redirect = tls::redirect_router(fallback_host, https_port);

    tokio::spawn(async move {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("HTTP redirect listener on {}", addr);
                if let Err(e) = axum::serve(listener, redirect).await {
                    error!("Redirect listener failed: {}", e);
                }
            }
            Err(e) => error!("Cannot bind redirect listener on {}: {}", addr, e),
        }
    });
}
