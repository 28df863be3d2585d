use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use parsegate_classifier::LocalClassifier;
use parsegate_server::state::AppState;

/// `parsegate health`: liveness check for container health checks.
///
/// Calls `GET http://localhost:$PARSEGATE_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("PARSEGATE_PORT").unwrap_or_else(|_| "8080".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parsegate=info".parse()?),
        )
        .json()
        .init();

    let cfg = parsegate_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let classifier = LocalClassifier::open(&cfg)?;
    if !classifier.has_geoip() {
        tracing::warn!(
            geoip_path = %cfg.geoip_path,
            "GeoIP database not found. Country and city fields will be empty. \
             Download GeoLite2-City and set PARSEGATE_GEOIP_PATH."
        );
    }

    let state = Arc::new(AppState::new(Arc::new(classifier), cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = parsegate_server::app::build_app(state);

    info!(port = cfg.port, "Parsegate listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Parsegate stopped");
    Ok(())
}
