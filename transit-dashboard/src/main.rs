use std::error::Error;

use tracing::info;

use transit_dashboard::config::DashboardConfig;
use transit_dashboard::dashboard::{Dashboard, Runtime};
use transit_dashboard::logging::init_logging;
use transit_dashboard::map::SceneMap;
use transit_dashboard::source::ApiClient;
use transit_dashboard::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let config = DashboardConfig::from_env()?;
    info!(api = %config.api.base_url, bind = %config.bind, "Starting transit dashboard");

    let client = ApiClient::new(config.api.clone())?;
    let dashboard = Dashboard::new(SceneMap::new(), config.map);
    let (mut runtime, handle) = Runtime::new(client, dashboard);
    if let Some(every) = config.refresh_every {
        runtime = runtime.with_refresh_interval(every);
    }
    let engine = tokio::spawn(runtime.run());

    let app = create_router(AppState::new(handle.clone()));

    info!("Routes:");
    info!("  GET  /health");
    info!("  GET  /api/dashboard?q=");
    info!("  POST /api/select/{{id}}");
    info!("  POST /api/markers/{{id}}/click");
    info!("  POST /api/refresh");
    info!("  POST /api/reload/{{resource}}");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    handle.shutdown().await.ok();
    engine.await?;
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
