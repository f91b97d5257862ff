use crate::cli::commands::ServeArgs;
use crate::config::JobSettings;
use crate::errors::DeepScanError;
use crate::{api, trigger};
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

pub async fn handle_serve(args: ServeArgs) -> Result<(), DeepScanError> {
    let config = trigger::load_config(args.store.config.as_deref()).await?;
    let server = config.server.clone().unwrap_or_default();
    let host = args.host.or(server.host).unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(server.port).unwrap_or(DEFAULT_PORT);
    let db_path = trigger::resolve_db_path(args.store.db.as_deref(), &config);

    info!(host = %host, port, db = %db_path, "Starting API server");

    let shutdown = CancellationToken::new();
    let state = api::create_app_state(&db_path, &config, shutdown.clone())?;

    let jobs = JobSettings::resolve(&config);
    let janitor = state
        .trigger
        .jobs()
        .spawn_janitor(jobs.cleanup_interval, jobs.retention, shutdown.clone());

    let orchestrator = state.trigger.orchestrator().clone();
    let app = api::build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
            signal.cancel();
        })
        .await
        .map_err(|e| DeepScanError::Internal(format!("Server error: {}", e)))?;

    shutdown.cancel();
    if let Some(handle) = janitor {
        let _ = handle.await;
    }
    orchestrator.wait_for_alerts().await;
    Ok(())
}
