use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ministry_planner::config::AppConfig;
use ministry_planner::error::AppError;
use ministry_planner::workflows::scheduling::SchedulingEngine;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState, MissingSnapshot};
use crate::routes::with_operational_routes;

pub(crate) async fn run(mut args: ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let snapshot_path: PathBuf = config.storage.snapshot_path.clone();
    let store = Arc::new(open_store(&snapshot_path, MissingSnapshot::StartEmpty)?);
    let engine = Arc::new(SchedulingEngine::new(Arc::clone(&store)));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_operational_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, snapshot = %snapshot_path.display(), "ministry planner ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    readiness_flag.store(false, Ordering::Release);
    store.save_json(&snapshot_path)?;
    info!(snapshot = %snapshot_path.display(), "plan snapshot written, shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until the process is killed.
        std::future::pending::<()>().await;
    }
}
