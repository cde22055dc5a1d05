use crate::cli::ServeArgs;
use crate::infra::{build_service, load_store, AppState};
use crate::routes::with_brigade_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use brigade::config::AppConfig;
use brigade::error::AppError;
use brigade::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = load_store(&config.roster)?;
    let service = Arc::new(build_service(&config, store));
    let catalog = service.refresh_catalog()?;
    info!(badges = catalog.len(), season = service.season_year(), "badge catalog warmed");

    let app = with_brigade_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "brigade console ready");

    axum::serve(listener, app).await?;
    Ok(())
}
