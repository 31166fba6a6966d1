use crate::cli::ServeArgs;
use crate::infra::{load_service, AppState};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::ScoringState;
use credit_risk::telemetry;
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
    if let Some(dir) = args.artifacts.artifact_dir.take() {
        config.scoring.artifact_dir = dir;
    }

    telemetry::init(&config.telemetry)?;

    // Artifacts load before the listener binds so a bad export never serves traffic.
    let service = load_service(&config.scoring.artifact_dir)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let scoring_state = ScoringState {
        service,
        default_threshold: config.scoring.default_threshold,
    };

    let app = with_scoring_routes(scoring_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        artifact_dir = %config.scoring.artifact_dir.display(),
        "credit risk scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
