use credit_risk::error::AppError;
use credit_risk::scoring::{load_artifacts, ArtifactPaths, CreditScoringService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load every artifact under `dir`; any failure stops startup.
pub(crate) fn load_service(dir: &Path) -> Result<CreditScoringService, AppError> {
    let bundle = load_artifacts(&ArtifactPaths::from_dir(dir))?;
    Ok(CreditScoringService::new(Arc::new(bundle)))
}
