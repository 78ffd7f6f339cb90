use lucky_draw::roster::RosterFormat;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_format(raw: &str) -> Result<RosterFormat, String> {
    RosterFormat::from_name(raw).ok_or_else(|| {
        format!(
            "unknown roster format '{raw}' (expected one of: {})",
            RosterFormat::known_names().join(", ")
        )
    })
}
