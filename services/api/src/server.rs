use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_draw_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use lucky_draw::config::{AppConfig, AppEnvironment};
use lucky_draw::error::AppError;
use lucky_draw::roster::{CsvRosterTable, InMemoryRosterTable, RemoteRosterFetcher};
use lucky_draw::signups::{CsvSignupLog, InMemorySignupLog};
use lucky_draw::telemetry;
use lucky_draw::DrawService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.admin.password.is_none() {
        warn!("LUCKY_DRAW_ADMIN_PASSWORD is not set; roster uploads will be rejected");
    }

    let app = draw_app(&config)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        roster = %config.roster.roster_url,
        format = config.roster.roster_format.name,
        "lucky draw backend ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Draw routes over the stores for the configured environment. The test environment keeps
/// sign-ins and uploads in memory; every other environment writes the configured CSV files.
pub(crate) fn draw_app(config: &AppConfig) -> Router {
    let fetcher = RemoteRosterFetcher::default();

    match config.environment {
        AppEnvironment::Test => {
            info!("test environment, sign-ins and prize uploads stay in memory");
            with_draw_routes(Arc::new(DrawService::new(
                fetcher,
                config.roster.clone(),
                Arc::new(InMemorySignupLog::default()),
                Arc::new(InMemoryRosterTable::default()),
                config.admin.clone(),
            )))
        }
        AppEnvironment::Development | AppEnvironment::Production => {
            info!(
                signup_log = %config.storage.signup_log.display(),
                roster_table = %config.storage.roster_table.display(),
                "sign-ins and prize uploads persist to csv"
            );
            with_draw_routes(Arc::new(DrawService::new(
                fetcher,
                config.roster.clone(),
                Arc::new(CsvSignupLog::new(&config.storage.signup_log)),
                Arc::new(CsvRosterTable::new(&config.storage.roster_table)),
                config.admin.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use lucky_draw::config::{
        AdminConfig, FetchPolicy, RosterConfig, ServerConfig, StorageConfig, TelemetryConfig,
    };
    use lucky_draw::roster::RosterFormat;
    use std::path::Path;
    use tower::ServiceExt;

    fn config(environment: AppEnvironment, label: &str) -> AppConfig {
        let dir = std::env::temp_dir().join(format!(
            "lucky-draw-api-{label}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        AppConfig {
            environment,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            roster: RosterConfig {
                roster_url: dir.join("roster.csv").display().to_string(),
                roster_format: RosterFormat::VOUCHER_LEDGER,
                directory_url: dir.join("directory.csv").display().to_string(),
                directory_format: RosterFormat::PRIZE_SUMMARY,
                fetch: FetchPolicy::default(),
            },
            admin: AdminConfig { password: None },
            storage: StorageConfig {
                signup_log: dir.join("signups.csv"),
                roster_table: dir.join("prizes.csv"),
            },
        }
    }

    async fn sign_in(app: Router) -> StatusCode {
        let request = Request::post("/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Winnie Lo","company":"SSC"}"#))
            .expect("request");
        app.oneshot(request).await.expect("response").status()
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn test_environment_keeps_sign_ins_in_memory() {
        let config = config(AppEnvironment::Test, "memory");
        assert_eq!(sign_in(draw_app(&config)).await, StatusCode::OK);
        assert!(!config.storage.signup_log.exists());
        cleanup(&config.storage.signup_log);
    }

    #[tokio::test]
    async fn development_environment_writes_the_signup_log() {
        let config = config(AppEnvironment::Development, "csv");
        assert_eq!(sign_in(draw_app(&config)).await, StatusCode::OK);
        let text = std::fs::read_to_string(&config.storage.signup_log).expect("log written");
        assert!(text.contains("Winnie Lo"));
        cleanup(&config.storage.signup_log);
    }
}
