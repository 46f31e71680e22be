use crate::cli::ServeArgs;
use crate::infra::{cors_layer, AppState};
use crate::routes::with_simulation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use grade_sim::config::AppConfig;
use grade_sim::error::AppError;
use grade_sim::simulations::{InMemorySimulationRepository, SimulationService};
use grade_sim::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        started_at: Utc::now(),
    };

    let repository = Arc::new(InMemorySimulationRepository::default());
    let simulation_service = Arc::new(SimulationService::new(repository, config.simulations));

    let app = with_simulation_routes(simulation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        passing_threshold = config.simulations.grading.passing_threshold,
        history_limit = config.simulations.history_limit,
        "grade simulator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
