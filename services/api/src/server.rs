use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::loader::seed_stores;
use crate::routes::with_report_card_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use report_card::config::AppConfig;
use report_card::error::AppError;
use report_card::reports::ReportCardService;
use report_card::telemetry;
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

    let engine = Arc::new(config.grading.engine()?);
    let stores = seed_stores(&args.batch)?;
    let report_service = Arc::new(
        ReportCardService::new(
            Arc::new(stores.scores),
            Arc::new(stores.policies),
            Arc::new(stores.roster),
            engine.clone(),
        )
        .with_default_school_name(config.grading.school_name.clone()),
    );

    let app = with_report_card_routes(engine, report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        core_subjects = ?config.grading.core_subjects,
        "report card service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
