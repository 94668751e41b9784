use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use routewise_api::handlers::shared::OPERATION_DURATION;
use routewise_api::{build_router, worker, AppState, Config};
use routewise_billing::{PaymentProcessor, StripeProcessor};
use routewise_notify::{LogMailer, Mailer, ResendMailer};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    tracing::info!("Starting Routewise API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        webhook_signing = config.billing.webhook_secret.is_some(),
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool =
        routewise_db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    let repos = routewise_db::pg::repositories(pool.clone());

    let mailer: Arc<dyn Mailer> = match &config.email_api_key {
        Some(key) => Arc::new(ResendMailer::new(key.clone())),
        None => {
            tracing::warn!("EMAIL_API_KEY not set; emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let processor: Option<Arc<dyn PaymentProcessor>> = match &config.billing.processor_api_key {
        Some(key) => Some(Arc::new(StripeProcessor::new(key.clone()))),
        None => {
            tracing::warn!("PAYMENT_PROCESSOR_API_KEY not set; retries will not be charged");
            None
        }
    };

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let retry_interval = config.retry_job_interval;
    let state = AppState::new(config, repos, pool, mailer, processor);

    // Background jobs
    let jobs = [
        worker::spawn_retry_job(state.billing.clone(), retry_interval),
        worker::spawn_limiter_sweep(state.limiter.clone()),
    ];

    let app = build_router(state, metrics_handle);

    tracing::info!("HTTP server listening on {}", http_addr);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    for job in jobs {
        job.abort();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("routewise_api=debug".parse()?);
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most operations are a handful of queries; charges and email add a network hop
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(OPERATION_DURATION.to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    routewise_billing::metrics::describe_metrics();
    routewise_coverage::metrics::describe_metrics();
    metrics::describe_counter!(
        routewise_axum::rate_limit::RATE_LIMITED_TOTAL,
        "Requests rejected by the rate limiter"
    );
    metrics::describe_histogram!(
        OPERATION_DURATION,
        "Handler latency in seconds by operation and result"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
