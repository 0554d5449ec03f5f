use actix_web::{web, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use jp_api::telemetry::init_tracing;
use jp_api::{create_app, AppState};
use jp_core::services::{OtpCleanupConfig, OtpCleanupService, OtpService, OtpServiceConfig};
use jp_infra::{build_store, create_notifier};
use jp_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Loads the environment's .env file before reading any variable
    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        bind_address = %config.server.bind_address(),
        store = ?config.otp.store,
        email_provider = ?config.email.provider,
        "Starting Job Portal OTP API"
    );

    let store = build_store(&config).await?;
    let notifier = create_notifier(&config.email, config.otp.ttl_minutes);

    let otp_service = Arc::new(OtpService::new(
        Arc::clone(&store),
        notifier,
        OtpServiceConfig::from(&config.otp),
    ));

    let cleanup = Arc::new(OtpCleanupService::new(store, OtpCleanupConfig::from(&config.otp)));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState { otp_service });
    let server_config = config.server.clone();

    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config))
        .keep_alive(Duration::from_secs(config.server.keep_alive));

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.server.bind_address())?.run().await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }

    info!("Job Portal OTP API stopped");
    Ok(())
}
