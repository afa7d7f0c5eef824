use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use trend_watch::config::{load_config, AppConfig};
use trend_watch::service::PollingService;
use trend_watch::source::HttpSeriesSource;
use trend_watch::storage::CsvPersister;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut history_only = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--history" => history_only = true,
            other => config_path = other.to_string(),
        }
    }

    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    // The blocking HTTP client and the worker thread live outside the async runtime.
    let setup_config = Arc::clone(&config);
    let service = match tokio::task::spawn_blocking(move || build_service(&setup_config)).await {
        Ok(Some(service)) => service,
        Ok(None) => return,
        Err(e) => {
            error!("Service setup task failed: {}", e);
            return;
        }
    };

    if history_only {
        let result = tokio::task::spawn_blocking(move || {
            let outcome = service.analyze_history(config.columns(), config.window, Path::new(&config.output_path));
            drop(service);
            outcome
        })
        .await;
        match result {
            Ok(Ok(table)) => info!("History analysed: {} rows", table.len()),
            Ok(Err(e)) => error!("History analysis failed: {}", e),
            Err(e) => error!("History task failed: {}", e),
        }
        return;
    }

    let mut service = service;
    if let Err(e) = service.start(config.columns(), config.window, config.output_path.as_str()) {
        error!("Failed to start service: {}", e);
        let _ = tokio::task::spawn_blocking(move || drop(service)).await;
        return;
    }

    info!(
        "Polling {:?} every {}s, writing {}. Press Ctrl-C to stop.",
        config.keywords, config.poll_interval_seconds, config.output_path
    );
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
    }

    info!("Stopping service, waiting for the current cycle to finish...");
    let stopped = tokio::task::spawn_blocking(move || {
        let result = service.stop();
        if let Some(e) = service.last_error() {
            warn!("Worker ended with error: {}", e);
        }
        result
    })
    .await;
    match stopped {
        Ok(Ok(())) => info!("Bye"),
        Ok(Err(e)) => error!("Stop failed: {}", e),
        Err(e) => error!("Stop task failed: {}", e),
    }
}

fn build_service(config: &AppConfig) -> Option<PollingService> {
    let source = match HttpSeriesSource::new(config.source_url.clone(), config.request_timeout()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize data source: {}", e);
            return None;
        }
    };

    Some(PollingService::new(
        Arc::new(source),
        Arc::new(CsvPersister),
        config.keywords.clone(),
        config.timeframe.clone(),
        config.poll_settings(),
    ))
}
