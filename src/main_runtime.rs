use sbc_solver::config::{AppConfig, LoggingConfig};
use sbc_solver::error::{Result, SolverError};
use sbc_solver::pricing::PriceCache;
use sbc_solver::HttpPriceSource;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub fn load_config(dir: &std::path::Path) -> Result<AppConfig> {
    let config = AppConfig::load_from(dir)?;
    if let Err(errors) = config.validate() {
        return Err(SolverError::Internal(format!(
            "invalid configuration: {}",
            errors.join("; ")
        )));
    }
    Ok(config)
}

pub fn build_cache(config: &AppConfig) -> Result<Arc<PriceCache>> {
    let source = HttpPriceSource::from_config(&config.price_source)?;
    Ok(Arc::new(PriceCache::from_config(Arc::new(source), &config.cache)))
}

pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sbc_solver=debug", config.level)));

    // `tracing_appender::rolling::daily` panics if it cannot create the first
    // file, so check the directory is writable before building the layer.
    let file_layer = config.dir.as_deref().and_then(|log_dir| {
        if std::fs::create_dir_all(log_dir).is_err() {
            eprintln!(
                "Warning: Could not create log directory {}, file logging disabled",
                log_dir
            );
            return None;
        }

        let test_path = std::path::Path::new(log_dir).join(".sbc_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(log_dir, "sbc-solver.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // Guard lives for the rest of the process
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    });

    let (json_layer, text_layer) = if config.json {
        (Some(tracing_subscriber::fmt::layer().json().with_target(true)), None)
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();
}

pub fn init_logging_simple() {
    // Minimal logging for quick commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
