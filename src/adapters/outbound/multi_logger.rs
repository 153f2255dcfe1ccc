use crate::adapters::outbound::console_logger::init_console_logger;
use crate::adapters::outbound::file_logger::init_file_logger;
use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Fans every message out to all configured sinks.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }
}

/// File logger when `path` is given and usable, console logger otherwise.
/// fast_log already mirrors to the console, so the file logger is used alone.
pub fn init_combined_logger(path: Option<&str>) -> DynLogger {
    let console = init_console_logger();
    let Some(path) = path else {
        return console;
    };
    match init_file_logger(path) {
        Ok(file) => file,
        Err(reason) => {
            console.warn(&format!("{}; logging to console only", reason));
            console
        }
    }
}

/// Convenience for attaching an extra sink (e.g. a UI notification bridge).
pub fn with_extra_sink(primary: DynLogger, extra: DynLogger) -> DynLogger {
    Arc::new(MultiLogger::new(vec![primary, extra]))
}

/// Process-wide logging for the binary. fast_log must claim the `log` facade
/// before tracing is installed, and the tracing subscriber is registered
/// without a `log` bridge so the two never compete for it.
pub fn init_process_logging(path: Option<&str>) -> DynLogger {
    let logger = init_combined_logger(path);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        logger.warn(&format!("tracing subscriber not installed: {}", e));
    }
    logger
}
