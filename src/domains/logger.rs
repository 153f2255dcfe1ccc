use chrono::Utc;
use log::Level;
use std::sync::Arc;

/// Logging port used by the navigation core.
/// Logging never fails from the session's point of view.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

const LOG_TARGET: &str = "stepmap_nav::navigation";

/// Writes through the `log` facade, which `init` points at fast_log.
pub struct FileLogger;

impl FileLogger {
    /// Console plus file appender at `path`. fast_log can only be initialised once per process.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .console()
                .file(path)
                .level(log::LevelFilter::Info),
        )?;
        Ok(())
    }

    fn emit(level: Level, msg: &str) {
        let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        log::log!(target: LOG_TARGET, level, "{} {}", stamp, msg);
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        Self::emit(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        Self::emit(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        Self::emit(Level::Error, msg);
    }
}
