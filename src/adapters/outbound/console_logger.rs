use crate::domains::logger::DomainLogger;
use chrono::Local;
use std::sync::Arc;

/// Prints to stdout/stderr with a local wall-clock prefix.
struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("{} INFO  {}", Local::now().format("%H:%M:%S"), msg);
    }

    fn warn(&self, msg: &str) {
        println!("{} WARN  {}", Local::now().format("%H:%M:%S"), msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{} ERROR {}", Local::now().format("%H:%M:%S"), msg);
    }
}

/// Console logger, used when no log file is configured or it cannot be opened.
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleLogger)
}
