use crate::domains::logger::{DomainLogger, FileLogger};
use std::path::Path;
use std::sync::Arc;

/// Creates the parent directory of `path`, starts fast_log and returns the
/// `log`-backed logger the session can be given.
pub fn init_file_logger(path: &str) -> Result<Arc<dyn DomainLogger>, String> {
    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create log directory {}: {}", dir.display(), e))?;
        }
    }
    FileLogger::init(path).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
