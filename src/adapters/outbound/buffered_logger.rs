use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy)]
enum Level {
    Info,
    Warn,
    Error,
}

/// Hands messages to a background task so the navigation loop never waits on log I/O.
/// Messages are dropped when the buffer is full.
struct BufferedLogger {
    sender: mpsc::Sender<(Level, String)>,
}

impl BufferedLogger {
    fn push(&self, level: Level, msg: &str) {
        let _ = self.sender.try_send((level, msg.to_string()));
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}

/// Must be called from within a tokio runtime.
pub fn init_buffered_logger(sink: DynLogger, capacity: usize) -> DynLogger {
    let (sender, mut receiver) = mpsc::channel::<(Level, String)>(capacity);
    tokio::spawn(async move {
        while let Some((level, msg)) = receiver.recv().await {
            match level {
                Level::Info => sink.info(&msg),
                Level::Warn => sink.warn(&msg),
                Level::Error => sink.error(&msg),
            }
        }
    });
    Arc::new(BufferedLogger { sender })
}
