use std::sync::{Arc, Mutex};
use std::time::Duration;
use stepmap_nav::adapters::outbound::{
    init_buffered_logger, init_noop_logger, with_extra_sink, MultiLogger,
};
use stepmap_nav::domains::logger::{DomainLogger, DynLogger};

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self { Self { messages: Arc::new(Mutex::new(Vec::new())) } }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("INFO:{}", msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("WARN:{}", msg)); }
    fn error(&self, msg: &str) { self.messages.lock().unwrap().push(format!("ERR:{}", msg)); }
}

#[tokio::test]
async fn test_buffered_and_noop_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let bridge = capture.clone() as DynLogger;

    let buffered = init_buffered_logger(bridge, 8);
    buffered.info("one");
    buffered.warn("two");
    buffered.error("three");

    // give the background task a moment
    tokio::time::sleep(Duration::from_millis(50)).await;

    let msgs = capture.messages.lock().unwrap();
    assert!(msgs.iter().any(|m| m.contains("INFO:one")));
    assert!(msgs.iter().any(|m| m.contains("WARN:two")));
    assert!(msgs.iter().any(|m| m.contains("ERR:three")));

    let noop = init_noop_logger();
    noop.info("ignored");
    noop.error("ignored-err");
}

#[test]
fn test_multi_logger_fans_out() {
    let first = Arc::new(BridgeCapture::new());
    let second = Arc::new(BridgeCapture::new());
    let multi = MultiLogger::new(vec![first.clone() as DynLogger, second.clone() as DynLogger]);

    multi.warn("route failed");

    for capture in [&first, &second] {
        assert_eq!(*capture.messages.lock().unwrap(), vec!["WARN:route failed".to_string()]);
    }
}

#[test]
fn test_extra_sink_sees_session_messages() {
    let ui = Arc::new(BridgeCapture::new());
    let logger = with_extra_sink(init_noop_logger(), ui.clone());

    logger.info("arrived at Padaria");
    assert!(ui.messages.lock().unwrap().iter().any(|m| m == "INFO:arrived at Padaria"));
}
