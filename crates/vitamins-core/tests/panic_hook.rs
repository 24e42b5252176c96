//! Panics reported through the host channel become window-tagged errors.
//!
//! Lives in its own test binary because the panic hook is process-global.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use vitamins_core::store::{KeyValueStore, MemoryStore};
use vitamins_core::{HostChannel, HostHandle, Tracker, TrackerConfig};

// Hook installation is take-then-set; serialize it so no hook is lost.
static INSTALL: Mutex<()> = Mutex::new(());

fn install(handle: &HostHandle) {
    let _guard = INSTALL.lock().unwrap_or_else(|e| e.into_inner());
    handle.install_panic_hook();
}

#[tokio::test]
async fn test_panic_recorded_as_uncaught_error() {
    let tracker = Tracker::new(TrackerConfig::new("test", "1.0"), Arc::new(MemoryStore::new()));
    let channel = HostChannel::new();
    let handle = channel.handle();
    install(&handle);

    let worker = std::thread::spawn(|| panic!("A monkey is throwing bananas at me!"));
    assert!(worker.join().is_err());
    handle.end_session();

    let tracker = channel.run(tracker).await;
    let logs = tracker.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].error.name, "Panic");
    assert_eq!(logs[0].error.message, "A monkey is throwing bananas at me!");
    assert_eq!(logs[0].tags, vec!["window".to_string()]);
    assert!(logs[0].error.stack.as_ref().unwrap()[0].contains("panic_hook.rs"));
}

#[tokio::test]
async fn test_panic_hook_does_not_keep_channel_open() {
    let store = MemoryStore::new();
    let tracker = Tracker::new(TrackerConfig::new("hook", "1.0"), Arc::new(store.clone()));
    let channel = HostChannel::new();
    let handle = channel.handle();
    install(&handle);
    drop(handle);

    let ended = tokio::time::timeout(Duration::from_secs(5), channel.run(tracker)).await;
    assert!(ended.is_ok());
    assert!(store.get("vitamins_hook_1.0_errors").unwrap().is_some());
}
