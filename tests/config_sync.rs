//! ConfigSync driven end to end through a watch source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nginx_fleet_sync::config::WatcherSettings;
use nginx_fleet_sync::lifecycle::Shutdown;
use nginx_fleet_sync::sync::{
    ChannelWatchSource, ConfigSync, ConfigurationEvent, EventSender, RegistrationError,
    ResourceEventHandler, SharedHostList, WatchSource,
};
use serde_json::Value;
use tokio::sync::broadcast;

mod common;

use common::{hosts_payload, payload_without_hosts};

fn channel_sync() -> (ConfigSync<ChannelWatchSource>, EventSender) {
    let (source, sender) = ChannelWatchSource::new();
    let mut sync = ConfigSync::new(&WatcherSettings::default());
    sync.initialize(source).unwrap();
    (sync, sender)
}

async fn wait_for(hosts: &SharedHostList, expected: &[&str]) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while hosts.load().as_slice() != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("host list never became {expected:?}, last {:?}", hosts.load()));
}

#[tokio::test]
async fn test_events_flow_until_cancelled() {
    let (sync, sender) = channel_sync();
    let hosts = sync.hosts();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(sync.run(shutdown.subscribe()));

    sender
        .send("nkl", ConfigurationEvent::Added(hosts_payload("10.0.0.1")))
        .unwrap();
    wait_for(&hosts, &["10.0.0.1"]).await;

    sender
        .send(
            "nkl",
            ConfigurationEvent::Updated {
                new: hosts_payload("10.0.0.1,10.0.0.2"),
                old: Some(hosts_payload("10.0.0.1")),
            },
        )
        .unwrap();
    wait_for(&hosts, &["10.0.0.1", "10.0.0.2"]).await;

    sender
        .send("nkl", ConfigurationEvent::Updated { new: payload_without_hosts(), old: None })
        .unwrap();
    sender
        .send("other", ConfigurationEvent::Deleted(None))
        .unwrap();
    sender
        .send("nkl", ConfigurationEvent::Added(hosts_payload("10.0.0.3")))
        .unwrap();
    wait_for(&hosts, &["10.0.0.3"]).await;

    sender.send("nkl", ConfigurationEvent::Deleted(None)).unwrap();
    wait_for(&hosts, &[]).await;

    shutdown.trigger();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_no_events_after_run_returns() {
    let (sync, sender) = channel_sync();
    let hosts = sync.hosts();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(sync.run(shutdown.subscribe()));

    sender
        .send("nkl", ConfigurationEvent::Added(hosts_payload("a,b")))
        .unwrap();
    wait_for(&hosts, &["a", "b"]).await;

    shutdown.trigger();
    task.await.unwrap().unwrap();

    let rejected = sender.send("nkl", ConfigurationEvent::Deleted(None));
    assert!(rejected.is_err());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(hosts.load().as_slice(), ["a", "b"]);
}

#[tokio::test]
async fn test_run_requires_a_source() {
    let sync = ConfigSync::<ChannelWatchSource>::new(&WatcherSettings::default());
    let shutdown = Shutdown::new();

    let result = sync.run(shutdown.subscribe()).await;

    assert!(matches!(result, Err(RegistrationError::NotRegistered)));
}

#[test]
fn test_empty_namespace_is_rejected() {
    let settings = WatcherSettings {
        namespace: String::new(),
        ..WatcherSettings::default()
    };
    let (source, _sender) = ChannelWatchSource::new();
    let mut sync = ConfigSync::new(&settings);

    assert!(matches!(
        sync.initialize(source),
        Err(RegistrationError::EmptyNamespace)
    ));
}

/// Delivers one event, then panics inside the watch loop.
struct PanickingSource {
    handler: Option<Arc<dyn ResourceEventHandler>>,
    reached: Arc<AtomicBool>,
}

impl WatchSource for PanickingSource {
    fn register(
        &mut self,
        _namespace: &str,
        handler: Arc<dyn ResourceEventHandler>,
    ) -> Result<(), RegistrationError> {
        self.handler = Some(handler);
        Ok(())
    }

    async fn run(self, _stop: broadcast::Receiver<()>) {
        if let Some(handler) = &self.handler {
            handler.on_add(&hosts_payload("before-panic"));
        }
        self.reached.store(true, Ordering::SeqCst);
        panic!("watch stream blew up");
    }
}

#[tokio::test]
async fn test_watch_loop_panic_is_contained() {
    let reached = Arc::new(AtomicBool::new(false));
    let mut sync = ConfigSync::new(&WatcherSettings::default());
    sync.initialize(PanickingSource {
        handler: None,
        reached: reached.clone(),
    })
    .unwrap();
    let hosts = sync.hosts();

    let shutdown = Shutdown::new();
    let task = tokio::spawn(sync.run(shutdown.subscribe()));

    wait_for(&hosts, &["before-panic"]).await;
    assert!(reached.load(Ordering::SeqCst));

    // run keeps waiting for cancellation after the loop dies
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!task.is_finished());

    shutdown.trigger();
    task.await.unwrap().unwrap();
    assert_eq!(hosts.load().as_slice(), ["before-panic"]);
}

fn event_for(i: usize) -> ConfigurationEvent {
    let payload = || -> Value {
        let hosts = (0..=i % 7)
            .map(|n| format!("h{i}-{n}"))
            .collect::<Vec<_>>()
            .join(",");
        hosts_payload(&hosts)
    };
    match i % 3 {
        0 => ConfigurationEvent::Added(payload()),
        1 => ConfigurationEvent::Updated {
            new: payload(),
            old: None,
        },
        _ => ConfigurationEvent::Deleted(None),
    }
}

/// Every published list is empty or the complete list of exactly one event.
fn is_whole_state(hosts: &[String]) -> bool {
    let Some(first) = hosts.first() else {
        return true;
    };
    let Some(prefix) = first.strip_suffix("-0") else {
        return first == "done";
    };
    let Ok(i) = prefix.trim_start_matches('h').parse::<usize>() else {
        return false;
    };
    hosts.len() == i % 7 + 1
        && hosts
            .iter()
            .enumerate()
            .all(|(n, host)| *host == format!("h{i}-{n}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_torn_lists() {
    let (sync, sender) = channel_sync();
    let hosts = sync.hosts();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(sync.run(shutdown.subscribe()));

    let finished = Arc::new(AtomicBool::new(false));
    let reader = {
        let hosts = hosts.clone();
        let finished = finished.clone();
        tokio::task::spawn_blocking(move || {
            let mut reads = 0usize;
            while !finished.load(Ordering::SeqCst) {
                let snapshot = hosts.load();
                assert!(is_whole_state(&snapshot), "torn read: {snapshot:?}");
                reads += 1;
            }
            reads
        })
    };

    for i in 0..1000 {
        sender.send("nkl", event_for(i)).unwrap();
    }
    sender
        .send("nkl", ConfigurationEvent::Added(hosts_payload("done")))
        .unwrap();
    wait_for(&hosts, &["done"]).await;

    finished.store(true, Ordering::SeqCst);
    let reads = reader.await.unwrap();
    assert!(reads > 0);

    shutdown.trigger();
    task.await.unwrap().unwrap();
}
