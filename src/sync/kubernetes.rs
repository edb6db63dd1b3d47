//! Watch source backed by a Kubernetes ConfigMap watcher.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::WorkQueueSettings;
use crate::resilience::backoff::retry_delay;
use crate::sync::source::{RegistrationError, ResourceEventHandler, WatchSource};

/// Watches ConfigMaps in one namespace and turns watcher events into
/// add/update/delete callbacks.
pub struct KubeWatchSource {
    client: Client,
    retry: WorkQueueSettings,
    registration: Option<(String, Arc<dyn ResourceEventHandler>)>,
}

impl KubeWatchSource {
    /// Create a source that backs off per `retry` when the watch fails.
    pub fn new(client: Client, retry: WorkQueueSettings) -> Self {
        Self {
            client,
            retry,
            registration: None,
        }
    }
}

impl WatchSource for KubeWatchSource {
    fn register(
        &mut self,
        namespace: &str,
        handler: Arc<dyn ResourceEventHandler>,
    ) -> Result<(), RegistrationError> {
        if namespace.is_empty() {
            return Err(RegistrationError::EmptyNamespace);
        }
        if self.registration.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }
        self.registration = Some((namespace.to_string(), handler));
        Ok(())
    }

    async fn run(self, mut stop: broadcast::Receiver<()>) {
        let Some((namespace, handler)) = self.registration else {
            tracing::warn!("ConfigMap watch source started without a handler");
            return;
        };

        let api: Api<ConfigMap> = Api::namespaced(self.client, &namespace);
        let stream = watcher::watcher(api, watcher::Config::default());
        let mut stream = std::pin::pin!(stream);

        let mut tracker = ConfigMapTracker::default();
        let mut failures = 0u32;

        tracing::info!(namespace = %namespace, queue = %self.retry.name, "ConfigMap watcher started");

        loop {
            tokio::select! {
                _ = stop.recv() => break,
                next = stream.next() => match next {
                    Some(Ok(event)) => {
                        failures = 0;
                        tracker.apply(event, handler.as_ref());
                    }
                    Some(Err(e)) => {
                        failures = failures.saturating_add(1);
                        let delay = retry_delay(failures, &self.retry);
                        tracing::warn!(
                            error = %e,
                            failures,
                            delay_ms = delay.as_millis() as u64,
                            "ConfigMap watch failed, retrying"
                        );
                        if stopped_during(&mut stop, delay).await {
                            break;
                        }
                    }
                    None => {
                        tracing::warn!("ConfigMap watch stream ended");
                        break;
                    }
                },
            }
        }

        tracing::info!(namespace = %namespace, "ConfigMap watcher stopped");
    }
}

async fn stopped_during(stop: &mut broadcast::Receiver<()>, delay: Duration) -> bool {
    tokio::select! {
        _ = stop.recv() => true,
        _ = tokio::time::sleep(delay) => false,
    }
}

/// Last seen payload per ConfigMap name.
///
/// The watcher only reports "applied", so this decides between add and
/// update, and detects objects that vanished across a relist.
#[derive(Default)]
struct ConfigMapTracker {
    known: HashMap<String, Value>,
    relisting: Option<HashSet<String>>,
}

impl ConfigMapTracker {
    fn apply(&mut self, event: Event<ConfigMap>, handler: &dyn ResourceEventHandler) {
        match event {
            Event::Init => {
                self.relisting = Some(HashSet::new());
            }
            Event::InitApply(cm) => {
                if let Some(seen) = self.relisting.as_mut() {
                    seen.insert(object_name(&cm));
                }
                self.upsert(cm, handler);
            }
            Event::InitDone => {
                let Some(seen) = self.relisting.take() else {
                    return;
                };
                let gone: Vec<String> = self
                    .known
                    .keys()
                    .filter(|name| !seen.contains(*name))
                    .cloned()
                    .collect();
                for name in gone {
                    tracing::debug!(name = %name, "ConfigMap disappeared during relist");
                    let last = self.known.remove(&name);
                    handler.on_delete(last.as_ref());
                }
            }
            Event::Apply(cm) => self.upsert(cm, handler),
            Event::Delete(cm) => {
                let name = object_name(&cm);
                self.known.remove(&name);
                match serde_json::to_value(&cm) {
                    Ok(payload) => handler.on_delete(Some(&payload)),
                    Err(e) => {
                        tracing::warn!(name = %name, error = %e, "Could not encode deleted ConfigMap");
                        handler.on_delete(None);
                    }
                }
            }
        }
    }

    fn upsert(&mut self, cm: ConfigMap, handler: &dyn ResourceEventHandler) {
        let name = object_name(&cm);
        let payload = match serde_json::to_value(&cm) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Could not encode ConfigMap, skipping");
                return;
            }
        };

        match self.known.insert(name, payload.clone()) {
            Some(previous) => handler.on_update(&payload, Some(&previous)),
            None => handler.on_add(&payload),
        }
    }
}

fn object_name(cm: &ConfigMap) -> String {
    cm.metadata.name.clone().unwrap_or_default()
}
