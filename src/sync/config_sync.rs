//! Host list synchronization from the watched ConfigMap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinError;

use crate::config::WatcherSettings;
use crate::lifecycle::Shutdown;
use crate::sync::event::{ConfigResource, ConfigurationEvent};
use crate::sync::hosts::{parse_hosts, SharedHostList, HOSTS_DATA_KEY};
use crate::sync::source::{RegistrationError, ResourceEventHandler, WatchSource};

/// Keeps [`SharedHostList`] in step with the `nginx-hosts` ConfigMap key.
///
/// ```text
/// initialize(source) → run(shutdown)
///     add/update → parse `nginx-hosts` → publish
///     delete     → publish []
///     bad payload or missing key → logged, list unchanged
/// ```
pub struct ConfigSync<S> {
    namespace: String,
    handler: Arc<HostListHandler>,
    source: Option<S>,
}

impl<S: WatchSource> ConfigSync<S> {
    /// Create a sync for the configured namespace, starting from an empty list.
    pub fn new(settings: &WatcherSettings) -> Self {
        Self {
            namespace: settings.namespace.clone(),
            handler: Arc::new(HostListHandler::new(SharedHostList::new())),
            source: None,
        }
    }

    /// Read handle for host consumers.
    pub fn hosts(&self) -> SharedHostList {
        self.handler.hosts.clone()
    }

    /// Register the add/update/delete callbacks with `source`.
    pub fn initialize(&mut self, mut source: S) -> Result<(), RegistrationError> {
        tracing::info!(namespace = %self.namespace, "ConfigSync::initialize");

        source.register(&self.namespace, self.handler.clone())?;
        self.source = Some(source);
        Ok(())
    }

    /// Handle an added ConfigMap; same as an update with no prior state.
    pub fn on_added(&self, resource: &Value) {
        self.handler.on_add(resource);
    }

    /// Publish the hosts in `new`. A payload without the hosts key is ignored.
    pub fn on_updated(&self, new: &Value, old: Option<&Value>) {
        self.handler.on_update(new, old);
    }

    /// Clear the host list.
    pub fn on_deleted(&self, resource: Option<&Value>) {
        self.handler.on_delete(resource);
    }

    /// Apply one event directly, bypassing the watch source.
    pub fn apply(&self, event: &ConfigurationEvent) {
        event.dispatch(self.handler.as_ref());
    }

    /// Run the watch loop on its own task until `shutdown` fires.
    ///
    /// Once this returns no further events touch the host list. A panic in
    /// the watch loop is logged and does not end `run` early.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RegistrationError> {
        tracing::debug!("ConfigSync::run");

        let source = self.source.ok_or(RegistrationError::NotRegistered)?;
        let stop = Shutdown::new();
        let mut watch = tokio::spawn(source.run(stop.subscribe()));

        let watch_done = tokio::select! {
            _ = shutdown.recv() => false,
            result = &mut watch => {
                report_watch_exit(result);
                let _ = shutdown.recv().await;
                true
            }
        };

        self.handler.stop();
        stop.trigger();
        if !watch_done {
            report_watch_exit(watch.await);
        }

        tracing::info!(
            namespace = %self.namespace,
            hosts = self.handler.hosts.len(),
            "ConfigSync stopped"
        );
        Ok(())
    }
}

fn report_watch_exit(result: Result<(), JoinError>) {
    match result {
        Ok(()) => tracing::debug!("Watch loop exited"),
        Err(e) if e.is_panic() => {
            tracing::error!(error = %e, "Watch loop panicked; host list frozen at its last state")
        }
        Err(e) => tracing::warn!(error = %e, "Watch loop cancelled"),
    }
}

/// The callbacks registered with the watch source.
struct HostListHandler {
    hosts: SharedHostList,
    stopped: AtomicBool,
}

impl HostListHandler {
    fn new(hosts: SharedHostList) -> Self {
        Self {
            hosts,
            stopped: AtomicBool::new(false),
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl ResourceEventHandler for HostListHandler {
    fn on_add(&self, resource: &Value) {
        tracing::debug!("ConfigSync::on_add");
        self.on_update(resource, None);
    }

    fn on_update(&self, new: &Value, _old: Option<&Value>) {
        tracing::debug!("ConfigSync::on_update");
        if self.is_stopped() {
            return;
        }

        let resource = match ConfigResource::from_payload(new) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::error!(error = %e, "Could not interpret event payload as a ConfigMap");
                return;
            }
        };

        let Some(raw) = resource.get(HOSTS_DATA_KEY) else {
            tracing::error!(
                configmap = resource.name(),
                key = HOSTS_DATA_KEY,
                "Key not found in ConfigMap"
            );
            return;
        };

        let hosts = parse_hosts(raw);
        tracing::info!(configmap = resource.name(), count = hosts.len(), "Updating NGINX hosts");
        self.hosts.publish(hosts);
    }

    fn on_delete(&self, _resource: Option<&Value>) {
        tracing::debug!("ConfigSync::on_delete");
        if self.is_stopped() {
            return;
        }

        tracing::info!("Host ConfigMap deleted, clearing NGINX hosts");
        self.hosts.publish(Vec::new());
    }
}
