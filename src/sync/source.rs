//! Watch source interface and the in-process channel source.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::sync::event::ConfigurationEvent;

/// Callbacks a watch source invokes, one event at a time.
pub trait ResourceEventHandler: Send + Sync {
    fn on_add(&self, resource: &Value);

    fn on_update(&self, new: &Value, old: Option<&Value>);

    fn on_delete(&self, resource: Option<&Value>);
}

/// Failure to establish a subscription.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("an event handler is already registered on this watch source")]
    AlreadyRegistered,

    #[error("watch namespace must not be empty")]
    EmptyNamespace,

    #[error("no watch source has been registered")]
    NotRegistered,
}

/// A stream of configuration resource events scoped to one namespace.
pub trait WatchSource: Send + 'static {
    /// Attach `handler` to events in `namespace`.
    fn register(
        &mut self,
        namespace: &str,
        handler: Arc<dyn ResourceEventHandler>,
    ) -> Result<(), RegistrationError>;

    /// Drive the stream, dispatching serially, until `stop` fires.
    fn run(self, stop: broadcast::Receiver<()>) -> impl Future<Output = ()> + Send;
}

#[derive(Debug)]
struct ScopedEvent {
    namespace: String,
    event: ConfigurationEvent,
}

/// Producer half of a [`ChannelWatchSource`].
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ScopedEvent>,
}

impl EventSender {
    /// Queue an event; hands it back if the source has stopped.
    pub fn send(
        &self,
        namespace: impl Into<String>,
        event: ConfigurationEvent,
    ) -> Result<(), ConfigurationEvent> {
        self.tx
            .send(ScopedEvent {
                namespace: namespace.into(),
                event,
            })
            .map_err(|e| e.0.event)
    }
}

/// Watch source fed from inside the process.
///
/// Events for other namespaces are dropped.
pub struct ChannelWatchSource {
    rx: mpsc::UnboundedReceiver<ScopedEvent>,
    registration: Option<(String, Arc<dyn ResourceEventHandler>)>,
}

impl ChannelWatchSource {
    /// Create a source and the sender that feeds it.
    pub fn new() -> (Self, EventSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx,
                registration: None,
            },
            EventSender { tx },
        )
    }
}

impl WatchSource for ChannelWatchSource {
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
        let Self {
            mut rx,
            registration,
        } = self;
        let Some((namespace, handler)) = registration else {
            tracing::warn!("Channel watch source started without a handler");
            return;
        };

        loop {
            tokio::select! {
                biased;
                _ = stop.recv() => {
                    tracing::debug!(namespace = %namespace, "Channel watch source stopping");
                    break;
                }
                next = rx.recv() => match next {
                    Some(scoped) if scoped.namespace == namespace => {
                        scoped.event.dispatch(handler.as_ref());
                    }
                    Some(scoped) => {
                        tracing::trace!(
                            namespace = %scoped.namespace,
                            kind = scoped.event.kind(),
                            "Ignoring event outside the watched namespace"
                        );
                    }
                    None => {
                        tracing::debug!("Event channel closed");
                        break;
                    }
                },
            }
        }
    }
}
