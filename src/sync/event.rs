//! Watch events and the ConfigMap shape they carry.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::sync::source::ResourceEventHandler;

/// A single change notification from the watch stream.
///
/// Payloads are the raw resource documents as the source delivered them.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationEvent {
    Added(Value),
    Updated { new: Value, old: Option<Value> },
    Deleted(Option<Value>),
}

impl ConfigurationEvent {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationEvent::Added(_) => "added",
            ConfigurationEvent::Updated { .. } => "updated",
            ConfigurationEvent::Deleted(_) => "deleted",
        }
    }

    /// Invoke the matching handler callback.
    pub fn dispatch(&self, handler: &dyn ResourceEventHandler) {
        match self {
            ConfigurationEvent::Added(resource) => handler.on_add(resource),
            ConfigurationEvent::Updated { new, old } => handler.on_update(new, old.as_ref()),
            ConfigurationEvent::Deleted(resource) => handler.on_delete(resource.as_ref()),
        }
    }
}

/// The subset of a ConfigMap the host sync reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigResource {
    #[serde(default)]
    pub metadata: ResourceMeta,
    #[serde(default)]
    pub data: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ConfigResource {
    /// Interpret a raw payload; fails when it is not ConfigMap shaped.
    pub fn from_payload(payload: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(payload)
    }

    /// Value stored under `key` in the data map.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key).map(String::as_str)
    }

    /// Object name, or `unknown` when absent.
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("unknown")
    }
}
