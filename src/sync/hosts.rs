//! The published NGINX host list.

use std::sync::Arc;

use arc_swap::ArcSwap;

/// ConfigMap data key holding the comma-separated host list.
pub const HOSTS_DATA_KEY: &str = "nginx-hosts";

/// Split the raw `nginx-hosts` value.
///
/// No trimming, deduplication or host validation: `""` yields `[""]`.
pub fn parse_hosts(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_owned).collect()
}

/// Cloneable read handle on the current host list.
///
/// Every publish swaps in a whole new list, so a reader always sees one
/// complete state.
#[derive(Debug, Clone)]
pub struct SharedHostList {
    inner: Arc<ArcSwap<Vec<String>>>,
}

impl SharedHostList {
    /// Create an empty host list.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }

    /// Snapshot of the current hosts.
    pub fn load(&self) -> Arc<Vec<String>> {
        self.inner.load_full()
    }

    /// Number of hosts currently published.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Whether the current list has no hosts.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Replace the whole list in one swap.
    pub(crate) fn publish(&self, hosts: Vec<String>) {
        self.inner.store(Arc::new(hosts));
    }
}

impl Default for SharedHostList {
    fn default() -> Self {
        Self::new()
    }
}
