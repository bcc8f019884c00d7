//! Event listeners - per-node callback registry
//!
//! Design: listeners are keyed by node and event type, invoked in
//! registration order. Dispatch itself lives on `Document`, which knows the
//! tree and walks target → ancestors.

use crate::types::NodeId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Handle returned by listener registration
pub type ListenerId = Uuid;

/// Listener callback
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Event delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `click`
    pub kind: String,
    /// Node the event was dispatched at
    pub target: NodeId,
    /// Node whose listener is running
    pub current_target: NodeId,
}

struct Listener {
    id: ListenerId,
    kind: String,
    callback: EventCallback,
}

#[derive(Default)]
pub struct ListenerRegistry {
    by_node: AHashMap<NodeId, Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, returns its id
    pub fn add(&mut self, node_id: NodeId, kind: &str, callback: EventCallback) -> ListenerId {
        let id = Uuid::new_v4();
        self.by_node.entry(node_id).or_default().push(Listener {
            id,
            kind: kind.to_string(),
            callback,
        });
        id
    }

    /// Remove one listener by id
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for listeners in self.by_node.values_mut() {
            if let Some(index) = listeners.iter().position(|l| l.id == id) {
                listeners.remove(index);
                return true;
            }
        }
        false
    }

    /// Remove every listener of `kind` on a node, returns how many were removed
    pub fn remove_kind(&mut self, node_id: NodeId, kind: &str) -> usize {
        let Some(listeners) = self.by_node.get_mut(&node_id) else {
            return 0;
        };
        let before = listeners.len();
        listeners.retain(|l| l.kind != kind);
        let removed = before - listeners.len();
        if listeners.is_empty() {
            self.by_node.remove(&node_id);
        }
        removed
    }

    /// Snapshot of callbacks for a node and event type, in registration order
    pub fn callbacks(&self, node_id: NodeId, kind: &str) -> Vec<EventCallback> {
        self.by_node
            .get(&node_id)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|l| l.kind == kind)
                    .map(|l| l.callback.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners registered on a node
    pub fn count(&self, node_id: NodeId) -> usize {
        self.by_node.get(&node_id).map_or(0, Vec::len)
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.by_node.values().map(Vec::len).sum();
        f.debug_struct("ListenerRegistry")
            .field("nodes", &self.by_node.len())
            .field("listeners", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_registry_add_remove() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = ListenerRegistry::new();

        let c = counter.clone();
        let id = registry.add(3, "click", Arc::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        registry.add(3, "input", Arc::new(|_| {}));

        let event = Event {
            kind: "click".to_string(),
            target: 3,
            current_target: 3,
        };
        for callback in registry.callbacks(3, "click") {
            callback(&event);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(registry.count(3), 2);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.callbacks(3, "click").is_empty());
        assert_eq!(registry.remove_kind(3, "input"), 1);
        assert_eq!(registry.count(3), 0);
    }
}
