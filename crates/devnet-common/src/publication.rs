//! Keyed publication of daemon output.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{DevNetError, DevNetResult};

/// Sink for values published under a topic and key.
pub trait Publisher: Send + Sync {
    /// Publishes `value` as the current value of `topic`/`key`.
    fn publish(&self, topic: &str, key: &str, value: Value);
}

/// A single publication as delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedItem {
    pub topic: String,
    pub key: String,
    pub value: Value,
}

/// In-memory publication store.
///
/// Keeps the latest value per topic/key so late readers can `get` it, and
/// fans every publication out to broadcast subscribers.
pub struct Publication {
    items: Mutex<BTreeMap<(String, String), Value>>,
    tx: broadcast::Sender<PublishedItem>,
}

impl Publication {
    /// Creates a publication whose subscribers buffer up to `capacity` items.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            items: Mutex::new(BTreeMap::new()),
            tx,
        }
    }

    /// Subscribes to future publications.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedItem> {
        self.tx.subscribe()
    }

    /// Returns the latest value published under `topic`/`key`.
    pub fn get(&self, topic: &str, key: &str) -> Option<Value> {
        self.items
            .lock()
            .get(&(topic.to_string(), key.to_string()))
            .cloned()
    }

    /// Returns the latest value decoded as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, topic: &str, key: &str) -> DevNetResult<Option<T>> {
        match self.get(topic, key) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DevNetError::json(format!("{}:{}", topic, key), e)),
            None => Ok(None),
        }
    }

    /// Returns the keys currently published under `topic`.
    pub fn keys(&self, topic: &str) -> Vec<String> {
        self.items
            .lock()
            .keys()
            .filter(|(t, _)| t == topic)
            .map(|(_, k)| k.clone())
            .collect()
    }
}

impl Default for Publication {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Publisher for Publication {
    fn publish(&self, topic: &str, key: &str, value: Value) {
        self.items
            .lock()
            .insert((topic.to_string(), key.to_string()), value.clone());

        // No subscribers is fine; the value is still retained for `get`.
        let _ = self.tx.send(PublishedItem {
            topic: topic.to_string(),
            key: key.to_string(),
            value,
        });
        tracing::trace!(topic = %topic, key = %key, "Published");
    }
}
