//! Ordered queue of typed source events.

use std::collections::VecDeque;

/// Operation type of a source event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Set operation (add or update)
    Set,
    /// Delete operation
    Del,
}

impl Operation {
    /// Returns true if this is a Set operation.
    pub fn is_set(&self) -> bool {
        matches!(self, Operation::Set)
    }

    /// Returns true if this is a Del operation.
    pub fn is_del(&self) -> bool {
        matches!(self, Operation::Del)
    }
}

/// An update or delete delivered by a configuration source.
///
/// Payloads are already decoded; consumers never see raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent<T> {
    /// The source published a new value under `key`.
    Set { key: String, value: T },
    /// The source withdrew `key`.
    Del { key: String },
}

impl<T> SourceEvent<T> {
    /// Creates a Set event.
    pub fn set(key: impl Into<String>, value: T) -> Self {
        SourceEvent::Set {
            key: key.into(),
            value,
        }
    }

    /// Creates a Del event.
    pub fn del(key: impl Into<String>) -> Self {
        SourceEvent::Del { key: key.into() }
    }

    /// Returns the source key.
    pub fn key(&self) -> &str {
        match self {
            SourceEvent::Set { key, .. } | SourceEvent::Del { key } => key,
        }
    }

    /// Returns the operation.
    pub fn op(&self) -> Operation {
        match self {
            SourceEvent::Set { .. } => Operation::Set,
            SourceEvent::Del { .. } => Operation::Del,
        }
    }
}

/// Configuration for a Consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Source group name (e.g., "DevicePortConfig")
    pub name: String,
    /// Maximum number of pending events before the oldest Set is dropped
    pub max_pending: usize,
}

impl ConsumerConfig {
    /// Creates a new consumer config.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_pending: 1024,
        }
    }

    /// Sets the pending limit.
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }
}

/// Consumer for source events.
///
/// Events are kept in arrival order across all keys, since precedence
/// arbitration downstream depends on the relative order of updates and
/// deletes from different sources.
///
/// # Coalescing
///
/// A Set is folded into the queue tail when the tail is a Set for the same
/// key; the later value wins. Nothing else is merged, and a Del is always
/// kept.
///
/// # Pending limit
///
/// Past `max_pending`, the oldest queued Set is dropped. A Del is never
/// dropped, since losing one would leave a withdrawn source in effect. A
/// queue holding only Dels may exceed the limit.
pub struct Consumer<T> {
    config: ConsumerConfig,
    queue: VecDeque<SourceEvent<T>>,
}

impl<T> Consumer<T> {
    /// Creates a new consumer with the given configuration.
    pub fn new(config: ConsumerConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
        }
    }

    /// Returns the source group name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns true if there are pending events.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Returns the number of pending events.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Queues a single event.
    pub fn push(&mut self, event: SourceEvent<T>) {
        match event {
            SourceEvent::Set { key, value } => {
                if let Some(SourceEvent::Set {
                    key: tail_key,
                    value: tail_value,
                }) = self.queue.back_mut()
                {
                    if *tail_key == key {
                        *tail_value = value;
                        return;
                    }
                }
                self.queue.push_back(SourceEvent::Set { key, value });
            }
            del @ SourceEvent::Del { .. } => self.queue.push_back(del),
        }

        if self.queue.len() > self.config.max_pending {
            let oldest_set = self.queue.iter().position(|e| e.op().is_set());
            if let Some(dropped) = oldest_set.and_then(|pos| self.queue.remove(pos)) {
                tracing::warn!(
                    consumer = %self.config.name,
                    key = %dropped.key(),
                    "Pending limit reached, dropping oldest update"
                );
            }
        }
    }

    /// Queues events in order.
    pub fn add_to_sync(&mut self, events: Vec<SourceEvent<T>>) {
        for event in events {
            self.push(event);
        }
    }

    /// Drains all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<SourceEvent<T>> {
        self.queue.drain(..).collect()
    }

    /// Dumps pending events for debugging.
    pub fn dump(&self) -> Vec<String> {
        self.queue
            .iter()
            .map(|e| {
                format!(
                    "{}:{} {}",
                    self.config.name,
                    e.key(),
                    if e.op().is_set() { "SET" } else { "DEL" }
                )
            })
            .collect()
    }
}
