// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle event delivery
//!
//! Events arrive from an outside thread (the process watcher) and are applied
//! one at a time. Each application takes a domain's exclusive lock, which may
//! block behind a job holder, so it runs on the blocking pool.

use crate::error::DomainError;
use crate::registry::Registry;
use tokio::sync::mpsc;
use vmjob_core::DomainEvent;

/// Default capacity of the event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Applies lifecycle events to the registry in arrival order
pub struct EventPump {
    registry: Registry,
    events: mpsc::Receiver<DomainEvent>,
}

impl EventPump {
    /// Create a pump and the sender feeding it
    pub fn new(registry: Registry, capacity: usize) -> (mpsc::Sender<DomainEvent>, Self) {
        let (tx, events) = mpsc::channel(capacity);
        (tx, Self { registry, events })
    }

    /// Run until every sender is dropped, returning the number of events applied
    pub async fn run(mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.recv().await {
            let name = event.name();
            let id = event.id();
            let registry = self.registry.clone();
            match tokio::task::spawn_blocking(move || registry.apply_event(&event)).await {
                Ok(Ok(())) => applied += 1,
                Ok(Err(DomainError::NotFound(_))) => {
                    tracing::debug!(domain = %id, event = name, "event for unknown domain");
                }
                Ok(Err(e)) => {
                    tracing::warn!(domain = %id, event = name, error = %e, "failed to apply event")
                }
                Err(e) => tracing::error!(domain = %id, event = name, error = %e, "event task failed"),
            }
        }
        tracing::debug!(applied, "event channel closed");
        applied
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
