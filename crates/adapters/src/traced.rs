// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::monitor::{ChannelHandle, MonitorCommand, MonitorReply, MonitorTransport, TransportError};
use crate::store::{DefinitionStore, StoreError};
use vmjob_core::{DomainDefinition, DomainId};

/// Wrapper that adds tracing to any MonitorTransport
#[derive(Clone)]
pub struct TracedMonitorTransport<T> {
    inner: T,
}

impl<T> TracedMonitorTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: MonitorTransport> MonitorTransport for TracedMonitorTransport<T> {
    fn channel_for(&self, id: DomainId) -> Option<ChannelHandle> {
        let channel = self.inner.channel_for(id);
        tracing::trace!(domain = %id, connected = channel.is_some(), "channel lookup");
        channel
    }

    fn send_command(
        &self,
        channel: &ChannelHandle,
        command: &MonitorCommand,
    ) -> Result<MonitorReply, TransportError> {
        let span = tracing::info_span!("monitor.send", %channel, command = %command.execute);
        let _guard = span.enter();

        tracing::debug!("sending");

        let start = std::time::Instant::now();
        let result = self.inner.send_command(channel, command);
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "reply received"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "command failed"
            ),
        }

        result
    }
}

/// Wrapper that adds tracing to any DefinitionStore
#[derive(Clone)]
pub struct TracedDefinitionStore<S> {
    inner: S,
}

impl<S> TracedDefinitionStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DefinitionStore> DefinitionStore for TracedDefinitionStore<S> {
    fn load_definition(&self, id: DomainId) -> Result<DomainDefinition, StoreError> {
        let span = tracing::info_span!("store.load", domain = %id);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.load_definition(id);
        let elapsed = start.elapsed();

        match &result {
            Ok(definition) => tracing::info!(
                name = %definition.name,
                elapsed_ms = elapsed.as_millis() as u64,
                "definition loaded"
            ),
            // A miss is an ordinary lookup result
            Err(StoreError::NotFound(_)) => tracing::debug!("definition not found"),
            Err(e) => tracing::error!(error = %e, "load failed"),
        }

        result
    }

    fn is_definition_active(&self, id: DomainId) -> Result<bool, StoreError> {
        let result = self.inner.is_definition_active(id);
        tracing::trace!(domain = %id, active = ?result.as_ref().ok(), "checked");
        result
    }

    fn list(&self) -> Result<Vec<DomainId>, StoreError> {
        let result = self.inner.list();
        match &result {
            Ok(ids) => tracing::debug!(count = ids.len(), "listed definitions"),
            Err(e) => tracing::error!(error = %e, "list failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
