// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference-counted domain registry
//!
//! Lookups share a read lock and never touch a domain's exclusive lock. The
//! map lock is never held across store or transport calls.

use crate::domain::{DomainObject, DomainRef};
use crate::error::DomainError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use vmjob_adapters::{ChannelHandle, DefinitionStore, MonitorTransport, StoreError};
use vmjob_core::{Clock, DomainDefinition, DomainEvent, DomainId, JobConfig};

/// External collaborators of the registry
#[derive(Clone)]
pub struct RegistryDeps {
    pub store: Arc<dyn DefinitionStore>,
    pub transport: Arc<dyn MonitorTransport>,
}

pub(crate) struct RegistryInner {
    pub(crate) store: Arc<dyn DefinitionStore>,
    pub(crate) transport: Arc<dyn MonitorTransport>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: JobConfig,
    domains: RwLock<HashMap<DomainId, Arc<DomainObject>>>,
}

impl RegistryInner {
    /// Called when a reference goes away
    pub(crate) fn release_object(&self, object: &Arc<DomainObject>) {
        let remaining = object.drop_ref();
        if remaining == 0 && object.is_removed() {
            self.dispose(object);
        }
    }

    fn dispose(&self, object: &Arc<DomainObject>) {
        let mut domains = self.domains.write();
        // Re-check under the write lock: remove() may have raced us here
        let current = domains
            .get(&object.id())
            .is_some_and(|o| Arc::ptr_eq(o, object));
        if current && object.refcount() == 0 {
            domains.remove(&object.id());
            tracing::debug!(domain = %object.id(), "domain object disposed");
        }
    }
}

/// Shared registry of domain objects
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    pub fn new(deps: RegistryDeps, clock: Arc<dyn Clock>, config: JobConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                store: deps.store,
                transport: deps.transport,
                clock,
                config,
                domains: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.inner.config
    }

    /// Look up a registered domain and take a reference to it
    pub fn acquire(&self, id: DomainId) -> Result<DomainRef, DomainError> {
        let domains = self.inner.domains.read();
        match domains.get(&id) {
            Some(object) if !object.is_removed() => {
                object.add_ref();
                Ok(DomainRef::adopt(
                    Arc::clone(&self.inner),
                    Arc::clone(object),
                ))
            }
            _ => Err(DomainError::NotFound(id)),
        }
    }

    /// Release a reference taken with [`Registry::acquire`]
    pub fn release(&self, domain: &DomainRef) -> Result<(), DomainError> {
        domain.release()
    }

    /// Look up a domain, loading it from the definition store on first use
    pub fn acquire_or_load(&self, id: DomainId) -> Result<DomainRef, DomainError> {
        match self.acquire(id) {
            Err(DomainError::NotFound(_)) if !self.contains(id) => {}
            other => return other,
        }

        let definition = match self.inner.store.load_definition(id) {
            Ok(definition) => definition,
            Err(StoreError::NotFound(_)) => return Err(DomainError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };
        let stored_active = self.inner.store.is_definition_active(id)?;
        let channel = self.seed_channel(id, stored_active);

        let mut domains = self.inner.domains.write();
        // Another thread may have loaded it while the store was read
        if let Some(object) = domains.get(&id) {
            if object.is_removed() {
                return Err(DomainError::NotFound(id));
            }
            object.add_ref();
            return Ok(DomainRef::adopt(
                Arc::clone(&self.inner),
                Arc::clone(object),
            ));
        }
        let active = channel.is_some();
        let object = Arc::new(DomainObject::new(definition, active, channel));
        object.add_ref();
        domains.insert(id, Arc::clone(&object));
        tracing::info!(domain = %id, active, "domain loaded");
        Ok(DomainRef::adopt(Arc::clone(&self.inner), object))
    }

    /// Register a new domain and take a reference to it
    pub fn add(&self, definition: DomainDefinition, active: bool) -> Result<DomainRef, DomainError> {
        let id = definition.id;
        let channel = self.seed_channel(id, active);

        let mut domains = self.inner.domains.write();
        if domains.contains_key(&id) {
            return Err(DomainError::AlreadyExists(id));
        }
        let object = Arc::new(DomainObject::new(definition, channel.is_some(), channel));
        object.add_ref();
        domains.insert(id, Arc::clone(&object));
        tracing::debug!(domain = %id, "domain added");
        Ok(DomainRef::adopt(Arc::clone(&self.inner), object))
    }

    /// Load every stored definition not yet registered
    pub fn load_all(&self) -> Result<usize, DomainError> {
        let mut loaded = 0;
        for id in self.inner.store.list()? {
            if self.contains(id) {
                continue;
            }
            match self.acquire_or_load(id) {
                Ok(_) => loaded += 1,
                Err(e) => tracing::warn!(domain = %id, error = %e, "failed to load domain"),
            }
        }
        Ok(loaded)
    }

    /// Mark a domain for destruction once outstanding references drain
    pub fn remove(&self, id: DomainId) -> Result<(), DomainError> {
        let mut domains = self.inner.domains.write();
        let object = match domains.get(&id) {
            Some(object) if !object.is_removed() => Arc::clone(object),
            _ => return Err(DomainError::NotFound(id)),
        };
        object.mark_removed();
        if object.refcount() == 0 {
            domains.remove(&id);
            tracing::debug!(domain = %id, "domain object disposed");
        } else {
            tracing::debug!(domain = %id, refs = object.refcount(), "domain removal pending");
        }
        Ok(())
    }

    /// Whether the map still holds `id`, including objects draining after removal
    pub fn contains(&self, id: DomainId) -> bool {
        self.inner.domains.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.domains.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of registered domains, excluding removed ones
    pub fn ids(&self) -> Vec<DomainId> {
        let mut ids: Vec<DomainId> = self
            .inner
            .domains
            .read()
            .values()
            .filter(|o| !o.is_removed())
            .map(|o| o.id())
            .collect();
        ids.sort();
        ids
    }

    /// Apply a lifecycle event under the domain's exclusive lock
    pub fn apply_event(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let domain = self.acquire(event.id())?;
        match event {
            DomainEvent::Started { id } => {
                // Look the channel up before taking the lock
                let channel = self.inner.transport.channel_for(*id);
                if channel.is_none() {
                    tracing::warn!(domain = %id, "started without a monitor channel");
                }
                let mut guard = domain.lock();
                guard.set_active(channel);
                tracing::info!(domain = %id, active = guard.is_active(), "domain started");
            }
            DomainEvent::Stopped { id, reason } => {
                let mut guard = domain.lock();
                guard.set_active(None);
                let info = guard.job_info();
                tracing::info!(
                    domain = %id,
                    %reason,
                    active_job = ?info.active,
                    async_job = ?info.async_job,
                    "domain stopped"
                );
            }
        }
        Ok(())
    }

    fn seed_channel(&self, id: DomainId, active: bool) -> Option<ChannelHandle> {
        if !active {
            return None;
        }
        let channel = self.inner.transport.channel_for(id);
        if channel.is_none() {
            tracing::warn!(domain = %id, "recorded as active but no monitor channel; treating as inactive");
        }
        channel
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
