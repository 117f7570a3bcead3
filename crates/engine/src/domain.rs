// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain objects, references and the exclusive lock
//!
//! A [`DomainObject`] is only reachable through a [`DomainRef`] handed out by
//! the [`Registry`](crate::Registry). Its mutable fields are only reachable
//! through a [`DomainGuard`], which holds the domain's exclusive lock.

use crate::error::DomainError;
use crate::registry::RegistryInner;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use vmjob_adapters::ChannelHandle;
use vmjob_core::{DomainDefinition, DomainId, JobInfo, JobState};

/// Fields protected by the exclusive lock
pub(crate) struct DomainState {
    pub(crate) active: bool,
    pub(crate) definition: DomainDefinition,
    /// Channel of the running process; `None` while inactive
    pub(crate) channel: Option<ChannelHandle>,
    pub(crate) job: JobState,
}

/// One managed domain with its lock and job state
pub struct DomainObject {
    id: DomainId,
    refs: AtomicUsize,
    removed: AtomicBool,
    pub(crate) state: Mutex<DomainState>,
    /// Waiters for the normal job slot
    pub(crate) cond: Condvar,
    /// Waiters for the async job slot or for async compatibility
    pub(crate) async_cond: Condvar,
    /// Channel lock; holds the handle in use by the current monitor session
    pub(crate) monitor: Mutex<Option<ChannelHandle>>,
}

impl DomainObject {
    pub(crate) fn new(
        definition: DomainDefinition,
        active: bool,
        channel: Option<ChannelHandle>,
    ) -> Self {
        Self {
            id: definition.id,
            refs: AtomicUsize::new(0),
            removed: AtomicBool::new(false),
            state: Mutex::new(DomainState {
                active,
                definition,
                channel,
                job: JobState::new(),
            }),
            cond: Condvar::new(),
            async_cond: Condvar::new(),
            monitor: Mutex::new(None),
        }
    }

    pub fn id(&self) -> DomainId {
        self.id
    }

    /// Outstanding references
    pub fn refcount(&self) -> usize {
        self.refs.load(Ordering::SeqCst)
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::SeqCst)
    }

    // Release writes refs then reads removed; remove does the reverse. Both
    // must be SeqCst so at least one side sees the last reference go.
    pub(crate) fn mark_removed(&self) {
        self.removed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn add_ref(&self) {
        self.refs.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop one reference, returning the remaining count
    pub(crate) fn drop_ref(&self) -> usize {
        self.refs.fetch_sub(1, Ordering::SeqCst) - 1
    }
}

impl fmt::Debug for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainObject")
            .field("id", &self.id)
            .field("refs", &self.refcount())
            .field("removed", &self.is_removed())
            .finish_non_exhaustive()
    }
}

/// Counted reference to a registered domain
///
/// Dropping the reference releases it. [`DomainRef::release`] releases it
/// explicitly and reports a second release as a contract violation.
pub struct DomainRef {
    pub(crate) registry: Arc<RegistryInner>,
    pub(crate) object: Arc<DomainObject>,
    released: AtomicBool,
}

impl DomainRef {
    /// Wrap an object whose count the caller already incremented
    pub(crate) fn adopt(registry: Arc<RegistryInner>, object: Arc<DomainObject>) -> Self {
        Self {
            registry,
            object,
            released: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> DomainId {
        self.object.id()
    }

    pub fn object(&self) -> &DomainObject {
        &self.object
    }

    /// Acquire the exclusive lock
    pub fn lock(&self) -> DomainGuard<'_> {
        DomainGuard::new(self.registry.as_ref(), &self.object, self.object.state.lock())
    }

    /// Acquire the exclusive lock if it is free
    pub fn try_lock(&self) -> Option<DomainGuard<'_>> {
        self.object
            .state
            .try_lock()
            .map(|state| DomainGuard::new(self.registry.as_ref(), &self.object, state))
    }

    /// Release this reference
    pub fn release(&self) -> Result<(), DomainError> {
        if self.released.swap(true, Ordering::AcqRel) {
            let err = DomainError::InvalidRefRelease(self.id());
            tracing::error!(domain = %self.id(), error = %err, "double release");
            return Err(err);
        }
        self.registry.release_object(&self.object);
        Ok(())
    }
}

impl Clone for DomainRef {
    fn clone(&self) -> Self {
        self.object.add_ref();
        Self::adopt(Arc::clone(&self.registry), Arc::clone(&self.object))
    }
}

impl Drop for DomainRef {
    fn drop(&mut self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.registry.release_object(&self.object);
        }
    }
}

impl fmt::Debug for DomainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainRef")
            .field("object", &self.object)
            .field("released", &self.released.load(Ordering::Acquire))
            .finish()
    }
}

/// Whether the domain was still running when the exclusive lock came back
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct StillActive(pub bool);

impl StillActive {
    pub fn is_active(self) -> bool {
        self.0
    }

    /// Turn a lost domain into [`DomainError::NotActive`]
    pub fn check(self, id: DomainId) -> Result<(), DomainError> {
        if self.0 {
            Ok(())
        } else {
            Err(DomainError::NotActive(id))
        }
    }
}

/// Exclusive access to one domain's state
///
/// Dropping the guard (or calling [`DomainGuard::unlock`]) releases the lock.
pub struct DomainGuard<'a> {
    pub(crate) registry: &'a RegistryInner,
    pub(crate) object: &'a DomainObject,
    pub(crate) state: MutexGuard<'a, DomainState>,
}

impl<'a> DomainGuard<'a> {
    pub(crate) fn new(
        registry: &'a RegistryInner,
        object: &'a DomainObject,
        state: MutexGuard<'a, DomainState>,
    ) -> Self {
        Self {
            registry,
            object,
            state,
        }
    }

    pub fn id(&self) -> DomainId {
        self.object.id()
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn definition(&self) -> &DomainDefinition {
        &self.state.definition
    }

    /// Record the managed process as started with `channel`, or as gone
    pub fn set_active(&mut self, channel: Option<ChannelHandle>) {
        self.state.active = channel.is_some();
        self.state.channel = channel;
    }

    pub fn job_info(&self) -> JobInfo {
        self.state.job.info(self.registry.clock.as_ref())
    }

    pub fn unlock(self) {}
}

impl fmt::Debug for DomainGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainGuard")
            .field("id", &self.id())
            .field("active", &self.state.active)
            .field("job", &self.state.job)
            .finish()
    }
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
