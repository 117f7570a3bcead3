// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote call guard
//!
//! Drops the exclusive lock while the caller blocks on a peer exchange
//! (e.g. a migration handshake). No channel is involved.

use crate::domain::{DomainGuard, DomainObject, StillActive};
use crate::registry::RegistryInner;
use std::fmt;
use vmjob_core::DomainId;

impl<'a> DomainGuard<'a> {
    /// Release the exclusive lock for a remote exchange
    ///
    /// Job ownership is kept; only the lock is given up.
    pub fn enter_remote(self) -> RemoteSession<'a> {
        let DomainGuard {
            registry,
            object,
            state,
        } = self;
        drop(state);
        tracing::debug!(domain = %object.id(), "entered remote call");
        RemoteSession { registry, object }
    }
}

/// A span during which the exclusive lock is released for a peer exchange
#[must_use = "call exit() to take the domain lock back"]
pub struct RemoteSession<'a> {
    registry: &'a RegistryInner,
    object: &'a DomainObject,
}

impl<'a> RemoteSession<'a> {
    pub fn id(&self) -> DomainId {
        self.object.id()
    }

    /// Take the exclusive lock back and report whether the domain survived
    pub fn exit(self) -> (DomainGuard<'a>, StillActive) {
        let object = self.object;
        let guard = DomainGuard::new(self.registry, object, object.state.lock());
        let still_active = StillActive(guard.is_active());
        if still_active.is_active() {
            tracing::debug!(domain = %object.id(), "left remote call");
        } else {
            tracing::warn!(domain = %object.id(), "domain stopped during remote call");
        }
        (guard, still_active)
    }
}

impl fmt::Debug for RemoteSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSession")
            .field("id", &self.object.id())
            .finish()
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
