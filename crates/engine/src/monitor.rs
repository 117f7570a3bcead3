// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor guard
//!
//! Entering the monitor takes the channel lock while the exclusive lock is
//! still held, then releases the exclusive lock. Leaving takes the exclusive
//! lock back before the channel lock is released. Only the holder of the job
//! slot (a normal job or the nested job of the async holder) may enter, so at
//! most one thread is ever between enter and exit.

use crate::domain::{DomainGuard, DomainObject, StillActive};
use crate::error::DomainError;
use crate::jobs::current_thread;
use crate::registry::RegistryInner;
use parking_lot::MutexGuard;
use std::fmt;
use vmjob_adapters::{ChannelHandle, MonitorCommand, MonitorReply};
use vmjob_core::{AsyncJobKind, DomainId, JobKind};

impl<'a> DomainGuard<'a> {
    /// Enter the monitor while holding a normal job
    ///
    /// Consumes the guard: the exclusive lock is released for the session.
    /// On error no lock is held; the job remains held and the caller must
    /// lock the domain again to end it.
    pub fn enter_monitor(self) -> Result<MonitorSession<'a>, DomainError> {
        let me = current_thread();
        let holds_job = match (self.state.job.active(), self.state.job.active_owner()) {
            (Some(kind), Some(owner)) => kind != JobKind::AsyncNested && owner == me,
            _ => false,
        };
        if !holds_job {
            return Err(self.job_not_held("enter_monitor"));
        }

        let channel = match (self.state.active, self.state.channel.clone()) {
            (true, Some(channel)) => channel,
            _ => return Err(DomainError::NotActive(self.id())),
        };
        Ok(MonitorSession::enter(self, channel, false))
    }

    /// Enter the monitor on behalf of the running async job `expected`
    ///
    /// Takes a nested job first, waiting up to the configured timeout. Fails
    /// with [`DomainError::AsyncJobChanged`] if `expected` is no longer the
    /// running async job and with [`DomainError::NotActive`] if the domain
    /// stopped. Only the thread that began the async job may enter. On error
    /// no lock is held and no nested job remains.
    pub fn enter_monitor_async(
        mut self,
        expected: AsyncJobKind,
    ) -> Result<MonitorSession<'a>, DomainError> {
        self.check_async_job(expected)?;
        if self.state.job.async_owner() != Some(current_thread()) {
            return Err(self.job_not_held("enter_monitor_async"));
        }

        let deadline = self.registry.config.deadline();
        self.acquire_job(JobKind::AsyncNested, deadline)?;

        // The async job may have ended or been replaced while we waited
        if let Err(err) = self.check_async_job(expected) {
            self.release_nested();
            return Err(err);
        }

        match (self.state.active, self.state.channel.clone()) {
            (true, Some(channel)) => Ok(MonitorSession::enter(self, channel, true)),
            _ => {
                self.release_nested();
                tracing::warn!(domain = %self.id(), job = %expected, "domain stopped before monitor entry");
                Err(DomainError::NotActive(self.id()))
            }
        }
    }

    fn job_not_held(&self, operation: &'static str) -> DomainError {
        let err = DomainError::JobNotHeld {
            id: self.id(),
            operation,
        };
        tracing::error!(
            domain = %self.id(),
            active_job = ?self.state.job.active(),
            async_job = ?self.state.job.async_job(),
            error = %err,
            "contract violation"
        );
        err
    }

    fn check_async_job(&self, expected: AsyncJobKind) -> Result<(), DomainError> {
        let current = self.state.job.async_job();
        if current == Some(expected) {
            return Ok(());
        }
        let err = DomainError::AsyncJobChanged {
            id: self.id(),
            expected,
            found: current.map_or_else(|| "none".to_string(), |k| k.to_string()),
        };
        tracing::warn!(domain = %self.id(), error = %err, "async job changed");
        Err(err)
    }

    fn release_nested(&mut self) {
        if let Err(source) = self.state.job.end_nested() {
            // Only reachable if job state was corrupted behind our back
            let _ = self.contract_violation("release_nested", source);
        }
        self.object.cond.notify_one();
    }
}

/// An open monitor session
///
/// The channel lock is held and the exclusive lock is not. Call
/// [`MonitorSession::exit`] to get the exclusive lock back.
#[must_use = "call exit() to take the domain lock back"]
pub struct MonitorSession<'a> {
    registry: &'a RegistryInner,
    object: &'a DomainObject,
    channel: Option<MutexGuard<'a, Option<ChannelHandle>>>,
    nested: bool,
}

impl<'a> MonitorSession<'a> {
    fn enter(guard: DomainGuard<'a>, channel: ChannelHandle, nested: bool) -> Self {
        let DomainGuard {
            registry,
            object,
            state,
        } = guard;

        let mut lock = object.monitor.lock();
        *lock = Some(channel);
        drop(state);
        tracing::debug!(domain = %object.id(), nested, "entered monitor");

        Self {
            registry,
            object,
            channel: Some(lock),
            nested,
        }
    }

    pub fn id(&self) -> DomainId {
        self.object.id()
    }

    /// Send one blocking command over the domain's channel
    pub fn command(&self, command: &MonitorCommand) -> Result<MonitorReply, DomainError> {
        let handle = self
            .channel
            .as_ref()
            .and_then(|lock| lock.as_ref())
            .ok_or(DomainError::NotActive(self.object.id()))?;
        Ok(self.registry.transport.send_command(handle, command)?)
    }

    /// Leave the monitor, taking the exclusive lock back
    ///
    /// The returned flag tells whether the domain is still running; state
    /// read before entering must not be trusted if it is false.
    pub fn exit(mut self) -> (DomainGuard<'a>, StillActive) {
        let guard = self.relock();
        let still_active = StillActive(guard.is_active());
        if !still_active.is_active() {
            tracing::warn!(domain = %guard.id(), "domain stopped while in monitor");
        }
        (guard, still_active)
    }

    fn relock(&mut self) -> DomainGuard<'a> {
        let object = self.object;
        let mut guard = DomainGuard::new(self.registry, object, object.state.lock());
        if let Some(mut lock) = self.channel.take() {
            *lock = None;
        }
        if self.nested {
            guard.release_nested();
            self.nested = false;
        }
        tracing::debug!(domain = %self.object.id(), "left monitor");
        guard
    }
}

impl fmt::Debug for MonitorSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorSession")
            .field("id", &self.object.id())
            .field("open", &self.channel.is_some())
            .field("nested", &self.nested)
            .finish()
    }
}

impl Drop for MonitorSession<'_> {
    fn drop(&mut self) {
        if self.channel.is_some() {
            tracing::warn!(domain = %self.object.id(), "monitor session dropped without exit");
            self.relock();
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
