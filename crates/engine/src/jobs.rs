// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job controller
//!
//! Normal jobs hold the domain's single job slot. An async job runs alongside
//! it and lets only the kinds in its mask take the slot while it lasts.
//!
//! Waiters always re-evaluate their predicate after waking. Requests that
//! are merely waiting for the slot sleep on `cond`; requests blocked by the
//! async job (incompatible normal jobs and further async jobs) sleep on
//! `async_cond`. `end_job` signals a single `cond` waiter, so a waiter that
//! wakes on `cond` but cannot use the free slot passes the signal on before
//! going back to sleep.

use crate::domain::DomainGuard;
use crate::error::DomainError;
use std::thread::ThreadId;
use std::time::Instant;
use vmjob_core::{AsyncJobKind, Blocker, Clock, JobKind, JobMask, JobStateError};

impl<'a> DomainGuard<'a> {
    /// Acquire the normal job slot for `kind`, waiting until `deadline`
    ///
    /// The exclusive lock is released while waiting and held again on
    /// return. On error no job state has changed.
    pub fn begin_job(&mut self, kind: JobKind, deadline: Instant) -> Result<(), DomainError> {
        if kind == JobKind::AsyncNested {
            let err = DomainError::InvalidJobRequest { id: self.id(), kind };
            tracing::error!(domain = %self.id(), error = %err, "rejected job request");
            return Err(err);
        }
        self.acquire_job(kind, deadline)
    }

    /// [`DomainGuard::begin_job`] with the configured wait timeout
    pub fn begin_job_default(&mut self, kind: JobKind) -> Result<(), DomainError> {
        let deadline = self.registry.config.deadline();
        self.begin_job(kind, deadline)
    }

    pub(crate) fn acquire_job(&mut self, kind: JobKind, deadline: Instant) -> Result<(), DomainError> {
        let object = self.object;
        if !self.state.job.can_begin(kind) {
            self.enqueue()?;
            let admitted = loop {
                if self.state.job.can_begin(kind) {
                    break true;
                }
                if Instant::now() >= deadline {
                    break false;
                }
                if self.state.job.is_compatible(kind) {
                    let _ = object.cond.wait_until(&mut self.state, deadline);
                } else {
                    if self.state.job.active().is_none() {
                        object.cond.notify_one();
                    }
                    let _ = object.async_cond.wait_until(&mut self.state, deadline);
                }
            };
            self.state.job.remove_waiter();
            if !admitted {
                return Err(self.timeout(kind.as_str(), self.state.job.blocker(kind, self.clock())));
            }
        }

        let now = self.clock().now();
        self.state.job.begin(kind, current_thread(), now);
        tracing::debug!(domain = %self.id(), job = %kind, "job started");
        Ok(())
    }

    /// Release the normal job slot and wake one waiter
    pub fn end_job(&mut self) -> Result<(), DomainError> {
        match self.state.job.end(current_thread()) {
            Ok(kind) => {
                tracing::debug!(domain = %self.id(), job = %kind, "job ended");
                self.object.cond.notify_one();
                Ok(())
            }
            Err(source) => Err(self.contract_violation("end_job", source)),
        }
    }

    /// Acquire the async job slot for `kind`, waiting until `deadline`
    ///
    /// Waits until neither an async job nor a normal job is running, then
    /// installs the configured default mask.
    pub fn begin_async_job(
        &mut self,
        kind: AsyncJobKind,
        deadline: Instant,
    ) -> Result<(), DomainError> {
        let object = self.object;
        if !self.state.job.can_begin_async() {
            self.enqueue()?;
            let admitted = loop {
                if self.state.job.can_begin_async() {
                    break true;
                }
                if Instant::now() >= deadline {
                    break false;
                }
                if self.state.job.async_job().is_some() {
                    if self.state.job.active().is_none() {
                        object.cond.notify_one();
                    }
                    let _ = object.async_cond.wait_until(&mut self.state, deadline);
                } else {
                    let _ = object.cond.wait_until(&mut self.state, deadline);
                }
            };
            self.state.job.remove_waiter();
            if !admitted {
                return Err(self.timeout(kind.as_str(), self.state.job.async_blocker(self.clock())));
            }
        }

        let mask = self.registry.config.default_async_mask;
        let now = self.clock().now();
        self.state
            .job
            .begin_async(kind, mask, current_thread(), now);
        // The slot is still free; let a compatible normal waiter re-check
        object.cond.notify_one();
        tracing::debug!(domain = %self.id(), job = %kind, %mask, "async job started");
        Ok(())
    }

    /// [`DomainGuard::begin_async_job`] with the configured wait timeout
    pub fn begin_async_job_default(&mut self, kind: AsyncJobKind) -> Result<(), DomainError> {
        let deadline = self.registry.config.deadline();
        self.begin_async_job(kind, deadline)
    }

    /// Replace the set of job kinds allowed alongside the running async job
    pub fn set_async_job_mask(&mut self, mask: JobMask) -> Result<(), DomainError> {
        if let Err(source) = self.state.job.set_async_mask(mask, current_thread()) {
            return Err(self.contract_violation("set_async_job_mask", source));
        }
        tracing::debug!(domain = %self.id(), %mask, "async job mask updated");
        self.object.cond.notify_all();
        self.object.async_cond.notify_all();
        Ok(())
    }

    /// Record the progress phase of the running async job
    pub fn set_async_job_phase(&mut self, phase: &str) -> Result<(), DomainError> {
        if let Err(source) = self.state.job.set_async_phase(phase, current_thread()) {
            return Err(self.contract_violation("set_async_job_phase", source));
        }
        tracing::debug!(domain = %self.id(), phase, "async job phase");
        Ok(())
    }

    /// Flag the running async job for cancellation
    ///
    /// Requires a normal `abort` job held by the calling thread, which the
    /// async job's mask must allow.
    pub fn request_async_abort(&mut self) -> Result<AsyncJobKind, DomainError> {
        let holds_abort = self.state.job.active() == Some(JobKind::Abort)
            && self.state.job.active_owner() == Some(current_thread());
        if !holds_abort {
            let err = DomainError::JobNotHeld {
                id: self.id(),
                operation: "request_async_abort",
            };
            tracing::error!(domain = %self.id(), error = %err, "contract violation");
            return Err(err);
        }
        match self.state.job.request_async_abort() {
            Ok(kind) => {
                tracing::info!(domain = %self.id(), job = %kind, "async job abort requested");
                Ok(kind)
            }
            Err(source) => Err(self.contract_violation("request_async_abort", source)),
        }
    }

    pub fn async_abort_requested(&self) -> bool {
        self.state.job.async_abort_requested()
    }

    /// Release the async job slot and wake every waiter
    pub fn end_async_job(&mut self) -> Result<(), DomainError> {
        match self.state.job.end_async(current_thread()) {
            Ok(kind) => {
                tracing::debug!(domain = %self.id(), job = %kind, "async job ended");
                self.object.async_cond.notify_all();
                self.object.cond.notify_all();
                Ok(())
            }
            Err(source) => Err(self.contract_violation("end_async_job", source)),
        }
    }

    fn enqueue(&mut self) -> Result<(), DomainError> {
        let config = &self.registry.config;
        if config.queue_full(self.state.job.waiters()) {
            let err = DomainError::TooManyWaiters {
                id: self.id(),
                limit: config.max_queued,
            };
            tracing::warn!(domain = %self.id(), error = %err, "job queue full");
            return Err(err);
        }
        self.state.job.add_waiter();
        Ok(())
    }

    fn timeout(&self, request: &str, blocker: Option<Blocker>) -> DomainError {
        let blocker = blocker
            .map(|b| b.to_string())
            .unwrap_or_else(|| "no job held".to_string());
        tracing::warn!(domain = %self.id(), request, %blocker, "job wait timed out");
        DomainError::Timeout {
            id: self.id(),
            request: request.to_string(),
            blocker,
        }
    }

    pub(crate) fn contract_violation(
        &self,
        operation: &'static str,
        source: JobStateError,
    ) -> DomainError {
        let err = DomainError::InvalidJobRelease {
            id: self.id(),
            source,
        };
        tracing::error!(domain = %self.id(), operation, error = %err, "contract violation");
        err
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.registry.clock.as_ref()
    }
}

pub(crate) fn current_thread() -> ThreadId {
    std::thread::current().id()
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
