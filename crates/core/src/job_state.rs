// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-domain job state
//!
//! Pure bookkeeping for the normal job slot and the async job slot. The
//! engine owns one `JobState` per domain behind the domain's exclusive lock
//! and uses the predicates here to decide whether a waiter may proceed.

use crate::clock::Clock;
use crate::job::{AsyncJobKind, JobKind, JobMask};
use serde::Serialize;
use std::thread::ThreadId;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Contract violations detected by job state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobStateError {
    #[error("no job is active")]
    NoActiveJob,
    #[error("no async job is active")]
    NoAsyncJob,
    #[error("nested job {0} is still held")]
    NestedJobHeld(JobKind),
    #[error("nested job is released by leaving the monitor")]
    NestedJobRelease,
    #[error("{0} job is held by another thread")]
    NotOwner(&'static str),
}

/// Ownership record of the normal job slot
#[derive(Clone, Debug)]
struct ActiveJob {
    kind: JobKind,
    owner: ThreadId,
    started: Instant,
}

/// Ownership record of the async job slot
#[derive(Clone, Debug)]
struct AsyncJob {
    kind: AsyncJobKind,
    owner: ThreadId,
    started: Instant,
    mask: JobMask,
    phase: Option<String>,
    abort_requested: bool,
}

/// What currently prevents a job request from being admitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Blocker {
    /// The normal job slot is taken
    Active { kind: JobKind, held_for: Duration },
    /// The running async job does not permit the requested kind
    Async { kind: AsyncJobKind, mask: JobMask },
}

impl std::fmt::Display for Blocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Blocker::Active { kind, held_for } => {
                write!(f, "job {} held for {}ms", kind, held_for.as_millis())
            }
            Blocker::Async { kind, mask } => write!(f, "async job {} allowing {}", kind, mask),
        }
    }
}

/// Snapshot of a domain's job state for diagnostics
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    pub active: Option<JobKind>,
    pub async_job: Option<AsyncJobKind>,
    pub async_mask: JobMask,
    pub async_phase: Option<String>,
    #[serde(with = "humantime_serde")]
    pub async_elapsed: Option<Duration>,
    pub abort_requested: bool,
    pub waiters: usize,
}

/// Job state of one domain
#[derive(Clone, Debug, Default)]
pub struct JobState {
    active: Option<ActiveJob>,
    async_job: Option<AsyncJob>,
    waiters: usize,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.async_job.is_none()
    }

    pub fn active(&self) -> Option<JobKind> {
        self.active.as_ref().map(|j| j.kind)
    }

    pub fn active_owner(&self) -> Option<ThreadId> {
        self.active.as_ref().map(|j| j.owner)
    }

    pub fn async_job(&self) -> Option<AsyncJobKind> {
        self.async_job.as_ref().map(|j| j.kind)
    }

    pub fn async_owner(&self) -> Option<ThreadId> {
        self.async_job.as_ref().map(|j| j.owner)
    }

    /// Mask of the running async job, empty when there is none
    pub fn async_mask(&self) -> JobMask {
        self.async_job
            .as_ref()
            .map(|j| j.mask)
            .unwrap_or(JobMask::EMPTY)
    }

    pub fn waiters(&self) -> usize {
        self.waiters
    }

    pub fn add_waiter(&mut self) {
        self.waiters += 1;
    }

    pub fn remove_waiter(&mut self) {
        self.waiters = self.waiters.saturating_sub(1);
    }

    /// Whether the running async job (if any) lets `kind` run concurrently
    ///
    /// The nested kind is only meaningful while an async job exists.
    pub fn is_compatible(&self, kind: JobKind) -> bool {
        match (&self.async_job, kind) {
            (Some(_), JobKind::AsyncNested) => true,
            (None, JobKind::AsyncNested) => false,
            (None, _) => true,
            (Some(job), kind) => job.mask.contains(kind),
        }
    }

    /// Whether a normal job of `kind` can be taken right now
    pub fn can_begin(&self, kind: JobKind) -> bool {
        self.is_compatible(kind) && self.active.is_none()
    }

    /// Whether an async job can be taken right now
    pub fn can_begin_async(&self) -> bool {
        self.async_job.is_none() && self.active.is_none()
    }

    /// Describe what blocks a request for `kind`, if anything
    pub fn blocker(&self, kind: JobKind, clock: &dyn Clock) -> Option<Blocker> {
        if !self.is_compatible(kind) {
            if let Some(job) = &self.async_job {
                return Some(Blocker::Async {
                    kind: job.kind,
                    mask: job.mask,
                });
            }
        }
        self.active.as_ref().map(|job| Blocker::Active {
            kind: job.kind,
            held_for: clock.since(job.started),
        })
    }

    /// Describe what blocks an async job request, if anything
    pub fn async_blocker(&self, clock: &dyn Clock) -> Option<Blocker> {
        if let Some(job) = &self.async_job {
            return Some(Blocker::Async {
                kind: job.kind,
                mask: job.mask,
            });
        }
        self.active.as_ref().map(|job| Blocker::Active {
            kind: job.kind,
            held_for: clock.since(job.started),
        })
    }

    /// Take the normal job slot. Callers check [`JobState::can_begin`] first.
    pub fn begin(&mut self, kind: JobKind, owner: ThreadId, now: Instant) {
        debug_assert!(self.can_begin(kind));
        self.active = Some(ActiveJob {
            kind,
            owner,
            started: now,
        });
    }

    /// Release the normal job slot held by `owner`, returning its kind
    pub fn end(&mut self, owner: ThreadId) -> Result<JobKind, JobStateError> {
        match &self.active {
            None => Err(JobStateError::NoActiveJob),
            Some(job) if job.kind == JobKind::AsyncNested => Err(JobStateError::NestedJobRelease),
            Some(job) if job.owner != owner => Err(JobStateError::NotOwner(job.kind.as_str())),
            Some(_) => self.end_any(),
        }
    }

    /// Release the nested job taken for a monitor session
    pub fn end_nested(&mut self) -> Result<(), JobStateError> {
        match &self.active {
            Some(job) if job.kind == JobKind::AsyncNested => {
                self.active = None;
                Ok(())
            }
            _ => Err(JobStateError::NoActiveJob),
        }
    }

    fn end_any(&mut self) -> Result<JobKind, JobStateError> {
        self.active
            .take()
            .map(|j| j.kind)
            .ok_or(JobStateError::NoActiveJob)
    }

    /// Take the async job slot. Callers check [`JobState::can_begin_async`] first.
    pub fn begin_async(&mut self, kind: AsyncJobKind, mask: JobMask, owner: ThreadId, now: Instant) {
        debug_assert!(self.can_begin_async());
        self.async_job = Some(AsyncJob {
            kind,
            owner,
            started: now,
            mask,
            phase: None,
            abort_requested: false,
        });
    }

    /// Release the async job slot held by `owner`, returning its kind
    pub fn end_async(&mut self, owner: ThreadId) -> Result<AsyncJobKind, JobStateError> {
        self.owned_async(owner)?;
        if let Some(job) = &self.active {
            if job.kind == JobKind::AsyncNested {
                return Err(JobStateError::NestedJobHeld(job.kind));
            }
        }
        self.async_job
            .take()
            .map(|j| j.kind)
            .ok_or(JobStateError::NoAsyncJob)
    }

    pub fn set_async_mask(&mut self, mask: JobMask, owner: ThreadId) -> Result<(), JobStateError> {
        self.owned_async(owner)?.mask = mask;
        Ok(())
    }

    pub fn set_async_phase(
        &mut self,
        phase: impl Into<String>,
        owner: ThreadId,
    ) -> Result<(), JobStateError> {
        self.owned_async(owner)?.phase = Some(phase.into());
        Ok(())
    }

    fn owned_async(&mut self, owner: ThreadId) -> Result<&mut AsyncJob, JobStateError> {
        match self.async_job.as_mut() {
            None => Err(JobStateError::NoAsyncJob),
            Some(job) if job.owner != owner => Err(JobStateError::NotOwner(job.kind.as_str())),
            Some(job) => Ok(job),
        }
    }

    /// Flag the running async job for cancellation
    pub fn request_async_abort(&mut self) -> Result<AsyncJobKind, JobStateError> {
        let job = self.async_job.as_mut().ok_or(JobStateError::NoAsyncJob)?;
        job.abort_requested = true;
        Ok(job.kind)
    }

    pub fn async_abort_requested(&self) -> bool {
        self.async_job
            .as_ref()
            .map(|j| j.abort_requested)
            .unwrap_or(false)
    }

    pub fn info(&self, clock: &dyn Clock) -> JobInfo {
        JobInfo {
            active: self.active(),
            async_job: self.async_job(),
            async_mask: self.async_mask(),
            async_phase: self.async_job.as_ref().and_then(|j| j.phase.clone()),
            async_elapsed: self.async_job.as_ref().map(|j| clock.since(j.started)),
            abort_requested: self.async_abort_requested(),
            waiters: self.waiters,
        }
    }
}

#[cfg(test)]
#[path = "job_state_tests.rs"]
mod tests;
