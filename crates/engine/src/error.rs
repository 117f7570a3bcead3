// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the job controller

use thiserror::Error;
use vmjob_adapters::{StoreError, TransportError};
use vmjob_core::{AsyncJobKind, DomainId, JobKind, JobStateError};

/// Errors returned by registry, job and monitor operations
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain not found: {0}")]
    NotFound(DomainId),
    #[error("domain already exists: {0}")]
    AlreadyExists(DomainId),
    #[error("timed out waiting for {request} on domain {id}: {blocker}")]
    Timeout {
        id: DomainId,
        request: String,
        blocker: String,
    },
    #[error("too many queued jobs on domain {id} (limit {limit})")]
    TooManyWaiters { id: DomainId, limit: usize },
    #[error("async job on domain {id} changed: expected {expected}, found {found}")]
    AsyncJobChanged {
        id: DomainId,
        expected: AsyncJobKind,
        found: String,
    },
    #[error("domain {0} unexpectedly stopped")]
    NotActive(DomainId),
    #[error("reference to domain {0} released twice")]
    InvalidRefRelease(DomainId),
    #[error("job contract violated on domain {id}: {source}")]
    InvalidJobRelease {
        id: DomainId,
        #[source]
        source: JobStateError,
    },
    #[error("{operation} on domain {id} requires holding a normal job")]
    JobNotHeld {
        id: DomainId,
        operation: &'static str,
    },
    #[error("job {kind} cannot be requested directly on domain {id}")]
    InvalidJobRequest { id: DomainId, kind: JobKind },
    #[error("definition store: {0}")]
    Store(#[from] StoreError),
    #[error("monitor: {0}")]
    Transport(#[from] TransportError),
}

impl DomainError {
    /// Programming-contract violations; callers treat these as fatal
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidRefRelease(_)
                | DomainError::InvalidJobRelease { .. }
                | DomainError::JobNotHeld { .. }
                | DomainError::InvalidJobRequest { .. }
        )
    }
}
