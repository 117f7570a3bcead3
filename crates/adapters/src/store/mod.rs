// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition store adapters

mod dir;

pub use dir::DirDefinitionStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDefinitionStore;

use std::path::PathBuf;
use thiserror::Error;
use vmjob_core::{DomainDefinition, DomainId};

/// Errors from definition store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("definition not found: {0}")]
    NotFound(DomainId),
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed definition {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Persisted domain definitions and their last recorded run state
pub trait DefinitionStore: Send + Sync + 'static {
    /// Load a definition by id
    fn load_definition(&self, id: DomainId) -> Result<DomainDefinition, StoreError>;

    /// Whether the domain was running when its state was last recorded
    fn is_definition_active(&self, id: DomainId) -> Result<bool, StoreError>;

    /// Ids of every stored definition
    fn list(&self) -> Result<Vec<DomainId>, StoreError>;
}
