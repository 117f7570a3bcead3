// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake definition store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DefinitionStore, StoreError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use vmjob_core::{DomainDefinition, DomainId};

/// In-memory definition store for testing
#[derive(Clone, Default)]
pub struct FakeDefinitionStore {
    definitions: Arc<Mutex<BTreeMap<DomainId, (DomainDefinition, bool)>>>,
    loads: Arc<Mutex<Vec<DomainId>>>,
}

impl FakeDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition with its active flag
    pub fn insert(&self, definition: DomainDefinition, active: bool) {
        self.definitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(definition.id, (definition, active));
    }

    /// Ids passed to `load_definition`, in call order
    pub fn loads(&self) -> Vec<DomainId> {
        self.loads.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DefinitionStore for FakeDefinitionStore {
    fn load_definition(&self, id: DomainId) -> Result<DomainDefinition, StoreError> {
        self.loads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(id);
        self.definitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .map(|(definition, _)| definition.clone())
            .ok_or(StoreError::NotFound(id))
    }

    fn is_definition_active(&self, id: DomainId) -> Result<bool, StoreError> {
        self.definitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .map(|(_, active)| *active)
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<DomainId>, StoreError> {
        Ok(self
            .definitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect())
    }
}
