// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed definition store
//!
//! Definitions live in `<config_dir>/<uuid>.toml`. A domain counts as active
//! while a status file `<state_dir>/<uuid>.status` exists.

use super::{DefinitionStore, StoreError};
use std::path::{Path, PathBuf};
use vmjob_core::{DomainDefinition, DomainId};

const DEFINITION_EXT: &str = "toml";
const STATUS_EXT: &str = "status";

/// Definition store reading TOML files from a directory
#[derive(Clone, Debug)]
pub struct DirDefinitionStore {
    config_dir: PathBuf,
    state_dir: PathBuf,
}

impl DirDefinitionStore {
    pub fn new(config_dir: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            state_dir: state_dir.into(),
        }
    }

    fn definition_path(&self, id: DomainId) -> PathBuf {
        self.config_dir.join(format!("{}.{}", id, DEFINITION_EXT))
    }

    fn status_path(&self, id: DomainId) -> PathBuf {
        self.state_dir.join(format!("{}.{}", id, STATUS_EXT))
    }

    /// Write a definition, replacing any previous one
    pub fn save_definition(&self, definition: &DomainDefinition) -> Result<(), StoreError> {
        let path = self.definition_path(definition.id);
        let content = toml::to_string_pretty(definition).map_err(|e| StoreError::Malformed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        ensure_dir(&self.config_dir)?;
        std::fs::write(&path, content).map_err(|source| StoreError::Io { path, source })
    }

    /// Record whether a domain is running
    pub fn set_active(&self, id: DomainId, active: bool) -> Result<(), StoreError> {
        let path = self.status_path(id);
        if active {
            ensure_dir(&self.state_dir)?;
            std::fs::write(&path, "running\n").map_err(|source| StoreError::Io { path, source })
        } else {
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(StoreError::Io { path, source }),
            }
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

impl DefinitionStore for DirDefinitionStore {
    fn load_definition(&self, id: DomainId) -> Result<DomainDefinition, StoreError> {
        let path = self.definition_path(id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id))
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let definition: DomainDefinition =
            toml::from_str(&content).map_err(|e| StoreError::Malformed {
                path: path.clone(),
                message: e.to_string(),
            })?;

        // The file name is authoritative; a mismatched id means a copied file
        if definition.id != id {
            return Err(StoreError::Malformed {
                path,
                message: format!("id {} does not match file name", definition.id),
            });
        }
        Ok(definition)
    }

    fn is_definition_active(&self, id: DomainId) -> Result<bool, StoreError> {
        if !self.definition_path(id).exists() {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.status_path(id).exists())
    }

    fn list(&self) -> Result<Vec<DomainId>, StoreError> {
        let entries = match std::fs::read_dir(&self.config_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.config_dir.clone(),
                    source,
                })
            }
        };

        let mut ids: Vec<DomainId> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.config_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DEFINITION_EXT) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).map(str::parse::<DomainId>) {
                Some(Ok(id)) => ids.push(id),
                _ => tracing::warn!(path = %path.display(), "skipping file without a domain id name"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "dir_tests.rs"]
mod tests;
