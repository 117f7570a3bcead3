// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job controller configuration

use crate::job::{JobKind, JobMask};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for job admission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// How long a job request waits before failing with a timeout
    #[serde(with = "humantime_serde")]
    pub job_wait_timeout: Duration,
    /// Maximum threads queued for admission on one domain (0 = unlimited)
    pub max_queued: usize,
    /// Mask installed when an async job begins
    pub default_async_mask: JobMask,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            job_wait_timeout: Duration::from_secs(30),
            max_queued: 0,
            default_async_mask: JobMask::of(&[JobKind::Destroy, JobKind::Abort]),
        }
    }
}

impl JobConfig {
    pub fn with_job_wait_timeout(mut self, timeout: Duration) -> Self {
        self.job_wait_timeout = timeout;
        self
    }

    pub fn with_max_queued(mut self, max_queued: usize) -> Self {
        self.max_queued = max_queued;
        self
    }

    pub fn with_default_async_mask(mut self, mask: JobMask) -> Self {
        self.default_async_mask = mask;
        self
    }

    /// Deadline for a request issued now with the default wait timeout
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.job_wait_timeout
    }

    /// Whether another waiter would exceed `max_queued`
    pub fn queue_full(&self, waiters: usize) -> bool {
        self.max_queued > 0 && waiters >= self.max_queued
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
