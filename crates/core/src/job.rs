// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job kinds and the async compatibility mask

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a normal job holding exclusive access to a domain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Read-only inspection that still needs the monitor
    Query,
    /// Forced shutdown of the managed process
    Destroy,
    /// Pause the managed process
    Suspend,
    /// Reconfiguration of the running process
    Modify,
    /// Cancel the running async job
    Abort,
    /// Single step on behalf of a migration driven from elsewhere
    MigrationOp,
    /// Acquired implicitly by the async job holder to use the monitor
    AsyncNested,
}

impl JobKind {
    pub const ALL: [JobKind; 7] = [
        JobKind::Query,
        JobKind::Destroy,
        JobKind::Suspend,
        JobKind::Modify,
        JobKind::Abort,
        JobKind::MigrationOp,
        JobKind::AsyncNested,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Query => "query",
            JobKind::Destroy => "destroy",
            JobKind::Suspend => "suspend",
            JobKind::Modify => "modify",
            JobKind::Abort => "abort",
            JobKind::MigrationOp => "migration-op",
            JobKind::AsyncNested => "async-nested",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a long-running async job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsyncJobKind {
    MigrationOut,
    MigrationIn,
    Save,
    Dump,
    Snapshot,
}

impl AsyncJobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AsyncJobKind::MigrationOut => "migration-out",
            AsyncJobKind::MigrationIn => "migration-in",
            AsyncJobKind::Save => "save",
            AsyncJobKind::Dump => "dump",
            AsyncJobKind::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for AsyncJobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of normal job kinds allowed to run alongside an async job
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<JobKind>", into = "Vec<JobKind>")]
pub struct JobMask(u16);

impl JobMask {
    pub const EMPTY: JobMask = JobMask(0);

    pub fn of(kinds: &[JobKind]) -> Self {
        kinds.iter().copied().collect()
    }

    pub fn with(self, kind: JobKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn without(self, kind: JobKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    pub fn contains(self, kind: JobKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = JobKind> {
        JobKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<JobKind> for JobMask {
    fn from_iter<I: IntoIterator<Item = JobKind>>(iter: I) -> Self {
        iter.into_iter().fold(JobMask::EMPTY, JobMask::with)
    }
}

impl From<Vec<JobKind>> for JobMask {
    fn from(kinds: Vec<JobKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<JobMask> for Vec<JobKind> {
    fn from(mask: JobMask) -> Self {
        mask.iter().collect()
    }
}

impl fmt::Debug for JobMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for JobMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(JobKind::as_str).collect();
        write!(f, "{{{}}}", names.join(","))
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
