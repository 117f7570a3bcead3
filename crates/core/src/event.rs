// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Asynchronous lifecycle events delivered for managed processes

use crate::id::DomainId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a managed process went away
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    Shutdown,
    Crashed,
    Destroyed,
    Migrated,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Shutdown => "shutdown",
            StopReason::Crashed => "crashed",
            StopReason::Destroyed => "destroyed",
            StopReason::Migrated => "migrated",
        };
        f.write_str(s)
    }
}

/// Lifecycle notification for one domain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DomainEvent {
    /// The managed process is running and its monitor channel is connected
    Started { id: DomainId },
    /// The managed process no longer exists
    Stopped { id: DomainId, reason: StopReason },
}

impl DomainEvent {
    pub fn id(&self) -> DomainId {
        match self {
            DomainEvent::Started { id } | DomainEvent::Stopped { id, .. } => *id,
        }
    }

    /// Event name for logging (e.g., "domain:stopped")
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::Started { .. } => "domain:started",
            DomainEvent::Stopped { .. } => "domain:stopped",
        }
    }
}
