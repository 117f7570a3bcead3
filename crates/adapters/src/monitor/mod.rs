// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor channel transport

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMonitorTransport, MonitorCall};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use vmjob_core::DomainId;

/// Errors from monitor commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("monitor channel closed: {0}")]
    Closed(ChannelHandle),
    #[error("command {command} failed: {message}")]
    CommandFailed { command: String, message: String },
}

/// Handle naming one connected monitor channel
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelHandle(pub String);

impl ChannelHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request sent over the monitor channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorCommand {
    pub execute: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub arguments: serde_json::Value,
}

impl MonitorCommand {
    pub fn new(execute: impl Into<String>) -> Self {
        Self {
            execute: execute.into(),
            arguments: serde_json::Value::Null,
        }
    }

    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// The response to a monitor command
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorReply(pub serde_json::Value);

/// Blocking command channel to a managed process
///
/// Implementations may block for as long as the managed process takes to
/// answer; callers never hold a domain's exclusive lock across these calls.
pub trait MonitorTransport: Send + Sync + 'static {
    /// The connected channel of a running domain, if any
    fn channel_for(&self, id: DomainId) -> Option<ChannelHandle>;

    /// Send one command and wait for its reply
    fn send_command(
        &self,
        channel: &ChannelHandle,
        command: &MonitorCommand,
    ) -> Result<MonitorReply, TransportError>;
}
