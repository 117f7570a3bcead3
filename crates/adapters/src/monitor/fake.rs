// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake monitor transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChannelHandle, MonitorCommand, MonitorReply, MonitorTransport, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use vmjob_core::DomainId;

/// Recorded monitor call
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorCall {
    pub channel: ChannelHandle,
    pub command: MonitorCommand,
}

type SendHook = Arc<dyn Fn(&MonitorCommand) + Send + Sync>;

/// Fake monitor transport for testing
///
/// Replies are taken from a queue (defaulting to an empty reply). An optional
/// hook runs inside `send_command`, letting tests block or inject events while
/// a command is in flight.
#[derive(Clone, Default)]
pub struct FakeMonitorTransport {
    channels: Arc<Mutex<HashMap<DomainId, ChannelHandle>>>,
    replies: Arc<Mutex<VecDeque<Result<MonitorReply, TransportError>>>>,
    calls: Arc<Mutex<Vec<MonitorCall>>>,
    hook: Arc<Mutex<Option<SendHook>>>,
}

impl FakeMonitorTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected channel for a domain
    pub fn connect(&self, id: DomainId) -> ChannelHandle {
        let handle = ChannelHandle::new(format!("monitor-{}", id));
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, handle.clone());
        handle
    }

    /// Drop a domain's channel
    pub fn disconnect(&self, id: DomainId) {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    /// Queue the result of the next command
    pub fn push_reply(&self, reply: Result<MonitorReply, TransportError>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Run `hook` inside every subsequent `send_command`
    pub fn on_send(&self, hook: impl Fn(&MonitorCommand) + Send + Sync + 'static) {
        *self.hook.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(hook));
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<MonitorCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl MonitorTransport for FakeMonitorTransport {
    fn channel_for(&self, id: DomainId) -> Option<ChannelHandle> {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }

    fn send_command(
        &self,
        channel: &ChannelHandle,
        command: &MonitorCommand,
    ) -> Result<MonitorReply, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MonitorCall {
                channel: channel.clone(),
                command: command.clone(),
            });

        // Clone out so the hook runs without our lock held
        let hook = self.hook.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(hook) = hook {
            hook(command);
        }

        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(MonitorReply::default()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
