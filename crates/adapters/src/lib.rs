// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the collaborators of the job controller
//!
//! The monitor transport carries blocking commands to a managed process; the
//! definition store persists domain definitions and their last known state.

pub mod monitor;
pub mod store;
pub mod traced;

pub use monitor::{ChannelHandle, MonitorCommand, MonitorReply, MonitorTransport, TransportError};
pub use store::{DefinitionStore, DirDefinitionStore, StoreError};
pub use traced::{TracedDefinitionStore, TracedMonitorTransport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use monitor::{FakeMonitorTransport, MonitorCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::FakeDefinitionStore;
