// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Domain registry and job controller
//!
//! Threads serialize access to a domain through its exclusive lock and
//! coordinate long-running work through the job slots. The exclusive lock is
//! released for the duration of monitor commands and remote exchanges.

mod domain;
mod error;
mod events;
mod jobs;
mod monitor;
mod registry;
mod remote;

pub use domain::{DomainGuard, DomainObject, DomainRef, StillActive};
pub use error::DomainError;
pub use events::{EventPump, EVENT_CHANNEL_CAPACITY};
pub use monitor::MonitorSession;
pub use registry::{Registry, RegistryDeps};
pub use remote::RemoteSession;
