// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vmjob-core: pure types for domain job coordination
//!
//! This crate provides:
//! - Domain identifiers, definitions and lifecycle events
//! - Job kinds and the async compatibility mask
//! - The per-domain job state and its admission predicates
//! - Job controller configuration and a testable clock

pub mod clock;
pub mod config;
pub mod definition;
pub mod event;
pub mod id;
pub mod job;
pub mod job_state;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, JobConfig};
pub use definition::DomainDefinition;
pub use event::{DomainEvent, StopReason};
pub use id::DomainId;
pub use job::{AsyncJobKind, JobKind, JobMask};
pub use job_state::{Blocker, JobInfo, JobState, JobStateError};
