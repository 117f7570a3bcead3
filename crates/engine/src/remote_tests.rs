// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::domain::DomainRef;
use crate::registry::{Registry, RegistryDeps};
use std::sync::Arc;
use vmjob_adapters::{FakeDefinitionStore, FakeMonitorTransport};
use vmjob_core::{AsyncJobKind, DomainDefinition, DomainEvent, FakeClock, JobConfig, StopReason};

fn setup() -> (Registry, DomainRef) {
    let transport = FakeMonitorTransport::new();
    let registry = Registry::new(
        RegistryDeps {
            store: Arc::new(FakeDefinitionStore::new()),
            transport: Arc::new(transport.clone()),
        },
        Arc::new(FakeClock::new()),
        JobConfig::default(),
    );
    let definition = DomainDefinition::new(DomainId::new(), "vm");
    transport.connect(definition.id);
    let domain = registry.add(definition, true).unwrap();
    (registry, domain)
}

#[test]
fn remote_call_releases_lock_and_keeps_job() {
    let (_registry, domain) = setup();
    let mut guard = domain.lock();
    guard.begin_async_job_default(AsyncJobKind::MigrationOut).unwrap();

    let session = guard.enter_remote();
    assert_eq!(session.id(), domain.id());
    let other = domain.clone();
    let async_job = std::thread::spawn(move || other.try_lock().map(|g| g.job_info().async_job))
        .join()
        .unwrap();
    assert_eq!(async_job, Some(Some(AsyncJobKind::MigrationOut)));

    let (mut guard, still_active) = session.exit();
    assert!(still_active.is_active());
    guard.end_async_job().unwrap();
}

#[test]
fn stop_during_remote_call_is_reported() {
    let (registry, domain) = setup();
    let id = domain.id();
    let mut guard = domain.lock();
    guard.begin_async_job_default(AsyncJobKind::MigrationOut).unwrap();

    let session = guard.enter_remote();
    registry
        .apply_event(&DomainEvent::Stopped {
            id,
            reason: StopReason::Shutdown,
        })
        .unwrap();

    let (mut guard, still_active) = session.exit();
    assert_eq!(still_active, StillActive(false));
    assert!(!guard.is_active());
    guard.end_async_job().unwrap();
}
