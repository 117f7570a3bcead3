// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::{Registry, RegistryDeps};
use vmjob_adapters::{FakeDefinitionStore, FakeMonitorTransport};
use vmjob_core::{FakeClock, JobConfig};

fn setup() -> (Registry, FakeMonitorTransport) {
    let transport = FakeMonitorTransport::new();
    let registry = Registry::new(
        RegistryDeps {
            store: Arc::new(FakeDefinitionStore::new()),
            transport: Arc::new(transport.clone()),
        },
        Arc::new(FakeClock::new()),
        JobConfig::default(),
    );
    (registry, transport)
}

fn add_domain(registry: &Registry, name: &str) -> DomainRef {
    registry
        .add(DomainDefinition::new(DomainId::new(), name), false)
        .unwrap()
}

#[test]
fn clone_and_drop_track_refcount() {
    let (registry, _) = setup();
    let domain = add_domain(&registry, "web");
    assert_eq!(domain.object().refcount(), 1);

    let second = domain.clone();
    assert_eq!(domain.object().refcount(), 2);

    drop(second);
    assert_eq!(domain.object().refcount(), 1);
}

#[test]
fn explicit_release_then_drop_counts_once() {
    let (registry, _) = setup();
    let domain = add_domain(&registry, "web");
    let keep = domain.clone();

    domain.release().unwrap();
    assert_eq!(keep.object().refcount(), 1);
    drop(domain);
    assert_eq!(keep.object().refcount(), 1);
}

#[test]
fn double_release_is_rejected() {
    let (registry, _) = setup();
    let domain = add_domain(&registry, "web");
    let keep = domain.clone();

    domain.release().unwrap();
    let err = domain.release().unwrap_err();
    assert!(matches!(err, DomainError::InvalidRefRelease(id) if id == domain.id()));
    assert!(err.is_contract_violation());
    assert_eq!(keep.object().refcount(), 1);
}

#[test]
fn try_lock_fails_while_locked() {
    let (registry, _) = setup();
    let domain = add_domain(&registry, "web");
    let other = domain.clone();

    let guard = domain.lock();
    let handle = std::thread::spawn(move || other.try_lock().is_some());
    assert!(!handle.join().unwrap());

    guard.unlock();
    assert!(domain.try_lock().is_some());
}

#[test]
fn set_active_tracks_channel() {
    let (registry, transport) = setup();
    let domain = add_domain(&registry, "web");
    let mut guard = domain.lock();
    assert!(!guard.is_active());
    assert_eq!(guard.definition().name, "web");

    guard.set_active(Some(transport.connect(domain.id())));
    assert!(guard.is_active());

    guard.set_active(None);
    assert!(!guard.is_active());
}

#[test]
fn still_active_check() {
    let id = DomainId::new();
    assert!(StillActive(true).check(id).is_ok());
    assert!(matches!(
        StillActive(false).check(id),
        Err(DomainError::NotActive(found)) if found == id
    ));
}
