// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::RegistryDeps;
use std::sync::Arc;
use vmjob_adapters::{
    ChannelHandle, FakeDefinitionStore, FakeMonitorTransport, MonitorCommand, MonitorReply,
    MonitorTransport, TransportError,
};
use vmjob_core::{DomainDefinition, DomainId, FakeClock, JobConfig, JobKind, StopReason};

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

#[tokio::test(flavor = "multi_thread")]
async fn pump_applies_events_in_order() {
    let (registry, transport) = setup();
    let domain = registry
        .add(DomainDefinition::new(DomainId::new(), "vm"), false)
        .unwrap();
    let id = domain.id();
    transport.connect(id);

    let (tx, pump) = EventPump::new(registry.clone(), EVENT_CHANNEL_CAPACITY);
    let task = tokio::spawn(pump.run());

    tx.send(DomainEvent::Started { id }).await.unwrap();
    tx.send(DomainEvent::Stopped {
        id,
        reason: StopReason::Destroyed,
    })
    .await
    .unwrap();
    tx.send(DomainEvent::Started { id }).await.unwrap();
    drop(tx);

    assert_eq!(task.await.unwrap(), 3);
    assert!(domain.lock().is_active());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_domains_are_skipped() {
    let (registry, _) = setup();
    let (tx, pump) = EventPump::new(registry, 4);
    let task = tokio::spawn(pump.run());

    tx.send(DomainEvent::Started { id: DomainId::new() })
        .await
        .unwrap();
    drop(tx);

    assert_eq!(task.await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn event_waits_for_lock_holder() {
    let (registry, _) = setup();
    let domain = registry
        .add(DomainDefinition::new(DomainId::new(), "vm"), false)
        .unwrap();
    let id = domain.id();

    let (tx, pump) = EventPump::new(registry.clone(), 4);
    let task = tokio::spawn(pump.run());

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let holder = domain.clone();
    let handle = std::thread::spawn(move || {
        let mut guard = holder.lock();
        guard.begin_job_default(JobKind::Modify).unwrap();
        locked_tx.send(()).unwrap();
        let _ = release_rx.recv();
        guard.end_job().unwrap();
    });
    locked_rx.recv().unwrap();

    tx.send(DomainEvent::Stopped {
        id,
        reason: StopReason::Crashed,
    })
    .await
    .unwrap();
    drop(tx);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(!task.is_finished());

    release_tx.send(()).unwrap();
    handle.join().unwrap();
    assert_eq!(task.await.unwrap(), 1);
}

/// Transport whose channel lookup panics, failing the blocking task
struct PanickingTransport;

impl MonitorTransport for PanickingTransport {
    fn channel_for(&self, _id: DomainId) -> Option<ChannelHandle> {
        panic!("channel lookup failed");
    }

    fn send_command(
        &self,
        channel: &ChannelHandle,
        _command: &MonitorCommand,
    ) -> Result<MonitorReply, TransportError> {
        Err(TransportError::Closed(channel.clone()))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_event_task_is_not_counted() {
    let registry = Registry::new(
        RegistryDeps {
            store: Arc::new(FakeDefinitionStore::new()),
            transport: Arc::new(PanickingTransport),
        },
        Arc::new(FakeClock::new()),
        JobConfig::default(),
    );
    let domain = registry
        .add(DomainDefinition::new(DomainId::new(), "vm"), false)
        .unwrap();
    let id = domain.id();

    let (tx, pump) = EventPump::new(registry.clone(), 4);
    let task = tokio::spawn(pump.run());

    tx.send(DomainEvent::Started { id }).await.unwrap();
    tx.send(DomainEvent::Stopped {
        id,
        reason: StopReason::Shutdown,
    })
    .await
    .unwrap();
    drop(tx);

    assert_eq!(task.await.unwrap(), 1);
    assert_eq!(domain.object().refcount(), 1);
}
