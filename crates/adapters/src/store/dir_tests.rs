// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> DirDefinitionStore {
    DirDefinitionStore::new(dir.path().join("qemu"), dir.path().join("run"))
}

#[test]
fn saved_definition_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let definition = DomainDefinition::new(DomainId::new(), "web").with_description("frontend");

    store.save_definition(&definition).unwrap();

    assert_eq!(store.load_definition(definition.id).unwrap(), definition);
    assert_eq!(store.list().unwrap(), vec![definition.id]);
}

#[test]
fn missing_definition_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let id = DomainId::new();

    assert!(matches!(store.load_definition(id), Err(StoreError::NotFound(i)) if i == id));
    assert!(matches!(store.is_definition_active(id), Err(StoreError::NotFound(_))));
}

#[test]
fn list_of_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(store_in(&dir).list().unwrap().is_empty());
}

#[test]
fn status_file_controls_active_flag() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let definition = DomainDefinition::new(DomainId::new(), "db");
    store.save_definition(&definition).unwrap();

    assert!(!store.is_definition_active(definition.id).unwrap());
    store.set_active(definition.id, true).unwrap();
    assert!(store.is_definition_active(definition.id).unwrap());
    store.set_active(definition.id, false).unwrap();
    assert!(!store.is_definition_active(definition.id).unwrap());

    // Clearing twice is fine
    store.set_active(definition.id, false).unwrap();
}

#[test]
fn mismatched_id_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let definition = DomainDefinition::new(DomainId::new(), "copy");
    store.save_definition(&definition).unwrap();

    let other = DomainId::new();
    std::fs::copy(
        store.definition_path(definition.id),
        store.definition_path(other),
    )
    .unwrap();

    assert!(matches!(
        store.load_definition(other),
        Err(StoreError::Malformed { .. })
    ));
}

#[test]
fn list_skips_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let definition = DomainDefinition::new(DomainId::new(), "only");
    store.save_definition(&definition).unwrap();
    std::fs::write(dir.path().join("qemu").join("notes.toml"), "x = 1").unwrap();
    std::fs::write(dir.path().join("qemu").join("README"), "hi").unwrap();

    assert_eq!(store.list().unwrap(), vec![definition.id]);
}
