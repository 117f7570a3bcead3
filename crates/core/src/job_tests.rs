use super::*;
use yare::parameterized;

#[test]
fn empty_mask_contains_nothing() {
    let mask = JobMask::EMPTY;
    assert!(mask.is_empty());
    assert!(JobKind::ALL.iter().all(|k| !mask.contains(*k)));
}

#[parameterized(
    query = { JobKind::Query },
    destroy = { JobKind::Destroy },
    modify = { JobKind::Modify },
    nested = { JobKind::AsyncNested },
)]
fn with_and_without_toggle_membership(kind: JobKind) {
    let mask = JobMask::EMPTY.with(kind);
    assert!(mask.contains(kind));
    assert_eq!(mask.iter().count(), 1);
    assert!(mask.without(kind).is_empty());
}

#[test]
fn mask_display_lists_kinds_in_declaration_order() {
    let mask = JobMask::of(&[JobKind::Abort, JobKind::Query]);
    assert_eq!(mask.to_string(), "{query,abort}");
}

#[test]
fn mask_deserializes_from_kind_list() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        mask: JobMask,
    }

    let parsed: Wrapper = toml::from_str(r#"mask = ["query", "migration-op"]"#).unwrap();
    assert!(parsed.mask.contains(JobKind::Query));
    assert!(parsed.mask.contains(JobKind::MigrationOp));
    assert!(!parsed.mask.contains(JobKind::Modify));
}

#[test]
fn unknown_kind_is_rejected() {
    #[derive(Debug, serde::Deserialize)]
    struct Wrapper {
        #[allow(dead_code)]
        mask: JobMask,
    }

    assert!(toml::from_str::<Wrapper>(r#"mask = ["teleport"]"#).is_err());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_kind() -> impl Strategy<Value = JobKind> {
        prop::sample::select(JobKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn mask_contains_exactly_what_was_added(kinds in proptest::collection::vec(arb_kind(), 0..10)) {
            let mask = JobMask::of(&kinds);
            for kind in JobKind::ALL {
                prop_assert_eq!(mask.contains(kind), kinds.contains(&kind));
            }
        }
    }
}
