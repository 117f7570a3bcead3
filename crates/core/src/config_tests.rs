use super::*;
use std::io::Write;
use yare::parameterized;

#[test]
fn defaults_match_documented_values() {
    let config = JobConfig::default();
    assert_eq!(config.job_wait_timeout, Duration::from_secs(30));
    assert_eq!(config.max_queued, 0);
    assert!(config.default_async_mask.contains(JobKind::Destroy));
    assert!(config.default_async_mask.contains(JobKind::Abort));
    assert!(!config.default_async_mask.contains(JobKind::Query));
}

#[test]
fn empty_toml_yields_defaults() {
    let config = JobConfig::from_toml_str("").unwrap();
    assert_eq!(config, JobConfig::default());
}

#[test]
fn parses_all_fields() {
    let config = JobConfig::from_toml_str(
        r#"
job_wait_timeout = "1m 30s"
max_queued = 4
default_async_mask = ["query"]
"#,
    )
    .unwrap();

    assert_eq!(config.job_wait_timeout, Duration::from_secs(90));
    assert_eq!(config.max_queued, 4);
    assert_eq!(config.default_async_mask, JobMask::of(&[JobKind::Query]));
}

#[test]
fn unknown_fields_are_rejected() {
    let result = JobConfig::from_toml_str("max_waiters = 3");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "job_wait_timeout = \"5s\"").unwrap();

    let config = JobConfig::load(file.path()).unwrap();
    assert_eq!(config.job_wait_timeout, Duration::from_secs(5));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = JobConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[parameterized(
    unlimited = { 0, 100, false },
    below_limit = { 3, 2, false },
    at_limit = { 3, 3, true },
)]
fn queue_full_respects_limit(max_queued: usize, waiters: usize, expected: bool) {
    let config = JobConfig::default().with_max_queued(max_queued);
    assert_eq!(config.queue_full(waiters), expected);
}
