//! Runtime construction from configuration and bounded worker pools.

use std::io::Write;
use std::time::{Duration, Instant};

use serial_test::serial;
use tempfile::NamedTempFile;

use groupcall::{GroupConfig, GroupRuntime, MemberSharing, MethodCall};

use crate::common::{worker_group, TestWorker};

#[test]
#[serial]
fn test_runtime_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "pool:\n  max_workers: 2\n  thread_name: test-worker\nmember_sharing: copy"
    )
    .unwrap();
    std::env::set_var("GROUPCALL_CONFIG", file.path());

    let runtime = GroupRuntime::from_env();
    std::env::remove_var("GROUPCALL_CONFIG");

    let runtime = runtime.unwrap();
    assert_eq!(runtime.pool().max_workers(), 2);
    assert_eq!(runtime.member_sharing(), MemberSharing::Copy);
}

#[test]
#[serial]
fn test_invalid_env_override_is_reported() {
    std::env::set_var("GROUPCALL_CONFIG", "/nonexistent/groupcall.yaml");
    std::env::set_var("GROUPCALL_MEMBER_SHARING", "sometimes");

    let result = GroupRuntime::from_env();
    std::env::remove_var("GROUPCALL_CONFIG");
    std::env::remove_var("GROUPCALL_MEMBER_SHARING");

    assert!(matches!(result, Err(groupcall::GroupError::Config(_))));
}

#[test]
fn test_fan_out_wider_than_pool_queues() {
    let mut config = GroupConfig::default();
    config.pool.max_workers = 2;
    let runtime = GroupRuntime::new(&config).unwrap();

    let delay = Duration::from_millis(50);
    let workers: Vec<_> = (0..6)
        .map(|i| TestWorker::slow(&format!("w{}", i), delay))
        .collect();
    let group = worker_group(&runtime, &workers);

    let started = Instant::now();
    let outcome = group
        .invoke(&MethodCall::new("record").one_way().arg("x"))
        .unwrap();

    assert!(outcome.exceptions().unwrap().is_empty());
    assert!(workers.iter().all(|w| w.completed()));
    // Six calls through two workers take at least three rounds.
    assert!(started.elapsed() >= delay * 3);
}
