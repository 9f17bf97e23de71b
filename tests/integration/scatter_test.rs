//! Scatter dispatch: round-robin distribution of group arguments.

use std::time::Duration;

use groupcall::{AddressingMode, GroupError, MethodCall, Value};

use crate::common::{call_for_results, runtime, strings, worker_group, TestWorker};

#[test]
fn test_scatter_wraps_around_smaller_source() {
    let runtime = runtime();
    let workers: Vec<_> = (0..5).map(|i| TestWorker::new(&format!("w{}", i))).collect();
    let group = worker_group(&runtime, &workers);
    let source = runtime.new_group("string");
    source.add_all(["s0", "s1", "s2"]);

    let call = MethodCall::new("echo").returning("string").scatter(&source);
    assert_eq!(call.addressing_mode(), AddressingMode::Scatter);

    let results = call_for_results(&group, &call);
    assert_eq!(strings(&results), vec!["s0", "s1", "s2", "s0", "s1"]);
}

#[test]
fn test_scatter_mixed_with_broadcast_arguments() {
    let runtime = runtime();
    let workers = vec![
        TestWorker::slow("a", Duration::from_millis(30)),
        TestWorker::new("b"),
    ];
    let group = worker_group(&runtime, &workers);
    let source = runtime.new_group("string");
    source.add_all(["left", "right"]);

    let call = MethodCall::new("pair")
        .returning("string")
        .arg("fixed")
        .scatter(&source);
    let results = call_for_results(&group, &call);

    assert_eq!(strings(&results), vec!["fixed-left", "fixed-right"]);
}

#[test]
fn test_scatter_arguments_wrap_independently() {
    let runtime = runtime();
    let workers: Vec<_> = (0..4).map(|i| TestWorker::new(&format!("w{}", i))).collect();
    let group = worker_group(&runtime, &workers);
    let letters = runtime.new_group("string");
    letters.add_all(["a", "b"]);
    let digits = runtime.new_group("string");
    digits.add_all(["1", "2", "3"]);

    let call = MethodCall::new("pair")
        .returning("string")
        .scatter(&letters)
        .scatter(&digits);
    let results = call_for_results(&group, &call);

    assert_eq!(strings(&results), vec!["a-1", "b-2", "a-3", "b-1"]);
}

#[test]
fn test_one_way_scatter_delivers_one_element_each() {
    let runtime = runtime();
    let workers: Vec<_> = (0..3).map(|i| TestWorker::new(&format!("w{}", i))).collect();
    let group = worker_group(&runtime, &workers);
    let source = runtime.new_group("number");
    source.add_all([10i64, 20, 30]);

    let outcome = group
        .invoke(&MethodCall::new("record").one_way().scatter(&source))
        .unwrap();
    assert!(outcome.exceptions().unwrap().is_empty());

    for (worker, expected) in workers.iter().zip([10i64, 20, 30]) {
        assert_eq!(worker.received(), vec![Value::from(expected)]);
    }
}

#[test]
fn test_empty_scatter_source_fails_before_dispatch() {
    let runtime = runtime();
    let workers = vec![TestWorker::new("a"), TestWorker::new("b")];
    let group = worker_group(&runtime, &workers);
    let empty = runtime.new_group("string");

    let err = group
        .invoke(&MethodCall::new("echo").returning("string").scatter(&empty))
        .unwrap_err();

    assert!(matches!(err, GroupError::EmptyScatterSource { position: 0 }));
    assert!(workers.iter().all(|w| w.call_count() == 0));
}
