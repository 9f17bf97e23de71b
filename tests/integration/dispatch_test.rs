//! Broadcast dispatch: ordering, completion and failure aggregation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use parking_lot::Mutex;

use groupcall::interfaces::same_member;
use groupcall::{
    CallOutcome, InvocationError, Invoker, MemberRef, MethodCall, Placeholder, Value,
};

use crate::common::{call_for_results, runtime, strings, worker_group, TestWorker};

#[test]
fn test_results_follow_member_order_under_random_delays() {
    let runtime = runtime();
    let mut rng = rand::rng();
    let workers: Vec<_> = (0..8)
        .map(|i| TestWorker::slow(&format!("w{}", i), Duration::from_millis(rng.random_range(0..40))))
        .collect();
    let group = worker_group(&runtime, &workers);

    let results = call_for_results(&group, &MethodCall::new("name").returning("string"));

    let expected: Vec<String> = (0..8).map(|i| format!("w{}", i)).collect();
    assert_eq!(results.size(), 8);
    assert_eq!(strings(&results), expected);
}

#[test]
fn test_last_member_finishing_first_keeps_its_slot() {
    let runtime = runtime();
    let workers = vec![
        TestWorker::slow("a", Duration::from_millis(80)),
        TestWorker::slow("b", Duration::from_millis(40)),
        TestWorker::new("c"),
    ];
    let group = worker_group(&runtime, &workers);

    let echoed = call_for_results(&group, &MethodCall::new("echo").returning("string").arg("x"));
    assert_eq!(strings(&echoed), vec!["x", "x", "x"]);

    let named = call_for_results(&group, &MethodCall::new("name").returning("string"));
    assert_eq!(strings(&named), vec!["a", "b", "c"]);
}

#[test]
fn test_invoke_returns_only_after_every_worker() {
    let runtime = runtime();
    let delay = Duration::from_millis(60);
    let workers: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|name| TestWorker::slow(name, delay))
        .collect();
    let group = worker_group(&runtime, &workers);

    let started = Instant::now();
    group.invoke(&MethodCall::new("record").one_way().arg("x")).unwrap();

    assert!(started.elapsed() >= delay);
    assert!(workers.iter().all(|w| w.completed()));
    assert_eq!(group.outstanding(), 0);
}

#[test]
fn test_single_failure_is_aggregated() {
    let runtime = runtime();
    let workers = vec![
        TestWorker::new("a"),
        TestWorker::slow("b", Duration::from_millis(20)),
        TestWorker::failing("c"),
        TestWorker::new("d"),
    ];
    let group = worker_group(&runtime, &workers);

    let outcome = group.invoke(&MethodCall::new("record").one_way().arg("x")).unwrap();
    let exceptions = outcome.exceptions().unwrap();

    assert_eq!(exceptions.len(), 1);
    let record = &exceptions.records()[0];
    assert_eq!(record.index, 2);
    assert!(matches!(record.failure, InvocationError::Rejected { .. }));
    let failed: MemberRef = workers[2].clone();
    assert!(same_member(&record.member, &failed));

    for (i, worker) in workers.iter().enumerate() {
        assert!(worker.completed());
        if i != 2 {
            assert_eq!(worker.received(), vec![Value::from("x")]);
        }
    }
}

#[test]
fn test_call_without_return_type_is_one_way() {
    let runtime = runtime();
    let workers = vec![TestWorker::new("a"), TestWorker::failing("b")];
    let group = worker_group(&runtime, &workers);

    match group.invoke(&MethodCall::new("record").arg("x")).unwrap() {
        CallOutcome::OneWay(exceptions) => assert_eq!(exceptions.indices(), vec![1]),
        CallOutcome::Results(_) => panic!("expected a one-way outcome"),
    }
}

#[test]
fn test_value_returning_failure_leaves_slot_pending() {
    let runtime = runtime();
    let workers = vec![TestWorker::new("a"), TestWorker::failing("b")];
    let group = worker_group(&runtime, &workers);

    let results = call_for_results(&group, &MethodCall::new("name").returning("string"));

    assert_eq!(results.size(), 2);
    assert_eq!(results.value_at(0), Some(Value::from("a")));
    assert_eq!(results.value_at(1), None);
    assert_eq!(results.count_pending(), 1);
}

#[test]
fn test_empty_group() {
    let runtime = runtime();
    let group = runtime.new_group("Worker");

    let results = call_for_results(&group, &MethodCall::new("name").returning("string"));
    assert!(results.is_empty());

    let outcome = group.invoke(&MethodCall::new("record").one_way()).unwrap();
    assert!(outcome.exceptions().unwrap().is_empty());
}

#[test]
fn test_broadcast_group_argument_is_frozen() {
    let runtime = runtime();
    let workers = vec![TestWorker::slow("a", Duration::from_millis(100))];
    let group = worker_group(&runtime, &workers);
    let argument = runtime.new_group("string");
    argument.add_all(["x", "y"]);

    let caller = group.clone();
    let passed = argument.clone();
    let handle = thread::spawn(move || {
        call_for_results(&caller, &MethodCall::new("count").returning("number").arg(passed))
    });

    thread::sleep(Duration::from_millis(30));
    argument.add("z");

    let results = handle.join().unwrap();
    results.wait_all();
    assert_eq!(results.value_at(0), Some(Value::from(2i64)));
    assert_eq!(argument.size(), 3);
}

/// Delivers calls asynchronously: the member answers later on another thread.
struct DeferredInvoker {
    delivered: AtomicUsize,
}

impl Invoker for DeferredInvoker {
    fn invoke(&self, member: &MemberRef, call: &MethodCall) -> Result<Value, InvocationError> {
        self.delivered.fetch_add(1, Ordering::SeqCst);
        let placeholder = Placeholder::pending(call.return_type().unwrap_or(groupcall::ANY_TYPE));
        let member = Arc::clone(member);
        let call = call.clone();
        let slot = Arc::clone(&placeholder);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            if let Ok(value) = member.invoke(&call) {
                slot.resolve(value);
            }
        });
        Ok(Value::Member(placeholder))
    }
}

#[test]
fn test_results_may_arrive_after_dispatch() {
    let base = runtime();
    let invoker = Arc::new(DeferredInvoker {
        delivered: AtomicUsize::new(0),
    });
    let runtime = base.with_invoker(invoker.clone());
    let workers = vec![TestWorker::new("a"), TestWorker::new("b")];
    let group = worker_group(&runtime, &workers);

    let results = call_for_results(&group, &MethodCall::new("name").returning("string"));

    assert_eq!(invoker.delivered.load(Ordering::SeqCst), 2);
    assert_eq!(results.count_pending(), 2);
    assert!(!results.all_arrived());

    results.wait_all();
    assert_eq!(results.count_pending(), 0);
    // value_at follows the delivered placeholders to their values.
    assert_eq!(results.value_at(0), Some(Value::from("a")));
    assert_eq!(results.value_at(1), Some(Value::from("b")));
}

/// Holds every call until the test releases it.
#[derive(Default)]
struct GatedInvoker {
    held: Mutex<Vec<(MemberRef, MethodCall, Arc<Placeholder>)>>,
}

impl GatedInvoker {
    /// Deliver the held call for `member` and resolve its placeholder.
    fn release(&self, member: &MemberRef) {
        let held = self.held.lock();
        if let Some((target, call, slot)) = held.iter().find(|(m, _, _)| same_member(m, member)) {
            if let Ok(value) = target.invoke(call) {
                slot.resolve(value);
            }
        }
    }
}

impl Invoker for GatedInvoker {
    fn invoke(&self, member: &MemberRef, call: &MethodCall) -> Result<Value, InvocationError> {
        let placeholder = Placeholder::pending(call.return_type().unwrap_or(groupcall::ANY_TYPE));
        self.held
            .lock()
            .push((Arc::clone(member), call.clone(), Arc::clone(&placeholder)));
        Ok(Value::Member(placeholder))
    }
}

#[test]
fn test_wait_operations_track_undelivered_results() {
    let base = runtime();
    let invoker = Arc::new(GatedInvoker::default());
    let runtime = base.with_invoker(invoker.clone());
    let workers = vec![TestWorker::new("a"), TestWorker::new("b"), TestWorker::new("c")];
    let group = worker_group(&runtime, &workers);

    let results = call_for_results(&group, &MethodCall::new("name").returning("string"));

    assert_eq!(results.size(), 3);
    assert_eq!(results.count_pending(), 3);
    assert!(results.all_awaited());
    assert!(!results.all_arrived());
    assert_eq!(results.value_at(1), None);

    let b: MemberRef = workers[1].clone();
    invoker.release(&b);

    assert_eq!(results.wait_one_and_get_index(), Some(1));
    assert_eq!(results.value_at(1), Some(Value::from("b")));
    assert_eq!(results.count_pending(), 2);
    assert!(!results.all_awaited());

    for worker in [&workers[0], &workers[2]] {
        let member: MemberRef = worker.clone();
        invoker.release(&member);
    }
    results.wait_all();
    assert!(results.all_arrived());
    assert_eq!(strings(&results), vec!["a", "b", "c"]);
}
