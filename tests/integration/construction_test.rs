//! Populating groups through a member factory.

use std::collections::HashMap;
use std::sync::Arc;

use groupcall::{GroupError, MethodCall, PlacementTarget, Value};

use crate::common::{call_for_results, runtime, strings, WorkerFactory, WORKER};

fn targets() -> Vec<PlacementTarget> {
    ["node-0", "node-1", "node-2"]
        .iter()
        .map(|name| PlacementTarget::from(*name))
        .collect()
}

fn parameters(names: &[&str]) -> Vec<Vec<Value>> {
    names.iter().map(|name| vec![Value::from(*name)]).collect()
}

#[test]
fn test_sequential_population_keeps_order() {
    let runtime = runtime();
    let factory = WorkerFactory::default();

    let group = runtime
        .populate(WORKER, &factory, parameters(&["a", "b", "c", "d"]), &targets())
        .unwrap();

    let names = call_for_results(&group, &MethodCall::new("name").returning("string"));
    assert_eq!(strings(&names), vec!["a", "b", "c", "d"]);

    let placed: Vec<String> = factory.placements().into_iter().map(|(_, t)| t).collect();
    assert_eq!(placed, vec!["node-0", "node-1", "node-2", "node-0"]);
}

#[test]
fn test_sequential_population_stops_at_first_failure() {
    let runtime = runtime();
    let factory = WorkerFactory::default();

    let err = runtime
        .populate(WORKER, &factory, parameters(&["a", "bad", "c"]), &targets())
        .unwrap_err();

    assert!(matches!(err, GroupError::Construction(_)));
    assert_eq!(factory.placements().len(), 2);
}

#[test]
fn test_parallel_population_skips_failures() {
    let runtime = runtime();
    let factory = Arc::new(WorkerFactory::default());

    let group = runtime
        .populate_in_parallel(
            WORKER,
            factory.clone(),
            parameters(&["a", "bad-1", "b", "c", "bad-2", "d"]),
            &targets(),
        )
        .unwrap();

    assert_eq!(group.size(), 4);
    assert_eq!(group.outstanding(), 0);

    let mut names = strings(&call_for_results(&group, &MethodCall::new("name").returning("string")));
    names.sort();
    assert_eq!(names, vec!["a", "b", "c", "d"]);

    // Round-robin placement by parameter position, whatever the completion order.
    let placed: HashMap<String, String> = factory.placements().into_iter().collect();
    assert_eq!(placed["a"], "node-0");
    assert_eq!(placed["bad-1"], "node-1");
    assert_eq!(placed["b"], "node-2");
    assert_eq!(placed["c"], "node-0");
    assert_eq!(placed["d"], "node-2");
}

#[test]
fn test_population_requires_targets() {
    let runtime = runtime();

    let err = runtime
        .populate_in_parallel(WORKER, Arc::new(WorkerFactory::default()), parameters(&["a"]), &[])
        .unwrap_err();
    assert!(matches!(err, GroupError::NoPlacementTargets));

    let err = runtime
        .populate(WORKER, &WorkerFactory::default(), parameters(&["a"]), &[])
        .unwrap_err();
    assert!(matches!(err, GroupError::NoPlacementTargets));
}
