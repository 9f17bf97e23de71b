//! groupcall-demo: broadcast and scatter calls over local members
//!
//! Builds a group of in-process greeters, then:
//! - broadcasts one greeting to every member
//! - scatters a group of names across the members, round-robin
//! - sends a one-way call and purges the members that failed it
//!
//! ## Configuration
//! - GROUPCALL_CONFIG: YAML config file (default: groupcall.yaml, optional)
//! - GROUPCALL_MAX_WORKERS: Upper bound on concurrent member workers
//! - GROUPCALL_LOG: Tracing filter (default: info)

use std::sync::Arc;

use tracing::info;

use groupcall::utils::bootstrap::init_tracing;
use groupcall::{
    ConstructionError, ConstructorCall, Group, GroupConfig, GroupRuntime, InvocationError,
    Member, MemberFactory, MemberRef, MethodCall, PlacementTarget, Value,
};

const GREETER: &str = "Greeter";

/// A member that greets whoever it is asked to.
#[derive(Debug)]
struct Greeter {
    name: String,
    node: String,
}

impl Member for Greeter {
    fn type_name(&self) -> &str {
        GREETER
    }

    fn invoke(&self, call: &MethodCall) -> Result<Value, InvocationError> {
        match call.name() {
            "greet" => {
                let whom = call
                    .value(0)
                    .map(Value::resolve)
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| "nobody".to_string());
                Ok(Value::from(format!("{} on {} greets {}", self.name, self.node, whom)))
            }
            "ping" if self.name.starts_with('x') => Err(InvocationError::Rejected {
                method: call.name().to_string(),
                reason: format!("{} is unavailable", self.name),
            }),
            "ping" => Ok(Value::unit()),
            other => Err(InvocationError::UnknownMethod(other.to_string())),
        }
    }
}

struct GreeterFactory;

impl MemberFactory for GreeterFactory {
    fn construct(
        &self,
        ctor: &ConstructorCall,
        target: &PlacementTarget,
    ) -> Result<MemberRef, ConstructionError> {
        let name = ctor
            .arguments
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ConstructionError::Rejected {
                type_name: ctor.type_name.clone(),
                reason: "missing name".to_string(),
            })?;

        Ok(Arc::new(Greeter {
            name: name.to_string(),
            node: target.name().to_string(),
        }))
    }
}

fn print_results(label: &str, results: &Group) {
    results.wait_all();
    println!("{} ({}):", label, results);
    for index in 0..results.size() {
        match results.value_at(index).as_ref().and_then(Value::as_str) {
            Some(text) => println!("  [{}] {}", index, text),
            None => println!("  [{}] <no result>", index),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = GroupConfig::load()?;
    let runtime = GroupRuntime::new(&config)?;

    let targets = vec![PlacementTarget::new("node-a"), PlacementTarget::new("node-b")];
    let names = ["alice", "bob", "xavier", "carol", "dave"];
    let greeters = runtime.populate(
        GREETER,
        &GreeterFactory,
        names.iter().map(|name| vec![Value::from(*name)]).collect(),
        &targets,
    )?;
    info!(group = %greeters, "Greeters ready");

    let broadcast = MethodCall::new("greet").returning("string").arg("world");
    if let Some(results) = greeters.invoke(&broadcast)?.into_results() {
        print_results("broadcast", &results);
    }

    let guests = runtime.new_group("string");
    guests.add_all(["ann", "ben", "cid"]);
    let scatter = MethodCall::new("greet").returning("string").scatter(&guests);
    if let Some(results) = greeters.invoke(&scatter)?.into_results() {
        print_results("scatter", &results);
    }

    let outcome = greeters.invoke(&MethodCall::new("ping").one_way())?;
    if let Some(exceptions) = outcome.exceptions() {
        for record in exceptions {
            println!("ping failed on member {}: {}", record.index, record.failure);
        }
        let purged = greeters.purge(exceptions);
        println!("purged {} member(s), {} left", purged, greeters.size());
    }

    Ok(())
}
