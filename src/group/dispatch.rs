//! Dispatch engine: fans one call out into one call per member.
//!
//! 1. Decide the addressing mode from the argument tags.
//! 2. For value-returning calls, allocate a result group sized to the
//!    member count at dispatch time.
//! 3. Launch one worker per member. Broadcast calls share one frozen copy
//!    of the call; scatter calls get a private argument list per member.
//! 4. Block on the completion barrier until every worker has finished.
//!
//! Only dispatch is complete when `invoke` returns: result slots may still
//! be waiting on placeholders returned by asynchronous invokers.

use std::sync::Arc;

use tracing::{debug, info_span};

use crate::call::{AddressingMode, Argument, MethodCall, Value};
use crate::interfaces::MemberRef;

use super::error::{GroupError, Result};
use super::exceptions::ExceptionList;
use super::result::build_result_group;
use super::worker::{CallSink, CallWorker};
use super::Group;

/// What a group call hands back once dispatch has completed.
#[derive(Debug)]
pub enum CallOutcome {
    /// One-way call: the failures collected from members, if any.
    OneWay(ExceptionList),
    /// Value-returning call: one slot per member, in member order.
    Results(Group),
}

impl CallOutcome {
    pub fn into_results(self) -> Option<Group> {
        match self {
            CallOutcome::Results(group) => Some(group),
            CallOutcome::OneWay(_) => None,
        }
    }

    pub fn exceptions(&self) -> Option<&ExceptionList> {
        match self {
            CallOutcome::OneWay(exceptions) => Some(exceptions),
            CallOutcome::Results(_) => None,
        }
    }
}

/// Snapshot of every scatter argument's members, taken once per call.
struct ScatterPlan {
    /// Per argument position: the scattered members, or `None` to pass the
    /// argument through unchanged.
    columns: Vec<Option<Vec<MemberRef>>>,
}

impl ScatterPlan {
    fn capture(call: &MethodCall) -> Result<Self> {
        let columns = call
            .arguments()
            .iter()
            .enumerate()
            .map(|(position, argument)| match argument {
                Argument::Scatter(group) => {
                    let members = group.members();
                    if members.is_empty() {
                        Err(GroupError::EmptyScatterSource { position })
                    } else {
                        Ok(Some(members))
                    }
                }
                Argument::Broadcast(_) => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns })
    }

    /// The call member `index` receives: element `index mod len` of each
    /// scattered argument, everything else unchanged.
    fn call_for(&self, call: &MethodCall, index: usize) -> MethodCall {
        let arguments = call
            .arguments()
            .iter()
            .zip(&self.columns)
            .map(|(argument, column)| match column {
                Some(members) => Argument::Broadcast(Value::Member(Arc::clone(
                    &members[index % members.len()],
                ))),
                None => argument.clone(),
            })
            .collect();

        call.with_arguments(arguments)
    }
}

impl Group {
    /// Execute `call` on every member and wait until all workers finish.
    ///
    /// One-way calls (including calls without a return type) yield the
    /// member failures; value-returning calls yield a result group whose
    /// slot `i` holds member `i`'s result. Member failures never abort the
    /// other members' calls.
    ///
    /// At most one call should be in flight per handle at a time.
    pub fn invoke(&self, call: &MethodCall) -> Result<CallOutcome> {
        let mode = call.addressing_mode();
        let span = info_span!(
            "group_invoke",
            group.type_name = %self.type_name(),
            method = %call.name(),
            mode = ?mode
        );
        let _entered = span.enter();

        let scatter = match mode {
            AddressingMode::Scatter => Some(ScatterPlan::capture(call)?),
            AddressingMode::Broadcast => None,
        };

        let size = self.size();

        let (outcome, sink) = if call.is_one_way() {
            let exceptions = ExceptionList::new();
            (CallOutcome::OneWay(exceptions.clone()), CallSink::OneWay(exceptions))
        } else {
            let return_type = call.return_type().unwrap_or(crate::ANY_TYPE);
            let (results, slots) = build_result_group(self, return_type, size);
            (CallOutcome::Results(results), CallSink::Results(slots))
        };

        if size == 0 {
            debug!("Empty group, nothing to dispatch");
            return Ok(outcome);
        }

        // One immutable snapshot shared by every broadcast worker.
        let frozen = Arc::new(call.frozen());

        let context = self.context();
        for index in 0..size {
            let member_call = match &scatter {
                Some(plan) => Arc::new(plan.call_for(&frozen, index)),
                None => Arc::clone(&frozen),
            };

            let worker = CallWorker {
                members: Arc::clone(self.shared_members()),
                index,
                call: member_call,
                invoker: Arc::clone(&context.invoker),
                sink: sink.clone(),
                guard: self.barrier().issue(),
            };
            context.pool.execute(move || worker.run());
        }

        debug!(workers = size, "Fan-out issued, waiting for completion");
        self.barrier().wait();
        debug!("All workers completed");

        Ok(outcome)
    }
}
