//! Per-member workers.
//!
//! Each worker runs exactly once on the worker pool and carries the
//! [`CompletionGuard`] issued for it, so the handle's outstanding count
//! falls when the worker is done, whichever way it ends.

use std::sync::Arc;

use tracing::{debug, debug_span, info, warn};

use crate::call::MethodCall;
use crate::interfaces::{ConstructorCall, Invoker, MemberFactory, PlacementTarget};

use super::barrier::CompletionGuard;
use super::exceptions::{ExceptionList, ExceptionRecord};
use super::result::ResultSlots;
use super::SharedMembers;

/// What happens with a member call's outcome.
#[derive(Clone)]
pub(crate) enum CallSink {
    /// Failures are recorded; values are discarded.
    OneWay(ExceptionList),
    /// Values fill the result slot at the member's index; failures are logged.
    Results(ResultSlots),
}

/// Executes one member-level call.
pub(crate) struct CallWorker {
    pub(crate) members: SharedMembers,
    pub(crate) index: usize,
    pub(crate) call: Arc<MethodCall>,
    pub(crate) invoker: Arc<dyn Invoker>,
    pub(crate) sink: CallSink,
    pub(crate) guard: CompletionGuard,
}

impl CallWorker {
    pub(crate) fn run(self) {
        let span = debug_span!("group_worker", method = %self.call.name(), member.index = self.index);
        let _entered = span.enter();

        // The sequence may have shrunk since dispatch.
        let member = match self.members.read().members.get(self.index).cloned() {
            Some(member) => member,
            None => {
                debug!("Member index out of range, skipping");
                return;
            }
        };

        let outcome = self.invoker.invoke(&member, &self.call);

        match (outcome, &self.sink) {
            (Ok(_), CallSink::OneWay(_)) => {}
            (Err(failure), CallSink::OneWay(exceptions)) => {
                debug!(error = %failure, "One-way member call failed");
                exceptions.add(ExceptionRecord {
                    member,
                    index: self.index,
                    failure,
                });
            }
            (Ok(value), CallSink::Results(slots)) => {
                slots.fill(self.index, value);
            }
            // TODO: route value-returning failures somewhere a caller can see
            // them; for now the slot stays pending.
            (Err(failure), CallSink::Results(_)) => {
                warn!(error = %failure, "Member call failed, result slot left unset");
            }
        }

        drop(self.guard);
    }
}

/// Builds one member and appends it to the group on success.
pub(crate) struct ConstructionWorker {
    pub(crate) members: SharedMembers,
    pub(crate) factory: Arc<dyn MemberFactory>,
    pub(crate) ctor: ConstructorCall,
    pub(crate) target: PlacementTarget,
    pub(crate) guard: CompletionGuard,
}

impl ConstructionWorker {
    pub(crate) fn run(self) {
        let span = debug_span!("construction_worker", member.type_name = %self.ctor.type_name, target = %self.target);
        let _entered = span.enter();

        match self.factory.construct(&self.ctor, &self.target) {
            Ok(member) => {
                self.members.write().members.push(member);
                debug!("Member constructed");
            }
            Err(e) => {
                info!(error = %e, "Member construction failed, member not added");
            }
        }

        drop(self.guard);
    }
}
