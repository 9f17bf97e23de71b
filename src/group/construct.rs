//! Populating a group by constructing members across placement targets.

use std::sync::Arc;

use tracing::{debug, info};

use crate::call::Value;
use crate::interfaces::{ConstructorCall, MemberFactory, PlacementTarget};
use crate::runtime::GroupRuntime;

use super::error::{GroupError, Result};
use super::worker::ConstructionWorker;
use super::Group;

fn target_for(targets: &[PlacementTarget], index: usize) -> Result<&PlacementTarget> {
    if targets.is_empty() {
        return Err(GroupError::NoPlacementTargets);
    }
    Ok(&targets[index % targets.len()])
}

impl GroupRuntime {
    /// Construct one member per parameter list, one after the other.
    ///
    /// Member `i` is placed on `targets[i % targets.len()]`. The first
    /// construction failure aborts population and is returned.
    pub fn populate(
        &self,
        type_name: &str,
        factory: &dyn MemberFactory,
        parameters: Vec<Vec<Value>>,
        targets: &[PlacementTarget],
    ) -> Result<Group> {
        let group = self.new_group(type_name);

        for (index, arguments) in parameters.into_iter().enumerate() {
            let target = target_for(targets, index)?;
            let ctor = ConstructorCall::new(type_name, arguments);
            let member = factory.construct(&ctor, target)?;
            group.shared_members().write().members.push(member);
        }

        info!(group.type_name = %type_name, group.size = group.size(), "Group populated");
        Ok(group)
    }

    /// Construct one member per parameter list, all at once.
    ///
    /// Returns once every construction has finished. Failed constructions
    /// are logged and skipped, so the group may end up smaller than
    /// `parameters`; member order follows completion order.
    pub fn populate_in_parallel(
        &self,
        type_name: &str,
        factory: Arc<dyn MemberFactory>,
        parameters: Vec<Vec<Value>>,
        targets: &[PlacementTarget],
    ) -> Result<Group> {
        let group = self.new_group(type_name);
        if parameters.is_empty() {
            return Ok(group);
        }
        if targets.is_empty() {
            return Err(GroupError::NoPlacementTargets);
        }

        let requested = parameters.len();
        for (index, arguments) in parameters.into_iter().enumerate() {
            let worker = ConstructionWorker {
                members: Arc::clone(group.shared_members()),
                factory: Arc::clone(&factory),
                ctor: ConstructorCall::new(type_name, arguments),
                target: target_for(targets, index)?.clone(),
                guard: group.barrier().issue(),
            };
            self.pool().execute(move || worker.run());
        }

        debug!(workers = requested, "Construction issued, waiting for completion");
        group.barrier().wait();

        info!(
            group.type_name = %type_name,
            group.size = group.size(),
            requested,
            "Group populated in parallel"
        );
        Ok(group)
    }
}
