//! Result groups for value-returning calls.
//!
//! A result group is allocated before fan-out with one pending placeholder
//! per source member. Workers fill slots by index, so results line up with
//! member order whatever the completion order. A slot whose worker failed
//! stays pending.

use std::sync::Arc;

use tracing::debug;

use crate::call::Value;
use crate::interfaces::MemberRef;
use crate::placeholder::Placeholder;

use super::Group;

/// Write side of a result group's slots.
#[derive(Clone)]
pub(crate) struct ResultSlots {
    slots: Arc<Vec<Arc<Placeholder>>>,
}

impl ResultSlots {
    /// Store the result for member `index`.
    ///
    /// Returns `false` if the index is out of range or the slot was filled.
    pub(crate) fn fill(&self, index: usize, value: Value) -> bool {
        match self.slots.get(index) {
            Some(slot) => slot.resolve(value),
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Allocate a result group of `return_type` with `size` pending slots.
pub(crate) fn build_result_group(
    source: &Group,
    return_type: &str,
    size: usize,
) -> (Group, ResultSlots) {
    let slots: Vec<Arc<Placeholder>> = (0..size).map(|_| Placeholder::pending(return_type)).collect();

    let result = source.sibling(return_type);
    result
        .shared_members()
        .write()
        .members
        .extend(slots.iter().map(|slot| Arc::clone(slot) as MemberRef));

    debug!(
        group.type_name = %source.type_name(),
        result.type_name = %return_type,
        result.size = size,
        "Result group allocated"
    );

    (
        result,
        ResultSlots {
            slots: Arc::new(slots),
        },
    )
}
