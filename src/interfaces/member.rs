//! Member interface: a participant a group can forward calls to.

use std::fmt;
use std::sync::Arc;

use crate::call::{MethodCall, Value};
use crate::placeholder::Placeholder;
use crate::ANY_TYPE;

use super::invoker::InvocationError;

/// Shared reference to a group member.
pub type MemberRef = Arc<dyn Member>;

/// A call-interceptable participant.
///
/// Implementations:
/// - `Placeholder`: wraps a pending or resolved value and forwards calls to it
/// - Application stand-ins for local or remote objects
pub trait Member: Send + Sync + fmt::Debug {
    /// Declared type of this member.
    fn type_name(&self) -> &str;

    /// Whether this member may join a group declared with `type_name`.
    ///
    /// The default accepts the wildcard type and an exact name match.
    fn is_assignable_to(&self, type_name: &str) -> bool {
        type_name == ANY_TYPE || self.type_name() == type_name
    }

    /// Execute a member-level call.
    fn invoke(&self, call: &MethodCall) -> Result<Value, InvocationError>;

    /// Sub-interface exposed under `name`, if any.
    fn interface(&self, _name: &str) -> Option<MemberRef> {
        None
    }

    /// Downcast hook for members that are placeholders.
    fn as_placeholder(&self) -> Option<&Placeholder> {
        None
    }
}

/// Identity comparison of two member references.
///
/// Compares data pointers only, so two references to the same allocation are
/// equal even when they were coerced through different vtables.
pub fn same_member(a: &MemberRef, b: &MemberRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}
