//! Invoker interface: delivers one member-level call.

use crate::call::{MethodCall, Value};

use super::member::MemberRef;

/// Result type for member invocations.
pub type Result<T> = std::result::Result<T, InvocationError>;

/// Errors a single member invocation can produce.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvocationError {
    #[error("Call '{method}' rejected: {reason}")]
    Rejected { method: String, reason: String },

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Value of type '{type_name}' cannot receive calls")]
    NotInvocable { type_name: String },

    #[error("No interface named '{0}'")]
    NoSuchInterface(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Delivers a call to one member.
///
/// Invokers may be asynchronous underneath: returning a pending placeholder
/// as the value is valid, the dispatch engine does not wait for it.
pub trait Invoker: Send + Sync {
    /// Invoke `call` on `member`.
    fn invoke(&self, member: &MemberRef, call: &MethodCall) -> Result<Value>;
}

/// Invoker that calls straight into the member.
///
/// When the call names an interface, the call is delegated to the member's
/// sub-interface of that name instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectInvoker;

impl Invoker for DirectInvoker {
    fn invoke(&self, member: &MemberRef, call: &MethodCall) -> Result<Value> {
        match call.interface() {
            Some(name) => member
                .interface(name)
                .ok_or_else(|| InvocationError::NoSuchInterface(name.to_string()))?
                .invoke(call),
            None => member.invoke(call),
        }
    }
}
