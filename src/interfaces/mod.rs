//! Abstract interfaces for group members and the capabilities they rely on.
//!
//! These traits define the contracts for:
//! - Members (call-interceptable participants)
//! - Invokers (delivering one member-level call)
//! - Member factories (building members on placement targets)

pub mod factory;
pub mod invoker;
pub mod member;

pub use factory::{ConstructionError, ConstructorCall, MemberFactory, PlacementTarget};
pub use invoker::{DirectInvoker, InvocationError, Invoker};
pub use member::{same_member, Member, MemberRef};
