//! groupcall - typed group communication.
//!
//! A [`Group`] stands for many members of one declared type. A single call
//! made on the group is fanned out into one call per member, executed in
//! parallel on a worker pool, and either collected into a result group that
//! mirrors member order (value-returning calls) or checked for per-member
//! failures (one-way calls).
//!
//! Arguments are tagged: [`Argument::Broadcast`] values reach every member
//! unchanged, [`Argument::Scatter`] groups are distributed round-robin so
//! member `i` receives element `i mod len`.

pub mod call;
pub mod config;
pub mod group;
pub mod interfaces;
pub mod placeholder;
pub mod pool;
pub mod runtime;
pub mod utils;


pub use call::{AddressingMode, Argument, MethodCall, Value};
pub use config::{ConfigError, GroupConfig, MemberSharing, PoolConfig};
pub use group::{CallOutcome, ExceptionList, ExceptionRecord, Group, GroupError};
pub use interfaces::{
    ConstructionError, ConstructorCall, DirectInvoker, InvocationError, Invoker, Member,
    MemberFactory, MemberRef, PlacementTarget,
};
pub use placeholder::Placeholder;
pub use pool::WorkerPool;
pub use runtime::GroupRuntime;

/// Type name accepted by a group that admits members of any type.
pub const ANY_TYPE: &str = "*";
