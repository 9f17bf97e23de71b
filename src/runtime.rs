//! Group runtime: the shared context every group handle dispatches through.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::{GroupConfig, MemberSharing};
use crate::group::{Group, GroupError};
use crate::interfaces::{DirectInvoker, Invoker};
use crate::pool::WorkerPool;

/// State shared by a group, its result groups and its derived groups.
pub(crate) struct GroupContext {
    pub(crate) pool: Arc<WorkerPool>,
    pub(crate) invoker: Arc<dyn Invoker>,
    pub(crate) member_sharing: MemberSharing,
}

impl fmt::Debug for GroupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupContext")
            .field("pool", &self.pool)
            .field("member_sharing", &self.member_sharing)
            .finish()
    }
}

/// Entry point for creating groups.
///
/// Owns the worker pool and the invoker used to deliver member calls.
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct GroupRuntime {
    context: Arc<GroupContext>,
}

impl GroupRuntime {
    /// Build a runtime with its own worker pool and the direct invoker.
    pub fn new(config: &GroupConfig) -> Result<Self, GroupError> {
        config.validate()?;
        let pool = WorkerPool::new(&config.pool).map_err(|e| GroupError::Pool(e.to_string()))?;

        info!(
            pool.max_workers = config.pool.max_workers,
            member_sharing = ?config.member_sharing,
            "Group runtime ready"
        );

        Ok(Self::with_pool(Arc::new(pool), config.member_sharing))
    }

    /// Build a runtime from `GroupConfig::load()`.
    pub fn from_env() -> Result<Self, GroupError> {
        Self::new(&GroupConfig::load()?)
    }

    /// Build a runtime over an existing pool.
    pub fn with_pool(pool: Arc<WorkerPool>, member_sharing: MemberSharing) -> Self {
        Self {
            context: Arc::new(GroupContext {
                pool,
                invoker: Arc::new(DirectInvoker),
                member_sharing,
            }),
        }
    }

    /// Same pool, different invoker.
    pub fn with_invoker(&self, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            context: Arc::new(GroupContext {
                pool: Arc::clone(&self.context.pool),
                invoker,
                member_sharing: self.context.member_sharing,
            }),
        }
    }

    /// Create an empty group of `type_name`.
    pub fn new_group(&self, type_name: impl Into<String>) -> Group {
        Group::new(type_name, Arc::clone(&self.context))
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.context.pool
    }

    pub fn member_sharing(&self) -> MemberSharing {
        self.context.member_sharing
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(&GroupConfig::default()).expect("test runtime")
    }
}
