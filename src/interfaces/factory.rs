//! Member factory interface: builds new members on placement targets.

use std::fmt;

use crate::call::Value;

use super::member::MemberRef;

/// Errors that can occur while constructing a member.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Construction of '{type_name}' rejected: {reason}")]
    Rejected { type_name: String, reason: String },

    #[error("Placement target unreachable: {0}")]
    UnreachableTarget(String),
}

/// Where a new member should be created (a node name or address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlacementTarget(String);

impl PlacementTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlacementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacementTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Descriptor for constructing one member.
#[derive(Debug, Clone)]
pub struct ConstructorCall {
    pub type_name: String,
    pub arguments: Vec<Value>,
}

impl ConstructorCall {
    pub fn new(type_name: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            arguments,
        }
    }
}

/// Creates members from constructor descriptors.
pub trait MemberFactory: Send + Sync {
    /// Build one member described by `ctor` on `target`.
    fn construct(
        &self,
        ctor: &ConstructorCall,
        target: &PlacementTarget,
    ) -> Result<MemberRef, ConstructionError>;
}
