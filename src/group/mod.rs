//! Group handles: one reference standing for many members.
//!
//! A [`Group`] holds an ordered member sequence of a declared type. Calls
//! made through [`Group::invoke`] are fanned out to every member (see
//! `dispatch`); the rest of this module is the admission API and the
//! queries built on top of the sequence.
//!
//! Inserting a group into another group splices its members in; a group
//! never holds a nested group as a single member.

pub mod barrier;
mod construct;
mod dispatch;
pub mod error;
pub mod exceptions;
mod result;
mod worker;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::call::{Argument, Value};
use crate::config::MemberSharing;
use crate::interfaces::{same_member, MemberRef};
use crate::placeholder::{self, Placeholder};
use crate::runtime::GroupContext;

pub use barrier::{CompletionBarrier, CompletionGuard};
pub use dispatch::CallOutcome;
pub use error::{GroupError, Result};
pub use exceptions::{ExceptionList, ExceptionRecord};

/// Ordered member sequence plus the names given to some members.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemberList {
    pub(crate) members: Vec<MemberRef>,
    names: HashMap<String, MemberRef>,
}

impl MemberList {
    fn position(&self, member: &MemberRef) -> Option<usize> {
        self.members.iter().position(|m| same_member(m, member))
    }

    fn remove_at(&mut self, index: usize) -> Option<MemberRef> {
        if index >= self.members.len() {
            return None;
        }
        let removed = self.members.remove(index);
        self.names.retain(|_, m| !same_member(m, &removed));
        Some(removed)
    }
}

/// Member sequence that may be shared by several handles.
pub(crate) type SharedMembers = Arc<RwLock<MemberList>>;

/// What admitting a value into a group amounts to.
enum Admission {
    Append(MemberRef),
    Splice(Vec<MemberRef>),
    Rejected,
}

struct GroupInner {
    id: Uuid,
    type_name: String,
    members: SharedMembers,
    barrier: Arc<CompletionBarrier>,
    context: Arc<GroupContext>,
}

/// Handle on a typed group of members.
///
/// Cloning yields another reference to the same handle. Equality, hashing
/// and formatting apply to the handle itself and are never fanned out.
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

impl Group {
    pub(crate) fn new(type_name: impl Into<String>, context: Arc<GroupContext>) -> Self {
        Self::from_parts(
            Uuid::new_v4(),
            type_name.into(),
            Arc::new(RwLock::new(MemberList::default())),
            context,
        )
    }

    fn from_parts(
        id: Uuid,
        type_name: String,
        members: SharedMembers,
        context: Arc<GroupContext>,
    ) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                id,
                type_name,
                members,
                barrier: Arc::new(CompletionBarrier::new()),
                context,
            }),
        }
    }

    /// Empty group of `type_name` sharing this group's runtime.
    pub fn sibling(&self, type_name: impl Into<String>) -> Group {
        Group::new(type_name, Arc::clone(&self.inner.context))
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Declared type of the members.
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Workers still running for the current call.
    pub fn outstanding(&self) -> usize {
        self.inner.barrier.outstanding()
    }

    pub(crate) fn shared_members(&self) -> &SharedMembers {
        &self.inner.members
    }

    pub(crate) fn barrier(&self) -> &Arc<CompletionBarrier> {
        &self.inner.barrier
    }

    pub(crate) fn context(&self) -> &Arc<GroupContext> {
        &self.inner.context
    }

    fn accepts_group(&self, other: &Group) -> bool {
        Value::Group(other.clone()).is_assignable_to(self.type_name())
    }

    fn admit(&self, value: Value) -> Admission {
        if !value.is_assignable_to(self.type_name()) {
            info!(
                group.type_name = %self.type_name(),
                value.type_name = %value.type_name(),
                "Incompatible value not added to group"
            );
            return Admission::Rejected;
        }

        match value {
            Value::Group(other) => Admission::Splice(other.members()),
            Value::Member(member) => Admission::Append(member),
            data @ Value::Data(_) => Admission::Append(Placeholder::resolved(data)),
        }
    }

    /// Add a value to the group.
    ///
    /// - a group is spliced in: its members are appended, not the group
    /// - a member is appended as is
    /// - any other value is wrapped in a resolved placeholder first
    ///
    /// Values whose type does not fit the group are logged and ignored.
    pub fn add(&self, value: impl Into<Value>) -> bool {
        match self.admit(value.into()) {
            Admission::Append(member) => {
                self.inner.members.write().members.push(member);
                true
            }
            Admission::Splice(members) => {
                self.inner.members.write().members.extend(members);
                true
            }
            Admission::Rejected => false,
        }
    }

    /// Merge `value` into this group.
    ///
    /// Same admission rule as [`Group::add`]: a compatible group has its
    /// members spliced in, an incompatible one is logged and ignored.
    pub fn add_merge(&self, value: impl Into<Value>) -> bool {
        self.add(value)
    }

    /// Add every value; true if any was admitted.
    pub fn add_all<I, V>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .fold(false, |modified, value| self.add(value) | modified)
    }

    /// Position of `member`, compared by identity.
    pub fn index_of(&self, member: &MemberRef) -> Option<usize> {
        self.inner.members.read().position(member)
    }

    pub fn contains(&self, member: &MemberRef) -> bool {
        self.index_of(member).is_some()
    }

    /// Remove and return the member at `index`.
    pub fn remove(&self, index: usize) -> Option<MemberRef> {
        self.inner.members.write().remove_at(index)
    }

    /// Remove the first occurrence of `member`.
    pub fn remove_member(&self, member: &MemberRef) -> bool {
        let mut list = self.inner.members.write();
        match list.position(member) {
            Some(index) => list.remove_at(index).is_some(),
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut list = self.inner.members.write();
        list.members.clear();
        list.names.clear();
    }

    pub fn size(&self) -> usize {
        self.inner.members.read().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Snapshot of the member sequence.
    pub fn members(&self) -> Vec<MemberRef> {
        self.inner.members.read().members.clone()
    }

    /// Iterate over a snapshot of the member sequence.
    pub fn iter(&self) -> std::vec::IntoIter<MemberRef> {
        self.members().into_iter()
    }

    /// Member at `index`, once the current call's dispatch has quiesced.
    ///
    /// Waits for the workers of an in-flight call to finish, not for the
    /// member's own value to arrive.
    pub fn get(&self, index: usize) -> Option<MemberRef> {
        self.inner.barrier.wait();
        self.inner.members.read().members.get(index).cloned()
    }

    /// Value held at `index`, following placeholders.
    ///
    /// `None` if the index is out of range or the value has not arrived.
    /// Never blocks on a placeholder.
    pub fn value_at(&self, index: usize) -> Option<Value> {
        Value::Member(self.get(index)?).try_resolve()
    }

    /// New handle of the declared type over this group's members.
    ///
    /// Uses the runtime's [`MemberSharing`] policy.
    pub fn group_by_type(&self) -> Group {
        self.group_by_type_with(self.inner.context.member_sharing)
    }

    /// New handle of the declared type with an explicit sharing policy.
    ///
    /// The new handle keeps this group's id, so the two compare equal. Its
    /// outstanding-call count starts at zero: it does not own the workers of
    /// a call in flight on this handle.
    pub fn group_by_type_with(&self, sharing: MemberSharing) -> Group {
        let members = match sharing {
            MemberSharing::Alias => Arc::clone(&self.inner.members),
            MemberSharing::Copy => Arc::new(RwLock::new(self.inner.members.read().clone())),
        };
        Group::from_parts(
            self.inner.id,
            self.inner.type_name.clone(),
            members,
            Arc::clone(&self.inner.context),
        )
    }

    /// Independent copy with a fresh id.
    pub(crate) fn detached_copy(&self) -> Group {
        Group::from_parts(
            Uuid::new_v4(),
            self.inner.type_name.clone(),
            Arc::new(RwLock::new(self.inner.members.read().clone())),
            Arc::clone(&self.inner.context),
        )
    }

    /// Tag this group for round-robin distribution as a call argument.
    pub fn scatter(&self) -> Argument {
        Argument::Scatter(self.clone())
    }

    fn with_members(&self, members: Vec<MemberRef>) -> Group {
        let group = self.sibling(self.inner.type_name.clone());
        group.inner.members.write().members = members;
        group
    }

    fn ensure_compatible(&self, other: &Group) -> Result<()> {
        if self.accepts_group(other) {
            Ok(())
        } else {
            Err(GroupError::IncompatibleGroups {
                expected: self.type_name().to_string(),
                found: other.type_name().to_string(),
            })
        }
    }

    /// Members of this group followed by the members of `other`.
    pub fn union(&self, other: &Group) -> Result<Group> {
        self.ensure_compatible(other)?;
        let mut members = self.members();
        members.extend(other.members());
        Ok(self.with_members(members))
    }

    /// Members of this group that also belong to `other`.
    pub fn intersection(&self, other: &Group) -> Result<Group> {
        self.ensure_compatible(other)?;
        let members = self.iter().filter(|m| other.contains(m)).collect();
        Ok(self.with_members(members))
    }

    /// Members of this group that do not belong to `other`.
    pub fn exclude(&self, other: &Group) -> Result<Group> {
        self.ensure_compatible(other)?;
        let members = self.iter().filter(|m| !other.contains(m)).collect();
        Ok(self.with_members(members))
    }

    /// Members in exactly one of the two groups.
    pub fn difference(&self, other: &Group) -> Result<Group> {
        self.ensure_compatible(other)?;
        let mut members: Vec<MemberRef> = self.iter().filter(|m| !other.contains(m)).collect();
        members.extend(other.iter().filter(|m| !self.contains(m)));
        Ok(self.with_members(members))
    }

    /// Members in `begin..end`; `end` is clamped to the group size.
    pub fn range(&self, begin: usize, end: usize) -> Result<Group> {
        if begin > end {
            return Err(GroupError::InvalidRange { begin, end });
        }
        let members = self.members();
        let end = end.min(members.len());
        let begin = begin.min(end);
        Ok(self.with_members(members[begin..end].to_vec()))
    }

    /// Add a member and register it under `key`.
    ///
    /// Groups cannot be named: splice them with [`Group::add`] instead.
    pub fn add_named(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self.admit(value.into()) {
            Admission::Append(member) => {
                let mut list = self.inner.members.write();
                list.members.push(Arc::clone(&member));
                list.names.insert(key.into(), member);
                true
            }
            Admission::Splice(_) => {
                warn!(group.type_name = %self.type_name(), "A group cannot be added as a named member");
                false
            }
            Admission::Rejected => false,
        }
    }

    pub fn get_named(&self, key: &str) -> Option<MemberRef> {
        self.inner.members.read().names.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.members.read().names.contains_key(key)
    }

    /// Remove the member registered under `key` from the group.
    pub fn remove_named(&self, key: &str) -> Option<MemberRef> {
        let mut list = self.inner.members.write();
        let member = list.names.remove(key)?;
        if let Some(index) = list.position(&member) {
            list.remove_at(index);
        }
        Some(member)
    }

    /// Registered names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.members.read().names.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every member recorded as failed in `exceptions`.
    ///
    /// Returns how many members were removed.
    pub fn purge(&self, exceptions: &ExceptionList) -> usize {
        exceptions
            .iter()
            .filter(|record| self.remove_member(&record.member))
            .count()
    }

    /// Block until every member has arrived.
    pub fn wait_all(&self) {
        placeholder::wait_all(&self.members());
    }

    /// Block until one member has arrived.
    pub fn wait_one(&self) {
        placeholder::wait_any(&self.members());
    }

    /// Block until the member at `n` has arrived.
    pub fn wait_nth(&self, n: usize) {
        placeholder::wait_nth(&self.members(), n);
    }

    /// Block until the first `n` members have arrived.
    pub fn wait_n(&self, n: usize) {
        placeholder::wait_n(&self.members(), n);
    }

    /// Wait for one member to arrive and return it.
    pub fn wait_and_get_one(&self) -> Option<MemberRef> {
        placeholder::wait_and_get_any(&self.members())
    }

    /// Wait for one member to arrive, remove it from the group, return it.
    pub fn wait_and_get_one_then_remove(&self) -> Option<MemberRef> {
        let member = placeholder::wait_and_get_any(&self.members())?;
        self.remove_member(&member);
        Some(member)
    }

    /// Wait for the member at `n` to arrive and return it.
    pub fn wait_and_get_nth(&self, n: usize) -> Option<MemberRef> {
        placeholder::wait_and_get_nth(&self.members(), n)
    }

    /// Wait for one member to arrive and return its index.
    pub fn wait_one_and_get_index(&self) -> Option<usize> {
        placeholder::wait_any(&self.members())
    }

    /// True if every member is still pending.
    pub fn all_awaited(&self) -> bool {
        placeholder::all_pending(&self.members())
    }

    /// True if no member is still pending.
    pub fn all_arrived(&self) -> bool {
        placeholder::all_arrived(&self.members())
    }

    pub fn count_pending(&self) -> usize {
        placeholder::count_pending(&self.members())
    }

    /// Log the size and every member of the group.
    pub fn log_members(&self) {
        let members = self.members();
        info!(group.type_name = %self.type_name(), group.size = members.len(), "Group members");
        for (index, member) in members.iter().enumerate() {
            info!(member.index = index, member.type_name = %member.type_name(), "  {:?}", member);
        }
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group<{}>[{} members]", self.type_name(), self.size())
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.inner.id)
            .field("type_name", &self.inner.type_name)
            .field("size", &self.size())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

impl IntoIterator for &Group {
    type Item = MemberRef;
    type IntoIter = std::vec::IntoIter<MemberRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
