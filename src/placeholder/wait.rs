//! Wait and query operations over sequences of members.
//!
//! Defined purely in terms of [`Placeholder`](super::Placeholder): a member that is not a
//! placeholder counts as arrived.

use std::sync::Arc;

use crate::call::Value;
use crate::interfaces::MemberRef;

use super::ArrivalSignal;

/// Whether `member` is a placeholder still waiting for its value.
///
/// A placeholder that resolved to another placeholder stays pending until
/// the end of the chain arrives.
pub fn is_pending(member: &MemberRef) -> bool {
    member
        .as_placeholder()
        .map(|placeholder| placeholder.settled().is_none())
        .unwrap_or(false)
}

/// First placeholder along `member`'s chain that has not arrived yet.
fn pending_link(member: &MemberRef) -> Option<MemberRef> {
    let mut current = Arc::clone(member);
    loop {
        let value = match current.as_placeholder() {
            Some(placeholder) => placeholder.try_get(),
            None => return None,
        };
        match value {
            None => return Some(current),
            Some(Value::Member(next)) => current = next,
            Some(_) => return None,
        }
    }
}

fn wait_member(member: &MemberRef) {
    if let Some(placeholder) = member.as_placeholder() {
        placeholder.wait_settled();
    }
}

/// Block until every member has arrived.
pub fn wait_all(members: &[MemberRef]) {
    for member in members {
        wait_member(member);
    }
}

/// Block until at least one member has arrived; returns its index.
///
/// When several have arrived, the lowest index wins. `None` for an empty
/// sequence.
pub fn wait_any(members: &[MemberRef]) -> Option<usize> {
    if members.is_empty() {
        return None;
    }

    loop {
        let signal = Arc::new(ArrivalSignal::default());
        let mut watched = Vec::with_capacity(members.len());
        let mut arrived = None;
        let mut moved = false;

        for (index, member) in members.iter().enumerate() {
            match pending_link(member) {
                None => {
                    arrived = Some(index);
                    break;
                }
                Some(link) => {
                    let registered = link
                        .as_placeholder()
                        .map(|placeholder| placeholder.watch(&signal))
                        .unwrap_or(false);
                    if registered {
                        watched.push(link);
                    } else {
                        // The link arrived meanwhile; its chain may go on.
                        moved = true;
                    }
                }
            }
        }

        if arrived.is_none() && !moved {
            signal.wait();
        }

        for link in &watched {
            if let Some(placeholder) = link.as_placeholder() {
                placeholder.unwatch(&signal);
            }
        }

        if let Some(index) = arrived.or_else(|| members.iter().position(|m| !is_pending(m))) {
            return Some(index);
        }
    }
}

/// Block until the member at `n` has arrived.
pub fn wait_nth(members: &[MemberRef], n: usize) {
    if let Some(member) = members.get(n) {
        wait_member(member);
    }
}

/// Block until the first `n` members have arrived, in order.
pub fn wait_n(members: &[MemberRef], n: usize) {
    for member in members.iter().take(n) {
        wait_member(member);
    }
}

/// Wait for any member to arrive and return it.
pub fn wait_and_get_any(members: &[MemberRef]) -> Option<MemberRef> {
    wait_any(members).map(|index| Arc::clone(&members[index]))
}

/// Wait for the member at `n` to arrive and return it.
pub fn wait_and_get_nth(members: &[MemberRef], n: usize) -> Option<MemberRef> {
    let member = members.get(n)?;
    wait_member(member);
    Some(Arc::clone(member))
}

/// Number of members still pending.
pub fn count_pending(members: &[MemberRef]) -> usize {
    members.iter().filter(|m| is_pending(m)).count()
}

/// True if every member is still pending.
pub fn all_pending(members: &[MemberRef]) -> bool {
    members.iter().all(is_pending)
}

/// True if no member is still pending.
pub fn all_arrived(members: &[MemberRef]) -> bool {
    !members.iter().any(is_pending)
}
