//! Single-shot placeholders for values that may not have arrived yet.
//!
//! Every raw value admitted into a group is wrapped in an already resolved
//! placeholder, and every slot of a result group starts as a pending one, so
//! group members are uniformly call-interceptable. Calls made on a pending
//! placeholder block until the value arrives (wait-by-necessity).

pub mod wait;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::call::{MethodCall, Value};
use crate::group::CallOutcome;
use crate::interfaces::{InvocationError, Member};

pub use wait::{
    all_arrived, all_pending, count_pending, is_pending, wait_all, wait_and_get_any,
    wait_and_get_nth, wait_any, wait_n, wait_nth,
};

/// Wakes a waiter blocked on several placeholders at once.
#[derive(Default)]
pub(crate) struct ArrivalSignal {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl ArrivalSignal {
    fn fire(&self) {
        *self.fired.lock() = true;
        self.cond.notify_all();
    }

    pub(crate) fn wait(&self) {
        let mut fired = self.fired.lock();
        while !*fired {
            self.cond.wait(&mut fired);
        }
    }
}

struct PlaceholderState {
    value: Option<Value>,
    watchers: Vec<Arc<ArrivalSignal>>,
}

/// A value slot that may not yet hold its final value.
pub struct Placeholder {
    type_name: String,
    state: Mutex<PlaceholderState>,
    arrived: Condvar,
}

impl Placeholder {
    /// Create a pending placeholder for a value of `type_name`.
    pub fn pending(type_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            type_name: type_name.into(),
            state: Mutex::new(PlaceholderState {
                value: None,
                watchers: Vec::new(),
            }),
            arrived: Condvar::new(),
        })
    }

    /// Create a placeholder that already holds `value`.
    pub fn resolved(value: Value) -> Arc<Self> {
        let type_name = value.type_name();
        Arc::new(Self {
            type_name,
            state: Mutex::new(PlaceholderState {
                value: Some(value),
                watchers: Vec::new(),
            }),
            arrived: Condvar::new(),
        })
    }

    /// Store the value and wake every waiter.
    ///
    /// Placeholders are single-shot: returns `false` and leaves the stored
    /// value untouched if one already arrived.
    pub fn resolve(&self, value: Value) -> bool {
        let watchers = {
            let mut state = self.state.lock();
            if state.value.is_some() {
                return false;
            }
            state.value = Some(value);
            std::mem::take(&mut state.watchers)
        };
        self.arrived.notify_all();
        for watcher in watchers {
            watcher.fire();
        }
        true
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().value.is_none()
    }

    /// Block until the value arrives.
    pub fn wait(&self) -> Value {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = &state.value {
                return value.clone();
            }
            self.arrived.wait(&mut state);
        }
    }

    /// Block for at most `timeout`; `None` if the value is still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Value> {
        let mut state = self.state.lock();
        if state.value.is_none() {
            let _ = self.arrived.wait_while_for(&mut state, |s| s.value.is_none(), timeout);
        }
        state.value.clone()
    }

    /// The value if it has arrived.
    pub fn try_get(&self) -> Option<Value> {
        self.state.lock().value.clone()
    }

    /// The final value if it has arrived, following placeholders that
    /// resolved to other placeholders.
    pub fn settled(&self) -> Option<Value> {
        self.try_get()?.try_resolve()
    }

    /// Block until the final value has arrived, following chained
    /// placeholders.
    pub fn wait_settled(&self) -> Value {
        self.wait().resolve()
    }

    /// Register `signal` to fire on arrival.
    ///
    /// Returns `false` without registering if the value already arrived.
    pub(crate) fn watch(&self, signal: &Arc<ArrivalSignal>) -> bool {
        let mut state = self.state.lock();
        if state.value.is_some() {
            return false;
        }
        state.watchers.push(Arc::clone(signal));
        true
    }

    pub(crate) fn unwatch(&self, signal: &Arc<ArrivalSignal>) {
        self.state
            .lock()
            .watchers
            .retain(|w| !Arc::ptr_eq(w, signal));
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            Some(value) => write!(f, "Placeholder<{}>({:?})", self.type_name, value),
            None => write!(f, "Placeholder<{}>(pending)", self.type_name),
        }
    }
}

impl Member for Placeholder {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_assignable_to(&self, type_name: &str) -> bool {
        match self.try_get() {
            Some(Value::Member(member)) => member.is_assignable_to(type_name),
            Some(value) => value.is_assignable_to(type_name),
            None => type_name == crate::ANY_TYPE || self.type_name == type_name,
        }
    }

    /// Waits for the value, then forwards the call to it.
    fn invoke(&self, call: &MethodCall) -> Result<Value, InvocationError> {
        match self.wait() {
            Value::Member(member) => member.invoke(call),
            Value::Group(group) => match group.invoke(call) {
                Ok(CallOutcome::Results(results)) => Ok(Value::Group(results)),
                Ok(CallOutcome::OneWay(_)) => Ok(Value::unit()),
                Err(e) => Err(InvocationError::Transport(e.to_string())),
            },
            Value::Data(data) => Err(InvocationError::NotInvocable {
                type_name: Value::Data(data).type_name(),
            }),
        }
    }

    fn as_placeholder(&self) -> Option<&Placeholder> {
        Some(self)
    }
}
