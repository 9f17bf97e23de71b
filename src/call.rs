//! Call descriptors: values, tagged arguments and method calls.
//!
//! A [`MethodCall`] is what a group receives and what each member finally
//! executes. Arguments carry their addressing mode explicitly: a
//! [`Argument::Scatter`] group is split round-robin across the fan-out, every
//! other argument is broadcast unchanged.

use std::fmt;

use crate::group::Group;
use crate::interfaces::{same_member, MemberRef};
use crate::ANY_TYPE;

/// A value passed to or returned from a member call.
#[derive(Clone)]
pub enum Value {
    /// Plain data.
    Data(serde_json::Value),
    /// Reference to a call-interceptable member.
    Member(MemberRef),
    /// A whole group handle.
    Group(Group),
}

impl Value {
    /// The unit value, returned by calls that produce nothing.
    pub fn unit() -> Self {
        Value::Data(serde_json::Value::Null)
    }

    /// Type name used for admission checks.
    pub fn type_name(&self) -> String {
        match self {
            Value::Data(data) => data_type_name(data).to_string(),
            Value::Member(member) => member.type_name().to_string(),
            Value::Group(group) => group.type_name().to_string(),
        }
    }

    /// Whether this value may join a group declared with `type_name`.
    pub fn is_assignable_to(&self, type_name: &str) -> bool {
        match self {
            Value::Data(data) => type_name == ANY_TYPE || data_type_name(data) == type_name,
            Value::Member(member) => member.is_assignable_to(type_name),
            Value::Group(group) => type_name == ANY_TYPE || group.type_name() == type_name,
        }
    }

    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(|d| d.as_str())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(|d| d.as_i64())
    }

    pub fn as_member(&self) -> Option<&MemberRef> {
        match self {
            Value::Member(member) => Some(member),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Value::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Follow placeholders until a non-placeholder value is reached.
    ///
    /// Blocks while a placeholder along the way is still pending.
    pub fn resolve(&self) -> Value {
        match self {
            Value::Member(member) => match member.as_placeholder() {
                Some(placeholder) => placeholder.wait().resolve(),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Follow placeholders without blocking.
    ///
    /// `None` as soon as a placeholder along the way is still pending.
    pub fn try_resolve(&self) -> Option<Value> {
        match self {
            Value::Member(member) => match member.as_placeholder() {
                Some(placeholder) => placeholder.try_get()?.try_resolve(),
                None => Some(self.clone()),
            },
            _ => Some(self.clone()),
        }
    }
}

fn data_type_name(data: &serde_json::Value) -> &'static str {
    match data {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Data(data) => write!(f, "Data({})", data),
            Value::Member(member) => write!(f, "Member({:?})", member),
            Value::Group(group) => write!(f, "Group({})", group),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Member(a), Value::Member(b)) => same_member(a, b),
            (Value::Group(a), Value::Group(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Value::Data(data)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Data(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Data(serde_json::Value::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Data(serde_json::Value::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Data(serde_json::Value::Bool(b))
    }
}

impl From<MemberRef> for Value {
    fn from(member: MemberRef) -> Self {
        Value::Member(member)
    }
}

impl From<Group> for Value {
    fn from(group: Group) -> Self {
        Value::Group(group)
    }
}

/// An argument tagged with its addressing mode.
#[derive(Debug, Clone)]
pub enum Argument {
    /// Every member receives this value unchanged.
    Broadcast(Value),
    /// Member `i` receives element `i mod len` of this group.
    Scatter(Group),
}

impl Argument {
    pub fn is_scatter(&self) -> bool {
        matches!(self, Argument::Scatter(_))
    }

    /// The broadcast value, if this argument is not scattered.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Broadcast(value) => Some(value),
            Argument::Scatter(_) => None,
        }
    }
}

/// How a call's arguments are addressed to the members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Identical arguments for every member.
    Broadcast,
    /// At least one argument is distributed round-robin.
    Scatter,
}

/// A call to be executed on every member of a group.
#[derive(Debug, Clone)]
pub struct MethodCall {
    name: String,
    return_type: Option<String>,
    one_way: bool,
    interface: Option<String>,
    arguments: Vec<Argument>,
}

impl MethodCall {
    /// Create a call to `name` with no arguments and no return value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            one_way: false,
            interface: None,
            arguments: Vec::new(),
        }
    }

    /// Declare the type of the value each member returns.
    pub fn returning(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }

    /// Mark the call fire-and-forget.
    pub fn one_way(mut self) -> Self {
        self.one_way = true;
        self
    }

    /// Route the call to the named sub-interface of each member.
    pub fn on_interface(mut self, name: impl Into<String>) -> Self {
        self.interface = Some(name.into());
        self
    }

    /// Append a broadcast argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(Argument::Broadcast(value.into()));
        self
    }

    /// Append a scattered argument.
    pub fn scatter(mut self, group: &Group) -> Self {
        self.arguments.push(Argument::Scatter(group.clone()));
        self
    }

    /// Append an already tagged argument.
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Broadcast value at position `i`.
    ///
    /// After scatter resolution every argument a member sees is a broadcast
    /// value, so member implementations read their inputs through this.
    pub fn value(&self, i: usize) -> Option<&Value> {
        self.arguments.get(i).and_then(Argument::as_value)
    }

    /// Fire-and-forget calls and calls without a return type are one-way.
    pub fn is_one_way(&self) -> bool {
        self.one_way || self.return_type.is_none()
    }

    /// Scatter as soon as any argument is scatter-tagged.
    pub fn addressing_mode(&self) -> AddressingMode {
        if self.arguments.iter().any(Argument::is_scatter) {
            AddressingMode::Scatter
        } else {
            AddressingMode::Broadcast
        }
    }

    /// Copy of this call whose group-valued arguments are detached from
    /// their source groups, so later membership changes stay invisible.
    pub(crate) fn frozen(&self) -> MethodCall {
        let arguments = self
            .arguments
            .iter()
            .map(|argument| match argument {
                Argument::Broadcast(Value::Group(group)) => {
                    Argument::Broadcast(Value::Group(group.detached_copy()))
                }
                other => other.clone(),
            })
            .collect();

        self.with_arguments(arguments)
    }

    /// Copy of this call with its arguments replaced.
    pub(crate) fn with_arguments(&self, arguments: Vec<Argument>) -> MethodCall {
        MethodCall {
            name: self.name.clone(),
            return_type: self.return_type.clone(),
            one_way: self.one_way,
            interface: self.interface.clone(),
            arguments,
        }
    }
}
