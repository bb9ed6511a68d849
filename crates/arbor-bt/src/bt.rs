use core::fmt;

use arbor_core::ExecutionContext;

use crate::arena::Children;

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Never started, or aborted and waiting to start again.
    #[default]
    Idle,
    Running,
    Success,
    Failure,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Success | State::Failure)
    }

    /// Stable numeric code used in trace events.
    pub fn code(self) -> u64 {
        match self {
            State::Idle => 0,
            State::Running => 1,
            State::Success => 2,
            State::Failure => 3,
        }
    }

    pub fn from_bool(success: bool) -> Self {
        if success {
            State::Success
        } else {
            State::Failure
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Idle => "idle",
            State::Running => "running",
            State::Success => "success",
            State::Failure => "failure",
        };
        f.write_str(name)
    }
}

/// Structural role of a node; decides how many children it may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Composite,
    Decorator,
    Action,
}

impl NodeKind {
    pub fn max_children(self) -> Option<usize> {
        match self {
            NodeKind::Root | NodeKind::Decorator => Some(1),
            NodeKind::Composite => None,
            NodeKind::Action => Some(0),
        }
    }

    pub fn accepts_children(self) -> bool {
        self.max_children() != Some(0)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Root => "root",
            NodeKind::Composite => "composite",
            NodeKind::Decorator => "decorator",
            NodeKind::Action => "action",
        };
        f.write_str(name)
    }
}

/// The extension points of a node.
///
/// The runtime owns the state machine: `on_start` runs before the first
/// `on_update` of every activation, and `on_stop` runs exactly once when the
/// activation ends with a terminal state or is aborted. `on_update` may read and
/// write the blackboards and drive its own children through `children`; it must
/// not change tree structure.
///
/// Returning `State::Idle` from `on_update` is treated as `Failure`.
pub trait Behaviour: BehaviourClone + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;

    /// Registry name of the node type.
    fn type_name(&self) -> &'static str;

    /// One-time setup when the owning instance is bound.
    fn init(&mut self, _ctx: &mut ExecutionContext<'_>) {}

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {}

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State;

    fn on_stop(&mut self, _ctx: &mut ExecutionContext<'_>) {}
}

/// Object-safe cloning for boxed behaviours. Implemented for every `Behaviour + Clone`.
pub trait BehaviourClone {
    fn clone_box(&self) -> Box<dyn Behaviour>;
}

impl<T> BehaviourClone for T
where
    T: Behaviour + Clone,
{
    fn clone_box(&self) -> Box<dyn Behaviour> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Behaviour> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for dyn Behaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.kind())
    }
}
