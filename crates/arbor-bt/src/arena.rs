use core::fmt;
use std::mem;

use arbor_core::{ExecutionContext, Vec2};
use arbor_tools::TraceEvent;
use uuid::Uuid;

use crate::bt::{Behaviour, NodeKind, State};

pub const TRACE_NODE_START: &str = "bt.node.start";
pub const TRACE_NODE_STOP: &str = "bt.node.stop";
pub const TRACE_NODE_ABORT: &str = "bt.node.abort";

/// Index of a node inside one tree's arena.
///
/// Ids are only meaningful for the tree that issued them; a cloned instance
/// issues its own. Use [`Node::guid`] to correlate nodes across clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Never issued; stands in for edges whose target no longer exists.
    pub(crate) const DANGLING: NodeId = NodeId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node slot: identity, layout, lifecycle state, child edges and behaviour.
pub struct Node {
    guid: Uuid,
    position: Vec2,
    state: State,
    started: bool,
    children: Vec<NodeId>,
    // `None` only while the node is being updated.
    behaviour: Option<Box<dyn Behaviour>>,
    kind: NodeKind,
    type_name: &'static str,
}

impl Node {
    pub(crate) fn new(guid: Uuid, behaviour: Box<dyn Behaviour>, position: Vec2) -> Self {
        Self {
            guid,
            position,
            state: State::Idle,
            started: false,
            children: Vec::new(),
            kind: behaviour.kind(),
            type_name: behaviour.type_name(),
            behaviour: Some(behaviour),
        }
    }

    /// Fresh, never-started copy without edges.
    pub(crate) fn duplicate(&self) -> Option<Self> {
        let behaviour = self.behaviour.as_ref()?.clone_box();
        Some(Self::new(self.guid, behaviour, self.position))
    }

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.started
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn behaviour(&self) -> Option<&dyn Behaviour> {
        self.behaviour.as_deref()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("guid", &self.guid)
            .field("type", &self.type_name)
            .field("state", &self.state)
            .field("children", &self.children)
            .finish()
    }
}

/// Flat node registry. Deleted nodes leave tombstones so ids stay stable while
/// a template is edited; cloning compacts them away.
#[derive(Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
}

impl NodeArena {
    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.slots.get_mut(id.index())?.take()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    pub(crate) fn ids(&self) -> Vec<NodeId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub(crate) fn parent_of(&self, child: NodeId) -> Option<NodeId> {
        self.iter()
            .find(|(_, n)| n.children.contains(&child))
            .map(|(id, _)| id)
    }

    /// Run one activation step of `id` (see [`Behaviour`] for the contract).
    pub(crate) fn update(&mut self, id: NodeId, ctx: &mut ExecutionContext<'_>) -> State {
        let Some(node) = self.get_mut(id) else {
            return State::Failure;
        };
        // Re-entering a node that is mid-update means the graph has a cycle.
        let Some(mut behaviour) = node.behaviour.take() else {
            return State::Failure;
        };
        let children = mem::take(&mut node.children);

        if !node.started {
            node.started = true;
            node.state = State::Running;
            behaviour.on_start(ctx);
            if ctx.is_tracing() {
                ctx.emit(TraceEvent::new(ctx.tick.tick, TRACE_NODE_START).with_a(id.0 as u64));
            }
        }

        let mut state = {
            let mut view = Children::new(self, &children);
            behaviour.on_update(ctx, &mut view)
        };
        if state == State::Idle {
            state = State::Failure;
        }

        if state.is_terminal() {
            // A finished node leaves no running descendants behind.
            for &child in &children {
                self.abort(child, ctx);
            }
            behaviour.on_stop(ctx);
            if ctx.is_tracing() {
                ctx.emit(
                    TraceEvent::new(ctx.tick.tick, TRACE_NODE_STOP)
                        .with_a(id.0 as u64)
                        .with_b(state.code()),
                );
            }
        }

        if let Some(node) = self.get_mut(id) {
            node.state = state;
            node.started = state == State::Running;
            node.behaviour = Some(behaviour);
            node.children = children;
        }
        state
    }

    /// Stop `id` if it is running: running descendants are aborted first, then
    /// the node's own `on_stop` runs and it returns to `Idle`.
    pub(crate) fn abort(&mut self, id: NodeId, ctx: &mut ExecutionContext<'_>) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        if !node.started {
            return;
        }
        let Some(mut behaviour) = node.behaviour.take() else {
            return;
        };
        let children = mem::take(&mut node.children);

        for &child in &children {
            self.abort(child, ctx);
        }
        behaviour.on_stop(ctx);
        if ctx.is_tracing() {
            ctx.emit(TraceEvent::new(ctx.tick.tick, TRACE_NODE_ABORT).with_a(id.0 as u64));
        }

        if let Some(node) = self.get_mut(id) {
            node.state = State::Idle;
            node.started = false;
            node.behaviour = Some(behaviour);
            node.children = children;
        }
    }

    /// Depth-first, pre-order `init` of everything reachable from `id`.
    pub(crate) fn init(&mut self, id: NodeId, ctx: &mut ExecutionContext<'_>) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        let Some(mut behaviour) = node.behaviour.take() else {
            return;
        };
        behaviour.init(ctx);
        let children = node.children.clone();
        node.behaviour = Some(behaviour);

        for child in children {
            self.init(child, ctx);
        }
    }

    pub(crate) fn running(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.started)
            .map(|(id, _)| id)
            .collect()
    }
}

/// A node's view of its own children during `on_update`.
pub struct Children<'a> {
    arena: &'a mut NodeArena,
    ids: &'a [NodeId],
}

impl<'a> Children<'a> {
    pub(crate) fn new(arena: &'a mut NodeArena, ids: &'a [NodeId]) -> Self {
        Self { arena, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    /// Update the child at `index`. A missing child reports `Failure`.
    pub fn update(&mut self, index: usize, ctx: &mut ExecutionContext<'_>) -> State {
        match self.ids.get(index) {
            Some(&id) => self.arena.update(id, ctx),
            None => State::Failure,
        }
    }

    pub fn abort(&mut self, index: usize, ctx: &mut ExecutionContext<'_>) {
        if let Some(&id) = self.ids.get(index) {
            self.arena.abort(id, ctx);
        }
    }

    pub fn abort_all(&mut self, ctx: &mut ExecutionContext<'_>) {
        for &id in self.ids {
            self.arena.abort(id, ctx);
        }
    }

    pub fn state(&self, index: usize) -> State {
        self.ids
            .get(index)
            .and_then(|&id| self.arena.get(id))
            .map(Node::state)
            .unwrap_or(State::Idle)
    }

    pub fn is_running(&self, index: usize) -> bool {
        self.ids
            .get(index)
            .and_then(|&id| self.arena.get(id))
            .is_some_and(Node::is_running)
    }
}
