use core::fmt;
use std::collections::HashMap;

use arbor_core::{
    Blackboard, BlackboardError, BlackboardKey, BlackboardScope, BlackboardValue, ExecutionContext,
    KeyType, SharedBlackboard, TickContext, Vec2,
};
use arbor_tools::{TraceEvent, TraceSink};
use uuid::Uuid;

use crate::arena::{Node, NodeArena, NodeId};
use crate::bt::{Behaviour, NodeKind, State};
use crate::error::{Result, StructuralError, TreeError};
use crate::library::TreeLibrary;
use crate::nodes::RootNode;
use crate::registry::{NodeArgs, NodeProperties, NodeRegistry};

pub const TRACE_TREE_TICK: &str = "bt.tree.tick";

/// A behavior tree: either an editable template or a bound, tickable instance.
///
/// Templates are edited through the authoring methods and never ticked.
/// [`Tree::instantiate`] (or `clone` followed by [`Tree::bind`]) turns a
/// template into an instance with its own node states and local blackboard;
/// the shared blackboard, if any, stays aliased between all instances.
pub struct Tree {
    name: String,
    nodes: NodeArena,
    root: NodeId,
    blackboard: Blackboard,
    shared: Option<SharedBlackboard>,
    clock: TickContext,
    bound: bool,
    trace: Option<Box<dyn TraceSink>>,
}

impl Tree {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_root_guid(name, Uuid::new_v4())
    }

    /// Template whose root node has a caller-chosen guid (asset loading).
    pub fn with_root_guid(name: impl Into<String>, root_guid: Uuid) -> Self {
        let mut nodes = NodeArena::default();
        let root = nodes.insert(Node::new(root_guid, Box::new(RootNode), Vec2::default()));
        Self {
            name: name.into(),
            nodes,
            root,
            blackboard: Blackboard::new(),
            shared: None,
            clock: TickContext::default(),
            bound: false,
            trace: None,
        }
    }

    // ---------------------------------------------------------------------
    // Authoring
    // ---------------------------------------------------------------------

    fn ensure_template(&self) -> Result<()> {
        if self.bound {
            Err(TreeError::BoundInstance)
        } else {
            Ok(())
        }
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Add a detached node with a fresh guid.
    pub fn create_node(&mut self, behaviour: Box<dyn Behaviour>, position: Vec2) -> Result<NodeId> {
        self.insert_node(Uuid::new_v4(), behaviour, position)
    }

    /// Add a detached node built by `registry` with default properties.
    pub fn create_node_from(
        &mut self,
        registry: &NodeRegistry,
        type_name: &str,
        position: Vec2,
    ) -> Result<NodeId> {
        self.ensure_template()?;
        let properties = NodeProperties::default();
        let library = TreeLibrary::default();
        let behaviour = registry.create(type_name, &NodeArgs::new(&properties, &library))?;
        self.create_node(behaviour, position)
    }

    /// Add a detached node with a caller-chosen guid.
    pub fn insert_node(
        &mut self,
        guid: Uuid,
        behaviour: Box<dyn Behaviour>,
        position: Vec2,
    ) -> Result<NodeId> {
        self.ensure_template()?;
        if self.find(guid).is_some() {
            return Err(TreeError::DuplicateNode(guid));
        }
        Ok(self.nodes.insert(Node::new(guid, behaviour, position)))
    }

    /// Create a node and make it the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, behaviour: Box<dyn Behaviour>) -> Result<NodeId> {
        self.ensure_template()?;
        let kind = self.require(parent)?.kind();
        if !kind.accepts_children() {
            return Err(TreeError::ChildNotAllowed { kind });
        }
        let position = self.require(parent)?.position();
        let child = self.create_node(behaviour, position)?;
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Link `child` under `parent`.
    ///
    /// Root and decorator parents hold a single child, which is replaced.
    /// Composite parents append.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_template()?;
        let kind = self.require(parent)?.kind();
        let child_guid = self.require(child)?.guid();
        if child == self.root {
            return Err(TreeError::RootNode);
        }
        if !kind.accepts_children() {
            return Err(TreeError::ChildNotAllowed { kind });
        }
        if self.nodes.parent_of(child).is_some() {
            return Err(StructuralError::MultipleParents { node: child_guid }.into());
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(StructuralError::Cycle { node: child_guid }.into());
        }

        let Some(node) = self.nodes.get_mut(parent) else {
            return Err(TreeError::UnknownNode(parent));
        };
        let children = node.children_mut();
        if kind.max_children() == Some(1) {
            children.clear();
        }
        children.push(child);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_template()?;
        let Some(node) = self.nodes.get_mut(parent) else {
            return Err(TreeError::UnknownNode(parent));
        };
        let children = node.children_mut();
        let index = children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotAChild)?;
        children.remove(index);
        Ok(())
    }

    /// Remove a node from the tree. Its children stay in the tree, detached.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.ensure_template()?;
        if id == self.root {
            return Err(TreeError::RootNode);
        }
        self.require(id)?;
        if let Some(parent) = self.nodes.parent_of(id) {
            self.remove_child(parent, id)?;
        }
        self.nodes.remove(id);
        Ok(())
    }

    /// Create a key holding `key_type`'s zero value.
    pub fn create_blackboard_key(
        &mut self,
        name: impl Into<String>,
        key_type: KeyType,
        scope: BlackboardScope,
    ) -> Result<()> {
        self.insert_blackboard_key(name, key_type.default_value(), scope)
    }

    /// Create a key with an initial value.
    ///
    /// A name is taken in the local scope when either scope already has it and
    /// a shared blackboard is attached; without one, only local names count.
    pub fn insert_blackboard_key(
        &mut self,
        name: impl Into<String>,
        value: impl Into<BlackboardValue>,
        scope: BlackboardScope,
    ) -> Result<()> {
        self.ensure_template()?;
        let name = name.into();
        if name.is_empty() {
            return Err(BlackboardError::InvalidKeyName.into());
        }

        let in_local = self.blackboard.contains(&name);
        let in_shared = self
            .shared
            .as_ref()
            .is_some_and(|shared| shared.read().contains(&name));

        match scope {
            BlackboardScope::Local => {
                if in_local {
                    return Err(duplicate(name, BlackboardScope::Local));
                }
                if in_shared {
                    return Err(BlackboardError::ShadowsSharedKey { name }.into());
                }
                self.blackboard.insert(name, value)?;
            }
            BlackboardScope::Shared => {
                let shared = self
                    .shared
                    .as_ref()
                    .ok_or(BlackboardError::NoSharedBlackboard)?;
                if in_shared {
                    return Err(duplicate(name, BlackboardScope::Shared));
                }
                if in_local {
                    return Err(duplicate(name, BlackboardScope::Local));
                }
                shared.write().insert(name, value)?;
            }
        }
        Ok(())
    }

    pub fn delete_blackboard_key(&mut self, name: &str, scope: BlackboardScope) -> Result<BlackboardKey> {
        self.ensure_template()?;
        let removed = match scope {
            BlackboardScope::Local => self.blackboard.remove(name),
            BlackboardScope::Shared => self
                .shared
                .as_ref()
                .ok_or(BlackboardError::NoSharedBlackboard)?
                .write()
                .remove(name),
        };
        removed.ok_or_else(|| {
            BlackboardError::KeyNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Attach (or detach) the shared blackboard.
    ///
    /// Rejected when a local key already uses a name the shared board has.
    pub fn set_shared_blackboard(&mut self, shared: Option<SharedBlackboard>) -> Result<()> {
        self.ensure_template()?;
        if let Some(name) = shared.as_ref().and_then(|s| self.shadowed_key(s)) {
            return Err(BlackboardError::ShadowsSharedKey { name }.into());
        }
        self.shared = shared;
        Ok(())
    }

    /// First local key whose name `shared` also holds.
    fn shadowed_key(&self, shared: &SharedBlackboard) -> Option<String> {
        let shared = shared.read();
        self.blackboard
            .names()
            .find(|name| shared.contains(name))
            .map(str::to_string)
    }

    /// Install (or remove) the sink that receives this instance's lifecycle events.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) -> Option<Box<dyn TraceSink>> {
        std::mem::replace(&mut self.trace, sink)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        let mut steps = 0usize;
        loop {
            if node == ancestor {
                return true;
            }
            // A malformed graph may already contain a cycle above `node`.
            steps += 1;
            if steps > self.nodes.len() {
                return true;
            }
            match self.nodes.parent_of(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    // ---------------------------------------------------------------------
    // Instancing
    // ---------------------------------------------------------------------

    /// Check the graph is a single tree rooted at the unique root node.
    pub fn validate(&self) -> std::result::Result<(), StructuralError> {
        let roots = self
            .nodes
            .iter()
            .filter(|(_, n)| n.kind() == NodeKind::Root)
            .count();
        match self.nodes.get(self.root) {
            Some(root) if root.kind() == NodeKind::Root => {}
            _ => return Err(StructuralError::MissingRoot),
        }
        if roots > 1 {
            return Err(StructuralError::MultipleRoots { count: roots });
        }

        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        for (id, node) in self.nodes.iter() {
            let count = node.children().len();
            if node.kind().max_children().is_some_and(|max| count > max) {
                return Err(StructuralError::InvalidChildCount {
                    node: node.guid(),
                    kind: node.kind(),
                    count,
                });
            }
            for &child in node.children() {
                let Some(child_node) = self.nodes.get(child) else {
                    return Err(StructuralError::DanglingChild { parent: node.guid() });
                };
                if parents.insert(child, id).is_some() {
                    return Err(StructuralError::MultipleParents {
                        node: child_node.guid(),
                    });
                }
            }
        }

        // With single parents, a cycle is a parent chain that comes back to
        // where it started. The root has no parent, so it is never on one.
        for (id, node) in self.nodes.iter() {
            let mut current = id;
            for _ in 0..parents.len() {
                match parents.get(&current) {
                    Some(&parent) if parent == id => {
                        return Err(StructuralError::Cycle { node: node.guid() });
                    }
                    Some(&parent) => current = parent,
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Turn this tree into a running instance: validate, reset the clock and
    /// run every node's `init`, parents before children.
    pub fn bind(&mut self) -> Result<()> {
        if self.bound {
            return Err(TreeError::AlreadyBound);
        }
        self.validate()?;

        self.clock = TickContext::default();
        self.bound = true;
        let root = self.root;
        let (nodes, mut ctx) = self.split();
        nodes.init(root, &mut ctx);

        tracing::debug!(tree = %self.name, nodes = self.nodes.len(), "bound tree instance");
        Ok(())
    }

    /// [`Tree::bind`], attaching `shared` first when given.
    ///
    /// Local keys that `shared` also holds keep resolving locally; each one is
    /// logged, since the shared value is unreachable by name.
    pub fn bind_shared(&mut self, shared: Option<SharedBlackboard>) -> Result<()> {
        if self.bound {
            return Err(TreeError::AlreadyBound);
        }
        if let Some(shared) = shared {
            {
                let board = shared.read();
                for name in self.blackboard.names().filter(|name| board.contains(name)) {
                    tracing::warn!(tree = %self.name, key = name, "local key shadows a shared key");
                }
            }
            self.shared = Some(shared);
        }
        self.bind()
    }

    /// Clone this template and bind the copy.
    pub fn instantiate(&self) -> Result<Tree> {
        let mut instance = self.clone();
        instance.bind()?;
        Ok(instance)
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Advance the clock by `dt_seconds` and update the root once.
    ///
    /// Ticking is infallible: an unbound tree reports `Failure`.
    pub fn tick(&mut self, dt_seconds: f32) -> State {
        self.tick_with(dt_seconds, None)
    }

    /// [`Tree::tick`], sending events to `outer` instead of this tree's own
    /// sink when given. Sub-trees tick through here with their parent's sink.
    pub(crate) fn tick_with(
        &mut self,
        dt_seconds: f32,
        outer: Option<&mut (dyn TraceSink + 'static)>,
    ) -> State {
        if !self.bound {
            tracing::warn!(tree = %self.name, "tick on a tree that is not bound");
            return State::Failure;
        }

        self.clock.advance(dt_seconds);
        let root = self.root;
        let (nodes, mut ctx) = self.split_with(outer);
        let state = nodes.update(root, &mut ctx);
        if ctx.is_tracing() {
            ctx.emit(TraceEvent::new(ctx.tick.tick, TRACE_TREE_TICK).with_b(state.code()));
        }
        state
    }

    /// Abort every running node. The next tick starts the tree afresh.
    pub fn abort(&mut self) {
        self.abort_with(None);
    }

    pub(crate) fn abort_with(&mut self, outer: Option<&mut (dyn TraceSink + 'static)>) {
        if !self.bound {
            return;
        }
        let root = self.root;
        let (nodes, mut ctx) = self.split_with(outer);
        nodes.abort(root, &mut ctx);
    }

    fn split(&mut self) -> (&mut NodeArena, ExecutionContext<'_>) {
        self.split_with(None)
    }

    fn split_with<'a>(
        &'a mut self,
        outer: Option<&'a mut (dyn TraceSink + 'static)>,
    ) -> (&'a mut NodeArena, ExecutionContext<'a>) {
        let trace = match outer {
            Some(sink) => Some(sink),
            None => self.trace.as_deref_mut(),
        };
        let ctx = ExecutionContext::new(self.clock, &mut self.blackboard)
            .with_shared(self.shared.as_ref())
            .with_trace(trace);
        (&mut self.nodes, ctx)
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn find(&self, guid: Uuid) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.guid() == guid)
            .map(|(id, _)| id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.parent_of(id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    /// Nodes whose current activation has not finished.
    pub fn running_nodes(&self) -> Vec<NodeId> {
        self.nodes.running()
    }

    /// State the root reported on the last tick.
    pub fn state(&self) -> State {
        self.nodes.get(self.root).map(Node::state).unwrap_or_default()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn shared_blackboard(&self) -> Option<&SharedBlackboard> {
        self.shared.as_ref()
    }

    pub fn clock(&self) -> TickContext {
        self.clock
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

fn duplicate(name: String, scope: BlackboardScope) -> TreeError {
    BlackboardError::DuplicateKey { name, scope }.into()
}

/// Deep copy for instancing.
///
/// Live nodes are copied in registry order with fresh (`Idle`) state and
/// rewired through an old-to-new id table. The local blackboard is copied, the
/// shared blackboard handle is aliased, and the trace sink is not carried
/// over. The copy is unbound.
impl Clone for Tree {
    fn clone(&self) -> Self {
        let mut nodes = NodeArena::default();
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(self.nodes.len());
        for (old, node) in self.nodes.iter() {
            if let Some(copy) = node.duplicate() {
                remap.insert(old, nodes.insert(copy));
            }
        }

        let lookup = |id: NodeId| remap.get(&id).copied().unwrap_or(NodeId::DANGLING);
        for (&old, &new) in &remap {
            let edges: Vec<NodeId> = self.children(old).iter().map(|&c| lookup(c)).collect();
            if let Some(node) = nodes.get_mut(new) {
                *node.children_mut() = edges;
            }
        }

        Self {
            name: self.name.clone(),
            root: lookup(self.root),
            nodes,
            blackboard: self.blackboard.clone(),
            shared: self.shared.clone(),
            clock: TickContext::default(),
            bound: false,
            trace: None,
        }
    }
}

/// Nodes still running when a bound instance goes away are aborted, so every
/// started activation sees its `on_stop`.
impl Drop for Tree {
    fn drop(&mut self) {
        self.abort();
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("bound", &self.bound)
            .field("clock", &self.clock)
            .field("blackboard", &self.blackboard)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}
