#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};

use arbor_bt::{Behaviour, Children, NodeId, NodeKind, State, Tree};
use arbor_core::ExecutionContext;

/// Lifecycle log shared by every clone of the behaviours that write to it.
#[derive(Debug, Clone, Default)]
pub struct Probe(Arc<Mutex<Vec<String>>>);

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

/// Action that returns the next scripted state on every update (the last one
/// repeats) and records `name:start`, `name:update` and `name:stop`.
#[derive(Debug, Clone)]
pub struct Script {
    name: &'static str,
    steps: Vec<State>,
    cursor: usize,
    probe: Probe,
}

impl Script {
    pub fn new(probe: &Probe, name: &'static str, steps: &[State]) -> Self {
        Self {
            name,
            steps: steps.to_vec(),
            cursor: 0,
            probe: probe.clone(),
        }
    }

    pub fn boxed(probe: &Probe, name: &'static str, steps: &[State]) -> Box<dyn Behaviour> {
        Box::new(Self::new(probe, name, steps))
    }
}

impl Behaviour for Script {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "Script"
    }

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.probe.record(format!("{}:start", self.name));
    }

    fn on_update(&mut self, _ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        self.probe.record(format!("{}:update", self.name));
        let index = self.cursor.min(self.steps.len().saturating_sub(1));
        self.cursor += 1;
        self.steps.get(index).copied().unwrap_or(State::Failure)
    }

    fn on_stop(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.probe.record(format!("{}:stop", self.name));
    }
}

/// Template with `behaviour` as the root's only child.
pub fn single(behaviour: Box<dyn Behaviour>) -> (Tree, NodeId) {
    let mut tree = Tree::new("single");
    let root = tree.root();
    let id = tree.attach(root, behaviour).unwrap();
    (tree, id)
}

/// Template with `parent` under the root and `children` under it, in order.
pub fn with_children(parent: Box<dyn Behaviour>, children: Vec<Box<dyn Behaviour>>) -> (Tree, NodeId) {
    let (mut tree, parent) = single(parent);
    for child in children {
        tree.attach(parent, child).unwrap();
    }
    (tree, parent)
}

pub fn tick_n(tree: &mut Tree, dt: f32, n: usize) -> Vec<State> {
    (0..n).map(|_| tree.tick(dt)).collect()
}
