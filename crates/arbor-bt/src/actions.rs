use core::fmt;
use std::sync::Arc;

use arbor_core::{BlackboardValue, ExecutionContext, NodeProperty};

use crate::arena::Children;
use crate::bt::{Behaviour, NodeKind, State};
use crate::tree::Tree;

/// Succeeds once `duration` simulated seconds have passed since the tick that
/// started the activation.
#[derive(Debug, Clone)]
pub struct Wait {
    pub duration: NodeProperty<f32>,
    started_at: f64,
}

impl Wait {
    pub fn new(duration: impl Into<NodeProperty<f32>>) -> Self {
        Self {
            duration: duration.into(),
            started_at: 0.0,
        }
    }
}

impl Default for Wait {
    fn default() -> Self {
        Self::new(NodeProperty::Value(1.0))
    }
}

impl Behaviour for Wait {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "Wait"
    }

    fn on_start(&mut self, ctx: &mut ExecutionContext<'_>) {
        self.started_at = ctx.tick.time_seconds;
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        let duration = match self.duration.resolve(ctx) {
            Ok(duration) => duration,
            Err(err) => {
                tracing::warn!(node = "Wait", error = %err, "wait duration unavailable");
                return State::Failure;
            }
        };

        if ctx.tick.time_seconds - self.started_at >= f64::from(duration) {
            State::Success
        } else {
            State::Running
        }
    }
}

/// Runs another tree as a single action.
///
/// The template is cloned into a private instance when the owning tree is
/// bound. The instance keeps its own blackboard and sees the parent's shared
/// blackboard (or its template's, when the parent has none).
pub struct SubTree {
    template: Option<Arc<Tree>>,
    instance: Option<Tree>,
}

impl SubTree {
    pub fn new(template: Arc<Tree>) -> Self {
        Self {
            template: Some(template),
            instance: None,
        }
    }

    /// A sub-tree without a template; it fails every tick.
    pub fn unbound() -> Self {
        Self {
            template: None,
            instance: None,
        }
    }

    pub fn template(&self) -> Option<&Arc<Tree>> {
        self.template.as_ref()
    }

    pub fn instance(&self) -> Option<&Tree> {
        self.instance.as_ref()
    }
}

// Instances are per-owner; a copy starts without one and builds its own in `init`.
impl Clone for SubTree {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            instance: None,
        }
    }
}

impl fmt::Debug for SubTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubTree")
            .field("template", &self.template.as_ref().map(|t| t.name()))
            .field("bound", &self.instance.is_some())
            .finish()
    }
}

impl Behaviour for SubTree {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "SubTree"
    }

    fn init(&mut self, ctx: &mut ExecutionContext<'_>) {
        self.instance = None;
        let Some(template) = self.template.as_deref() else {
            tracing::warn!("sub-tree has no template; it will fail when ticked");
            return;
        };

        let mut instance = template.clone();
        match instance.bind_shared(ctx.shared().cloned()) {
            Ok(()) => self.instance = Some(instance),
            Err(err) => {
                tracing::warn!(tree = template.name(), error = %err, "sub-tree template failed to bind");
            }
        }
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        let dt = ctx.tick.dt_seconds;
        match self.instance.as_mut() {
            Some(instance) => instance.tick_with(dt, ctx.trace_sink()),
            None => State::Failure,
        }
    }

    fn on_stop(&mut self, ctx: &mut ExecutionContext<'_>) {
        if let Some(instance) = self.instance.as_mut() {
            instance.abort_with(ctx.trace_sink());
        }
    }
}

/// Writes `message` to the log and succeeds.
#[derive(Debug, Clone, Default)]
pub struct Log {
    pub message: String,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Behaviour for Log {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "Log"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        tracing::info!(tick = ctx.tick.tick, "{}", self.message);
        State::Success
    }
}

/// Assigns `value` to the blackboard key `key`.
#[derive(Debug, Clone)]
pub struct SetProperty {
    pub key: String,
    pub value: NodeProperty<BlackboardValue>,
}

impl SetProperty {
    pub fn new(key: impl Into<String>, value: impl Into<NodeProperty<BlackboardValue>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Behaviour for SetProperty {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "SetProperty"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        let result = self
            .value
            .resolve_value(ctx)
            .and_then(|value| ctx.set_value(&self.key, value));
        match result {
            Ok(()) => State::Success,
            Err(err) => {
                tracing::warn!(node = "SetProperty", key = %self.key, error = %err, "blackboard write failed");
                State::Failure
            }
        }
    }
}

/// Succeeds when the key `key` currently holds `value`.
#[derive(Debug, Clone)]
pub struct CompareProperty {
    pub key: String,
    pub value: NodeProperty<BlackboardValue>,
}

impl CompareProperty {
    pub fn new(key: impl Into<String>, value: impl Into<NodeProperty<BlackboardValue>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Behaviour for CompareProperty {
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "CompareProperty"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        let result = ctx.value(&self.key).and_then(|current| {
            self.value
                .resolve_value(ctx)
                .map(|expected| current == expected)
        });
        match result {
            Ok(equal) => State::from_bool(equal),
            Err(err) => {
                tracing::warn!(node = "CompareProperty", key = %self.key, error = %err, "blackboard read failed");
                State::Failure
            }
        }
    }
}

/// Host-supplied predicate over the execution context.
#[derive(Clone)]
pub struct Condition<F> {
    predicate: F,
}

impl<F> Condition<F>
where
    F: Fn(&ExecutionContext<'_>) -> bool + Clone + Send + Sync + 'static,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> fmt::Debug for Condition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").finish_non_exhaustive()
    }
}

impl<F> Behaviour for Condition<F>
where
    F: Fn(&ExecutionContext<'_>) -> bool + Clone + Send + Sync + 'static,
{
    fn kind(&self) -> NodeKind {
        NodeKind::Action
    }

    fn type_name(&self) -> &'static str {
        "Condition"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, _children: &mut Children<'_>) -> State {
        State::from_bool((self.predicate)(ctx))
    }
}
