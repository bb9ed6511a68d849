use arbor_core::{ExecutionContext, NodeProperty};

use crate::arena::Children;
use crate::bt::{Behaviour, NodeKind, State};

/// Entry point of every tree. Forwards to its single child.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootNode;

impl Behaviour for RootNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Root
    }

    fn type_name(&self) -> &'static str {
        "Root"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        children.update(0, ctx)
    }
}

/// Runs children in order until one fails.
///
/// Resumes at the child that was running on the previous tick instead of
/// re-evaluating earlier siblings. The resume index is reset when a new
/// activation starts.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    current: usize,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }
}

impl Behaviour for Sequencer {
    fn kind(&self) -> NodeKind {
        NodeKind::Composite
    }

    fn type_name(&self) -> &'static str {
        "Sequencer"
    }

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.current = 0;
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        while self.current < children.len() {
            match children.update(self.current, ctx) {
                State::Running => return State::Running,
                State::Failure => return State::Failure,
                State::Success | State::Idle => self.current += 1,
            }
        }
        State::Success
    }
}

/// Runs children in order until one succeeds. Resumes like [`Sequencer`].
#[derive(Debug, Clone, Default)]
pub struct Selector {
    current: usize,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }
}

impl Behaviour for Selector {
    fn kind(&self) -> NodeKind {
        NodeKind::Composite
    }

    fn type_name(&self) -> &'static str {
        "Selector"
    }

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.current = 0;
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        while self.current < children.len() {
            match children.update(self.current, ctx) {
                State::Running => return State::Running,
                State::Success => return State::Success,
                State::Failure | State::Idle => self.current += 1,
            }
        }
        State::Failure
    }
}

/// Selector that re-checks higher-priority children every tick.
///
/// When an earlier child starts running or finishes, the lower-priority child
/// that was running is aborted.
#[derive(Debug, Clone, Default)]
pub struct InterruptSelector {
    running: Option<usize>,
}

impl InterruptSelector {
    pub fn new() -> Self {
        Self::default()
    }

    fn abort_running_except(
        &mut self,
        keep: usize,
        ctx: &mut ExecutionContext<'_>,
        children: &mut Children<'_>,
    ) {
        if let Some(prev) = self.running.take() {
            if prev != keep {
                children.abort(prev, ctx);
            }
        }
    }
}

impl Behaviour for InterruptSelector {
    fn kind(&self) -> NodeKind {
        NodeKind::Composite
    }

    fn type_name(&self) -> &'static str {
        "InterruptSelector"
    }

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.running = None;
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        for i in 0..children.len() {
            match children.update(i, ctx) {
                State::Failure | State::Idle => continue,
                State::Success => {
                    self.abort_running_except(i, ctx, children);
                    return State::Success;
                }
                State::Running => {
                    if self.running != Some(i) {
                        self.abort_running_except(i, ctx, children);
                        self.running = Some(i);
                    }
                    return State::Running;
                }
            }
        }

        self.running = None;
        State::Failure
    }
}

/// Ticks every unfinished child each tick.
///
/// Fails as soon as any child fails (aborting the others); succeeds once every
/// child has succeeded.
#[derive(Debug, Clone, Default)]
pub struct Parallel {
    results: Vec<State>,
}

impl Parallel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Behaviour for Parallel {
    fn kind(&self) -> NodeKind {
        NodeKind::Composite
    }

    fn type_name(&self) -> &'static str {
        "Parallel"
    }

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.results.clear();
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        if self.results.len() != children.len() {
            self.results = vec![State::Running; children.len()];
        }

        let mut still_running = 0usize;
        for i in 0..children.len() {
            if self.results[i] != State::Running {
                continue;
            }
            let state = children.update(i, ctx);
            match state {
                State::Failure | State::Idle => {
                    children.abort_all(ctx);
                    return State::Failure;
                }
                State::Running => still_running += 1,
                State::Success => {}
            }
            self.results[i] = state;
        }

        if still_running > 0 {
            State::Running
        } else {
            State::Success
        }
    }
}

/// Swaps `Success` and `Failure` of its child.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverter;

impl Behaviour for Inverter {
    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }

    fn type_name(&self) -> &'static str {
        "Inverter"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        if children.is_empty() {
            return State::Failure;
        }
        match children.update(0, ctx) {
            State::Success => State::Failure,
            State::Failure | State::Idle => State::Success,
            State::Running => State::Running,
        }
    }
}

/// Reports `Success` whenever its child finishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Succeed;

impl Behaviour for Succeed {
    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }

    fn type_name(&self) -> &'static str {
        "Succeed"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        if children.is_empty() {
            return State::Failure;
        }
        match children.update(0, ctx) {
            State::Running => State::Running,
            _ => State::Success,
        }
    }
}

/// Reports `Failure` whenever its child finishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fail;

impl Behaviour for Fail {
    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }

    fn type_name(&self) -> &'static str {
        "Fail"
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        match children.update(0, ctx) {
            State::Running => State::Running,
            _ => State::Failure,
        }
    }
}

/// Restarts its child when it finishes.
///
/// With `max_repeats == 0` the loop never ends on a restarting outcome; a
/// non-restarting outcome always ends it.
#[derive(Debug, Clone)]
pub struct Repeat {
    pub restart_on_success: bool,
    pub restart_on_failure: bool,
    pub max_repeats: u32,
    iterations: u32,
}

impl Repeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forever() -> Self {
        Self {
            restart_on_failure: true,
            ..Self::default()
        }
    }

    pub fn times(max_repeats: u32) -> Self {
        Self {
            max_repeats,
            ..Self::default()
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn repeat(&mut self, outcome: State) -> State {
        self.iterations = self.iterations.saturating_add(1);
        if self.max_repeats > 0 && self.iterations >= self.max_repeats {
            outcome
        } else {
            State::Running
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Self {
            restart_on_success: true,
            restart_on_failure: false,
            max_repeats: 0,
            iterations: 0,
        }
    }
}

impl Behaviour for Repeat {
    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }

    fn type_name(&self) -> &'static str {
        "Repeat"
    }

    fn on_start(&mut self, _ctx: &mut ExecutionContext<'_>) {
        self.iterations = 0;
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        if children.is_empty() {
            return State::Failure;
        }
        match children.update(0, ctx) {
            State::Running => State::Running,
            State::Success if self.restart_on_success => self.repeat(State::Success),
            State::Success => State::Success,
            State::Failure | State::Idle if self.restart_on_failure => self.repeat(State::Failure),
            State::Failure | State::Idle => State::Failure,
        }
    }
}

/// Fails (aborting its child) once the activation has lasted `duration` seconds.
#[derive(Debug, Clone)]
pub struct Timeout {
    pub duration: NodeProperty<f32>,
    started_at: f64,
}

impl Timeout {
    pub fn new(duration: impl Into<NodeProperty<f32>>) -> Self {
        Self {
            duration: duration.into(),
            started_at: 0.0,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::new(NodeProperty::Value(1.0))
    }
}

impl Behaviour for Timeout {
    fn kind(&self) -> NodeKind {
        NodeKind::Decorator
    }

    fn type_name(&self) -> &'static str {
        "Timeout"
    }

    fn on_start(&mut self, ctx: &mut ExecutionContext<'_>) {
        self.started_at = ctx.tick.time_seconds;
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext<'_>, children: &mut Children<'_>) -> State {
        let duration = match self.duration.resolve(ctx) {
            Ok(duration) => duration,
            Err(err) => {
                tracing::warn!(node = self.type_name(), error = %err, "timeout duration unavailable");
                return State::Failure;
            }
        };

        if ctx.tick.time_seconds - self.started_at >= f64::from(duration) {
            return State::Failure;
        }
        children.update(0, ctx)
    }
}
