use std::mem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bt::State;
use crate::error::Result;
use crate::tree::Tree;

/// How often a host ticks one agent's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    pub tick_every: u32,
    pub tick_offset: u32,
    /// Keep ticking after the tree reports `Success` or `Failure`.
    pub restart_on_completion: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick_every: 1,
            tick_offset: 0,
            restart_on_completion: true,
        }
    }
}

impl AgentConfig {
    /// Tick every `tick_every` frames, with the phase derived from `id` so a
    /// crowd of agents spreads evenly over frames.
    pub fn deterministic(id: u64, tick_every: u32) -> Self {
        let every = tick_every.max(1);
        let offset = (id % u64::from(every)) as u32;
        Self {
            tick_every: every,
            tick_offset: offset,
            ..Self::default()
        }
    }

    pub fn should_tick(&self, frame: u64) -> bool {
        let every = u64::from(self.tick_every.max(1));
        (frame + u64::from(self.tick_offset)) % every == 0
    }
}

/// One bound tree instance driven by a host loop.
#[derive(Debug)]
pub struct Agent {
    pub id: u64,
    pub config: AgentConfig,
    tree: Tree,
    pending_dt: f32,
    last: State,
}

impl Agent {
    /// Wrap `tree`, binding it first if needed.
    pub fn new(id: u64, mut tree: Tree) -> Result<Self> {
        if !tree.is_bound() {
            tree.bind()?;
        }
        Ok(Self {
            id,
            config: AgentConfig::default(),
            tree,
            pending_dt: 0.0,
            last: State::Idle,
        })
    }

    pub fn from_template(id: u64, template: &Tree) -> Result<Self> {
        Self::new(id, template.instantiate()?)
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Advance one host frame. Time from skipped frames is delivered on the
    /// next frame that ticks.
    pub fn tick(&mut self, frame: u64, dt_seconds: f32) -> State {
        if self.is_finished() {
            return self.last;
        }
        self.pending_dt += dt_seconds;
        if !self.config.should_tick(frame) {
            return self.last;
        }

        let dt = mem::take(&mut self.pending_dt);
        self.last = self.tree.tick(dt);
        self.last
    }

    pub fn last_state(&self) -> State {
        self.last
    }

    /// The tree completed and this agent does not restart it.
    pub fn is_finished(&self) -> bool {
        self.last.is_terminal() && !self.config.restart_on_completion
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }
}

/// Tick every agent once, in stable id order.
pub fn tick_agents(frame: u64, dt_seconds: f32, agents: &mut [Agent]) {
    agents.sort_by_key(|agent| agent.id);
    for agent in agents.iter_mut() {
        agent.tick(frame, dt_seconds);
    }
}
