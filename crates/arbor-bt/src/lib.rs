//! Behavior tree runtime built on `arbor-core`.
//!
//! Trees are authored as templates, instantiated per agent and ticked by the
//! host. See [`Tree`] for the instancing model and [`Behaviour`] for the node
//! lifecycle.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actions;
pub mod arena;
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod asset;
pub mod bt;
pub mod error;
pub mod library;
pub mod nodes;
pub mod registry;
pub mod runner;
pub mod tree;

pub use actions::{CompareProperty, Condition, Log, SetProperty, SubTree, Wait};
pub use arena::{Children, Node, NodeId, TRACE_NODE_ABORT, TRACE_NODE_START, TRACE_NODE_STOP};
#[cfg(feature = "serde")]
pub use asset::{AssetError, NodeAsset, TreeAsset};
pub use bt::{Behaviour, BehaviourClone, NodeKind, State};
pub use error::{StructuralError, TreeError};
pub use library::TreeLibrary;
pub use nodes::{
    Fail, InterruptSelector, Inverter, Parallel, Repeat, RootNode, Selector, Sequencer, Succeed,
    Timeout,
};
pub use registry::{NodeArgs, NodeFactory, NodeProperties, NodeRegistry};
pub use runner::{tick_agents, Agent, AgentConfig};
pub use tree::{Tree, TRACE_TREE_TICK};
