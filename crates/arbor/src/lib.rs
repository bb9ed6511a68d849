//! Umbrella crate that re-exports the `arbor-*` building blocks.
//!
//! Hosts that only need the runtime can depend on this crate and reach
//! everything through [`prelude`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use arbor_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use arbor_tools as tools;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use arbor_bt as bt;

/// The types most hosts touch: trees, nodes, blackboards and tracing.
#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub mod prelude {
    pub use arbor_bt::{
        tick_agents, Agent, AgentConfig, Behaviour, Children, NodeId, NodeKind, NodeRegistry,
        State, Tree, TreeError, TreeLibrary,
    };
    #[cfg(feature = "serde")]
    pub use arbor_bt::TreeAsset;
    pub use arbor_core::{
        Blackboard, BlackboardScope, ExecutionContext, KeyType, NodeProperty, SharedBlackboard,
        Vec2, Vec3,
    };
    pub use arbor_tools::{SharedTraceLog, TraceEvent, TraceSink};
}
