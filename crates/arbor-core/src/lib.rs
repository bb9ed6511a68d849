//! Blackboard, execution context and tick primitives for the arbor behavior tree runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod context;
pub mod error;
pub mod property;
pub mod tick;
pub mod value;

pub use blackboard::{Blackboard, BlackboardKey, BlackboardScope, SharedBlackboard};
pub use context::ExecutionContext;
pub use error::BlackboardError;
pub use property::NodeProperty;
pub use tick::TickContext;
pub use value::{BlackboardType, BlackboardValue, KeyType, ObjectRef, Vec2, Vec3};
