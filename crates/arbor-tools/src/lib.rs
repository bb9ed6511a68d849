//! Tick tracing primitives for the arbor behavior tree runtime.
//!
//! Trees write events into a [`TraceSink`]; turning them into timelines or
//! inspectors is left to host tooling.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, SharedTraceLog, TraceEvent, TraceLog, TraceSink, VecTraceSink};
