//! Reference tracing and cycle collection for propcache runtime objects.
//!
//! Runtime objects are reference counted with `Arc`. This crate supplies the
//! pieces a host runtime's cycle collector needs on top of that:
//!
//! - [`Trace`]: traversal and clear hooks implemented by container objects
//! - [`Collector`]: trial-deletion collector over weakly tracked objects
//! - [`GcConfig`]: allocation thresholds that mark a collection as due

#![warn(clippy::all)]

pub mod collector;
pub mod trace;

pub use collector::{CollectionStats, Collector, GcConfig, global, track};
pub use trace::{RecordingTracer, Trace, Tracer};
