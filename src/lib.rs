//! # Typewriter
//!
//! A cancellation-safe typewriter engine for progressively revealing
//! hierarchical content trees.
//!
//! Typewriter flattens an arbitrary content tree into an ordered
//! execution plan and reveals it over time: text token by token, opaque
//! nodes instantly, and nested sub-streams to completion before the
//! enclosing stream resumes.
//!
//! ## Core Concepts
//!
//! - **Plan**: pre-order flattening of the tree into text / instant /
//!   nested units
//! - **Signature**: structural fingerprint that gates restarts, immune to
//!   node-identity churn
//! - **Run token**: monotonic fence that cancels every stale scheduled
//!   step at once
//! - **Pure state machine**: deterministic transitions, with all timer
//!   effects kept in the orchestrator
//!
//! ## Example
//!
//! ```rust,ignore
//! use typewriter::{Node, StreamOptions, Typewriter};
//!
//! let mut tw = Typewriter::new(StreamOptions::default());
//! tw.sync(&Node::text("Hello, world!"));
//!
//! while !tw.is_complete() {
//!     tw.pump();
//!     // sleep until tw.next_due(), render tw.rendered_text()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod content;
pub mod engine;
pub mod options;
pub mod plan;
pub mod schedule;
pub mod state;

// Re-exports for convenience
pub use content::{
    CapabilityMarker, ComponentId, ComponentRef, Element, Node, STREAM_CAPABILITY,
    STREAM_COMPONENT_NAME,
};
pub use engine::{tokenize, StreamFlags, Typewriter};
pub use options::{CompletionHook, InstanceId, StreamBy, StreamOptions};
pub use plan::{ExecutionUnit, Plan, Signature, UnitKind};
pub use schedule::Scheduler;
pub use state::{Action, Rendered, StreamState, TextProgress};
