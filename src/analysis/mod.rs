//! Duplication analysis for singlescope.
//!
//! Takes the per-consumer [`ResolutionRecord`]s of a scan and decides whether
//! the workspace is bound to one physical copy of the target package or to
//! several.
//!
//! # Severity tiers
//!
//! - `none`: zero or one distinct real path
//! - `warning`: exactly two copies declaring the same version
//! - `error`: two copies with different or unknown versions, or three or more

pub mod duplication;

// Re-export main types for convenience
pub use duplication::{analyze, Analysis, DuplicationGroup, ResolutionRecord, Severity};
