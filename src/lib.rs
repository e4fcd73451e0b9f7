//! singlescope - detects workspaces bound to more than one installed copy of
//! a singleton npm dependency
//!
//! Libraries that rely on identity checks and module-level state (CRDT
//! document libraries such as `yjs`) break silently when two copies get
//! loaded. This crate resolves the package from every workspace member the
//! way Node would, groups the results by real path, and reports how many
//! physical copies are in use.

pub mod analysis;
pub mod export;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod workspace;
