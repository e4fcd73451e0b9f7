//! Workspace discovery.
//!
//! Produces the ordered list of [`Consumer`]s a scan checks: the members of
//! each workspace area, followed by any copies of the target package found
//! by sweeping the package store directly.

mod store;
mod walker;

pub use store::{StoreLayout, NAME_PLACEHOLDER};
pub use walker::{
    enumerate_consumers, workspace_areas, Consumer, ConsumerKind, WalkError, WalkResult,
    DEFAULT_AREAS,
};
