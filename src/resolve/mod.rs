//! Resolution of the target package from a consumer's point of view.
//!
//! - [`Resolver`] finds the real file an import of the package would load.
//! - [`version_of`] reads the declared version of the copy that file belongs to.
//!
//! Both walk up the directory tree and both are bounded by an explicit depth,
//! so symlink cycles end in a resolution failure rather than a hang.

pub mod resolver;
pub mod version;

pub use resolver::{
    ResolutionFailure, ResolveCache, ResolveResult, Resolver, DEFAULT_CONDITIONS,
    DEFAULT_MAX_DEPTH,
};
pub use version::version_of;
