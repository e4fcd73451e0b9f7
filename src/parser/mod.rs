//! Parser module for singlescope.
//!
//! Reads npm `package.json` manifests into a typed, lenient model. Only the
//! fields that affect module resolution, version reporting and workspace
//! discovery are kept.
//!
//! # Example
//!
//! ```
//! use singlescope::parser::parse_str;
//!
//! let pkg = parse_str(r#"{"name": "yjs", "version": "13.6.8"}"#).unwrap();
//! assert_eq!(pkg.version.as_deref(), Some("13.6.8"));
//! ```

pub mod package_json;
pub mod types;

// Re-export commonly used types for convenience
pub use package_json::{
    package_name, parse_file, parse_str, read_manifest, ParseError, ParseResult, MANIFEST_FILE,
};

pub use types::{PackageJson, WorkspaceSpec};
