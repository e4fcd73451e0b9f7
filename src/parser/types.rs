//! Shared types for manifest parsing.
//!
//! This module defines the subset of `package.json` that module resolution
//! and version introspection need.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Represents the structure of a package.json file.
///
/// Only the fields that influence where a package is loaded from, and what
/// it reports as its version, are captured. Everything else is ignored.
///
/// # Example
///
/// ```
/// use singlescope::parser::types::PackageJson;
///
/// let json = r#"{"name": "yjs", "version": "13.6.8", "main": "./dist/yjs.cjs"}"#;
/// let pkg: PackageJson = serde_json::from_str(json).unwrap();
/// assert_eq!(pkg.name.as_deref(), Some("yjs"));
/// assert_eq!(pkg.main.as_deref(), Some("./dist/yjs.cjs"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageJson {
    /// The name of the package.
    pub name: Option<String>,

    /// The declared version of the package.
    pub version: Option<String>,

    /// Legacy entry point, relative to the package directory.
    pub main: Option<String>,

    /// Conditional exports map, kept as raw JSON because its shape varies
    /// (string, subpath object, or nested conditions).
    pub exports: Option<Value>,

    /// Workspace member patterns declared by a workspace root.
    ///
    /// Read leniently: a malformed value never fails the whole manifest.
    #[serde(default, deserialize_with = "lenient_workspaces")]
    pub workspaces: Option<WorkspaceSpec>,
}

impl PackageJson {
    /// Returns true if the manifest identifies a package.
    ///
    /// Build tools drop bare `{"type": "module"}` manifests into output
    /// folders; those carry neither field and do not describe a package.
    pub fn is_package_manifest(&self) -> bool {
        self.name.is_some() || self.version.is_some()
    }

    /// Returns the workspace patterns declared by this manifest, if any.
    pub fn workspace_patterns(&self) -> &[String] {
        self.workspaces
            .as_ref()
            .map(WorkspaceSpec::patterns)
            .unwrap_or_default()
    }
}

/// The two shapes the `workspaces` field takes in the wild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WorkspaceSpec {
    /// `"workspaces": ["apps/*", "packages/*"]`
    Array(Vec<String>),
    /// `"workspaces": { "packages": ["apps/*"] }`
    Object { packages: Vec<String> },
}

impl WorkspaceSpec {
    /// Reads either shape from raw JSON, keeping only string patterns.
    ///
    /// Returns `None` for values that are neither an array nor an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        fn strings(items: &[Value]) -> Vec<String> {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        }

        match value {
            Value::Array(items) => Some(WorkspaceSpec::Array(strings(items))),
            Value::Object(map) => Some(WorkspaceSpec::Object {
                packages: map
                    .get("packages")
                    .and_then(Value::as_array)
                    .map(|items| strings(items))
                    .unwrap_or_default(),
            }),
            _ => None,
        }
    }

    /// Returns the member patterns regardless of shape.
    pub fn patterns(&self) -> &[String] {
        match self {
            WorkspaceSpec::Array(patterns) => patterns,
            WorkspaceSpec::Object { packages } => packages,
        }
    }
}

fn lenient_workspaces<'de, D>(deserializer: D) -> Result<Option<WorkspaceSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(WorkspaceSpec::from_value))
}
