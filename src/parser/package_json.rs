//! Parser for npm package.json files.
//!
//! Manifests are read in two places: when choosing a package's entry point
//! and when reading back the version of a resolved copy. Both treat a parse
//! failure as recoverable, so callers get a typed error and decide.

use std::fs;
use std::path::Path;

use super::types::PackageJson;

/// The manifest file name looked up in every package directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Errors that can occur during package.json parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a package.json file from a file path.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use singlescope::parser::package_json::parse_file;
///
/// let pkg = parse_file(Path::new("package.json")).unwrap();
/// println!("Package: {:?}", pkg.name);
/// ```
pub fn parse_file(path: &Path) -> ParseResult<PackageJson> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a package.json from a string.
///
/// # Example
///
/// ```
/// use singlescope::parser::package_json::parse_str;
///
/// let json = r#"{"name": "my-app", "version": "1.0.0"}"#;
/// let pkg = parse_str(json).unwrap();
/// assert_eq!(pkg.name, Some("my-app".to_string()));
/// ```
pub fn parse_str(content: &str) -> ParseResult<PackageJson> {
    // editors on Windows like to save manifests with a byte order mark
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let pkg: PackageJson = serde_json::from_str(content)?;
    Ok(pkg)
}

/// Reads the manifest in `dir`, if one exists.
///
/// Returns `None` when the directory has no manifest at all, and
/// `Some(Err(_))` when a manifest exists but cannot be read or parsed.
pub fn read_manifest(dir: &Path) -> Option<ParseResult<PackageJson>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return None;
    }
    Some(parse_file(&path))
}

/// Returns the declared `name` of the package in `dir`, if readable.
pub fn package_name(dir: &Path) -> Option<String> {
    read_manifest(dir)?.ok()?.name
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_PACKAGE_JSON: &str = r#"{
        "name": "yjs",
        "version": "13.6.8",
        "description": "Shared Editing Library",
        "main": "./dist/yjs.cjs",
        "module": "./dist/yjs.mjs",
        "exports": {
            ".": {
                "types": "./dist/src/index.d.ts",
                "import": "./dist/yjs.mjs",
                "require": "./dist/yjs.cjs"
            },
            "./package.json": "./package.json"
        },
        "dependencies": {
            "lib0": "^0.2.74"
        }
    }"#;

    #[test]
    fn test_parse_str_valid() {
        let pkg = parse_str(SAMPLE_PACKAGE_JSON).unwrap();

        assert_eq!(pkg.name, Some("yjs".to_string()));
        assert_eq!(pkg.version, Some("13.6.8".to_string()));
        assert_eq!(pkg.main, Some("./dist/yjs.cjs".to_string()));
        assert!(pkg.exports.is_some());
    }

    #[test]
    fn test_parse_str_empty_object() {
        let pkg = parse_str("{}").unwrap();

        assert!(pkg.name.is_none());
        assert!(pkg.version.is_none());
        assert!(pkg.exports.is_none());
    }

    #[test]
    fn test_parse_str_invalid_json() {
        let result = parse_str("{ invalid json }");

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ParseError::JsonError(_)));
    }

    #[test]
    fn test_parse_str_wrong_field_type() {
        // A numeric version is malformed for our purposes
        let result = parse_str(r#"{"name": "x", "version": 13}"#);
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn test_parse_str_with_byte_order_mark() {
        let pkg = parse_str("\u{feff}{\"name\": \"yjs\", \"main\": \"./dist/yjs.cjs\"}").unwrap();

        assert_eq!(pkg.name.as_deref(), Some("yjs"));
        assert_eq!(pkg.main.as_deref(), Some("./dist/yjs.cjs"));
    }

    #[test]
    fn test_read_manifest_with_byte_order_mark_and_odd_workspaces() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            b"\xef\xbb\xbf{\"name\": \"root\", \"workspaces\": [\"apps/*\", {\"path\": 1}]}",
        )
        .unwrap();

        let pkg = read_manifest(dir.path()).unwrap().unwrap();
        assert_eq!(pkg.name.as_deref(), Some("root"));
        assert_eq!(pkg.workspace_patterns(), ["apps/*"]);
    }

    #[test]
    fn test_read_manifest_missing() {
        let dir = TempDir::new().unwrap();
        assert!(read_manifest(dir.path()).is_none());
    }

    #[test]
    fn test_read_manifest_present_and_broken() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();

        let result = read_manifest(dir.path()).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_package_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), r#"{"name": "@app/web"}"#).unwrap();

        assert_eq!(package_name(dir.path()), Some("@app/web".to_string()));
    }

    #[test]
    fn test_parse_error_display() {
        let io_err = ParseError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(io_err.to_string().contains("Failed to read file"));

        let json_err = parse_str("[").unwrap_err();
        assert!(json_err.to_string().contains("Failed to parse JSON"));
    }
}
