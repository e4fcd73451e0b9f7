//! Version introspection for resolved package files.

use std::path::Path;

use tracing::{trace, warn};

use crate::parser::{read_manifest, MANIFEST_FILE};

/// Returns the version declared by the package that owns `resolved`.
///
/// Walks up from the file's directory to the nearest manifest that
/// describes a package, examining at most `max_depth + 1` directories.
/// Manifests without `name` or `version` (module-type markers inside build
/// output) are skipped. A malformed manifest yields `None`.
pub fn version_of(resolved: &Path, max_depth: usize) -> Option<String> {
    let mut current = resolved.parent();
    for _ in 0..=max_depth {
        let dir = current?;
        match read_manifest(dir) {
            Some(Ok(manifest)) if manifest.is_package_manifest() => return manifest.version,
            Some(Ok(_)) => trace!(dir = %dir.display(), "skipping marker manifest"),
            Some(Err(err)) => {
                warn!(
                    manifest = %dir.join(MANIFEST_FILE).display(),
                    error = %err,
                    "malformed manifest, version unknown"
                );
                return None;
            }
            None => {}
        }
        current = dir.parent();
    }
    None
}
