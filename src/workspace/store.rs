//! Direct sweep of a content-addressed package store.
//!
//! Import resolution only finds copies that some consumer actually reaches.
//! Stores such as pnpm's `node_modules/.pnpm` keep every installed copy under
//! an entry named after the package and its version, so listing the store
//! also surfaces copies nothing resolves to, e.g. leftovers of a partial
//! install.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::walker::Consumer;
use crate::parser::package_name;

/// Placeholder replaced by the encoded package name in entry prefixes.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Naming convention of a package store.
///
/// The default matches pnpm: entries live in `node_modules/.pnpm`, are named
/// `<name>@<version>[_<peer suffix>]`, encode scoped names with `+` instead
/// of `/`, and hold the package itself at `node_modules/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    /// Store directory, relative to the workspace root.
    pub dir: PathBuf,
    /// Entry name prefix; `{name}` is replaced by the encoded package name.
    pub entry_prefix: String,
    /// Replaces `/` in scoped package names.
    pub scope_separator: char,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("node_modules/.pnpm"),
            entry_prefix: format!("{NAME_PLACEHOLDER}@"),
            scope_separator: '+',
        }
    }
}

impl StoreLayout {
    /// Returns the prefix a store entry for `package` starts with.
    ///
    /// ```
    /// use singlescope::workspace::StoreLayout;
    ///
    /// let layout = StoreLayout::default();
    /// assert_eq!(layout.entry_prefix_for("yjs"), "yjs@");
    /// assert_eq!(layout.entry_prefix_for("@scope/crdt"), "@scope+crdt@");
    /// ```
    pub fn entry_prefix_for(&self, package: &str) -> String {
        let encoded = package.replace('/', &self.scope_separator.to_string());
        self.entry_prefix.replace(NAME_PLACEHOLDER, &encoded)
    }

    /// Location of the package inside a store entry.
    fn package_dir(entry: &Path, package: &str) -> PathBuf {
        entry.join("node_modules").join(package)
    }

    /// Lists every installed copy of `package` in the store under `root`.
    ///
    /// A missing store, an unreadable entry, or a convention that matches
    /// nothing all yield fewer findings, never an error.
    pub fn sweep(&self, root: &Path, package: &str) -> Vec<Consumer> {
        let store = root.join(&self.dir);
        if !store.is_dir() {
            debug!(store = %store.display(), "no package store, skipping sweep");
            return Vec::new();
        }

        let prefix = self.entry_prefix_for(package);
        let mut copies = Vec::new();
        for entry in WalkDir::new(&store)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(store = %store.display(), error = %err, "unreadable store entry");
                    continue;
                }
            };

            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }

            let copy = Self::package_dir(entry.path(), package);
            if copy.is_dir() {
                let name = package_name(&copy);
                copies.push(Consumer::store_copy(copy, name));
            }
        }

        debug!(store = %store.display(), prefix = %prefix, count = copies.len(), "swept package store");
        copies
    }
}
