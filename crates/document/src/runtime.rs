//! Locating and loading the Mermaid browser runtime.
//!
//! The runtime is inlined into every assembled page so that the page renders
//! its own diagrams without any network access. It is too large (and moves
//! too fast) to embed at compile time, so it is looked up on disk instead.

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Relative locations checked beneath every search root, in order.
const CANDIDATES: [&str; 2] = ["node_modules/mermaid/dist/mermaid.min.js", "mermaid.min.js"];

/// The full script text of the Mermaid runtime.
#[derive(Clone)]
pub struct MermaidRuntime {
    script: String,
    origin: Option<PathBuf>,
}
impl MermaidRuntime {
    /// Uses the given script text directly.
    pub fn inline(script: impl Into<String>) -> Self {
        Self { script: script.into(), origin: None }
    }

    /// Reads the runtime from an explicit file. A missing file is fatal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::RuntimeNotFound(path.display().to_string()));
        }
        let script = fs::read_to_string(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), bytes = script.len(), "Loaded mermaid runtime");
        Ok(Self { script, origin: Some(path.to_path_buf()) })
    }

    /// Finds the runtime for a document living in `document_dir`.
    ///
    /// An `explicit` path is used as-is, without falling back to searching.
    /// Otherwise the document directory and each of its ancestors are
    /// searched, then the current directory, then the user data directory.
    #[instrument(skip_all)]
    pub fn locate(explicit: Option<&Path>, document_dir: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let roots = Self::search_roots(document_dir);
        let mut searched = Vec::new();
        for root in &roots {
            for candidate in CANDIDATES {
                let path = root.join(candidate);
                if path.is_file() {
                    return Self::from_file(path);
                }
                searched.push(path.display().to_string());
            }
        }
        tracing::info!(roots = roots.len(), "Mermaid runtime not found in any search location");
        exn::bail!(ErrorKind::RuntimeNotFound(searched.join(", ")));
    }

    fn search_roots(document_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = document_dir.map(|d| d.ancestors().map(Path::to_path_buf).collect()).unwrap_or_default();
        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd);
        }
        if let Some(dirs) = ProjectDirs::from("", "", "mdmermaid") {
            roots.push(dirs.data_dir().to_path_buf());
        }
        let mut seen = Vec::with_capacity(roots.len());
        roots.retain(|root| {
            let fresh = !seen.contains(root);
            if fresh {
                seen.push(root.clone());
            }
            fresh
        });
        roots
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    /// Where the runtime was read from, if it came from disk.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUB: &str = "window.mermaid = { initialize() {}, run() { return Promise.resolve(); } };";

    #[test]
    fn test_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.js");
        fs::write(&path, STUB).unwrap();
        let runtime = MermaidRuntime::locate(Some(&path), None).unwrap();
        assert_eq!(runtime.script(), STUB);
        assert_eq!(runtime.origin(), Some(path.as_path()));
    }

    #[test]
    fn test_explicit_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A runtime beside the document must not be used when an explicit path was given.
        fs::write(dir.path().join("mermaid.min.js"), STUB).unwrap();
        let missing = dir.path().join("missing.js");
        let err = MermaidRuntime::locate(Some(&missing), Some(dir.path())).err().unwrap();
        assert!(matches!(&*err, ErrorKind::RuntimeNotFound(_)));
    }

    #[test]
    fn test_found_in_node_modules_of_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("node_modules/mermaid/dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("mermaid.min.js"), STUB).unwrap();
        let docs = dir.path().join("docs/nested");
        fs::create_dir_all(&docs).unwrap();
        let runtime = MermaidRuntime::locate(None, Some(&docs)).unwrap();
        assert_eq!(runtime.script(), STUB);
        assert_eq!(runtime.origin(), Some(dist.join("mermaid.min.js").as_path()));
    }

    #[test]
    fn test_nearest_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mermaid.min.js"), "outer").unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("mermaid.min.js"), "inner").unwrap();
        assert_eq!(MermaidRuntime::locate(None, Some(&docs)).unwrap().script(), "inner");
    }

    #[test]
    fn test_inline() {
        let runtime = MermaidRuntime::inline(STUB);
        assert_eq!(runtime.script(), STUB);
        assert!(runtime.origin().is_none());
    }
}
