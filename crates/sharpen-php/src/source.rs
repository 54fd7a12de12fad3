//! File content providers for the patch builder.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Supplies the full text of a source file.
pub trait SourceProvider {
    fn contents(&self, path: &str) -> io::Result<String>;
}

/// Sources held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    files: HashMap<String, String>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceProvider for InMemorySources {
    fn contents(&self, path: &str) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no source for {}", path))
        })
    }
}

/// Sources read from disk, with paths resolved against an optional root.
#[derive(Debug, Clone, Default)]
pub struct FsSources {
    root: Option<PathBuf>,
}

impl FsSources {
    /// Read paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        FsSources {
            root: Some(root.into()),
        }
    }
}

impl SourceProvider for FsSources {
    fn contents(&self, path: &str) -> io::Result<String> {
        let full = match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        };
        tracing::trace!(path = %full.display(), "reading source");
        fs::read_to_string(full)
    }
}
