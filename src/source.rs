//! Cache of loaded source buffers keyed by path.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct SourceCache {
    buffers: HashMap<PathBuf, Vec<String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }

    /// The line buffer for `path`, read from disk on first use.
    pub fn lines(&mut self, path: &Path) -> io::Result<&[String]> {
        match self.buffers.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let text = fs::read_to_string(path)?;
                let lines = text.lines().map(str::to_string).collect();
                Ok(entry.insert(lines).as_slice())
            }
        }
    }

    /// Line count for an already-loaded buffer.
    pub fn total(&self, path: &Path) -> Option<usize> {
        self.buffers.get(path).map(Vec::len)
    }

    /// Install a buffer directly; used when source text comes from somewhere
    /// other than disk (tests, generated code).
    pub fn insert(&mut self, path: impl Into<PathBuf>, lines: Vec<String>) {
        self.buffers.insert(path.into(), lines);
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}
