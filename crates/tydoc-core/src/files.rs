//! File registry: reversible mapping between source files and the
//! declarations that anchor them.
//!
//! The extractor assigns each source file an integer id, records its path
//! in `entries`, and anchors it to a module declaration in `reflections`.
//! The reverse map (declaration to file) is derived lazily and cached once;
//! the registry is immutable after decode, so a `OnceLock` is enough.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::error::ResolveError;
use crate::reflection::ReflectionId;

/// Registry of source files known to the extractor.
#[derive(Debug)]
pub struct FileRegistry {
    entries: BTreeMap<u32, String>,
    reflections: BTreeMap<u32, ReflectionId>,
    anchors: OnceLock<HashMap<ReflectionId, u32>>,
}

impl FileRegistry {
    /// Build a registry from the decoded `entries` and `reflections` maps.
    pub fn new(entries: BTreeMap<u32, String>, reflections: BTreeMap<u32, ReflectionId>) -> Self {
        FileRegistry {
            entries,
            reflections,
            anchors: OnceLock::new(),
        }
    }

    /// File id to path, as decoded.
    pub fn entries(&self) -> &BTreeMap<u32, String> {
        &self.entries
    }

    /// File id to anchor declaration id, as decoded.
    pub fn reflections(&self) -> &BTreeMap<u32, ReflectionId> {
        &self.reflections
    }

    /// Path of the file anchored to the given declaration.
    ///
    /// Fails with [`ResolveError::MissingFileAnchor`] when the declaration
    /// anchors no registered file.
    pub fn filepath(&self, declaration: ReflectionId) -> Result<&str, ResolveError> {
        let file_id = self
            .anchors()
            .get(&declaration)
            .ok_or(ResolveError::MissingFileAnchor(declaration))?;
        self.entries
            .get(file_id)
            .map(String::as_str)
            .ok_or(ResolveError::MissingFileAnchor(declaration))
    }

    fn anchors(&self) -> &HashMap<ReflectionId, u32> {
        self.anchors.get_or_init(|| {
            self.reflections
                .iter()
                .map(|(&file_id, &declaration)| (declaration, file_id))
                .collect()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
