//! Error types for decoding and resolution.
//!
//! Two error families with different propagation policies:
//!
//! - [`DecodeError`]: structural errors found while decoding the JSON
//!   document. These are fatal — the whole document is rejected rather
//!   than producing a partially linked tree, since consumers assume a
//!   fully resolved graph.
//! - [`ResolveError`]: lookup failures hit *after* decode, when a caller
//!   resolves a symbol id, follows a reference chain, or asks the file
//!   registry for a path. These are per-access and non-fatal; the tree
//!   itself stays usable.

use thiserror::Error;

use crate::reflection::ReflectionId;

// ============================================================================
// Decode Errors (fatal, fail-fast)
// ============================================================================

/// Structural error while decoding an extractor JSON document.
///
/// Any of these aborts the decode immediately; no partial tree is
/// returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A reflection object carries a `kind` integer outside the known
    /// bitmask set.
    #[error("unknown reflection kind {code:#x}")]
    UnknownReflectionKind { code: u64 },

    /// A type record carries a `type` discriminant outside the known set.
    #[error("unknown type discriminant `{discriminant}`")]
    UnknownTypeKind { discriminant: String },

    /// A required field is absent from an object of a recognized shape.
    #[error("missing field `{field}` in {context}")]
    MissingField {
        context: &'static str,
        field: String,
    },

    /// A field is present but holds a value of the wrong shape.
    #[error("invalid field `{field}` in {context}: expected {expected}")]
    InvalidField {
        context: &'static str,
        field: String,
        expected: &'static str,
    },

    /// Two reflection objects claim the same id.
    #[error("duplicate reflection id {id}")]
    DuplicateId { id: ReflectionId },

    /// The top-level JSON value is not a project-kind reflection.
    #[error("invalid document root: {reason}")]
    InvalidRoot { reason: String },
}

impl DecodeError {
    /// Create a missing-field error.
    pub fn missing(context: &'static str, field: impl Into<String>) -> Self {
        DecodeError::MissingField {
            context,
            field: field.into(),
        }
    }

    /// Create an invalid-field error.
    pub fn invalid(
        context: &'static str,
        field: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        DecodeError::InvalidField {
            context,
            field: field.into(),
            expected,
        }
    }
}

// ============================================================================
// Resolution Errors (per-access, lookup time)
// ============================================================================

/// Lookup failure on an already-decoded project.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A target id is absent from the project symbol map.
    #[error("unresolved symbol id {0}")]
    UnresolvedSymbol(ReflectionId),

    /// A chain of reference reflections cycles back on itself.
    #[error("cyclic reference chain through id {0}")]
    CyclicReferenceChain(ReflectionId),

    /// No registered file is anchored to the declaration.
    #[error("no file anchored to declaration {0}")]
    MissingFileAnchor(ReflectionId),
}

// ============================================================================
// Tests
// ============================================================================
