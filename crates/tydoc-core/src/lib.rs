//! Core decode and resolution layer for TypeDoc JSON output.
//!
//! This crate turns the JSON document produced by an external TypeScript
//! documentation extractor into an in-memory declaration graph:
//! - Kind registry mapping the extractor's bitmask codes to a closed enum
//! - Tagged-union type model for type expressions
//! - Structured comment model with cross-reference rendering
//! - Reflection tree with a project-wide symbol map and navigation
//!   (paths, root modules, reference chains, group and export resolution)
//! - Single-pass, shape-predicate-driven decoder
//! - File registry mapping declarations back to source file paths
//!
//! Decoding is fail-fast: any structural violation rejects the whole
//! document. The decoded [`Project`] is immutable and safe to share.
//!
//! ```
//! use tydoc_core::decode_str;
//!
//! let project = decode_str(
//!     r#"{"id": 0, "name": "pkg", "variant": "project", "kind": 1, "children": []}"#,
//! )?;
//! assert_eq!(project.root().name, "pkg");
//! assert_eq!(project.symbol_count(), 1);
//! # Ok::<(), tydoc_core::DecodeError>(())
//! ```

pub mod comment;
pub mod decoder;
pub mod error;
pub mod files;
pub mod kind;
pub mod reflection;
pub mod types;

pub use decoder::{decode_reader, decode_slice, decode_str, decode_value};
pub use error::{DecodeError, ResolveError};
pub use kind::ReflectionKind;
pub use reflection::{Project, Reflection, ReflectionData, ReflectionId};
pub use types::{Type, TypeTarget};
