//! Reflection kind registry.
//!
//! The extractor identifies declaration kinds with power-of-two bitmask
//! integers. This module maps those codes onto a closed enum, both ways.
//! The mapping is a bijection; an unknown code is a decode error, never a
//! silent default.

use std::fmt;

use serde::Serialize;

use crate::error::DecodeError;

/// Declaration kind of a reflection node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
    Project,
    Module,
    Namespace,
    Enum,
    EnumMember,
    Variable,
    Function,
    Class,
    Interface,
    Constructor,
    Property,
    Method,
    CallSignature,
    IndexSignature,
    ConstructorSignature,
    Parameter,
    TypeLiteral,
    TypeParameter,
    Accessor,
    GetSignature,
    SetSignature,
    TypeAlias,
    Reference,
}

/// Every kind, in bitmask order. Useful for exhaustive iteration in tests
/// and dispatch tables.
pub const ALL_KINDS: [ReflectionKind; 23] = [
    ReflectionKind::Project,
    ReflectionKind::Module,
    ReflectionKind::Namespace,
    ReflectionKind::Enum,
    ReflectionKind::EnumMember,
    ReflectionKind::Variable,
    ReflectionKind::Function,
    ReflectionKind::Class,
    ReflectionKind::Interface,
    ReflectionKind::Constructor,
    ReflectionKind::Property,
    ReflectionKind::Method,
    ReflectionKind::CallSignature,
    ReflectionKind::IndexSignature,
    ReflectionKind::ConstructorSignature,
    ReflectionKind::Parameter,
    ReflectionKind::TypeLiteral,
    ReflectionKind::TypeParameter,
    ReflectionKind::Accessor,
    ReflectionKind::GetSignature,
    ReflectionKind::SetSignature,
    ReflectionKind::TypeAlias,
    ReflectionKind::Reference,
];

impl ReflectionKind {
    /// Translate an extractor bitmask code into a kind.
    ///
    /// Fails with [`DecodeError::UnknownReflectionKind`] for any code
    /// outside the known set.
    pub fn from_bits(code: u64) -> Result<Self, DecodeError> {
        match code {
            0x1 => Ok(ReflectionKind::Project),
            0x2 => Ok(ReflectionKind::Module),
            0x4 => Ok(ReflectionKind::Namespace),
            0x8 => Ok(ReflectionKind::Enum),
            0x10 => Ok(ReflectionKind::EnumMember),
            0x20 => Ok(ReflectionKind::Variable),
            0x40 => Ok(ReflectionKind::Function),
            0x80 => Ok(ReflectionKind::Class),
            0x100 => Ok(ReflectionKind::Interface),
            0x200 => Ok(ReflectionKind::Constructor),
            0x400 => Ok(ReflectionKind::Property),
            0x800 => Ok(ReflectionKind::Method),
            0x1000 => Ok(ReflectionKind::CallSignature),
            0x2000 => Ok(ReflectionKind::IndexSignature),
            0x4000 => Ok(ReflectionKind::ConstructorSignature),
            0x8000 => Ok(ReflectionKind::Parameter),
            0x10000 => Ok(ReflectionKind::TypeLiteral),
            0x20000 => Ok(ReflectionKind::TypeParameter),
            0x40000 => Ok(ReflectionKind::Accessor),
            0x80000 => Ok(ReflectionKind::GetSignature),
            0x100000 => Ok(ReflectionKind::SetSignature),
            0x200000 => Ok(ReflectionKind::TypeAlias),
            0x400000 => Ok(ReflectionKind::Reference),
            _ => Err(DecodeError::UnknownReflectionKind { code }),
        }
    }

    /// The extractor bitmask code for this kind. Exact inverse of
    /// [`ReflectionKind::from_bits`].
    pub fn bits(self) -> u64 {
        match self {
            ReflectionKind::Project => 0x1,
            ReflectionKind::Module => 0x2,
            ReflectionKind::Namespace => 0x4,
            ReflectionKind::Enum => 0x8,
            ReflectionKind::EnumMember => 0x10,
            ReflectionKind::Variable => 0x20,
            ReflectionKind::Function => 0x40,
            ReflectionKind::Class => 0x80,
            ReflectionKind::Interface => 0x100,
            ReflectionKind::Constructor => 0x200,
            ReflectionKind::Property => 0x400,
            ReflectionKind::Method => 0x800,
            ReflectionKind::CallSignature => 0x1000,
            ReflectionKind::IndexSignature => 0x2000,
            ReflectionKind::ConstructorSignature => 0x4000,
            ReflectionKind::Parameter => 0x8000,
            ReflectionKind::TypeLiteral => 0x10000,
            ReflectionKind::TypeParameter => 0x20000,
            ReflectionKind::Accessor => 0x40000,
            ReflectionKind::GetSignature => 0x80000,
            ReflectionKind::SetSignature => 0x100000,
            ReflectionKind::TypeAlias => 0x200000,
            ReflectionKind::Reference => 0x400000,
        }
    }

    /// Stable snake_case name for display and serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            ReflectionKind::Project => "project",
            ReflectionKind::Module => "module",
            ReflectionKind::Namespace => "namespace",
            ReflectionKind::Enum => "enum",
            ReflectionKind::EnumMember => "enum_member",
            ReflectionKind::Variable => "variable",
            ReflectionKind::Function => "function",
            ReflectionKind::Class => "class",
            ReflectionKind::Interface => "interface",
            ReflectionKind::Constructor => "constructor",
            ReflectionKind::Property => "property",
            ReflectionKind::Method => "method",
            ReflectionKind::CallSignature => "call_signature",
            ReflectionKind::IndexSignature => "index_signature",
            ReflectionKind::ConstructorSignature => "constructor_signature",
            ReflectionKind::Parameter => "parameter",
            ReflectionKind::TypeLiteral => "type_literal",
            ReflectionKind::TypeParameter => "type_parameter",
            ReflectionKind::Accessor => "accessor",
            ReflectionKind::GetSignature => "get_signature",
            ReflectionKind::SetSignature => "set_signature",
            ReflectionKind::TypeAlias => "type_alias",
            ReflectionKind::Reference => "reference",
        }
    }
}

impl fmt::Display for ReflectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
