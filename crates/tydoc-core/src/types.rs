//! Type model: tagged union over the extractor's type expressions.
//!
//! Every variant carries exactly the fields its discriminant defines, so
//! consumers match exhaustively instead of probing optional fields. A
//! reference target is either a symbol id resolvable through the project
//! symbol map or an unresolved descriptor for an external symbol; the two
//! are never coerced into each other.

use serde::Serialize;

use crate::reflection::ReflectionId;

// ============================================================================
// Targets
// ============================================================================

/// Descriptor for a symbol the extractor could not resolve to an id,
/// typically from a dependency without its own documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// File the symbol was declared in, as reported by the extractor.
    pub source_file_name: String,
    /// Fully qualified symbol name.
    pub qualified_name: String,
}

/// Target of a reference-kind type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypeTarget {
    /// Symbol id resolvable through the project symbol map.
    Symbol(ReflectionId),
    /// External symbol with no id in this project.
    Unresolved(Target),
}

impl TypeTarget {
    /// The symbol id, if this target is resolvable in-project.
    pub fn symbol(&self) -> Option<ReflectionId> {
        match self {
            TypeTarget::Symbol(id) => Some(*id),
            TypeTarget::Unresolved(_) => None,
        }
    }
}

// ============================================================================
// Type Kind
// ============================================================================

/// Discriminant of a type record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Array,
    Intrinsic,
    Literal,
    Reference,
    Reflection,
    Union,
    Tuple,
    Query,
    TypeOperator,
    Intersection,
    Mapped,
}

impl TypeKind {
    /// Parse the raw `type` discriminant string.
    pub fn from_discriminant(discriminant: &str) -> Option<Self> {
        match discriminant {
            "array" => Some(TypeKind::Array),
            "intrinsic" => Some(TypeKind::Intrinsic),
            "literal" => Some(TypeKind::Literal),
            "reference" => Some(TypeKind::Reference),
            "reflection" => Some(TypeKind::Reflection),
            "union" => Some(TypeKind::Union),
            "tuple" => Some(TypeKind::Tuple),
            "query" => Some(TypeKind::Query),
            "typeOperator" => Some(TypeKind::TypeOperator),
            "intersection" => Some(TypeKind::Intersection),
            "mapped" => Some(TypeKind::Mapped),
            _ => None,
        }
    }

    /// The raw discriminant string.
    pub fn discriminant(self) -> &'static str {
        match self {
            TypeKind::Array => "array",
            TypeKind::Intrinsic => "intrinsic",
            TypeKind::Literal => "literal",
            TypeKind::Reference => "reference",
            TypeKind::Reflection => "reflection",
            TypeKind::Union => "union",
            TypeKind::Tuple => "tuple",
            TypeKind::Query => "query",
            TypeKind::TypeOperator => "typeOperator",
            TypeKind::Intersection => "intersection",
            TypeKind::Mapped => "mapped",
        }
    }
}

// ============================================================================
// Type Expressions
// ============================================================================

/// A decoded type expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Type {
    /// `T[]`
    Array { element_type: Box<Type> },
    /// Built-in types such as `string` or `number`.
    Intrinsic { name: String },
    /// Literal types: `"on"`, `42`, `true`, `null`.
    Literal { value: serde_json::Value },
    /// A named reference to another declaration.
    Reference {
        name: String,
        /// Absent for references the extractor left entirely symbolic.
        target: Option<TypeTarget>,
        package: Option<String>,
        type_arguments: Vec<Type>,
        qualified_name: Option<String>,
        refers_to_type_parameter: bool,
    },
    /// An anonymous type literal; `declaration` points at the
    /// [`TypeLiteral`](crate::kind::ReflectionKind::TypeLiteral) node in
    /// the project symbol map.
    Reflection { declaration: ReflectionId },
    /// `A | B`
    Union { types: Vec<Type> },
    /// `A & B`
    Intersection { types: Vec<Type> },
    /// `[A, B]`
    Tuple { elements: Vec<Type> },
    /// `typeof x`
    Query { query_type: Box<Type> },
    /// `keyof T`, `readonly T`, `unique T`
    TypeOperator { operator: String, target: Box<Type> },
    /// `{ [K in keyof T]: U }`
    Mapped {
        parameter: String,
        parameter_type: Box<Type>,
        template_type: Box<Type>,
        name_type: Option<Box<Type>>,
        optional_modifier: Option<String>,
        readonly_modifier: Option<String>,
    },
}

impl Type {
    /// The discriminant of this type expression.
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Array { .. } => TypeKind::Array,
            Type::Intrinsic { .. } => TypeKind::Intrinsic,
            Type::Literal { .. } => TypeKind::Literal,
            Type::Reference { .. } => TypeKind::Reference,
            Type::Reflection { .. } => TypeKind::Reflection,
            Type::Union { .. } => TypeKind::Union,
            Type::Intersection { .. } => TypeKind::Intersection,
            Type::Tuple { .. } => TypeKind::Tuple,
            Type::Query { .. } => TypeKind::Query,
            Type::TypeOperator { .. } => TypeKind::TypeOperator,
            Type::Mapped { .. } => TypeKind::Mapped,
        }
    }

    /// The reference target, for reference-kind types that carry one.
    pub fn target(&self) -> Option<&TypeTarget> {
        match self {
            Type::Reference { target, .. } => target.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
