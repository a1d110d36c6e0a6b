//! Reflection tree: declaration nodes, the project arena, and navigation.
//!
//! Every decoded declaration is a [`Reflection`] stored in the arena owned
//! by [`Project`]. The arena doubles as the project-wide symbol map: one
//! table, keyed by the extractor-assigned id, shared by every lookup.
//! Ownership runs strictly parent to child through id lists; the `parent`
//! field is a non-owning back-reference used only for navigation.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::comment::Comment;
use crate::error::ResolveError;
use crate::files::FileRegistry;
use crate::kind::ReflectionKind;
use crate::types::{Type, TypeTarget};

// ============================================================================
// Reflection Id
// ============================================================================

/// Identifier of a declaration, unique within a project. Assigned by the
/// extractor, never by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReflectionId(pub u32);

impl std::fmt::Display for ReflectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Auxiliary Records
// ============================================================================

/// Originating source location of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub file_name: String,
    /// 1-based line number.
    pub line: u32,
    pub character: u32,
    pub url: Option<String>,
}

/// Named presentational bucket of child declarations, e.g. "Properties".
/// Holds raw ids; resolve through [`Project::resolved_groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub title: String,
    pub children: Vec<ReflectionId>,
}

/// A [`Group`] with its children materialized into live references.
#[derive(Debug)]
pub struct ResolvedGroup<'a> {
    pub title: &'a str,
    pub children: Vec<&'a Reflection>,
}

/// Synthetic reference produced by CommonJS `export=` promotion. Not part
/// of the symbol map; `id` and `name` come from the promoted property and
/// `target` points at the original symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReference {
    pub id: ReflectionId,
    pub name: String,
    pub target: TypeTarget,
}

// ============================================================================
// Reflection Nodes
// ============================================================================

/// A single decoded declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reflection {
    pub id: ReflectionId,
    pub name: String,
    /// Raw discriminant string from the extractor, e.g. `"declaration"`.
    pub variant: String,
    pub comment: Option<Comment>,
    /// Owned children, in document order.
    pub children: Vec<ReflectionId>,
    /// Boolean modifiers such as `is_static` or `is_optional`. The key set
    /// is open-ended upstream.
    pub flags: BTreeMap<String, bool>,
    pub groups: Vec<Group>,
    pub sources: Vec<Source>,
    /// Non-owning back-reference; `None` only for the project root.
    pub parent: Option<ReflectionId>,
    /// Associated type, where the kind has one (variables, properties,
    /// signature return types, alias targets, parameter types, ...).
    pub ty: Option<Type>,
    /// Kind-specific payload. [`Reflection::kind`] derives from this, so
    /// kind and payload cannot disagree.
    pub data: ReflectionData,
}

impl Reflection {
    /// The declaration kind, derived from the payload variant.
    pub fn kind(&self) -> ReflectionKind {
        self.data.kind()
    }

    /// Whether the named flag is set.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

/// Kind-specific payload of a reflection node.
///
/// One variant per [`ReflectionKind`]; consumers match exhaustively so a
/// new kind fails to compile everywhere it matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReflectionData {
    Project {
        package_name: Option<String>,
        package_version: Option<String>,
        readme: Vec<crate::comment::CommentSegment>,
    },
    Module {
        package_version: Option<String>,
        readme: Vec<crate::comment::CommentSegment>,
    },
    Namespace,
    Enum,
    EnumMember,
    Variable {
        default_value: Option<String>,
    },
    Function {
        signatures: Vec<ReflectionId>,
    },
    Class {
        extended_types: Vec<Type>,
        implemented_types: Vec<Type>,
        type_parameters: Vec<ReflectionId>,
    },
    Interface {
        extended_types: Vec<Type>,
        extended_by: Vec<Type>,
        type_parameters: Vec<ReflectionId>,
        index_signature: Option<ReflectionId>,
    },
    Constructor {
        signatures: Vec<ReflectionId>,
    },
    Property {
        inherited_from: Option<Type>,
        overwrites: Option<Type>,
        default_value: Option<String>,
    },
    Method {
        signatures: Vec<ReflectionId>,
        inherited_from: Option<Type>,
        overwrites: Option<Type>,
    },
    CallSignature {
        parameters: Vec<ReflectionId>,
        type_parameters: Vec<ReflectionId>,
    },
    IndexSignature {
        parameters: Vec<ReflectionId>,
    },
    ConstructorSignature {
        parameters: Vec<ReflectionId>,
    },
    Parameter {
        default_value: Option<String>,
    },
    TypeLiteral {
        signatures: Vec<ReflectionId>,
        index_signature: Option<ReflectionId>,
    },
    TypeParameter {
        default: Option<Type>,
    },
    Accessor {
        get_signature: Option<ReflectionId>,
        set_signature: Option<ReflectionId>,
    },
    GetSignature,
    SetSignature {
        parameters: Vec<ReflectionId>,
    },
    TypeAlias,
    Reference {
        target: ReflectionId,
    },
}

impl ReflectionData {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> ReflectionKind {
        match self {
            ReflectionData::Project { .. } => ReflectionKind::Project,
            ReflectionData::Module { .. } => ReflectionKind::Module,
            ReflectionData::Namespace => ReflectionKind::Namespace,
            ReflectionData::Enum => ReflectionKind::Enum,
            ReflectionData::EnumMember => ReflectionKind::EnumMember,
            ReflectionData::Variable { .. } => ReflectionKind::Variable,
            ReflectionData::Function { .. } => ReflectionKind::Function,
            ReflectionData::Class { .. } => ReflectionKind::Class,
            ReflectionData::Interface { .. } => ReflectionKind::Interface,
            ReflectionData::Constructor { .. } => ReflectionKind::Constructor,
            ReflectionData::Property { .. } => ReflectionKind::Property,
            ReflectionData::Method { .. } => ReflectionKind::Method,
            ReflectionData::CallSignature { .. } => ReflectionKind::CallSignature,
            ReflectionData::IndexSignature { .. } => ReflectionKind::IndexSignature,
            ReflectionData::ConstructorSignature { .. } => ReflectionKind::ConstructorSignature,
            ReflectionData::Parameter { .. } => ReflectionKind::Parameter,
            ReflectionData::TypeLiteral { .. } => ReflectionKind::TypeLiteral,
            ReflectionData::TypeParameter { .. } => ReflectionKind::TypeParameter,
            ReflectionData::Accessor { .. } => ReflectionKind::Accessor,
            ReflectionData::GetSignature => ReflectionKind::GetSignature,
            ReflectionData::SetSignature { .. } => ReflectionKind::SetSignature,
            ReflectionData::TypeAlias => ReflectionKind::TypeAlias,
            ReflectionData::Reference { .. } => ReflectionKind::Reference,
        }
    }

    /// Ids of reflections owned through the payload (signatures,
    /// parameters, type parameters, accessor signatures). Children owned
    /// through [`Reflection::children`] are not included.
    pub fn nested_ids(&self) -> Vec<ReflectionId> {
        match self {
            ReflectionData::Function { signatures }
            | ReflectionData::Constructor { signatures } => signatures.clone(),
            ReflectionData::Method { signatures, .. } => signatures.clone(),
            ReflectionData::Class {
                type_parameters, ..
            } => type_parameters.clone(),
            ReflectionData::Interface {
                type_parameters,
                index_signature,
                ..
            } => {
                let mut ids = type_parameters.clone();
                ids.extend(*index_signature);
                ids
            }
            ReflectionData::CallSignature {
                parameters,
                type_parameters,
            } => {
                let mut ids = parameters.clone();
                ids.extend_from_slice(type_parameters);
                ids
            }
            ReflectionData::IndexSignature { parameters }
            | ReflectionData::ConstructorSignature { parameters }
            | ReflectionData::SetSignature { parameters } => parameters.clone(),
            ReflectionData::TypeLiteral {
                signatures,
                index_signature,
            } => {
                let mut ids = signatures.clone();
                ids.extend(*index_signature);
                ids
            }
            ReflectionData::Accessor {
                get_signature,
                set_signature,
            } => get_signature.iter().chain(set_signature).copied().collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// The decoded root: the reflection arena, the symbol map, and the file
/// registry. Immutable once decode completes.
#[derive(Debug)]
pub struct Project {
    root: ReflectionId,
    symbols: HashMap<ReflectionId, Reflection>,
    files: Option<FileRegistry>,
}

impl Project {
    pub(crate) fn new(
        root: ReflectionId,
        symbols: HashMap<ReflectionId, Reflection>,
        files: Option<FileRegistry>,
    ) -> Self {
        debug_assert!(symbols.contains_key(&root));
        Project {
            root,
            symbols,
            files,
        }
    }

    /// Id of the project root node.
    pub fn root_id(&self) -> ReflectionId {
        self.root
    }

    /// The project root node, the ultimate ancestor of every declaration.
    pub fn root(&self) -> &Reflection {
        self.symbols
            .get(&self.root)
            .expect("project root is registered during decode")
    }

    /// The file registry, when the document carried one.
    pub fn files(&self) -> Option<&FileRegistry> {
        self.files.as_ref()
    }

    /// Number of declarations in the symbol map, the root included.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the symbol map contains the id.
    pub fn contains(&self, id: ReflectionId) -> bool {
        self.symbols.contains_key(&id)
    }

    /// Look up a declaration by id.
    pub fn get(&self, id: ReflectionId) -> Option<&Reflection> {
        self.symbols.get(&id)
    }

    /// Look up a declaration by id, failing with
    /// [`ResolveError::UnresolvedSymbol`] when absent.
    pub fn resolve(&self, id: ReflectionId) -> Result<&Reflection, ResolveError> {
        self.symbols
            .get(&id)
            .ok_or(ResolveError::UnresolvedSymbol(id))
    }

    /// Iterate over every declaration, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Reflection> {
        self.symbols.values()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Documentation path of a declaration.
    ///
    /// A node directly under the project keeps its own name; a module
    /// literally named `index` collapses into its parent's path (directory
    /// index-file convention); everything else is `parent_path/name`.
    pub fn path(&self, id: ReflectionId) -> Result<String, ResolveError> {
        let node = self.resolve(id)?;
        let Some(parent_id) = node.parent else {
            return Ok(node.name.clone());
        };
        let parent = self.resolve(parent_id)?;
        if parent.kind() == ReflectionKind::Project {
            return Ok(node.name.clone());
        }
        if node.kind() == ReflectionKind::Module && node.name == "index" {
            return self.path(parent_id);
        }
        Ok(format!("{}/{}", self.path(parent_id)?, node.name))
    }

    /// The top-level module containing a declaration: the nearest ancestor
    /// whose own parent is the project root.
    pub fn root_module(&self, id: ReflectionId) -> Result<&Reflection, ResolveError> {
        let mut node = self.resolve(id)?;
        while let Some(parent_id) = node.parent {
            let parent = self.resolve(parent_id)?;
            if parent.kind() == ReflectionKind::Project {
                break;
            }
            node = parent;
        }
        Ok(node)
    }

    /// One symbol-map hop: for a reference node, the declaration its
    /// target id names; any other node resolves to itself.
    pub fn resolved_target(&self, id: ReflectionId) -> Result<&Reflection, ResolveError> {
        let node = self.resolve(id)?;
        match node.data {
            ReflectionData::Reference { target } => self.resolve(target),
            _ => Ok(node),
        }
    }

    /// Follow reference chains until a non-reference declaration.
    ///
    /// A revisited id fails with [`ResolveError::CyclicReferenceChain`];
    /// malformed input must not loop forever.
    pub fn final_target(&self, id: ReflectionId) -> Result<&Reflection, ResolveError> {
        let mut visited = HashSet::new();
        let mut node = self.resolve(id)?;
        loop {
            let ReflectionData::Reference { target } = node.data else {
                return Ok(node);
            };
            if !visited.insert(node.id) {
                return Err(ResolveError::CyclicReferenceChain(node.id));
            }
            node = self.resolve(target)?;
        }
    }

    /// Materialize a declaration's groups into live references, preserving
    /// group order and titles.
    pub fn resolved_groups(&self, id: ReflectionId) -> Result<Vec<ResolvedGroup<'_>>, ResolveError> {
        let node = self.resolve(id)?;
        node.groups
            .iter()
            .map(|group| {
                let children = group
                    .children
                    .iter()
                    .map(|&child| self.resolve(child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ResolvedGroup {
                    title: &group.title,
                    children,
                })
            })
            .collect()
    }

    /// CommonJS default-export promotion.
    ///
    /// If the module has a function child named exactly `export=`, the
    /// members of that function's return type literal are promoted as the
    /// module's exports, each as a synthetic reference to the original
    /// symbol. Modules without such a child export nothing this way.
    pub fn module_exports(&self, id: ReflectionId) -> Result<Vec<ExportReference>, ResolveError> {
        let module = self.resolve(id)?;
        for &child_id in &module.children {
            let child = self.resolve(child_id)?;
            if child.name == "export=" && child.kind() == ReflectionKind::Function {
                return self.function_exports(child);
            }
        }
        Ok(Vec::new())
    }

    fn function_exports(&self, function: &Reflection) -> Result<Vec<ExportReference>, ResolveError> {
        let ReflectionData::Function { ref signatures } = function.data else {
            return Ok(Vec::new());
        };
        let Some(&first) = signatures.first() else {
            return Ok(Vec::new());
        };
        let signature = self.resolve(first)?;
        let Some(Type::Reflection { declaration }) = signature.ty else {
            return Ok(Vec::new());
        };
        let literal = self.resolve(declaration)?;
        let mut exports = Vec::new();
        for &member_id in &literal.children {
            let member = self.resolve(member_id)?;
            if let Some(target) = member.ty.as_ref().and_then(Type::target) {
                exports.push(ExportReference {
                    id: member.id,
                    name: member.name.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(exports)
    }

    /// Path of the source file anchored to a declaration, via the file
    /// registry. Fails with [`ResolveError::MissingFileAnchor`] when the
    /// document carried no registry or the declaration anchors no file.
    pub fn filepath(&self, id: ReflectionId) -> Result<&str, ResolveError> {
        let registry = self
            .files
            .as_ref()
            .ok_or(ResolveError::MissingFileAnchor(id))?;
        registry.filepath(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
