//! Single-pass decoder from extractor JSON to the reflection arena.
//!
//! The decoder walks the parsed [`serde_json::Value`] bottom-up: every
//! JSON object's fields are decoded into intermediate nodes before the
//! object itself is classified, so nested declarations exist before the
//! declaration that owns them. Classification is an ordered list of shape
//! predicates over the decoded field map, most specific first:
//!
//! 1. reflection (`variant` + `id` + numeric `kind`) — registered in the
//!    project symbol map, the single point where identity is established
//! 2. unresolved target descriptor (`source_file_name` + `qualified_name`)
//! 3. type record (string `type` discriminant)
//! 4. comment segment (`kind` in {`text`, `code`, `inline-tag`})
//! 5. block tag (`kind` is a tag marker with `content`)
//! 6. comment (`summary`)
//! 7. anything else passes through as a plain mapping
//!
//! Object keys are normalized from the extractor's camelCase to
//! snake_case at the object boundary, so `sourceFileName` and
//! `source_file_name` decode identically.
//!
//! Structural errors abort the whole decode; a malformed tree is never
//! partially usable.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::comment::{BlockTag, BlockTagKind, Comment, CommentSegment, SegmentKind, SegmentTarget};
use crate::error::DecodeError;
use crate::files::FileRegistry;
use crate::kind::ReflectionKind;
use crate::reflection::{Group, Project, Reflection, ReflectionData, ReflectionId, Source};
use crate::types::{Target, Type, TypeKind, TypeTarget};

// ============================================================================
// Entry Points
// ============================================================================

/// Decode a JSON document from a string.
pub fn decode_str(json: &str) -> Result<Project, DecodeError> {
    decode_value(serde_json::from_str(json)?)
}

/// Decode a JSON document from bytes.
pub fn decode_slice(bytes: &[u8]) -> Result<Project, DecodeError> {
    decode_value(serde_json::from_slice(bytes)?)
}

/// Decode a JSON document from a reader. The document is buffered in
/// full before decoding; there is no incremental mode.
pub fn decode_reader<R: Read>(reader: R) -> Result<Project, DecodeError> {
    decode_value(serde_json::from_reader(reader)?)
}

/// Decode an already-parsed JSON document.
pub fn decode_value(value: Value) -> Result<Project, DecodeError> {
    let mut decoder = Decoder::default();
    let node = decoder.node(value)?;
    let Node::Reflection(root) = node else {
        return Err(DecodeError::InvalidRoot {
            reason: "top-level value is not a reflection object".to_string(),
        });
    };
    let Some(root_kind) = decoder.symbols.get(&root).map(Reflection::kind) else {
        return Err(DecodeError::InvalidRoot {
            reason: "root reflection was not registered".to_string(),
        });
    };
    if root_kind != ReflectionKind::Project {
        return Err(DecodeError::InvalidRoot {
            reason: format!(
                "top-level reflection has kind `{}`, expected `project`",
                root_kind
            ),
        });
    }
    debug!(symbols = decoder.symbols.len(), root = %root, "decoded project");
    Ok(Project::new(root, decoder.symbols, decoder.files))
}

// ============================================================================
// Intermediate Nodes
// ============================================================================

type Fields = BTreeMap<String, Node>;

/// A decoded JSON value. Scalars and unrecognized objects pass through;
/// recognized shapes become typed model values. Reflections are held by
/// id only — the nodes themselves live in the decoder's symbol map.
#[derive(Debug)]
enum Node {
    Value(Value),
    Array(Vec<Node>),
    Object(Fields),
    Target(Target),
    Type(Type),
    Segment(CommentSegment),
    Tag(BlockTag),
    Comment(Comment),
    Reflection(ReflectionId),
}

// ============================================================================
// Shape Predicates
// ============================================================================

fn is_reflection_shape(fields: &Fields) -> bool {
    fields.contains_key("variant")
        && fields.contains_key("id")
        && matches!(fields.get("kind"), Some(Node::Value(Value::Number(_))))
}

fn is_target_shape(fields: &Fields) -> bool {
    matches!(
        fields.get("source_file_name"),
        Some(Node::Value(Value::String(_)))
    ) && matches!(
        fields.get("qualified_name"),
        Some(Node::Value(Value::String(_)))
    )
}

fn is_type_shape(fields: &Fields) -> bool {
    matches!(fields.get("type"), Some(Node::Value(Value::String(_))))
}

fn is_segment_shape(fields: &Fields) -> bool {
    matches!(
        fields.get("kind"),
        Some(Node::Value(Value::String(kind))) if SegmentKind::parse(kind).is_some()
    )
}

fn is_block_tag_shape(fields: &Fields) -> bool {
    let marker = matches!(
        fields.get("kind"),
        Some(Node::Value(Value::String(kind))) if kind.starts_with('@') || kind.starts_with("{@")
    );
    marker && fields.contains_key("content")
}

fn is_comment_shape(fields: &Fields) -> bool {
    fields.contains_key("summary")
}

/// Normalize a camelCase object key to snake_case. Keys that are already
/// snake_case come through unchanged.
fn snake_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// ============================================================================
// Decoder
// ============================================================================

#[derive(Default)]
struct Decoder {
    symbols: HashMap<ReflectionId, Reflection>,
    files: Option<FileRegistry>,
}

impl Decoder {
    fn node(&mut self, value: Value) -> Result<Node, DecodeError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.node(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Node::Array),
            Value::Object(map) => self.object(map),
            scalar => Ok(Node::Value(scalar)),
        }
    }

    /// The object-materialization hook: fields first, then one predicate
    /// decides what the object is.
    fn object(&mut self, map: Map<String, Value>) -> Result<Node, DecodeError> {
        let mut fields = Fields::new();
        for (key, value) in map {
            fields.insert(snake_key(&key), self.node(value)?);
        }
        if is_reflection_shape(&fields) {
            self.reflection(fields).map(Node::Reflection)
        } else if is_target_shape(&fields) {
            target(fields).map(Node::Target)
        } else if is_type_shape(&fields) {
            self.type_record(fields).map(Node::Type)
        } else if is_segment_shape(&fields) {
            segment(fields).map(Node::Segment)
        } else if is_block_tag_shape(&fields) {
            block_tag(fields).map(Node::Tag)
        } else if is_comment_shape(&fields) {
            comment(fields).map(Node::Comment)
        } else {
            Ok(Node::Object(fields))
        }
    }

    // ------------------------------------------------------------------
    // Reflections
    // ------------------------------------------------------------------

    fn reflection(&mut self, fields: Fields) -> Result<ReflectionId, DecodeError> {
        let mut f = FieldMap::new("reflection", fields);
        let id = ReflectionId(f.require_u32("id")?);
        let kind = ReflectionKind::from_bits(f.require_u64("kind")?)?;
        let name = f.require_string("name")?;
        let variant = f.require_string("variant")?;
        trace!(%id, %kind, name = %name, "decoding reflection");

        let comment = f.take_comment("comment")?;
        let children = f.take_reflection_list("children")?;
        let flags = f.take_flags("flags")?;
        let groups = f.take_groups("groups")?;
        let sources = f.take_sources("sources")?;
        let ty = f.take_type("type")?;

        let data = self.payload(kind, &mut f)?;

        if kind == ReflectionKind::Project {
            if let Some(node) = f.take("files") {
                self.files = Some(file_registry(node)?);
            }
        }

        let mut owned = children.clone();
        owned.extend(data.nested_ids());

        let reflection = Reflection {
            id,
            name,
            variant,
            comment,
            children,
            flags,
            groups,
            sources,
            parent: None,
            ty,
            data,
        };
        if self.symbols.insert(id, reflection).is_some() {
            return Err(DecodeError::DuplicateId { id });
        }
        // Children were materialized before this node; stamp the back-link.
        for child in owned {
            if let Some(node) = self.symbols.get_mut(&child) {
                node.parent = Some(id);
            }
        }
        Ok(id)
    }

    fn payload(
        &mut self,
        kind: ReflectionKind,
        f: &mut FieldMap,
    ) -> Result<ReflectionData, DecodeError> {
        let data = match kind {
            ReflectionKind::Project => ReflectionData::Project {
                package_name: f.take_string("package_name")?,
                package_version: f.take_string("package_version")?,
                readme: f.take_segments("readme")?,
            },
            ReflectionKind::Module => ReflectionData::Module {
                package_version: f.take_string("package_version")?,
                readme: f.take_segments("readme")?,
            },
            ReflectionKind::Namespace => ReflectionData::Namespace,
            ReflectionKind::Enum => ReflectionData::Enum,
            ReflectionKind::EnumMember => ReflectionData::EnumMember,
            ReflectionKind::Variable => ReflectionData::Variable {
                default_value: f.take_string("default_value")?,
            },
            ReflectionKind::Function => ReflectionData::Function {
                signatures: f.take_reflection_list("signatures")?,
            },
            ReflectionKind::Class => ReflectionData::Class {
                extended_types: f.take_type_list("extended_types")?,
                implemented_types: f.take_type_list("implemented_types")?,
                type_parameters: f.take_type_parameters()?,
            },
            ReflectionKind::Interface => ReflectionData::Interface {
                extended_types: f.take_type_list("extended_types")?,
                extended_by: f.take_type_list("extended_by")?,
                type_parameters: f.take_type_parameters()?,
                index_signature: f.take_reflection("index_signature")?,
            },
            ReflectionKind::Constructor => ReflectionData::Constructor {
                signatures: f.take_reflection_list("signatures")?,
            },
            ReflectionKind::Property => ReflectionData::Property {
                inherited_from: f.take_type("inherited_from")?,
                overwrites: f.take_type("overwrites")?,
                default_value: f.take_string("default_value")?,
            },
            ReflectionKind::Method => ReflectionData::Method {
                signatures: f.take_reflection_list("signatures")?,
                inherited_from: f.take_type("inherited_from")?,
                overwrites: f.take_type("overwrites")?,
            },
            ReflectionKind::CallSignature => ReflectionData::CallSignature {
                parameters: f.take_reflection_list("parameters")?,
                type_parameters: f.take_type_parameters()?,
            },
            ReflectionKind::IndexSignature => ReflectionData::IndexSignature {
                parameters: f.take_reflection_list("parameters")?,
            },
            ReflectionKind::ConstructorSignature => ReflectionData::ConstructorSignature {
                parameters: f.take_reflection_list("parameters")?,
            },
            ReflectionKind::Parameter => ReflectionData::Parameter {
                default_value: f.take_string("default_value")?,
            },
            ReflectionKind::TypeLiteral => ReflectionData::TypeLiteral {
                signatures: f.take_reflection_list("signatures")?,
                index_signature: f.take_reflection("index_signature")?,
            },
            ReflectionKind::TypeParameter => ReflectionData::TypeParameter {
                default: f.take_type("default")?,
            },
            ReflectionKind::Accessor => ReflectionData::Accessor {
                get_signature: f.take_reflection("get_signature")?,
                set_signature: f.take_reflection("set_signature")?,
            },
            ReflectionKind::GetSignature => ReflectionData::GetSignature,
            ReflectionKind::SetSignature => ReflectionData::SetSignature {
                parameters: f.take_reflection_list("parameters")?,
            },
            ReflectionKind::TypeAlias => ReflectionData::TypeAlias,
            ReflectionKind::Reference => ReflectionData::Reference {
                target: ReflectionId(f.require_u32("target")?),
            },
        };
        Ok(data)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn type_record(&mut self, fields: Fields) -> Result<Type, DecodeError> {
        let mut f = FieldMap::new("type", fields);
        let discriminant = f.require_string("type")?;
        let kind = TypeKind::from_discriminant(&discriminant)
            .ok_or(DecodeError::UnknownTypeKind { discriminant })?;

        let ty = match kind {
            TypeKind::Array => Type::Array {
                element_type: f.require_boxed_type("element_type")?,
            },
            TypeKind::Intrinsic => Type::Intrinsic {
                name: f.require_string("name")?,
            },
            TypeKind::Literal => Type::Literal {
                value: f.take_scalar("value")?,
            },
            TypeKind::Reference => Type::Reference {
                name: f.require_string("name")?,
                target: f.take_type_target("target")?,
                package: f.take_string("package")?,
                type_arguments: f.take_type_list("type_arguments")?,
                qualified_name: f.take_string("qualified_name")?,
                refers_to_type_parameter: f.take_bool("refers_to_type_parameter")?,
            },
            TypeKind::Reflection => {
                let declaration = f
                    .take_reflection("declaration")?
                    .ok_or_else(|| DecodeError::missing("type", "declaration"))?;
                Type::Reflection { declaration }
            }
            TypeKind::Union => Type::Union {
                types: f.take_type_list("types")?,
            },
            TypeKind::Intersection => Type::Intersection {
                types: f.take_type_list("types")?,
            },
            TypeKind::Tuple => Type::Tuple {
                elements: f.take_type_list("elements")?,
            },
            TypeKind::Query => Type::Query {
                query_type: f.require_boxed_type("query_type")?,
            },
            TypeKind::TypeOperator => Type::TypeOperator {
                operator: f.require_string("operator")?,
                target: f.require_boxed_type("target")?,
            },
            TypeKind::Mapped => Type::Mapped {
                parameter: f.require_string("parameter")?,
                parameter_type: f.require_boxed_type("parameter_type")?,
                template_type: f.require_boxed_type("template_type")?,
                name_type: f.take_boxed_type("name_type")?,
                optional_modifier: f.take_string("optional_modifier")?,
                readonly_modifier: f.take_string("readonly_modifier")?,
            },
        };
        Ok(ty)
    }
}

// ============================================================================
// Leaf Shapes
// ============================================================================

fn target(fields: Fields) -> Result<Target, DecodeError> {
    let mut f = FieldMap::new("target descriptor", fields);
    Ok(Target {
        source_file_name: f.require_string("source_file_name")?,
        qualified_name: f.require_string("qualified_name")?,
    })
}

fn segment(fields: Fields) -> Result<CommentSegment, DecodeError> {
    let mut f = FieldMap::new("comment segment", fields);
    let raw = f.require_string("kind")?;
    let kind = SegmentKind::parse(&raw)
        .ok_or_else(|| DecodeError::invalid("comment segment", "kind", "text, code or inline-tag"))?;
    let text = f.require_string("text")?;
    let tag = f.take_string("tag")?;
    let target = match f.take("target") {
        None | Some(Node::Value(Value::Null)) => None,
        Some(Node::Value(Value::Number(n))) => {
            let id = n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| DecodeError::invalid("comment segment", "target", "unsigned integer"))?;
            Some(SegmentTarget::Symbol(ReflectionId(id)))
        }
        Some(Node::Value(Value::String(url))) => Some(SegmentTarget::Url(url)),
        Some(_) => {
            return Err(DecodeError::invalid(
                "comment segment",
                "target",
                "symbol id or URL string",
            ))
        }
    };
    Ok(CommentSegment {
        kind,
        text,
        tag,
        target,
    })
}

fn block_tag(fields: Fields) -> Result<BlockTag, DecodeError> {
    let mut f = FieldMap::new("block tag", fields);
    let kind = BlockTagKind::from_marker(&f.require_string("kind")?);
    let name = f.take_string("name")?;
    let content = f.take_segments("content")?;
    Ok(BlockTag {
        kind,
        name,
        content,
    })
}

fn comment(fields: Fields) -> Result<Comment, DecodeError> {
    let mut f = FieldMap::new("comment", fields);
    let summary = f.take_segments("summary")?;
    let block_tags = f.take_tags("block_tags")?;
    Ok(Comment {
        summary,
        block_tags,
    })
}

fn file_registry(node: Node) -> Result<FileRegistry, DecodeError> {
    let Node::Object(fields) = node else {
        return Err(DecodeError::invalid("project", "files", "object"));
    };
    let mut f = FieldMap::new("files", fields);

    let mut entries = BTreeMap::new();
    if let Some(node) = f.take("entries") {
        let Node::Object(map) = node else {
            return Err(DecodeError::invalid("files", "entries", "object"));
        };
        for (key, value) in map {
            let file_id = parse_file_id(&key, "entries")?;
            let Node::Value(Value::String(path)) = value else {
                return Err(DecodeError::invalid("files", "entries", "path strings"));
            };
            entries.insert(file_id, path);
        }
    }

    let mut reflections = BTreeMap::new();
    if let Some(node) = f.take("reflections") {
        let Node::Object(map) = node else {
            return Err(DecodeError::invalid("files", "reflections", "object"));
        };
        for (key, value) in map {
            let file_id = parse_file_id(&key, "reflections")?;
            let Node::Value(Value::Number(n)) = value else {
                return Err(DecodeError::invalid("files", "reflections", "declaration ids"));
            };
            let declaration = n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| DecodeError::invalid("files", "reflections", "declaration ids"))?;
            reflections.insert(file_id, ReflectionId(declaration));
        }
    }

    Ok(FileRegistry::new(entries, reflections))
}

fn parse_file_id(key: &str, field: &'static str) -> Result<u32, DecodeError> {
    key.parse::<u32>()
        .map_err(|_| DecodeError::invalid("files", field, "integer keys"))
}

// ============================================================================
// Field Extraction
// ============================================================================

/// Decoded field map of one object, with context-carrying extraction
/// helpers. Every helper removes the field it reads, so misclassified
/// leftovers never alias typed data.
struct FieldMap {
    context: &'static str,
    fields: Fields,
}

impl FieldMap {
    fn new(context: &'static str, fields: Fields) -> Self {
        FieldMap { context, fields }
    }

    fn take(&mut self, name: &str) -> Option<Node> {
        match self.fields.remove(name) {
            Some(Node::Value(Value::Null)) | None => None,
            some => some,
        }
    }

    fn require(&mut self, name: &str) -> Result<Node, DecodeError> {
        self.take(name)
            .ok_or_else(|| DecodeError::missing(self.context, name))
    }

    fn require_string(&mut self, name: &str) -> Result<String, DecodeError> {
        match self.require(name)? {
            Node::Value(Value::String(s)) => Ok(s),
            _ => Err(DecodeError::invalid(self.context, name, "string")),
        }
    }

    fn take_string(&mut self, name: &str) -> Result<Option<String>, DecodeError> {
        match self.take(name) {
            None => Ok(None),
            Some(Node::Value(Value::String(s))) => Ok(Some(s)),
            Some(_) => Err(DecodeError::invalid(self.context, name, "string")),
        }
    }

    fn require_u64(&mut self, name: &str) -> Result<u64, DecodeError> {
        match self.require(name)? {
            Node::Value(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| DecodeError::invalid(self.context, name, "unsigned integer")),
            _ => Err(DecodeError::invalid(self.context, name, "unsigned integer")),
        }
    }

    fn require_u32(&mut self, name: &str) -> Result<u32, DecodeError> {
        u32::try_from(self.require_u64(name)?)
            .map_err(|_| DecodeError::invalid(self.context, name, "32-bit unsigned integer"))
    }

    fn take_bool(&mut self, name: &str) -> Result<bool, DecodeError> {
        match self.take(name) {
            None => Ok(false),
            Some(Node::Value(Value::Bool(b))) => Ok(b),
            Some(_) => Err(DecodeError::invalid(self.context, name, "boolean")),
        }
    }

    fn take_scalar(&mut self, name: &str) -> Result<Value, DecodeError> {
        match self.fields.remove(name) {
            None => Ok(Value::Null),
            Some(Node::Value(value)) => Ok(value),
            Some(_) => Err(DecodeError::invalid(self.context, name, "scalar value")),
        }
    }

    fn take_type(&mut self, name: &str) -> Result<Option<Type>, DecodeError> {
        match self.take(name) {
            None => Ok(None),
            Some(Node::Type(ty)) => Ok(Some(ty)),
            Some(_) => Err(DecodeError::invalid(self.context, name, "type record")),
        }
    }

    fn require_boxed_type(&mut self, name: &str) -> Result<Box<Type>, DecodeError> {
        self.take_type(name)?
            .map(Box::new)
            .ok_or_else(|| DecodeError::missing(self.context, name))
    }

    fn take_boxed_type(&mut self, name: &str) -> Result<Option<Box<Type>>, DecodeError> {
        Ok(self.take_type(name)?.map(Box::new))
    }

    fn take_type_list(&mut self, name: &str) -> Result<Vec<Type>, DecodeError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(Node::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Node::Type(ty) => Ok(ty),
                    _ => Err(DecodeError::invalid(self.context, name, "type records")),
                })
                .collect(),
            Some(_) => Err(DecodeError::invalid(self.context, name, "array of type records")),
        }
    }

    fn take_type_target(&mut self, name: &str) -> Result<Option<TypeTarget>, DecodeError> {
        match self.take(name) {
            None => Ok(None),
            Some(Node::Value(Value::Number(n))) => {
                let id = n
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| DecodeError::invalid(self.context, name, "unsigned integer"))?;
                Ok(Some(TypeTarget::Symbol(ReflectionId(id))))
            }
            Some(Node::Target(target)) => Ok(Some(TypeTarget::Unresolved(target))),
            Some(_) => Err(DecodeError::invalid(
                self.context,
                name,
                "symbol id or target descriptor",
            )),
        }
    }

    fn take_reflection(&mut self, name: &str) -> Result<Option<ReflectionId>, DecodeError> {
        match self.take(name) {
            None => Ok(None),
            Some(Node::Reflection(id)) => Ok(Some(id)),
            Some(_) => Err(DecodeError::invalid(self.context, name, "reflection object")),
        }
    }

    fn take_reflection_list(&mut self, name: &str) -> Result<Vec<ReflectionId>, DecodeError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(Node::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Node::Reflection(id) => Ok(id),
                    _ => Err(DecodeError::invalid(self.context, name, "reflection objects")),
                })
                .collect(),
            Some(_) => Err(DecodeError::invalid(
                self.context,
                name,
                "array of reflection objects",
            )),
        }
    }

    /// Signature type parameters: the extractor has emitted both the
    /// singular `typeParameter` and the plural `typeParameters` key across
    /// versions.
    fn take_type_parameters(&mut self) -> Result<Vec<ReflectionId>, DecodeError> {
        let ids = self.take_reflection_list("type_parameter")?;
        if ids.is_empty() {
            return self.take_reflection_list("type_parameters");
        }
        Ok(ids)
    }

    fn take_segments(&mut self, name: &str) -> Result<Vec<CommentSegment>, DecodeError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(Node::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Node::Segment(segment) => Ok(segment),
                    _ => Err(DecodeError::invalid(self.context, name, "comment segments")),
                })
                .collect(),
            Some(_) => Err(DecodeError::invalid(
                self.context,
                name,
                "array of comment segments",
            )),
        }
    }

    fn take_tags(&mut self, name: &str) -> Result<Vec<BlockTag>, DecodeError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(Node::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Node::Tag(tag) => Ok(tag),
                    _ => Err(DecodeError::invalid(self.context, name, "block tags")),
                })
                .collect(),
            Some(_) => Err(DecodeError::invalid(self.context, name, "array of block tags")),
        }
    }

    fn take_comment(&mut self, name: &str) -> Result<Option<Comment>, DecodeError> {
        match self.take(name) {
            None => Ok(None),
            Some(Node::Comment(comment)) => Ok(Some(comment)),
            Some(_) => Err(DecodeError::invalid(self.context, name, "comment object")),
        }
    }

    fn take_flags(&mut self, name: &str) -> Result<BTreeMap<String, bool>, DecodeError> {
        match self.take(name) {
            None => Ok(BTreeMap::new()),
            Some(Node::Object(map)) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Node::Value(Value::Bool(b)) => Ok((key, b)),
                    _ => Err(DecodeError::invalid(self.context, name, "boolean flags")),
                })
                .collect(),
            Some(_) => Err(DecodeError::invalid(self.context, name, "flags object")),
        }
    }

    fn take_groups(&mut self, name: &str) -> Result<Vec<Group>, DecodeError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(Node::Array(items)) => items.into_iter().map(group).collect(),
            Some(_) => Err(DecodeError::invalid(self.context, name, "array of groups")),
        }
    }

    fn take_sources(&mut self, name: &str) -> Result<Vec<Source>, DecodeError> {
        match self.take(name) {
            None => Ok(Vec::new()),
            Some(Node::Array(items)) => items.into_iter().map(source).collect(),
            Some(_) => Err(DecodeError::invalid(self.context, name, "array of sources")),
        }
    }
}

fn group(node: Node) -> Result<Group, DecodeError> {
    let Node::Object(fields) = node else {
        return Err(DecodeError::invalid("group", "group", "object"));
    };
    let mut f = FieldMap::new("group", fields);
    let title = f.require_string("title")?;
    let children = match f.take("children") {
        None => Vec::new(),
        Some(Node::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Node::Value(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .map(ReflectionId)
                    .ok_or_else(|| DecodeError::invalid("group", "children", "declaration ids")),
                _ => Err(DecodeError::invalid("group", "children", "declaration ids")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(DecodeError::invalid("group", "children", "array of ids")),
    };
    Ok(Group { title, children })
}

fn source(node: Node) -> Result<Source, DecodeError> {
    let Node::Object(fields) = node else {
        return Err(DecodeError::invalid("source", "source", "object"));
    };
    let mut f = FieldMap::new("source", fields);
    Ok(Source {
        file_name: f.require_string("file_name")?,
        line: f.require_u32("line")?,
        character: f.require_u32("character")?,
        url: f.take_string("url")?,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod key_normalization {
        use super::*;

        #[test]
        fn camel_case_becomes_snake_case() {
            assert_eq!(snake_key("sourceFileName"), "source_file_name");
            assert_eq!(snake_key("extendedTypes"), "extended_types");
            assert_eq!(snake_key("qualifiedName"), "qualified_name");
        }

        #[test]
        fn snake_case_passes_through() {
            assert_eq!(snake_key("source_file_name"), "source_file_name");
            assert_eq!(snake_key("name"), "name");
            assert_eq!(snake_key("1"), "1");
        }
    }

    mod predicates {
        use super::*;

        fn fields(pairs: Vec<(&str, Node)>) -> Fields {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        }

        fn string(s: &str) -> Node {
            Node::Value(Value::String(s.to_string()))
        }

        fn number(n: u64) -> Node {
            Node::Value(Value::Number(n.into()))
        }

        #[test]
        fn reflection_shape_needs_numeric_kind() {
            let shape = fields(vec![
                ("variant", string("declaration")),
                ("id", number(1)),
                ("kind", number(0x80)),
            ]);
            assert!(is_reflection_shape(&shape));

            let string_kind = fields(vec![
                ("variant", string("declaration")),
                ("id", number(1)),
                ("kind", string("text")),
            ]);
            assert!(!is_reflection_shape(&string_kind));
        }

        #[test]
        fn target_shape_needs_both_names() {
            let shape = fields(vec![
                ("source_file_name", string("a.ts")),
                ("qualified_name", string("Foo")),
            ]);
            assert!(is_target_shape(&shape));
            let partial = fields(vec![("qualified_name", string("Foo"))]);
            assert!(!is_target_shape(&partial));
        }

        #[test]
        fn type_shape_needs_string_discriminant() {
            assert!(is_type_shape(&fields(vec![("type", string("union"))])));
            assert!(!is_type_shape(&fields(vec![("type", number(2))])));
        }

        #[test]
        fn segment_shape_recognizes_known_kinds() {
            for kind in ["text", "code", "inline-tag"] {
                assert!(is_segment_shape(&fields(vec![
                    ("kind", string(kind)),
                    ("text", string("x"))
                ])));
            }
            assert!(!is_segment_shape(&fields(vec![("kind", string("@param"))])));
        }

        #[test]
        fn block_tag_shape_needs_marker_and_content() {
            let shape = fields(vec![("kind", string("@param")), ("content", Node::Array(vec![]))]);
            assert!(is_block_tag_shape(&shape));
            let inline = fields(vec![("kind", string("{@link}")), ("content", Node::Array(vec![]))]);
            assert!(is_block_tag_shape(&inline));
            let no_content = fields(vec![("kind", string("@param"))]);
            assert!(!is_block_tag_shape(&no_content));
        }

        #[test]
        fn comment_shape_needs_summary() {
            assert!(is_comment_shape(&fields(vec![(
                "summary",
                Node::Array(vec![])
            )])));
            assert!(!is_comment_shape(&fields(vec![("text", string("x"))])));
        }

        #[test]
        fn reflection_shape_wins_over_type_shape() {
            // An object matching both predicates must decode as a
            // reflection: the reflection shape is the most specific.
            let shape = fields(vec![
                ("variant", string("declaration")),
                ("id", number(1)),
                ("kind", number(0x20)),
                ("type", string("intrinsic")),
            ]);
            assert!(is_reflection_shape(&shape));
            assert!(is_type_shape(&shape));
        }
    }

    mod passthrough {
        use super::*;
        use serde_json::json;

        #[test]
        fn unrecognized_objects_pass_through() {
            let mut decoder = Decoder::default();
            let node = decoder
                .node(json!({"custom": {"nested": [1, 2]}}))
                .unwrap();
            let Node::Object(fields) = node else {
                panic!("expected passthrough object");
            };
            assert!(matches!(fields.get("custom"), Some(Node::Object(_))));
        }
    }
}
