//! Comment model: structured documentation comments.
//!
//! A comment is an ordered summary of segments plus block tags. Segments
//! may carry a cross-reference target: an integer symbol id (resolved
//! through the project symbol map at render time) or an external URL.
//! The set of recognized tag markers is open upstream, so unknown markers
//! are preserved as [`BlockTagKind::Other`] instead of failing the decode.

use serde::Serialize;

use crate::error::ResolveError;
use crate::reflection::{Project, ReflectionId};

// ============================================================================
// Segments
// ============================================================================

/// Kind of a comment content segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Text,
    Code,
    InlineTag,
}

impl SegmentKind {
    /// Parse the raw segment `kind` string.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "text" => Some(SegmentKind::Text),
            "code" => Some(SegmentKind::Code),
            "inline-tag" => Some(SegmentKind::InlineTag),
            _ => None,
        }
    }
}

/// Cross-reference target of a segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SegmentTarget {
    /// Symbol id, resolved through the project symbol map.
    Symbol(ReflectionId),
    /// External URL, rendered as a direct link.
    Url(String),
}

/// One piece of comment content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentSegment {
    pub kind: SegmentKind,
    pub text: String,
    /// Tag marker for inline-tag segments, e.g. `@link`.
    pub tag: Option<String>,
    pub target: Option<SegmentTarget>,
}

impl CommentSegment {
    /// Render this segment as markdown.
    ///
    /// A symbol target renders as a reference-style link labeled with the
    /// target's computed path when a project is supplied, and as plain
    /// text when it is not. A URL target renders as a standard link. Ids
    /// absent from the symbol map fail with
    /// [`ResolveError::UnresolvedSymbol`].
    pub fn markdown(&self, symbols: Option<&Project>) -> Result<String, ResolveError> {
        match (&self.target, symbols) {
            (Some(SegmentTarget::Symbol(id)), Some(project)) => {
                let path = project.path(*id)?;
                Ok(format!("[{}][{}]", self.text, path))
            }
            (Some(SegmentTarget::Url(url)), _) => Ok(format!("[{}]({})", self.text, url)),
            _ => Ok(self.text.clone()),
        }
    }
}

// ============================================================================
// Block Tags
// ============================================================================

/// Recognized documentation tag markers.
///
/// Markers outside the known set are carried through as `Other` so new
/// upstream tags degrade gracefully instead of rejecting the comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BlockTagKind {
    Alpha,
    Beta,
    Category,
    DefaultValue,
    Deprecated,
    Enum,
    Event,
    EventProperty,
    Example,
    Experimental,
    Group,
    Hidden,
    Ignore,
    InheritDoc,
    Interface,
    Internal,
    Label,
    Link,
    Module,
    Namespace,
    Overload,
    Override,
    PackageDocumentation,
    Param,
    Private,
    PrivateRemarks,
    Property,
    Protected,
    Public,
    Readonly,
    Remarks,
    Returns,
    Satisfies,
    Sealed,
    See,
    Template,
    Throws,
    TypeParam,
    Virtual,
    /// Marker not in the known set, preserved verbatim.
    Other(String),
}

impl BlockTagKind {
    /// Classify a raw tag marker. Never fails; unknown markers map to
    /// [`BlockTagKind::Other`].
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "@alpha" => BlockTagKind::Alpha,
            "@beta" => BlockTagKind::Beta,
            "@category" => BlockTagKind::Category,
            "@defaultValue" => BlockTagKind::DefaultValue,
            "@deprecated" => BlockTagKind::Deprecated,
            "@enum" => BlockTagKind::Enum,
            "@event" => BlockTagKind::Event,
            "@eventProperty" => BlockTagKind::EventProperty,
            "@example" => BlockTagKind::Example,
            "@experimental" => BlockTagKind::Experimental,
            "@group" => BlockTagKind::Group,
            "@hidden" => BlockTagKind::Hidden,
            "@ignore" => BlockTagKind::Ignore,
            "{@inheritDoc}" => BlockTagKind::InheritDoc,
            "@interface" => BlockTagKind::Interface,
            "@internal" => BlockTagKind::Internal,
            "{@label}" => BlockTagKind::Label,
            "{@link}" => BlockTagKind::Link,
            "@module" => BlockTagKind::Module,
            "@namespace" => BlockTagKind::Namespace,
            "@overload" => BlockTagKind::Overload,
            "@override" => BlockTagKind::Override,
            "@packageDocumentation" => BlockTagKind::PackageDocumentation,
            "@param" => BlockTagKind::Param,
            "@private" => BlockTagKind::Private,
            "@privateRemarks" => BlockTagKind::PrivateRemarks,
            "@property" => BlockTagKind::Property,
            "@protected" => BlockTagKind::Protected,
            "@public" => BlockTagKind::Public,
            "@readonly" => BlockTagKind::Readonly,
            "@remarks" => BlockTagKind::Remarks,
            "@returns" => BlockTagKind::Returns,
            "@satisfies" => BlockTagKind::Satisfies,
            "@sealed" => BlockTagKind::Sealed,
            "@see" => BlockTagKind::See,
            "@template" => BlockTagKind::Template,
            "@throws" => BlockTagKind::Throws,
            "@typeParam" => BlockTagKind::TypeParam,
            "@virtual" => BlockTagKind::Virtual,
            other => BlockTagKind::Other(other.to_string()),
        }
    }

    /// The raw marker string.
    pub fn marker(&self) -> &str {
        match self {
            BlockTagKind::Alpha => "@alpha",
            BlockTagKind::Beta => "@beta",
            BlockTagKind::Category => "@category",
            BlockTagKind::DefaultValue => "@defaultValue",
            BlockTagKind::Deprecated => "@deprecated",
            BlockTagKind::Enum => "@enum",
            BlockTagKind::Event => "@event",
            BlockTagKind::EventProperty => "@eventProperty",
            BlockTagKind::Example => "@example",
            BlockTagKind::Experimental => "@experimental",
            BlockTagKind::Group => "@group",
            BlockTagKind::Hidden => "@hidden",
            BlockTagKind::Ignore => "@ignore",
            BlockTagKind::InheritDoc => "{@inheritDoc}",
            BlockTagKind::Interface => "@interface",
            BlockTagKind::Internal => "@internal",
            BlockTagKind::Label => "{@label}",
            BlockTagKind::Link => "{@link}",
            BlockTagKind::Module => "@module",
            BlockTagKind::Namespace => "@namespace",
            BlockTagKind::Overload => "@overload",
            BlockTagKind::Override => "@override",
            BlockTagKind::PackageDocumentation => "@packageDocumentation",
            BlockTagKind::Param => "@param",
            BlockTagKind::Private => "@private",
            BlockTagKind::PrivateRemarks => "@privateRemarks",
            BlockTagKind::Property => "@property",
            BlockTagKind::Protected => "@protected",
            BlockTagKind::Public => "@public",
            BlockTagKind::Readonly => "@readonly",
            BlockTagKind::Remarks => "@remarks",
            BlockTagKind::Returns => "@returns",
            BlockTagKind::Satisfies => "@satisfies",
            BlockTagKind::Sealed => "@sealed",
            BlockTagKind::See => "@see",
            BlockTagKind::Template => "@template",
            BlockTagKind::Throws => "@throws",
            BlockTagKind::TypeParam => "@typeParam",
            BlockTagKind::Virtual => "@virtual",
            BlockTagKind::Other(marker) => marker,
        }
    }
}

/// A named documentation annotation, e.g. `@param x ...`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTag {
    pub kind: BlockTagKind,
    /// Parameter name for tags like `@param`.
    pub name: Option<String>,
    pub content: Vec<CommentSegment>,
}

impl BlockTag {
    /// Render the tag content as markdown, segments concatenated in order.
    pub fn markdown(&self, symbols: Option<&Project>) -> Result<String, ResolveError> {
        render_segments(&self.content, symbols)
    }
}

// ============================================================================
// Comments
// ============================================================================

/// A structured documentation comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub summary: Vec<CommentSegment>,
    pub block_tags: Vec<BlockTag>,
}

impl Comment {
    /// Render the summary as markdown, segments concatenated in order.
    pub fn markdown(&self, symbols: Option<&Project>) -> Result<String, ResolveError> {
        render_segments(&self.summary, symbols)
    }

    /// The block tags with the given kind, in document order.
    pub fn tags<'a>(&'a self, kind: &'a BlockTagKind) -> impl Iterator<Item = &'a BlockTag> + 'a {
        self.block_tags.iter().filter(move |tag| tag.kind == *kind)
    }
}

fn render_segments(
    segments: &[CommentSegment],
    symbols: Option<&Project>,
) -> Result<String, ResolveError> {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&segment.markdown(symbols)?);
    }
    Ok(out)
}

// ============================================================================
// Tests
// ============================================================================
