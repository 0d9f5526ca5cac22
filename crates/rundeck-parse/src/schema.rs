//! Parse-table schema model
//!
//! A schema node declares the shape a tag is expected to take and how its
//! content becomes a native value. Schemas are plain data: built once,
//! never mutated, and shared between parent tables by reference. The
//! [engine](crate::engine) interprets them against an XML element tree.

use std::sync::Arc;

/// Declarative description of one expected XML shape.
///
/// Constructors return `Arc<Schema>` so that one table can be referenced
/// from several parents, the way a node list schema serves both the
/// successful and the failed node list of an execution.
#[derive(Clone, Debug)]
pub enum Schema {
    /// The tag's text content becomes the value
    Text { tag: String },
    /// The tag's attributes become a map keyed by attribute name
    Attribute { tag: String },
    /// Attributes plus the text content, inserted under `text_key`
    AttributeText { tag: String, text_key: String },
    /// A tag with named, shape-distinct children; `required` must all be
    /// present, `optional` may be
    Composite {
        tag: String,
        required: Vec<Arc<Schema>>,
        optional: Vec<Arc<Schema>>,
    },
    /// A tag holding a homogeneous sequence of `element` children. Unless
    /// `skip_count` is set, the tag must carry a `count` attribute equal to
    /// the number of matched children.
    List {
        tag: String,
        element: Arc<Schema>,
        skip_count: bool,
    },
    /// Mutually exclusive candidate shapes, resolved by first match in
    /// declaration order
    Alternatives { candidates: Vec<Arc<Schema>> },
}

impl Schema {
    pub fn text(tag: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Text { tag: tag.into() })
    }

    pub fn attribute(tag: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Attribute { tag: tag.into() })
    }

    pub fn attribute_text(tag: impl Into<String>, text_key: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::AttributeText {
            tag: tag.into(),
            text_key: text_key.into(),
        })
    }

    pub fn composite(
        tag: impl Into<String>,
        required: impl IntoIterator<Item = Arc<Self>>,
        optional: impl IntoIterator<Item = Arc<Self>>,
    ) -> Arc<Self> {
        Arc::new(Self::Composite {
            tag: tag.into(),
            required: required.into_iter().collect(),
            optional: optional.into_iter().collect(),
        })
    }

    /// A list whose `count` attribute is validated against the matched
    /// element count
    pub fn list(tag: impl Into<String>, element: Arc<Self>) -> Arc<Self> {
        Arc::new(Self::List {
            tag: tag.into(),
            element,
            skip_count: false,
        })
    }

    /// A list carrying no trustworthy `count` attribute; none is read
    pub fn uncounted_list(tag: impl Into<String>, element: Arc<Self>) -> Arc<Self> {
        Arc::new(Self::List {
            tag: tag.into(),
            element,
            skip_count: true,
        })
    }

    pub fn alternatives(candidates: impl IntoIterator<Item = Arc<Self>>) -> Arc<Self> {
        Arc::new(Self::Alternatives {
            candidates: candidates.into_iter().collect(),
        })
    }

    /// The tag this schema matches, or `None` for alternatives (which match
    /// whatever their candidates match)
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Text { tag }
            | Self::Attribute { tag }
            | Self::AttributeText { tag, .. }
            | Self::Composite { tag, .. }
            | Self::List { tag, .. } => Some(tag),
            Self::Alternatives { .. } => None,
        }
    }

    /// Whether an element with the given tag name is a lookup match for this
    /// schema. Resolves through nested alternatives so that a parent can
    /// select children for a schema whose candidates share one tag.
    pub fn matches_tag(&self, name: &str) -> bool {
        match self {
            Self::Alternatives { candidates } => {
                candidates.iter().any(|candidate| candidate.matches_tag(name))
            }
            _ => self.tag() == Some(name),
        }
    }

    /// Human-readable tag description for diagnostics: the declared tag, or
    /// the candidate tags joined with `|`
    pub fn tag_names(&self) -> String {
        match self {
            Self::Alternatives { candidates } => {
                let mut names: Vec<String> =
                    candidates.iter().map(|candidate| candidate.tag_names()).collect();
                names.dedup();
                names.join("|")
            }
            _ => self.tag().unwrap_or_default().to_string(),
        }
    }
}
