//! Types shared across the structure tree.
//!
//! Implements structure element types according to ISO 32000-1:2008 Section 14.7.2.

use super::content::{ContentItem, ContentObject};
use super::element::Element;
use crate::geometry::Rect;
use crate::page::Page;
use crate::registry::PageRef;
use std::sync::Arc;

pub(crate) const TYPE_MCR: &str = "MCR";
pub(crate) const TYPE_OBJR: &str = "OBJR";
pub(crate) const TYPE_STRUCT_TREE_ROOT: &str = "StructTreeRoot";
pub(crate) const TYPE_STRUCT_ELEM: &str = "StructElem";
/// Object type reported by [`ContentObject::object_type`] for annotations.
pub const TYPE_ANNOT: &str = "Annot";
/// Object type reported by [`ContentObject::object_type`] for XObjects.
pub const TYPE_XOBJECT: &str = "XObject";
pub(crate) const SUBTYPE_IMAGE: &str = "Image";

/// A child in the structure tree: an element or one of the two leaf kinds.
#[derive(Debug, Clone)]
pub enum Node {
    /// A nested structure element
    Element(Element),
    /// A marked-content section
    Item(ContentItem),
    /// A whole annotation or XObject
    Object(ContentObject),
}

impl Node {
    /// Standardized role, for elements only.
    pub fn role(&self) -> Option<&str> {
        match self {
            Node::Element(el) => Some(el.role()),
            _ => None,
        }
    }

    /// Whether this node is a structure element.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Borrow the element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Take the element, if this is one.
    pub fn into_element(self) -> Option<Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Page the node belongs to, if known and alive.
    pub fn page(&self) -> Option<Arc<Page>> {
        match self {
            Node::Element(el) => el.page(),
            Node::Item(item) => item.page(),
            Node::Object(obj) => obj.page(),
        }
    }

    /// Bounding box in device space, `None` if undefined.
    pub fn bbox(&self) -> Option<Rect> {
        match self {
            Node::Element(el) => el.bbox(),
            Node::Item(item) => item.bbox(),
            Node::Object(obj) => obj.bbox(),
        }
    }
}

/// A leaf of the structure tree: physical content realizing an element.
#[derive(Debug, Clone)]
pub enum Content {
    /// A marked-content section
    Item(ContentItem),
    /// A whole annotation or XObject
    Object(ContentObject),
}

impl Content {
    /// Weak handle to the owning page.
    pub fn pageref(&self) -> Option<PageRef> {
        match self {
            Content::Item(item) => item.pageref(),
            Content::Object(obj) => Some(obj.pageref()),
        }
    }

    /// Bounding box in device space, `None` if undefined.
    pub fn bbox(&self) -> Option<Rect> {
        match self {
            Content::Item(item) => item.bbox(),
            Content::Object(obj) => obj.bbox(),
        }
    }

    /// Text of a marked-content section; objects carry no text.
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Item(item) => item.text(),
            Content::Object(_) => None,
        }
    }
}

impl From<Content> for Node {
    fn from(content: Content) -> Self {
        match content {
            Content::Item(item) => Node::Item(item),
            Content::Object(obj) => Node::Object(obj),
        }
    }
}

/// Standard structure types from PDF spec Section 14.8.4.
///
/// Custom types are mapped to standard types through the tree's role map;
/// anything still unknown after mapping is kept as [`StructType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructType {
    // Document-level structure types
    /// Document root
    Document,
    /// Part (major division)
    Part,
    /// Article
    Art,
    /// Section
    Sect,
    /// Division
    Div,

    // Paragraph-level structure types
    /// Paragraph
    P,
    /// Heading (unnumbered)
    H,
    /// Heading level 1
    H1,
    /// Heading level 2
    H2,
    /// Heading level 3
    H3,
    /// Heading level 4
    H4,
    /// Heading level 5
    H5,
    /// Heading level 6
    H6,

    // List structure types
    /// List
    L,
    /// List item
    LI,
    /// Label (list item marker)
    Lbl,
    /// List body (list item content)
    LBody,

    // Table structure types
    /// Table
    Table,
    /// Table row
    TR,
    /// Table header cell
    TH,
    /// Table data cell
    TD,
    /// Table header group
    THead,
    /// Table body group
    TBody,
    /// Table footer group
    TFoot,

    // Inline structure types
    /// Span (inline generic)
    Span,
    /// Quote
    Quote,
    /// Note
    Note,
    /// Reference
    Reference,
    /// Bibliographic entry
    BibEntry,
    /// Code
    Code,
    /// Link
    Link,
    /// Annotation
    Annot,

    // Illustration structure types
    /// Figure
    Figure,
    /// Formula
    Formula,
    /// Form (input field)
    Form,

    /// Custom structure type not defined in the PDF specification
    Custom(String),
}

impl StructType {
    /// Classify a role name (e.g. "P", "H1").
    pub fn from_name(s: &str) -> Self {
        match s {
            "Document" => Self::Document,
            "Part" => Self::Part,
            "Art" => Self::Art,
            "Sect" => Self::Sect,
            "Div" => Self::Div,
            "P" => Self::P,
            "H" => Self::H,
            "H1" => Self::H1,
            "H2" => Self::H2,
            "H3" => Self::H3,
            "H4" => Self::H4,
            "H5" => Self::H5,
            "H6" => Self::H6,
            "L" => Self::L,
            "LI" => Self::LI,
            "Lbl" => Self::Lbl,
            "LBody" => Self::LBody,
            "Table" => Self::Table,
            "TR" => Self::TR,
            "TH" => Self::TH,
            "TD" => Self::TD,
            "THead" => Self::THead,
            "TBody" => Self::TBody,
            "TFoot" => Self::TFoot,
            "Span" => Self::Span,
            "Quote" => Self::Quote,
            "Note" => Self::Note,
            "Reference" => Self::Reference,
            "BibEntry" => Self::BibEntry,
            "Code" => Self::Code,
            "Link" => Self::Link,
            "Annot" => Self::Annot,
            "Figure" => Self::Figure,
            "Formula" => Self::Formula,
            "Form" => Self::Form,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Check if this is a heading type (H, H1-H6)
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::H | Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6)
    }

    /// Heading level, 1-6, for numbered headings.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            _ => None,
        }
    }

    /// Check if this is a block-level element
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::Part
                | Self::Art
                | Self::Sect
                | Self::Div
                | Self::P
                | Self::H
                | Self::H1
                | Self::H2
                | Self::H3
                | Self::H4
                | Self::H5
                | Self::H6
                | Self::Table
                | Self::Figure
                | Self::Formula
        )
    }
}
