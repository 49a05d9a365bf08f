//! Converter from structure trees to plain, serializable snapshots.
//!
//! A snapshot captures the shape of a structure tree (roles, pages,
//! marked-content ids, accessibility attributes) detached from the document,
//! so it can be inspected, compared or exported as JSON after the document
//! is gone.
//!
//! PDF Spec: ISO 32000-1:2008, Section 14.7-14.9

use super::element::Element;
use super::kids::Kids;
use super::tree::Tree;
use super::types::Node;
use crate::error::Result;
use serde::Serialize;

/// Detached copy of a structure element and its descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementSnapshot {
    /// Standardized role
    pub role: String,

    /// Raw structure type, before the role map
    pub struct_type: String,

    /// Zero-based index of the element's page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,

    /// Marked-content ids of the direct children, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mcids: Vec<i64>,

    /// Number of annotations and XObjects among the direct children
    #[serde(skip_serializing_if = "is_zero")]
    pub objects: usize,

    /// Alternate description (`/Alt`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,

    /// Replacement text (`/ActualText`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_text: Option<String>,

    /// Language (`/Lang`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Nested elements, in document order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSnapshot>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ElementSnapshot {
    fn shallow(el: &Element) -> Self {
        Self {
            role: el.role().to_string(),
            struct_type: el.struct_type().to_string(),
            page_index: el.page().map(|page| page.index()),
            alt_text: el.alt_text(),
            actual_text: el.actual_text(),
            lang: el.lang(),
            ..Self::default()
        }
    }

    /// Number of elements in this subtree, including this one.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(snapshot) = stack.pop() {
            count += 1;
            stack.extend(snapshot.children.iter());
        }
        count
    }
}

struct Frame {
    snapshot: ElementSnapshot,
    kids: Kids,
}

/// Snapshot every top-level element of `tree`.
///
/// Content leaves directly under the root have no element to belong to and
/// are left out.
pub fn snapshot_tree(tree: &Tree) -> Vec<ElementSnapshot> {
    build(tree.children(), Vec::new())
}

/// Snapshot `el` and its descendants.
pub fn snapshot_element(el: &Element) -> ElementSnapshot {
    let frame = Frame {
        snapshot: ElementSnapshot::shallow(el),
        kids: el.children(),
    };
    build(Kids::empty(el.docref()), vec![frame])
        .pop()
        .unwrap_or_default()
}

/// Serialize snapshots as pretty-printed JSON.
///
/// # Arguments
///
/// * `snapshots` - Snapshots from [`snapshot_tree`] or [`snapshot_element`]
///
/// # Returns
///
/// The JSON text, or [`Error::Serialization`](crate::error::Error::Serialization)
pub fn to_json(snapshots: &[ElementSnapshot]) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshots)?)
}

fn build(mut top: Kids, mut stack: Vec<Frame>) -> Vec<ElementSnapshot> {
    let mut roots = Vec::new();
    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.kids.next(),
            None => top.next(),
        };
        match next {
            Some(Node::Element(el)) => {
                stack.push(Frame {
                    snapshot: ElementSnapshot::shallow(&el),
                    kids: el.children(),
                });
            },
            Some(Node::Item(item)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.snapshot.mcids.push(item.mcid());
                }
            },
            Some(Node::Object(_)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.snapshot.objects += 1;
                }
            },
            None => match stack.pop() {
                Some(done) => match stack.last_mut() {
                    Some(parent) => parent.snapshot.children.push(done.snapshot),
                    None => roots.push(done.snapshot),
                },
                None => break,
            },
        }
    }
    roots
}
