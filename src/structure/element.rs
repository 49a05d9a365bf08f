//! Structure elements (ISO 32000-1:2008, Section 14.7.2).

use super::kids::{Ancestry, Kids};
use super::traversal::Findable;
use super::tree::Tree;
use super::types::{Content, Node, StructType, TYPE_STRUCT_TREE_ROOT};
use crate::diagnostics::DiagnosticKind;
use crate::document::Document;
use crate::geometry::{bound_rects, Rect};
use crate::object::{decode_text_string, rect_value, Dictionary, Object, ObjectRef};
use crate::page::Page;
use crate::registry::{DocumentRef, PageRef};
use std::cell::OnceCell;
use std::sync::Arc;

/// A node of the structure tree.
///
/// Elements are cheap views over a structure element dictionary. They are
/// built on demand whenever a traversal needs one and never deduplicated;
/// two `Element`s may describe the same dictionary.
#[derive(Debug, Clone)]
pub struct Element {
    docref: DocumentRef,
    objid: Option<ObjectRef>,
    props: Dictionary,
    ancestry: Ancestry,
    role: OnceCell<String>,
    pageref: OnceCell<Option<PageRef>>,
}

/// What a `/P` entry points at.
#[derive(Debug, Clone)]
pub enum Parent {
    /// The structure tree root
    Tree(Arc<Tree>),
    /// Another structure element
    Element(Element),
}

impl Element {
    /// Wrap a structure element dictionary.
    pub fn new(docref: DocumentRef, objid: Option<ObjectRef>, props: Dictionary) -> Self {
        Self {
            docref,
            objid,
            props,
            ancestry: Ancestry::default().with_opt(objid),
            role: OnceCell::new(),
            pageref: OnceCell::new(),
        }
    }

    /// Place the element below the arrays and elements in `ancestry`.
    pub(crate) fn within(mut self, ancestry: &Ancestry) -> Self {
        self.ancestry = ancestry.with_opt(self.objid);
        self
    }

    /// Use `role` instead of looking the type up in the role map.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = OnceCell::from(role.into());
        self
    }

    /// Weak handle to the owning document.
    pub fn docref(&self) -> DocumentRef {
        self.docref
    }

    /// Object id of the element dictionary, if it was indirect.
    pub fn objid(&self) -> Option<ObjectRef> {
        self.objid
    }

    /// Raw element dictionary.
    pub fn props(&self) -> &Dictionary {
        &self.props
    }

    /// The owning document, if still alive.
    pub fn doc(&self) -> Option<Arc<Document>> {
        self.docref.upgrade()
    }

    /// Raw structure type (`/S`), empty if missing or not a name.
    pub fn struct_type(&self) -> &str {
        self.props
            .get("S")
            .and_then(|obj| obj.as_name())
            .unwrap_or("")
    }

    /// Structure type mapped through the tree's role map.
    ///
    /// Falls back to [`struct_type`](Self::struct_type) when unmapped, when
    /// the document has no role map, or when the document is gone.
    pub fn role(&self) -> &str {
        self.role.get_or_init(|| {
            let struct_type = self.struct_type();
            let Some(doc) = self.doc() else {
                return struct_type.to_string();
            };
            if struct_type.is_empty() {
                doc.report(
                    DiagnosticKind::MissingStructType,
                    "Structure element has no 'S' name",
                    &self.props,
                );
            }
            doc.structure()
                .and_then(|tree| tree.role_map().get(struct_type).cloned())
                .unwrap_or_else(|| struct_type.to_string())
        })
    }

    /// Classification of [`role`](Self::role) among the standard types.
    pub fn standard_type(&self) -> StructType {
        StructType::from_name(self.role())
    }

    /// Page named by `/Pg`, if any.
    ///
    /// A malformed `/Pg` is reported once per element.
    pub fn page(&self) -> Option<Arc<Page>> {
        self.pageref()?.upgrade()
    }

    fn pageref(&self) -> Option<PageRef> {
        *self.pageref.get_or_init(|| self.resolve_page())
    }

    fn resolve_page(&self) -> Option<PageRef> {
        let pg = self.props.get("Pg")?;
        let doc = self.doc()?;
        match pg {
            Object::Reference(page_ref) => match doc.page_by_id(*page_ref) {
                Ok(page) => Some(page.pageref()),
                Err(_) => {
                    doc.report(
                        DiagnosticKind::PageNotFound,
                        "'Pg' entry not found in document",
                        &self.props,
                    );
                    None
                },
            },
            _ => {
                doc.report(
                    DiagnosticKind::InvalidPageRef,
                    "'Pg' entry is not an indirect object reference",
                    &self.props,
                );
                None
            },
        }
    }

    /// Parent element or tree root named by `/P`.
    pub fn parent(&self) -> Option<Parent> {
        let raw = self.props.get("P")?;
        let doc = self.doc()?;
        let (objid, parent) = match doc.resolve_with_ref(raw) {
            Ok(resolved) => resolved,
            Err(e) => {
                doc.report(
                    DiagnosticKind::Unresolved,
                    &format!("'P' entry unresolvable ({})", e),
                    raw,
                );
                return None;
            },
        };
        let Object::Dictionary(dict) = parent else {
            doc.report(
                DiagnosticKind::MalformedParent,
                "'P' entry is not a dictionary",
                parent,
            );
            return None;
        };
        if parent.dict_type() == Some(TYPE_STRUCT_TREE_ROOT) {
            return doc.structure().map(Parent::Tree);
        }
        Some(Parent::Element(Element::new(self.docref, objid, dict.clone())))
    }

    /// Lazy iterator over the direct children named by `/K`.
    pub fn children(&self) -> Kids {
        match self.props.get("K") {
            Some(k) => Kids::new(
                self.docref,
                self.pageref(),
                Some(k.clone()),
                self.ancestry.clone(),
            ),
            None => Kids::empty(self.docref),
        }
    }

    /// Every content leaf below this element, depth-first.
    pub fn contents(&self) -> Contents {
        Contents::new(self.children())
    }

    /// Bounding box in device space.
    ///
    /// Uses `/BBox` when present, otherwise the union of the boxes of the
    /// contents that sit on this element's page. `None` when the element
    /// has no page or nothing to bound.
    pub fn bbox(&self) -> Option<Rect> {
        let page = self.page()?;
        if let Some(raw) = self.props.get("BBox") {
            if let Some(doc) = self.doc() {
                match doc.resolve(raw).and_then(rect_value) {
                    Ok(rect) => return Some(page.ctm().transform_rect(&rect)),
                    Err(e) => doc.report(
                        DiagnosticKind::MalformedRect,
                        &format!("'BBox' entry is not a rectangle ({})", e),
                        raw,
                    ),
                }
            }
        }
        let pageref = page.pageref();
        bound_rects(
            self.contents()
                .filter(|content| content.pageref() == Some(pageref))
                .filter_map(|content| content.bbox()),
        )
    }

    /// Concatenated text of every marked-content section below this element.
    pub fn text(&self) -> Option<String> {
        let runs: Vec<String> = self
            .contents()
            .filter_map(|content| content.text().map(str::to_string))
            .collect();
        if runs.is_empty() {
            None
        } else {
            Some(runs.concat())
        }
    }

    /// Marked-content ids of the direct children.
    pub fn mcids(&self) -> Vec<i64> {
        self.children()
            .filter_map(|node| match node {
                Node::Item(item) => Some(item.mcid()),
                _ => None,
            })
            .collect()
    }

    /// Alternate description (`/Alt`).
    pub fn alt_text(&self) -> Option<String> {
        self.text_entry("Alt")
    }

    /// Replacement text (`/ActualText`).
    pub fn actual_text(&self) -> Option<String> {
        self.text_entry("ActualText")
    }

    /// Language (`/Lang`).
    pub fn lang(&self) -> Option<String> {
        self.text_entry("Lang")
    }

    /// Title (`/T`).
    pub fn title(&self) -> Option<String> {
        self.text_entry("T")
    }

    /// Element identifier (`/ID`).
    pub fn id(&self) -> Option<String> {
        self.text_entry("ID")
    }

    fn text_entry(&self, key: &str) -> Option<String> {
        let value = self.props.get(key)?;
        let bytes = match value {
            Object::String(bytes) => bytes.clone(),
            Object::Reference(_) => self.doc()?.resolve(value).ok()?.as_string()?.to_vec(),
            _ => return None,
        };
        Some(decode_text_string(&bytes))
    }
}

impl Findable for Element {
    fn children(&self) -> Kids {
        Element::children(self)
    }
}

impl<'a> IntoIterator for &'a Element {
    type Item = Node;
    type IntoIter = Kids;

    fn into_iter(self) -> Kids {
        self.children()
    }
}

/// Depth-first flattening of a subtree into its content leaves.
///
/// Elements are descended into but never yielded.
#[derive(Debug, Clone)]
pub struct Contents {
    stack: Vec<Kids>,
}

impl Contents {
    pub(crate) fn new(kids: Kids) -> Self {
        Self { stack: vec![kids] }
    }
}

impl Iterator for Contents {
    type Item = Content;

    fn next(&mut self) -> Option<Content> {
        loop {
            let kids = self.stack.last_mut()?;
            match kids.next() {
                Some(Node::Element(el)) => self.stack.push(el.children()),
                Some(Node::Item(item)) => return Some(Content::Item(item)),
                Some(Node::Object(obj)) => return Some(Content::Object(obj)),
                None => {
                    self.stack.pop();
                },
            }
        }
    }
}
