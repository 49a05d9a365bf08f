//! Resolution of `/K` entries into structure nodes.
//!
//! A `/K` value may be a single child or an array of children, and each child
//! may be one of several shapes (ISO 32000-1:2008, Section 14.7.2, Table 323):
//!
//! - an integer: a marked-content id on the current page
//! - a dictionary with `/Type /MCR`: a marked-content reference
//! - a dictionary with `/Type /OBJR`: an object reference
//! - any other dictionary: a nested structure element
//! - an array of any of the above, nested arbitrarily
//!
//! [`Kids`] flattens all of that lazily, without recursion. Malformed entries
//! are reported as diagnostics and skipped; they never end the iteration.
//! A reference back to an array or element that is still open above the
//! entry is a cycle and is skipped the same way.

use super::content::{ContentItem, ContentObject};
use super::element::Element;
use super::types::{Node, TYPE_MCR, TYPE_OBJR, TYPE_STRUCT_ELEM};
use crate::diagnostics::{report_detached, DiagnosticKind};
use crate::document::Document;
use crate::object::{Dictionary, Object, ObjectRef};
use crate::registry::{DocumentRef, PageRef};
use std::fmt;
use std::sync::Arc;

/// Shape of a resolved `/K` value.
#[derive(Debug)]
enum ChildRef {
    List(Vec<Object>),
    Mcid(i64),
    MarkedContentRef(Dictionary),
    ObjectRef(Dictionary),
    Element(Option<ObjectRef>, Dictionary),
    Unrecognized(Object),
}

impl ChildRef {
    fn classify(objid: Option<ObjectRef>, obj: &Object) -> Self {
        match obj {
            Object::Array(items) => ChildRef::List(items.clone()),
            Object::Integer(mcid) => ChildRef::Mcid(*mcid),
            Object::Dictionary(dict) => match obj.dict_type() {
                Some(TYPE_MCR) => ChildRef::MarkedContentRef(dict.clone()),
                Some(TYPE_OBJR) => ChildRef::ObjectRef(dict.clone()),
                _ => ChildRef::Element(objid, dict.clone()),
            },
            other => ChildRef::Unrecognized(other.clone()),
        }
    }
}

/// Indirect arrays and elements open above a `/K` value, innermost first.
///
/// A value whose reference is already open is a cycle. Siblings share the
/// chain, so the same array or element may appear any number of times side
/// by side without being refused.
#[derive(Clone, Default)]
pub(crate) struct Ancestry(Option<Arc<Link>>);

struct Link {
    objid: ObjectRef,
    parent: Ancestry,
}

impl Ancestry {
    /// This chain with `objid` opened below it.
    pub(crate) fn with(&self, objid: ObjectRef) -> Self {
        Ancestry(Some(Arc::new(Link {
            objid,
            parent: self.clone(),
        })))
    }

    /// Extend with `objid` if there is one.
    pub(crate) fn with_opt(&self, objid: Option<ObjectRef>) -> Self {
        match objid {
            Some(objid) => self.with(objid),
            None => self.clone(),
        }
    }

    pub(crate) fn contains(&self, objid: ObjectRef) -> bool {
        self.iter().any(|open| open == objid)
    }

    fn iter(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        let mut link = self.0.as_deref();
        std::iter::from_fn(move || {
            let current = link?;
            link = current.parent.0.as_deref();
            Some(current.objid)
        })
    }
}

impl fmt::Debug for Ancestry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// Unlink iteratively; a deep chain would overflow the stack otherwise.
impl Drop for Link {
    fn drop(&mut self) {
        let mut next = self.parent.0.take();
        while let Some(link) = next {
            match Arc::try_unwrap(link) {
                Ok(mut link) => next = link.parent.0.take(),
                Err(_) => break,
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    value: Object,
    top_level: bool,
    ancestry: Ancestry,
}

/// Lazy iterator over the children named by a `/K` entry.
///
/// Holds only weak handles; if the document is released mid-way the
/// iteration simply ends.
#[derive(Debug, Clone)]
pub struct Kids {
    docref: DocumentRef,
    page: Option<PageRef>,
    pending: Vec<Pending>,
}

impl Kids {
    /// Children of `value` whose bare marked-content ids belong to `page`.
    ///
    /// `ancestry` holds the element owning `value`, and whatever was open
    /// above it.
    pub(crate) fn new(
        docref: DocumentRef,
        page: Option<PageRef>,
        value: Option<Object>,
        ancestry: Ancestry,
    ) -> Self {
        Self {
            docref,
            page,
            pending: value
                .into_iter()
                .map(|value| Pending {
                    value,
                    top_level: false,
                    ancestry: ancestry.clone(),
                })
                .collect(),
        }
    }

    /// Direct children of the structure tree root.
    ///
    /// Each entry is checked for shapes that do not belong under the root.
    /// `ancestry` holds the root's `/K` array if it was indirect.
    pub(crate) fn root(docref: DocumentRef, entries: Vec<Object>, ancestry: Ancestry) -> Self {
        Self {
            docref,
            page: None,
            pending: entries
                .into_iter()
                .rev()
                .map(|value| Pending {
                    value,
                    top_level: true,
                    ancestry: ancestry.clone(),
                })
                .collect(),
        }
    }

    /// An iterator yielding nothing.
    pub(crate) fn empty(docref: DocumentRef) -> Self {
        Self::new(docref, None, None, Ancestry::default())
    }

    fn resolve(&mut self, doc: &Document, pending: Pending) -> Option<Node> {
        let (objid, resolved) = match doc.resolve_with_ref(&pending.value) {
            Ok(resolved) => resolved,
            Err(e) => {
                doc.report(
                    DiagnosticKind::Unresolved,
                    &format!("Unresolvable 'K' entry ({})", e),
                    &pending.value,
                );
                return None;
            },
        };
        if let Some(objid) = objid.filter(|&objid| pending.ancestry.contains(objid)) {
            let message = match resolved {
                Object::Array(_) => "'K' array contains itself",
                _ => "Structure element contains itself",
            };
            doc.report(DiagnosticKind::CyclicStructure, message, &objid);
            return None;
        }
        if pending.top_level {
            check_root_entry(doc, resolved);
        }

        match ChildRef::classify(objid, resolved) {
            ChildRef::List(items) => {
                let ancestry = pending.ancestry.with_opt(objid);
                self.pending.extend(items.into_iter().rev().map(|value| Pending {
                    value,
                    top_level: false,
                    ancestry: ancestry.clone(),
                }));
                None
            },
            ChildRef::Mcid(mcid) => self.marked_content_id(doc, mcid),
            ChildRef::MarkedContentRef(dict) => self.marked_content_ref(doc, &dict),
            ChildRef::ObjectRef(dict) => self.object_ref(doc, &dict, &pending.ancestry),
            ChildRef::Element(objid, dict) => Some(Node::Element(
                Element::new(self.docref, objid, dict).within(&pending.ancestry),
            )),
            ChildRef::Unrecognized(other) => {
                doc.report(DiagnosticKind::UnrecognizedKid, "Unrecognized 'K' element", &other);
                None
            },
        }
    }

    fn marked_content_id(&self, doc: &Document, mcid: i64) -> Option<Node> {
        let Some(page) = self.page else {
            doc.report(
                DiagnosticKind::MissingPage,
                "No page found for marked-content id",
                &mcid,
            );
            return None;
        };
        if mcid < 0 {
            doc.report(DiagnosticKind::InvalidMcid, "Marked-content id is negative", &mcid);
            return None;
        }
        Some(Node::Item(ContentItem::new(Some(page), mcid, None)))
    }

    fn marked_content_ref(&self, doc: &Document, dict: &Dictionary) -> Option<Node> {
        let mcid = match dict.get("MCID").map(|mcid| doc.resolve(mcid)) {
            Some(Ok(Object::Integer(mcid))) if *mcid >= 0 => *mcid,
            _ => {
                doc.report(
                    DiagnosticKind::InvalidMcid,
                    "'MCID' entry is not a non-negative int",
                    dict,
                );
                return None;
            },
        };
        let page = self.child_page(doc, dict)?;
        let stream = match dict.get("Stm") {
            None => None,
            Some(stm) => match doc.resolve_with_ref(stm) {
                Ok((Some(stream_ref), target)) if target.is_stream() => Some(stream_ref),
                _ => {
                    doc.report(
                        DiagnosticKind::InvalidStream,
                        "'Stm' entry is not a content stream reference",
                        stm,
                    );
                    None
                },
            },
        };
        Some(Node::Item(ContentItem::new(Some(page), mcid, stream)))
    }

    fn object_ref(&self, doc: &Document, dict: &Dictionary, ancestry: &Ancestry) -> Option<Node> {
        let Some(target_ref) = dict.get("Obj").and_then(|obj| obj.as_reference()) else {
            doc.report(
                DiagnosticKind::InvalidObjectRef,
                "'Obj' entry is not an indirect object reference",
                dict,
            );
            return None;
        };
        let target = match doc.load_object(target_ref) {
            Ok(target) => target,
            Err(e) => {
                doc.report(
                    DiagnosticKind::Unresolved,
                    &format!("'Obj' entry unresolvable ({})", e),
                    &target_ref,
                );
                return None;
            },
        };

        match target {
            Object::Dictionary(target_dict) if target.dict_type() == Some(TYPE_STRUCT_ELEM) => {
                if ancestry.contains(target_ref) {
                    doc.report(
                        DiagnosticKind::CyclicStructure,
                        "Structure element contains itself",
                        &target_ref,
                    );
                    return None;
                }
                // Irregular, but some producers reference elements this way.
                return Some(Node::Element(
                    Element::new(self.docref, Some(target_ref), target_dict.clone())
                        .within(ancestry),
                ));
            },
            Object::Dictionary(_) | Object::Stream { .. } => {},
            other => {
                doc.report(
                    DiagnosticKind::InvalidObjectRef,
                    "'Obj' entry does not point to a dict or stream",
                    other,
                );
                return None;
            },
        }

        let page = self.child_page(doc, dict)?;
        Some(Node::Object(ContentObject::new(page, Some(target_ref), target.clone())))
    }

    /// Page of a reference dictionary: its own `/Pg`, else the context page.
    fn child_page(&self, doc: &Document, dict: &Dictionary) -> Option<PageRef> {
        match dict.get("Pg") {
            None => {
                if self.page.is_none() {
                    doc.report(
                        DiagnosticKind::MissingPage,
                        "No page found for marked-content reference",
                        dict,
                    );
                }
                self.page
            },
            Some(Object::Reference(page_ref)) => match doc.page_by_id(*page_ref) {
                Ok(page) => Some(page.pageref()),
                Err(_) => {
                    doc.report(
                        DiagnosticKind::PageNotFound,
                        "'Pg' entry not found in document",
                        dict,
                    );
                    None
                },
            },
            Some(_) => {
                doc.report(
                    DiagnosticKind::InvalidPageRef,
                    "'Pg' entry is not an indirect object reference",
                    dict,
                );
                None
            },
        }
    }
}

impl Iterator for Kids {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        while let Some(pending) = self.pending.pop() {
            let Some(doc) = self.docref.upgrade() else {
                report_detached("Document released while reading children", &pending.value);
                self.pending.clear();
                return None;
            };
            if let Some(node) = self.resolve(&doc, pending) {
                return Some(node);
            }
        }
        None
    }
}

/// Report shapes that do not belong directly under the tree root.
///
/// The entry is still handed to normal resolution afterwards.
fn check_root_entry(doc: &Document, entry: &Object) {
    let message = match entry {
        Object::Dictionary(_) => match entry.dict_type() {
            Some(TYPE_OBJR) => "StructTreeRoot contains an object reference",
            Some(TYPE_MCR) => "StructTreeRoot contains a marked-content reference",
            _ => return,
        },
        _ => "StructTreeRoot contains a non-element entry",
    };
    doc.report(DiagnosticKind::IrregularRoot, message, entry);
}
