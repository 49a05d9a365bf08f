//! The structure tree root (ISO 32000-1:2008, Section 14.7.2).

use super::element::{Contents, Element};
use super::kids::{Ancestry, Kids};
use super::number_tree::NumberTree;
use super::traversal::Findable;
use super::types::Content;
use crate::diagnostics::DiagnosticKind;
use crate::document::Document;
use crate::object::{decode_text_string, Dictionary, Object};
use crate::page::Page;
use crate::registry::DocumentRef;
use indexmap::IndexMap;
use std::sync::{Arc, OnceLock};

/// Root of a document's logical structure.
///
/// Obtained from [`Document::structure`]. The role map and parent tree are
/// built on first access and kept for the life of the tree.
#[derive(Debug)]
pub struct Tree {
    docref: DocumentRef,
    props: Dictionary,
    role_map: OnceLock<IndexMap<String, String>>,
    parent_tree: OnceLock<NumberTree>,
}

impl Tree {
    /// Read the catalog's `/StructTreeRoot`.
    ///
    /// Returns `None` for untagged documents or an unusable root.
    pub(crate) fn from_document(doc: &Document) -> Option<Self> {
        let Some(raw) = doc.catalog().get("StructTreeRoot") else {
            log::debug!("Document has no StructTreeRoot");
            return None;
        };
        match doc.resolve(raw) {
            Ok(Object::Dictionary(props)) => Some(Self::new(doc.docref(), props.clone())),
            Ok(other) => {
                doc.report(
                    DiagnosticKind::IrregularRoot,
                    "StructTreeRoot is not a dictionary",
                    other,
                );
                None
            },
            Err(e) => {
                doc.report(
                    DiagnosticKind::Unresolved,
                    &format!("StructTreeRoot unresolvable ({})", e),
                    raw,
                );
                None
            },
        }
    }

    /// Wrap a structure tree root dictionary.
    pub fn new(docref: DocumentRef, props: Dictionary) -> Self {
        Self {
            docref,
            props,
            role_map: OnceLock::new(),
            parent_tree: OnceLock::new(),
        }
    }

    /// Weak handle to the owning document.
    pub fn docref(&self) -> DocumentRef {
        self.docref
    }

    /// Raw root dictionary.
    pub fn props(&self) -> &Dictionary {
        &self.props
    }

    /// The owning document, if still alive.
    pub fn doc(&self) -> Option<Arc<Document>> {
        self.docref.upgrade()
    }

    /// Top-level structure nodes.
    ///
    /// `/K` should be one element dictionary or an array of them. Other
    /// shapes are reported and read as well as possible.
    pub fn children(&self) -> Kids {
        let Some(k) = self.props.get("K") else {
            log::debug!("StructTreeRoot has no 'K' entry");
            return Kids::empty(self.docref);
        };
        let Some(doc) = self.doc() else {
            return Kids::empty(self.docref);
        };
        match doc.resolve_with_ref(k) {
            Ok((objid, Object::Array(entries))) => Kids::root(
                self.docref,
                entries.clone(),
                Ancestry::default().with_opt(objid),
            ),
            Ok((_, Object::Dictionary(_))) => {
                Kids::root(self.docref, vec![k.clone()], Ancestry::default())
            },
            Ok((_, other)) => {
                doc.report(
                    DiagnosticKind::IrregularRoot,
                    "'K' entry in StructTreeRoot should be dict or list",
                    other,
                );
                Kids::empty(self.docref)
            },
            Err(e) => {
                doc.report(
                    DiagnosticKind::Unresolved,
                    &format!("'K' entry in StructTreeRoot unresolvable ({})", e),
                    k,
                );
                Kids::empty(self.docref)
            },
        }
    }

    /// Every content leaf in the tree, depth-first.
    pub fn contents(&self) -> Contents {
        Contents::new(self.children())
    }

    /// Mapping from document-specific structure types to standard roles.
    ///
    /// Empty if the root has no `/RoleMap`. Keys are sorted.
    pub fn role_map(&self) -> &IndexMap<String, String> {
        self.role_map.get_or_init(|| self.load_role_map())
    }

    fn load_role_map(&self) -> IndexMap<String, String> {
        let mut role_map = IndexMap::new();
        let (Some(raw), Some(doc)) = (self.props.get("RoleMap"), self.doc()) else {
            return role_map;
        };
        let dict = match doc.resolve(raw) {
            Ok(Object::Dictionary(dict)) => dict,
            Ok(other) => {
                doc.report(
                    DiagnosticKind::MalformedRoleMap,
                    "'RoleMap' entry is not a dictionary",
                    other,
                );
                return role_map;
            },
            Err(e) => {
                doc.report(
                    DiagnosticKind::Unresolved,
                    &format!("'RoleMap' entry unresolvable ({})", e),
                    raw,
                );
                return role_map;
            },
        };

        let mut keys: Vec<&String> = dict.keys().collect();
        keys.sort();
        for key in keys {
            let value = &dict[key];
            let role = match doc.resolve(value) {
                Ok(Object::Name(name)) => name.clone(),
                Ok(Object::String(bytes)) => decode_text_string(bytes),
                _ => {
                    doc.report(
                        DiagnosticKind::MalformedRoleMap,
                        "'RoleMap' value is not a name",
                        value,
                    );
                    continue;
                },
            };
            role_map.insert(key.clone(), role);
        }
        role_map
    }

    /// The flattened `/ParentTree`.
    ///
    /// Empty if the root has none, so lookups can always be made.
    pub fn parent_tree(&self) -> &NumberTree {
        self.parent_tree.get_or_init(|| {
            match (self.props.get("ParentTree"), self.doc()) {
                (Some(root), Some(doc)) => NumberTree::load(&doc, root),
                _ => NumberTree::new(),
            }
        })
    }

    /// Element owning marked-content section `mcid` of `page`.
    ///
    /// Looks the page's `/StructParents` key up in the parent tree.
    pub fn element_for_mcid(&self, page: &Page, mcid: i64) -> Option<Element> {
        let key = page.struct_parents()?;
        let doc = self.doc()?;
        let entry = doc.resolve(self.parent_tree().get(key)?).ok()?;
        let slot = entry.as_array()?.get(usize::try_from(mcid).ok()?)?;
        self.element_at(&doc, slot)
    }

    /// Element owning the annotation or XObject with `/StructParent` `key`.
    pub fn element_for_object(&self, key: i64) -> Option<Element> {
        let doc = self.doc()?;
        let entry = self.parent_tree().get(key)?;
        self.element_at(&doc, entry)
    }

    fn element_at(&self, doc: &Document, raw: &Object) -> Option<Element> {
        match doc.resolve_with_ref(raw) {
            Ok((objid, Object::Dictionary(dict))) => {
                Some(Element::new(self.docref, objid, dict.clone()))
            },
            _ => None,
        }
    }

    /// Marked-content ids of a page's own content stream in logical order.
    ///
    /// Sections inside form XObjects are left out.
    pub fn reading_order(&self, page_index: usize) -> Vec<i64> {
        self.contents()
            .filter_map(|content| match content {
                Content::Item(item)
                    if item.stream().is_none()
                        && item.pageref().map(|page| page.index()) == Some(page_index) =>
                {
                    Some(item.mcid())
                },
                _ => None,
            })
            .collect()
    }
}

impl Findable for Tree {
    fn children(&self) -> Kids {
        Tree::children(self)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = super::types::Node;
    type IntoIter = Kids;

    fn into_iter(self) -> Kids {
        self.children()
    }
}
