//! PDF document model.
//!
//! A [`Document`] is built from an [`ObjectStore`] of already-parsed objects
//! and the reference of its catalog. Construction walks the page tree once;
//! everything else (content interpretation, the structure tree) is computed
//! lazily. Documents are always handed out as `Arc<Document>` and register
//! themselves in the weak-handle registry so that structure nodes can refer
//! back to them without owning them.

use crate::config::ReaderOptions;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::interpret::{ContentInterpreter, NullInterpreter};
use crate::object::{rect_value, Dictionary, Object, ObjectRef, ObjectStore};
use crate::page::Page;
use crate::registry::{self, DocumentRef, PageRef};
use crate::structure::Tree;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// US Letter, used when no `/MediaBox` is found anywhere up the page tree.
const DEFAULT_MEDIABOX: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// PDF document.
///
/// # Example
///
/// ```
/// use pdf_structure::document::Document;
/// use pdf_structure::object::{Object, ObjectStore};
///
/// let mut store = ObjectStore::new();
/// let page = store.reserve();
/// let pages = store.insert(Object::dict([
///     ("Type", Object::name("Pages")),
///     ("Kids", Object::Array(vec![Object::Reference(page)])),
/// ]));
/// store.set(page, Object::dict([("Type", Object::name("Page")), ("Parent", pages.into())]));
/// let catalog = store.insert(Object::dict([
///     ("Type", Object::name("Catalog")),
///     ("Pages", pages.into()),
/// ]));
///
/// let doc = Document::new(store, catalog)?;
/// assert_eq!(doc.page_count(), 1);
/// assert!(doc.structure().is_none());
/// # Ok::<(), pdf_structure::error::Error>(())
/// ```
pub struct Document {
    docref: DocumentRef,
    store: ObjectStore,
    catalog: Dictionary,
    pages: Vec<Arc<Page>>,
    page_ids: HashMap<ObjectRef, usize>,
    options: ReaderOptions,
    diagnostics: Diagnostics,
    structure: OnceLock<Option<Arc<Tree>>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("docref", &self.docref)
            .field("objects", &self.store.len())
            .field("pages", &self.pages.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

/// A leaf of the page tree, before the document exists.
struct PageSpec {
    objid: ObjectRef,
    props: Dictionary,
    mediabox: Rect,
    rotate: i32,
    annotations: Vec<(Option<ObjectRef>, Dictionary)>,
}

/// Attributes inherited down the page tree.
#[derive(Clone, Copy)]
struct Inherited {
    mediabox: Option<Rect>,
    rotate: Option<i64>,
}

impl Document {
    /// Build a document with no content interpreter and default options.
    pub fn new(store: ObjectStore, catalog_ref: ObjectRef) -> Result<Arc<Self>> {
        Self::with_options(
            store,
            catalog_ref,
            Arc::new(NullInterpreter),
            ReaderOptions::default(),
        )
    }

    /// Build a document whose pages are interpreted by `interpreter`.
    pub fn with_interpreter(
        store: ObjectStore,
        catalog_ref: ObjectRef,
        interpreter: impl ContentInterpreter + 'static,
    ) -> Result<Arc<Self>> {
        Self::with_options(
            store,
            catalog_ref,
            Arc::new(interpreter),
            ReaderOptions::default(),
        )
    }

    /// Build a document with explicit interpreter and options.
    ///
    /// # Errors
    ///
    /// Fails if the catalog is missing or not a dictionary. A malformed page
    /// tree is not an error: broken branches are skipped with a diagnostic.
    pub fn with_options(
        store: ObjectStore,
        catalog_ref: ObjectRef,
        interpreter: Arc<dyn ContentInterpreter>,
        options: ReaderOptions,
    ) -> Result<Arc<Self>> {
        let diagnostics = Diagnostics::new(options.record_diagnostics, options.max_diagnostics);

        let catalog = store
            .resolve(&Object::Reference(catalog_ref), options.max_resolve_depth)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::InvalidPdf("Catalog is not a dictionary".into()))?;

        let specs = match catalog.get("Pages") {
            Some(root) => collect_pages(&store, root, &options, &diagnostics),
            None => {
                log::warn!("Catalog has no /Pages entry");
                Vec::new()
            },
        };
        let page_ids = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| (spec.objid, index))
            .collect();

        let doc = Arc::new_cyclic(|weak| {
            let docref = registry::register(weak.clone());
            let pages = specs
                .into_iter()
                .enumerate()
                .map(|(index, spec)| {
                    Arc::new(Page::new(
                        PageRef::new(docref, index),
                        spec.objid,
                        spec.props,
                        spec.mediabox,
                        spec.rotate,
                        spec.annotations,
                        Arc::clone(&interpreter),
                    ))
                })
                .collect();
            Document {
                docref,
                store,
                catalog,
                pages,
                page_ids,
                options,
                diagnostics,
                structure: OnceLock::new(),
            }
        });
        log::debug!("Opened document with {} pages", doc.page_count());
        Ok(doc)
    }

    /// Weak handle to this document.
    pub fn docref(&self) -> DocumentRef {
        self.docref
    }

    /// Options this document was built with.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// The document catalog.
    pub fn catalog(&self) -> &Dictionary {
        &self.catalog
    }

    /// Load an indirect object.
    pub fn load_object(&self, obj_ref: ObjectRef) -> Result<&Object> {
        self.store
            .get(obj_ref)
            .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))
    }

    /// Follow indirect references until a direct object is reached.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        self.store.resolve(obj, self.options.max_resolve_depth)
    }

    /// Like [`resolve`](Self::resolve), also returning the last reference
    /// followed.
    pub fn resolve_with_ref<'a>(
        &'a self,
        obj: &'a Object,
    ) -> Result<(Option<ObjectRef>, &'a Object)> {
        self.store
            .resolve_with_ref(obj, self.options.max_resolve_depth)
    }

    /// All pages, in page-tree order.
    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by zero-based index.
    pub fn page(&self, index: usize) -> Option<Arc<Page>> {
        self.pages.get(index).cloned()
    }

    /// Page by the object id of its page dictionary.
    pub fn page_by_id(&self, objid: ObjectRef) -> Result<Arc<Page>> {
        self.page_ids
            .get(&objid)
            .and_then(|&index| self.page(index))
            .ok_or(Error::PageNotFound(objid))
    }

    /// The logical structure tree, or `None` for untagged documents.
    ///
    /// Built on first access and shared afterwards.
    pub fn structure(&self) -> Option<Arc<Tree>> {
        self.structure
            .get_or_init(|| Tree::from_document(self).map(Arc::new))
            .clone()
    }

    /// Diagnostics recorded while reading this document.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.entries()
    }

    /// Forget recorded diagnostics.
    pub fn clear_diagnostics(&self) {
        self.diagnostics.clear();
    }

    /// Log and record a recovered malformation.
    pub fn report(&self, kind: DiagnosticKind, message: &str, value: &dyn fmt::Debug) {
        self.diagnostics.report(kind, message, value);
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        registry::release(self.docref);
    }
}

/// Walk the page tree without recursion, collecting leaves in order.
fn collect_pages(
    store: &ObjectStore,
    root: &Object,
    options: &ReaderOptions,
    diagnostics: &Diagnostics,
) -> Vec<PageSpec> {
    let mut specs = Vec::new();
    let mut visited: HashSet<ObjectRef> = HashSet::new();
    let inherited = Inherited {
        mediabox: None,
        rotate: None,
    };
    let mut stack: Vec<(Object, Inherited, usize)> = vec![(root.clone(), inherited, 0)];

    while let Some((raw, mut inherited, depth)) = stack.pop() {
        if let Some(obj_ref) = raw.as_reference() {
            if !visited.insert(obj_ref) {
                diagnostics.report(
                    DiagnosticKind::MalformedPageTree,
                    "Page tree node visited twice",
                    &obj_ref,
                );
                continue;
            }
        }
        if depth > options.max_tree_depth {
            diagnostics.report(
                DiagnosticKind::MalformedPageTree,
                "Page tree too deep, skipping branch",
                &raw,
            );
            continue;
        }
        let (objid, node) = match store.resolve_with_ref(&raw, options.max_resolve_depth) {
            Ok(resolved) => resolved,
            Err(e) => {
                diagnostics.report(DiagnosticKind::Unresolved, "Page tree node unresolvable", &e);
                continue;
            },
        };
        let Some(dict) = node.as_dict() else {
            diagnostics.report(
                DiagnosticKind::MalformedPageTree,
                "Page tree node is not a dictionary",
                node,
            );
            continue;
        };

        if let Some(mediabox) = dict.get("MediaBox") {
            match store
                .resolve(mediabox, options.max_resolve_depth)
                .and_then(rect_value)
            {
                Ok(rect) => inherited.mediabox = Some(rect),
                Err(e) => {
                    diagnostics.report(DiagnosticKind::MalformedRect, "Malformed /MediaBox", &e)
                },
            }
        }
        if let Some(rotate) = dict.get("Rotate").and_then(|obj| obj.as_integer()) {
            inherited.rotate = Some(rotate);
        }

        let is_intermediate = match dict.get("Type").and_then(|obj| obj.as_name()) {
            Some("Pages") => true,
            Some("Page") => false,
            _ => dict.contains_key("Kids"),
        };

        if is_intermediate {
            let kids = dict
                .get("Kids")
                .and_then(|kids| store.resolve(kids, options.max_resolve_depth).ok())
                .and_then(|kids| kids.as_array());
            match kids {
                Some(kids) => {
                    for kid in kids.iter().rev() {
                        stack.push((kid.clone(), inherited, depth + 1));
                    }
                },
                None => diagnostics.report(
                    DiagnosticKind::MalformedPageTree,
                    "Pages node missing /Kids array",
                    dict,
                ),
            }
            continue;
        }

        let Some(objid) = objid else {
            diagnostics.report(
                DiagnosticKind::MalformedPageTree,
                "Page dictionary is not an indirect object",
                dict,
            );
            continue;
        };
        let annotations = collect_annotations(store, dict, options);
        specs.push(PageSpec {
            objid,
            props: dict.clone(),
            mediabox: inherited.mediabox.unwrap_or(DEFAULT_MEDIABOX),
            rotate: (inherited.rotate.unwrap_or(0).rem_euclid(360) / 90 * 90) as i32,
            annotations,
        });
    }
    specs
}

fn collect_annotations(
    store: &ObjectStore,
    page: &Dictionary,
    options: &ReaderOptions,
) -> Vec<(Option<ObjectRef>, Dictionary)> {
    let Some(annots) = page
        .get("Annots")
        .and_then(|annots| store.resolve(annots, options.max_resolve_depth).ok())
        .and_then(|annots| annots.as_array())
    else {
        return Vec::new();
    };
    annots
        .iter()
        .filter_map(
            |annot| match store.resolve_with_ref(annot, options.max_resolve_depth) {
                Ok((objid, Object::Dictionary(dict))) => Some((objid, dict.clone())),
                Ok((objid, other)) => {
                    log::warn!("Annotation {:?} is not a dictionary: {:?}", objid, other);
                    None
                },
                Err(e) => {
                    log::warn!("Annotation unresolvable: {}", e);
                    None
                },
            },
        )
        .collect()
}
