//! Pages of a document.
//!
//! A [`Page`] knows its place in the document, its device transform and its
//! annotations. Its content is interpreted lazily, on the first request that
//! needs it, through the document's [`ContentInterpreter`].

use crate::annotations::Annotation;
use crate::diagnostics::DiagnosticKind;
use crate::document::Document;
use crate::geometry::{Matrix, Rect};
use crate::interpret::{
    ContentInterpreter, FormXObject, GraphicObject, ImageObject, MarkedContent, PageContent,
};
use crate::object::{Dictionary, ObjectRef};
use crate::registry::PageRef;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A page of a [`Document`].
pub struct Page {
    pageref: PageRef,
    objid: ObjectRef,
    props: Dictionary,
    mediabox: Rect,
    rotate: i32,
    ctm: Matrix,
    annotations: Vec<Annotation>,
    interpreter: Arc<dyn ContentInterpreter>,
    content: OnceLock<PageContent>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("index", &self.pageref.index())
            .field("objid", &self.objid)
            .field("mediabox", &self.mediabox)
            .field("rotate", &self.rotate)
            .field("interpreted", &self.content.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Page {
    pub(crate) fn new(
        pageref: PageRef,
        objid: ObjectRef,
        props: Dictionary,
        mediabox: Rect,
        rotate: i32,
        annotations: Vec<(Option<ObjectRef>, Dictionary)>,
        interpreter: Arc<dyn ContentInterpreter>,
    ) -> Self {
        let ctm = device_ctm(&mediabox, rotate);
        let annotations = annotations
            .iter()
            .map(|(objid, dict)| Annotation::from_dict(*objid, dict, &ctm))
            .collect();
        Self {
            pageref,
            objid,
            props,
            mediabox,
            rotate,
            ctm,
            annotations,
            interpreter,
            content: OnceLock::new(),
        }
    }

    /// Weak handle to this page.
    pub fn pageref(&self) -> PageRef {
        self.pageref
    }

    /// Zero-based page index.
    pub fn index(&self) -> usize {
        self.pageref.index()
    }

    /// Object id of the page dictionary.
    pub fn objid(&self) -> ObjectRef {
        self.objid
    }

    /// Raw page dictionary.
    pub fn props(&self) -> &Dictionary {
        &self.props
    }

    /// Media box in default user space (inherited if not set on the page).
    pub fn mediabox(&self) -> Rect {
        self.mediabox
    }

    /// Rotation in degrees, normalized to 0, 90, 180 or 270.
    pub fn rotate(&self) -> i32 {
        self.rotate
    }

    /// Transform from default user space to device space.
    ///
    /// Device space has its origin at the top-left of the displayed page,
    /// with y growing downwards.
    pub fn ctm(&self) -> Matrix {
        self.ctm
    }

    /// The owning document, if still alive.
    pub fn doc(&self) -> Option<Arc<Document>> {
        self.pageref.document().upgrade()
    }

    /// Key of this page's entry in the structure parent tree.
    pub fn struct_parents(&self) -> Option<i64> {
        self.props.get("StructParents").and_then(|obj| obj.as_integer())
    }

    /// Annotations listed in `/Annots`.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Whether the page content has already been interpreted.
    pub fn is_interpreted(&self) -> bool {
        self.content.get().is_some()
    }

    /// Interpreted page content, computed on first access.
    ///
    /// Interpretation failures are recorded as diagnostics and leave the
    /// page empty.
    pub fn content(&self) -> &PageContent {
        self.content.get_or_init(|| {
            log::debug!("Interpreting content of page {}", self.index());
            match self.interpreter.interpret(self) {
                Ok(content) => content,
                Err(e) => {
                    let message = format!("Content interpretation failed on page {}", self.index());
                    match self.doc() {
                        Some(doc) => doc.report(DiagnosticKind::Interpretation, &message, &e),
                        None => crate::diagnostics::report_detached(&message, &e),
                    }
                    PageContent::default()
                },
            }
        })
    }

    /// Marked content of the page's own content stream.
    pub fn marked_content(&self) -> &MarkedContent {
        &self.content().marked
    }

    /// Painted objects of the page's own content stream.
    pub fn objects(&self) -> &[GraphicObject] {
        &self.content().marked.objects
    }

    /// Text runs per marked-content id.
    pub fn mcid_texts(&self) -> &HashMap<i64, Vec<String>> {
        &self.content().marked.mcid_texts
    }

    /// Form XObjects painted on the page.
    pub fn xobjects(&self) -> &[FormXObject] {
        &self.content().xobjects
    }

    /// Image XObjects painted on the page.
    pub fn images(&self) -> &[ImageObject] {
        &self.content().images
    }

    /// Form XObject whose stream has object id `objid`.
    pub fn xobject_by_id(&self, objid: ObjectRef) -> Option<&FormXObject> {
        self.xobjects().iter().find(|xobj| xobj.objid == objid)
    }

    /// Image whose stream has object id `objid`.
    pub fn image_by_id(&self, objid: ObjectRef) -> Option<&ImageObject> {
        self.images().iter().find(|img| img.objid == objid)
    }

    /// Annotation with object id `objid`.
    pub fn annotation_by_id(&self, objid: ObjectRef) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|annot| annot.objid == Some(objid))
    }
}

/// Device transform for a media box shown with the given clockwise rotation.
pub(crate) fn device_ctm(mediabox: &Rect, rotate: i32) -> Matrix {
    let (x0, y0) = (mediabox.left(), mediabox.top());
    let (x1, y1) = (mediabox.right(), mediabox.bottom());
    match rotate.rem_euclid(360) {
        90 => Matrix::new(0.0, 1.0, 1.0, 0.0, -y0, -x0),
        180 => Matrix::new(-1.0, 0.0, 0.0, 1.0, x1, -y0),
        270 => Matrix::new(0.0, -1.0, -1.0, 0.0, y1, x1),
        _ => Matrix::new(1.0, 0.0, 0.0, -1.0, -x0, y1),
    }
}
