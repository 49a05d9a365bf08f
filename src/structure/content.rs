//! Content leaves of the structure tree.
//!
//! A [`ContentItem`] points at one marked-content section of a content
//! stream; a [`ContentObject`] points at a whole annotation or XObject
//! (ISO 32000-1:2008, Sections 14.7.4.2 and 14.7.4.3).

use super::types::{SUBTYPE_IMAGE, TYPE_ANNOT, TYPE_XOBJECT};
use crate::annotations::Annotation;
use crate::diagnostics::DiagnosticKind;
use crate::document::Document;
use crate::error::Error;
use crate::geometry::Rect;
use crate::interpret::{FormXObject, ImageObject, MarkedContent};
use crate::object::{rect_value, Object, ObjectRef};
use crate::page::Page;
use crate::registry::PageRef;
use std::cell::OnceCell;
use std::sync::Arc;

/// A marked-content section.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pageref: Option<PageRef>,
    mcid: i64,
    stream: Option<ObjectRef>,
    bbox: OnceCell<Option<Rect>>,
    text: OnceCell<Option<String>>,
}

impl ContentItem {
    /// Section `mcid` on `pageref`, inside the form XObject `stream` if given.
    pub fn new(pageref: Option<PageRef>, mcid: i64, stream: Option<ObjectRef>) -> Self {
        Self {
            pageref,
            mcid,
            stream,
            bbox: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    /// Weak handle to the owning page.
    pub fn pageref(&self) -> Option<PageRef> {
        self.pageref
    }

    /// Marked-content id, unique within its content stream.
    pub fn mcid(&self) -> i64 {
        self.mcid
    }

    /// Object id of the form XObject holding the section, if not the page.
    pub fn stream(&self) -> Option<ObjectRef> {
        self.stream
    }

    /// The owning page, if known and alive.
    pub fn page(&self) -> Option<Arc<Page>> {
        self.pageref?.upgrade()
    }

    /// Union of the boxes of everything painted inside the section.
    ///
    /// Interprets the page on first call.
    pub fn bbox(&self) -> Option<Rect> {
        *self.bbox.get_or_init(|| {
            let page = self.page()?;
            self.source(&page).bbox_of(self.mcid)
        })
    }

    /// Text shown inside the section, `None` if there was none.
    ///
    /// Interprets the page on first call.
    pub fn text(&self) -> Option<&str> {
        self.text
            .get_or_init(|| {
                let page = self.page()?;
                self.source(&page).text_of(self.mcid)
            })
            .as_deref()
    }

    fn source<'p>(&self, page: &'p Page) -> &'p MarkedContent {
        if let Some(stream) = self.stream {
            match page.xobject_by_id(stream) {
                Some(xobj) => return &xobj.content,
                None => log::debug!(
                    "Form {} not painted on page {}, using page content",
                    stream,
                    page.index()
                ),
            }
        }
        page.marked_content()
    }
}

/// The object a [`ContentObject`] stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferencedObject {
    /// An annotation on the page
    Annotation(Annotation),
    /// A form XObject painted on the page
    XObject(FormXObject),
    /// An image XObject painted on the page
    Image(ImageObject),
}

impl ReferencedObject {
    /// Bounding box in device space.
    pub fn bbox(&self) -> Option<Rect> {
        match self {
            ReferencedObject::Annotation(annot) => annot.bbox(),
            ReferencedObject::XObject(xobj) => Some(xobj.bbox),
            ReferencedObject::Image(img) => Some(img.bbox),
        }
    }
}

/// A whole annotation or XObject.
#[derive(Debug, Clone)]
pub struct ContentObject {
    pageref: PageRef,
    objid: Option<ObjectRef>,
    props: Object,
}

impl ContentObject {
    /// Wrap the annotation dictionary or XObject stream `props`.
    pub fn new(pageref: PageRef, objid: Option<ObjectRef>, props: Object) -> Self {
        Self {
            pageref,
            objid,
            props,
        }
    }

    /// Weak handle to the owning page.
    pub fn pageref(&self) -> PageRef {
        self.pageref
    }

    /// Object id of the referenced object.
    pub fn objid(&self) -> Option<ObjectRef> {
        self.objid
    }

    /// Raw annotation dictionary or XObject stream.
    pub fn props(&self) -> &Object {
        &self.props
    }

    /// The owning page, if alive.
    pub fn page(&self) -> Option<Arc<Page>> {
        self.pageref.upgrade()
    }

    /// `"XObject"` for streams, otherwise the `/Type` name.
    ///
    /// `/Type` is optional on annotations, so a dictionary without one is
    /// an `"Annot"`.
    pub fn object_type(&self) -> &str {
        if self.props.is_stream() {
            TYPE_XOBJECT
        } else {
            self.props.dict_type().unwrap_or(TYPE_ANNOT)
        }
    }

    /// Find the referenced object among the page's annotations or XObjects.
    pub fn obj(&self) -> Option<ReferencedObject> {
        let page = self.page()?;
        match self.object_type() {
            TYPE_ANNOT => {
                if let Some(annot) = self.objid.and_then(|objid| page.annotation_by_id(objid)) {
                    return Some(ReferencedObject::Annotation(annot.clone()));
                }
                let dict = self.props.as_dict()?;
                Some(ReferencedObject::Annotation(Annotation::from_dict(
                    self.objid,
                    dict,
                    &page.ctm(),
                )))
            },
            TYPE_XOBJECT => {
                let objid = self.objid?;
                let subtype = self
                    .props
                    .as_dict()
                    .and_then(|dict| dict.get("Subtype"))
                    .and_then(|obj| obj.as_name());
                if subtype == Some(SUBTYPE_IMAGE) {
                    page.image_by_id(objid).cloned().map(ReferencedObject::Image)
                } else {
                    page.xobject_by_id(objid)
                        .cloned()
                        .map(ReferencedObject::XObject)
                }
            },
            _ => None,
        }
    }

    /// Bounding box in device space.
    ///
    /// `/BBox` or `/Rect` when present, otherwise the box of [`obj`](Self::obj).
    pub fn bbox(&self) -> Option<Rect> {
        let page = self.page()?;
        if let (Some(dict), Some(doc)) = (self.props.as_dict(), page.doc()) {
            for key in ["BBox", "Rect"] {
                let Some(raw) = dict.get(key) else {
                    continue;
                };
                match doc.resolve(raw).and_then(rect_value) {
                    Ok(rect) => return Some(page.ctm().transform_rect(&rect)),
                    Err(e) => report_rect(&doc, key, &e, raw),
                }
            }
        }
        self.obj()?.bbox()
    }
}

fn report_rect(doc: &Document, key: &str, e: &Error, raw: &Object) {
    doc.report(
        DiagnosticKind::MalformedRect,
        &format!("'{}' entry is not a rectangle ({})", key, e),
        raw,
    );
}
