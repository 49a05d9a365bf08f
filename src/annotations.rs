//! Page annotations.
//!
//! Only the parts of an annotation dictionary the structure tree needs are
//! kept: identity, subtype, text, placement and the `/StructParent` key that
//! links it back into the parent tree (ISO 32000-1:2008, Section 12.5).

use crate::geometry::{Matrix, Rect};
use crate::object::{decode_text_string, rect_value, Dictionary, ObjectRef};

/// A PDF annotation on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Object id of the annotation dictionary, if it was indirect
    pub objid: Option<ObjectRef>,

    /// Annotation subtype (Text, Link, Widget, ...)
    pub subtype: Option<String>,

    /// Text contents of the annotation
    pub contents: Option<String>,

    /// `/Rect` in default user space
    pub rect: Option<Rect>,

    /// `/Rect` transformed into the page's device space
    pub bbox: Option<Rect>,

    /// Key of this annotation in the structure parent tree
    pub struct_parent: Option<i64>,
}

impl Annotation {
    /// Build from an annotation dictionary on a page with transform `ctm`.
    pub fn from_dict(objid: Option<ObjectRef>, dict: &Dictionary, ctm: &Matrix) -> Self {
        let rect = match dict.get("Rect").map(rect_value) {
            Some(Ok(rect)) => Some(rect),
            Some(Err(e)) => {
                log::warn!("Annotation {:?} has malformed /Rect: {}", objid, e);
                None
            },
            None => None,
        };

        Self {
            objid,
            subtype: dict
                .get("Subtype")
                .and_then(|obj| obj.as_name())
                .map(str::to_string),
            contents: dict
                .get("Contents")
                .and_then(|obj| obj.as_string())
                .map(decode_text_string),
            rect,
            bbox: rect.map(|r| ctm.transform_rect(&r)),
            struct_parent: dict.get("StructParent").and_then(|obj| obj.as_integer()),
        }
    }

    /// Bounding box in device space, if the annotation has a `/Rect`.
    pub fn bbox(&self) -> Option<Rect> {
        self.bbox
    }
}
