//! Content interpretation boundary.
//!
//! Turning a page's content stream into positioned objects and text runs is
//! the job of an external interpreter. The structure reader only needs the
//! result: per marked-content id, which objects were painted where and what
//! text was shown. [`ContentInterpreter`] is that seam; a page calls it at
//! most once and caches the [`PageContent`] it returns.

use crate::error::Result;
use crate::geometry::{bound_rects, Rect};
use crate::object::ObjectRef;
use crate::page::Page;
use std::collections::HashMap;

/// A painted object (text run, path, image or form) in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicObject {
    /// Marked-content id of the innermost enclosing section, if any
    pub mcid: Option<i64>,
    /// Bounding box in device space
    pub bbox: Rect,
}

/// Objects and text runs of one content stream, keyed by marked-content id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkedContent {
    /// Painted objects in content-stream order
    pub objects: Vec<GraphicObject>,
    /// Text runs recorded per marked-content id, in content-stream order
    pub mcid_texts: HashMap<i64, Vec<String>>,
}

impl MarkedContent {
    /// Record a painted object.
    pub fn push_object(&mut self, mcid: Option<i64>, bbox: Rect) {
        self.objects.push(GraphicObject { mcid, bbox });
    }

    /// Record a text run shown inside the marked-content section `mcid`.
    pub fn push_text(&mut self, mcid: i64, text: impl Into<String>) {
        self.mcid_texts.entry(mcid).or_default().push(text.into());
    }

    /// Union of the boxes of every object in section `mcid`.
    pub fn bbox_of(&self, mcid: i64) -> Option<Rect> {
        bound_rects(
            self.objects
                .iter()
                .filter(|obj| obj.mcid == Some(mcid))
                .map(|obj| obj.bbox),
        )
    }

    /// Concatenated text of section `mcid`, `None` if nothing was recorded.
    pub fn text_of(&self, mcid: i64) -> Option<String> {
        self.mcid_texts.get(&mcid).map(|runs| runs.concat())
    }
}

/// A form XObject painted on a page, with its own marked content.
#[derive(Debug, Clone, PartialEq)]
pub struct FormXObject {
    /// Object id of the form's content stream
    pub objid: ObjectRef,
    /// Bounding box in device space
    pub bbox: Rect,
    /// Marked-content id of the `Do` invocation on the page, if any
    pub mcid: Option<i64>,
    /// Marked content inside the form's own stream
    pub content: MarkedContent,
}

/// An image XObject painted on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageObject {
    /// Object id of the image stream
    pub objid: ObjectRef,
    /// Bounding box in device space
    pub bbox: Rect,
    /// Marked-content id of the enclosing section, if any
    pub mcid: Option<i64>,
}

/// Interpreted content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Marked content of the page's own content stream
    pub marked: MarkedContent,
    /// Form XObjects painted on the page
    pub xobjects: Vec<FormXObject>,
    /// Image XObjects painted on the page
    pub images: Vec<ImageObject>,
}

/// Interprets page content streams.
///
/// Implementations may be expensive; pages cache the result.
pub trait ContentInterpreter: Send + Sync {
    /// Interpret the content of `page`.
    fn interpret(&self, page: &Page) -> Result<PageContent>;
}

/// Interpreter that finds nothing on any page.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInterpreter;

impl ContentInterpreter for NullInterpreter {
    fn interpret(&self, _page: &Page) -> Result<PageContent> {
        Ok(PageContent::default())
    }
}

/// Interpreter serving pre-computed content keyed by page object id.
///
/// Useful when content was interpreted elsewhere, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticInterpreter {
    pages: HashMap<ObjectRef, PageContent>,
}

impl StaticInterpreter {
    /// Create an interpreter with no content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the content of the page with object id `page_id`.
    pub fn insert(&mut self, page_id: ObjectRef, content: PageContent) {
        self.pages.insert(page_id, content);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_page(mut self, page_id: ObjectRef, content: PageContent) -> Self {
        self.insert(page_id, content);
        self
    }
}

impl ContentInterpreter for StaticInterpreter {
    fn interpret(&self, page: &Page) -> Result<PageContent> {
        Ok(self.pages.get(&page.objid()).cloned().unwrap_or_default())
    }
}
