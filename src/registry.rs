//! Weak handles to live documents and pages.
//!
//! Structure nodes must not keep their document alive, and must not form
//! ownership cycles with it. They hold a [`DocumentRef`] (an index into a
//! process-wide registry plus a generation number) or a [`PageRef`]
//! (a document handle plus a page index) and dereference it on every access.
//! Once a document is dropped its slot's generation is bumped, so stale
//! handles fail to dereference even if the slot is reused.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::page::Page;
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex, Weak};

lazy_static! {
    static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::default());
}

#[derive(Default)]
struct Slot {
    generation: u32,
    doc: Option<Weak<Document>>,
}

#[derive(Default)]
struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Registry {
    fn insert(&mut self, doc: Weak<Document>) -> DocumentRef {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            },
        };
        let slot = &mut self.slots[index];
        slot.doc = Some(doc);
        DocumentRef {
            index,
            generation: slot.generation,
        }
    }

    fn remove(&mut self, docref: DocumentRef) {
        if let Some(slot) = self.slots.get_mut(docref.index) {
            if slot.generation == docref.generation && slot.doc.is_some() {
                slot.doc = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(docref.index);
            }
        }
    }

    fn get(&self, docref: DocumentRef) -> Option<Weak<Document>> {
        let slot = self.slots.get(docref.index)?;
        if slot.generation != docref.generation {
            return None;
        }
        slot.doc.clone()
    }
}

/// Weak handle to a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    index: usize,
    generation: u32,
}

impl DocumentRef {
    /// Get the document if it is still alive.
    pub fn upgrade(&self) -> Option<Arc<Document>> {
        // Lock is released before upgrading.
        let weak = {
            let registry = REGISTRY.lock().unwrap_or_else(|e| e.into_inner());
            registry.get(*self)?
        };
        weak.upgrade()
    }

    /// Get the document, failing with [`Error::DocumentReleased`] if it is gone.
    pub fn deref(&self) -> Result<Arc<Document>> {
        self.upgrade().ok_or(Error::DocumentReleased)
    }

    /// Whether the document is still alive.
    pub fn is_live(&self) -> bool {
        self.upgrade().is_some()
    }
}

/// Weak handle to a page of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef {
    doc: DocumentRef,
    index: usize,
}

impl PageRef {
    pub(crate) fn new(doc: DocumentRef, index: usize) -> Self {
        Self { doc, index }
    }

    /// Handle to the owning document.
    pub fn document(&self) -> DocumentRef {
        self.doc
    }

    /// Zero-based index of the page within its document.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the page if its document is still alive.
    pub fn upgrade(&self) -> Option<Arc<Page>> {
        self.doc.upgrade()?.page(self.index)
    }

    /// Get the page, failing with [`Error::DocumentReleased`] if it is gone.
    pub fn deref(&self) -> Result<Arc<Page>> {
        self.upgrade().ok_or(Error::DocumentReleased)
    }
}

pub(crate) fn register(doc: Weak<Document>) -> DocumentRef {
    REGISTRY
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(doc)
}

pub(crate) fn release(docref: DocumentRef) {
    REGISTRY
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .remove(docref);
}
