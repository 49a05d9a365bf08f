//! Shared fixtures: small tagged documents built object by object.

#![allow(dead_code)]

use pdf_structure::document::Document;
use pdf_structure::interpret::{PageContent, StaticInterpreter};
use pdf_structure::object::{Dictionary, Object, ObjectRef, ObjectStore};
use pdf_structure::ReaderOptions;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Object {
    Object::Array(vec![
        Object::Integer(x0),
        Object::Integer(y0),
        Object::Integer(x1),
        Object::Integer(y1),
    ])
}

pub fn dict(entries: Vec<(&str, Object)>) -> Dictionary {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// A structure element dictionary.
pub fn elem(s: &str, k: Option<Object>) -> Dictionary {
    let mut props = dict(vec![("Type", Object::name("StructElem")), ("S", Object::name(s))]);
    if let Some(k) = k {
        props.insert("K".to_string(), k);
    }
    props
}

/// A structure element dictionary on page `pg`.
pub fn elem_on(s: &str, pg: ObjectRef, k: Option<Object>) -> Dictionary {
    let mut props = elem(s, k);
    props.insert("Pg".to_string(), pg.into());
    props
}

pub fn mcr(mcid: i64, pg: Option<ObjectRef>) -> Object {
    let mut props = dict(vec![("Type", Object::name("MCR")), ("MCID", Object::Integer(mcid))]);
    if let Some(pg) = pg {
        props.insert("Pg".to_string(), pg.into());
    }
    Object::Dictionary(props)
}

pub fn objr(target: ObjectRef, pg: Option<ObjectRef>) -> Object {
    let mut props = dict(vec![("Type", Object::name("OBJR")), ("Obj", target.into())]);
    if let Some(pg) = pg {
        props.insert("Pg".to_string(), pg.into());
    }
    Object::Dictionary(props)
}

/// Builder for a US Letter document whose pages are interpreted from
/// pre-recorded content.
pub struct Fixture {
    pub store: ObjectStore,
    pub pages: Vec<ObjectRef>,
    page_dicts: Vec<Dictionary>,
    pages_root: ObjectRef,
    pub root: ObjectRef,
    root_dict: Option<Dictionary>,
    interpreter: StaticInterpreter,
    options: ReaderOptions,
}

impl Fixture {
    pub fn new(page_count: usize) -> Self {
        let mut store = ObjectStore::new();
        let pages_root = store.reserve();
        let root = store.reserve();
        let pages = (0..page_count).map(|_| store.reserve()).collect();
        let page_dicts = (0..page_count)
            .map(|i| {
                dict(vec![
                    ("Type", Object::name("Page")),
                    ("Parent", pages_root.into()),
                    ("StructParents", Object::Integer(i as i64)),
                ])
            })
            .collect();
        Self {
            store,
            pages,
            page_dicts,
            pages_root,
            root,
            root_dict: Some(dict(vec![("Type", Object::name("StructTreeRoot"))])),
            interpreter: StaticInterpreter::new(),
            options: ReaderOptions::default(),
        }
    }

    /// Store `obj` as a new indirect object.
    pub fn add(&mut self, obj: impl Into<Object>) -> ObjectRef {
        self.store.insert(obj.into())
    }

    pub fn reserve(&mut self) -> ObjectRef {
        self.store.reserve()
    }

    pub fn set(&mut self, obj_ref: ObjectRef, obj: impl Into<Object>) {
        self.store.set(obj_ref, obj.into());
    }

    pub fn page(&self, index: usize) -> ObjectRef {
        self.pages[index]
    }

    /// Set an entry of the structure tree root.
    pub fn root_entry(&mut self, key: &str, value: Object) -> &mut Self {
        if let Some(root) = self.root_dict.as_mut() {
            root.insert(key.to_string(), value);
        }
        self
    }

    /// Set the root's `/K`.
    pub fn root_kids(&mut self, k: Object) -> &mut Self {
        self.root_entry("K", k)
    }

    /// Produce an untagged document.
    pub fn untagged(&mut self) -> &mut Self {
        self.root_dict = None;
        self
    }

    pub fn page_entry(&mut self, index: usize, key: &str, value: Object) -> &mut Self {
        self.page_dicts[index].insert(key.to_string(), value);
        self
    }

    /// Add an annotation to a page's `/Annots`.
    pub fn annotate(&mut self, index: usize, annot: Dictionary) -> ObjectRef {
        let annot_ref = self.add(annot);
        let annots = self.page_dicts[index]
            .entry("Annots".to_string())
            .or_insert_with(|| Object::Array(Vec::new()));
        if let Object::Array(items) = annots {
            items.push(annot_ref.into());
        }
        annot_ref
    }

    pub fn content(&mut self, index: usize, content: PageContent) -> &mut Self {
        let page = self.pages[index];
        self.interpreter.insert(page, content);
        self
    }

    pub fn options(&mut self, options: ReaderOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn open(mut self) -> Arc<Document> {
        for (page, props) in self.pages.iter().zip(self.page_dicts) {
            self.store.set(*page, Object::Dictionary(props));
        }
        self.store.set(
            self.pages_root,
            Object::dict([
                ("Type", Object::name("Pages")),
                (
                    "Kids",
                    Object::Array(self.pages.iter().map(|p| Object::Reference(*p)).collect()),
                ),
                ("Count", Object::Integer(self.pages.len() as i64)),
                ("MediaBox", rect(0, 0, 612, 792)),
            ]),
        );
        let mut catalog = dict(vec![
            ("Type", Object::name("Catalog")),
            ("Pages", self.pages_root.into()),
        ]);
        if let Some(root) = self.root_dict {
            self.store.set(self.root, Object::Dictionary(root));
            catalog.insert("StructTreeRoot".to_string(), self.root.into());
        }
        let catalog_ref = self.store.insert(Object::Dictionary(catalog));
        Document::with_options(
            self.store,
            catalog_ref,
            Arc::new(self.interpreter),
            self.options,
        )
        .expect("fixture document")
    }
}
