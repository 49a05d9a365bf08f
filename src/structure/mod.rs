//! PDF Logical Structure (Tagged PDF) support.
//!
//! This module implements lazy reading and traversal of PDF logical structure
//! trees according to ISO 32000-1:2008 Section 14.7.
//!
//! ## Overview
//!
//! Tagged PDFs contain explicit document structure that defines reading order,
//! semantic meaning, and accessibility information, parallel to the physical
//! page content.
//!
//! ## Structure Tree
//!
//! A structure tree consists of:
//! - **[`Tree`]**: the StructTreeRoot, with its role map and parent tree
//! - **[`Element`]**: structure elements (paragraphs, headings, sections, etc.)
//! - **[`ContentItem`]**: a marked-content section (BMC/BDC/EMC) in a content stream
//! - **[`ContentObject`]**: a whole annotation or XObject
//!
//! Nothing is materialized up front. Children are resolved from the raw `/K`
//! entries as they are iterated, and nodes hold only weak handles to their
//! document and page.
//!
//! ## Reading Order
//!
//! Reading order is the pre-order traversal of the structure tree, as produced
//! by [`Findable::find_all`] or [`Element::contents`].
//!
//! ## Example
//!
//! ```ignore
//! use pdf_structure::structure::Findable;
//!
//! if let Some(tree) = document.structure() {
//!     for heading in tree.find_all(regex::Regex::new("H[1-6]").unwrap()) {
//!         println!("{:?} {:?}", heading.role(), heading.bbox());
//!     }
//!     let order = tree.reading_order(0);
//! }
//! ```

mod content;
pub mod converter;
mod element;
mod kids;
mod number_tree;
pub mod traversal;
mod tree;
mod types;

pub use content::{ContentItem, ContentObject, ReferencedObject};
pub use converter::{snapshot_element, snapshot_tree, to_json, ElementSnapshot};
pub use element::{Contents, Element, Parent};
pub use kids::Kids;
pub use number_tree::NumberTree;
pub use traversal::{FindAll, Findable, Matcher};
pub use tree::Tree;
pub use types::{Content, Node, StructType, TYPE_ANNOT, TYPE_XOBJECT};
