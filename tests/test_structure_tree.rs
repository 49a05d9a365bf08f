//! Integration tests for the logical structure tree.
//!
//! Documents are assembled object by object with the fixture in `common`,
//! with page content supplied by a static interpreter.

mod common;

use common::{dict, elem, elem_on, init_logging, mcr, objr, rect, Fixture};
use pdf_structure::document::Document;
use pdf_structure::geometry::Rect;
use pdf_structure::interpret::{FormXObject, ImageObject, MarkedContent, PageContent};
use pdf_structure::object::Object;
use pdf_structure::structure::{
    snapshot_element, snapshot_tree, to_json, Content, Element, Findable, Matcher, Node, Parent,
    ReferencedObject, StructType,
};
use pdf_structure::{DiagnosticKind, ReaderOptions};
use regex::Regex;
use std::sync::Arc;

fn count(doc: &Document, kind: DiagnosticKind) -> usize {
    doc.diagnostics().iter().filter(|d| d.kind == kind).count()
}

fn content_with(objects: &[(i64, Rect)], texts: &[(i64, &str)]) -> PageContent {
    let mut content = PageContent::default();
    for (mcid, bbox) in objects {
        content.marked.push_object(Some(*mcid), *bbox);
    }
    for (mcid, text) in texts {
        content.marked.push_text(*mcid, *text);
    }
    content
}

fn describe(node: &Node) -> String {
    match node {
        Node::Element(el) => el.role().to_string(),
        Node::Item(item) => format!("mcid:{}", item.mcid()),
        Node::Object(obj) => format!("obj:{}", obj.object_type()),
    }
}

/// First top-level element of the document's structure tree.
fn first_element(doc: &Document) -> Element {
    doc.structure()
        .expect("tagged document")
        .children()
        .next()
        .and_then(Node::into_element)
        .expect("top-level element")
}

/// Document > [H1(0), Sect > [P(1), P(2), Figure(link)], P(3)], all on page 0.
fn example() -> Arc<Document> {
    let mut fx = Fixture::new(1);
    let pg = fx.page(0);
    let annot = fx.annotate(
        0,
        dict(vec![
            ("Type", Object::name("Annot")),
            ("Subtype", Object::name("Link")),
            ("Rect", rect(10, 700, 110, 720)),
        ]),
    );
    let document = fx.reserve();
    let h1 = fx.add(elem_on("H1", pg, Some(Object::Integer(0))));
    let p1 = fx.add(elem_on("P", pg, Some(Object::Integer(1))));
    let p2 = fx.add(elem_on("P", pg, Some(Object::Integer(2))));
    let figure = fx.add(elem_on("Figure", pg, Some(objr(annot, None))));
    let sect = fx.add(elem_on(
        "Sect",
        pg,
        Some(Object::Array(vec![p1.into(), p2.into(), figure.into()])),
    ));
    let p3 = fx.add(elem_on("P", pg, Some(Object::Integer(3))));
    fx.set(
        document,
        elem_on(
            "Document",
            pg,
            Some(Object::Array(vec![h1.into(), sect.into(), p3.into()])),
        ),
    );
    fx.root_kids(document.into());
    fx.content(
        0,
        content_with(
            &[
                (0, Rect::new(50.0, 40.0, 200.0, 30.0)),
                (1, Rect::new(50.0, 100.0, 300.0, 20.0)),
                (2, Rect::new(50.0, 130.0, 300.0, 20.0)),
                (3, Rect::new(50.0, 700.0, 100.0, 20.0)),
            ],
            &[(0, "Title"), (1, "First. "), (2, "Second."), (3, "End")],
        ),
    );
    fx.open()
}

// =============================================================================
// CHILDREN RESOLUTION TESTS
// =============================================================================

mod resolver_tests {
    use super::*;

    #[test]
    fn test_bare_mcid_without_page_is_dropped() {
        init_logging();
        let mut fx = Fixture::new(1);
        let p = fx.add(elem("P", Some(Object::Integer(5))));
        fx.root_kids(Object::Array(vec![p.into()]));
        let doc = fx.open();

        let el = first_element(&doc);
        assert_eq!(el.children().count(), 0);
        assert_eq!(doc.diagnostics().len(), 1);
        assert_eq!(count(&doc, DiagnosticKind::MissingPage), 1);
    }

    #[test]
    fn test_bare_mcid_uses_element_page() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let p = fx.add(elem_on("P", pg, Some(Object::Integer(5))));
        fx.root_kids(p.into());
        let doc = fx.open();

        let kids: Vec<Node> = first_element(&doc).children().collect();
        assert_eq!(kids.len(), 1);
        let Node::Item(item) = &kids[0] else {
            panic!("expected a content item, got {:?}", kids[0]);
        };
        assert_eq!(item.mcid(), 5);
        assert_eq!(item.stream(), None);
        assert!(Arc::ptr_eq(&item.page().unwrap(), &doc.pages()[0]));
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_list_keeps_document_order() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let p = fx.add(elem_on(
            "P",
            pg,
            Some(Object::Array(vec![
                Object::Integer(5),
                Object::Dictionary(elem("Span", None)),
            ])),
        ));
        fx.root_kids(p.into());
        let doc = fx.open();

        let kids: Vec<Node> = first_element(&doc).children().collect();
        assert_eq!(kids.len(), 2);
        assert!(matches!(&kids[0], Node::Item(item) if item.mcid() == 5));
        assert!(matches!(&kids[1], Node::Element(el) if el.role() == "Span"));
    }

    #[test]
    fn test_nested_lists_are_flattened() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let inner = fx.add(Object::Array(vec![Object::Integer(1), Object::Integer(2)]));
        let p = fx.add(elem_on(
            "P",
            pg,
            Some(Object::Array(vec![
                Object::Integer(0),
                inner.into(),
                Object::Integer(3),
            ])),
        ));
        fx.root_kids(p.into());
        let doc = fx.open();

        assert_eq!(first_element(&doc).mcids(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_shared_array_is_not_a_cycle() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let shared = fx.add(Object::Array(vec![Object::Integer(1), Object::Integer(2)]));
        let span = fx.add(elem_on("Span", pg, Some(shared.into())));
        let p = fx.add(elem_on(
            "P",
            pg,
            Some(Object::Array(vec![
                shared.into(),
                shared.into(),
                span.into(),
                span.into(),
            ])),
        ));
        fx.root_kids(p.into());
        let doc = fx.open();

        let p = first_element(&doc);
        assert_eq!(p.mcids(), vec![1, 2, 1, 2]);
        let roles: Vec<String> = p.find_all(Matcher::All).map(|n| describe(&n)).collect();
        let expected = ["mcid:1", "mcid:2", "mcid:1", "mcid:2", "Span", "mcid:1", "mcid:2"];
        assert_eq!(roles[..7], expected);
        assert_eq!(roles[7..], expected[4..]);
        assert_eq!(p.contents().count(), 8);
        assert_eq!(count(&doc, DiagnosticKind::CyclicStructure), 0);
    }

    #[test]
    fn test_object_reference_to_element_yields_element() {
        let mut fx = Fixture::new(1);
        let figure = fx.add(elem("Figure", None));
        let div = fx.add(elem("Div", Some(objr(figure, None))));
        fx.root_kids(div.into());
        let doc = fx.open();

        let kids: Vec<Node> = first_element(&doc).children().collect();
        assert_eq!(kids.len(), 1);
        let el = kids[0].as_element().expect("element, not a content object");
        assert_eq!(el.role(), "Figure");
        assert_eq!(el.objid(), Some(figure));
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_object_reference_to_annotation() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let figure = tree.find("Figure").and_then(Node::into_element).unwrap();

        let kids: Vec<Node> = figure.children().collect();
        let Node::Object(obj) = &kids[0] else {
            panic!("expected a content object, got {:?}", kids[0]);
        };
        assert_eq!(obj.object_type(), "Annot");
        assert_eq!(obj.pageref(), doc.pages()[0].pageref());
        assert_eq!(obj.bbox(), Some(Rect::from_corners(10.0, 72.0, 110.0, 92.0)));
        match obj.obj() {
            Some(ReferencedObject::Annotation(annot)) => {
                assert_eq!(annot.subtype.as_deref(), Some("Link"));
                assert_eq!(annot.objid, obj.objid());
            },
            other => panic!("expected an annotation, got {:?}", other),
        }
    }

    #[test]
    fn test_object_reference_without_page_is_dropped() {
        let mut fx = Fixture::new(1);
        let annot = fx.annotate(0, dict(vec![("Subtype", Object::name("Text"))]));
        let figure = fx.add(elem("Figure", Some(objr(annot, None))));
        fx.root_kids(figure.into());
        let doc = fx.open();

        assert_eq!(first_element(&doc).children().count(), 0);
        assert_eq!(count(&doc, DiagnosticKind::MissingPage), 1);
    }

    #[test]
    fn test_object_reference_to_image() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let image = fx.add(Object::Stream {
            dict: dict(vec![
                ("Type", Object::name("XObject")),
                ("Subtype", Object::name("Image")),
            ]),
            data: bytes::Bytes::new(),
        });
        let figure = fx.add(elem_on("Figure", pg, Some(objr(image, None))));
        fx.root_kids(figure.into());
        let mut content = PageContent::default();
        content.images.push(ImageObject {
            objid: image,
            bbox: Rect::new(100.0, 100.0, 50.0, 50.0),
            mcid: None,
        });
        fx.content(0, content);
        let doc = fx.open();

        let Some(Node::Object(obj)) = first_element(&doc).children().next() else {
            panic!("expected a content object");
        };
        assert_eq!(obj.object_type(), "XObject");
        assert!(matches!(obj.obj(), Some(ReferencedObject::Image(_))));
        assert_eq!(obj.bbox(), Some(Rect::new(100.0, 100.0, 50.0, 50.0)));
    }

    #[test]
    fn test_malformed_children_are_skipped() {
        init_logging();
        let mut fx = Fixture::new(2);
        let (pg0, pg1) = (fx.page(0), fx.page(1));
        let not_a_page = fx.add(Object::dict([("Type", Object::name("Font"))]));
        let p = fx.add(elem_on(
            "P",
            pg0,
            Some(Object::Array(vec![
                mcr(1, Some(pg1)),
                Object::dict([("Type", Object::name("MCR"))]),
                Object::dict([
                    ("Type", Object::name("MCR")),
                    ("MCID", Object::Integer(9)),
                    ("Pg", Object::Integer(3)),
                ]),
                mcr(9, Some(not_a_page)),
                Object::Real(1.5),
                Object::dict([("Type", Object::name("OBJR")), ("Obj", Object::Integer(4))]),
                mcr(2, None),
            ])),
        ));
        fx.root_kids(p.into());
        let doc = fx.open();

        let items: Vec<(i64, usize)> = first_element(&doc)
            .children()
            .map(|node| match node {
                Node::Item(item) => (item.mcid(), item.pageref().unwrap().index()),
                other => panic!("unexpected child {:?}", other),
            })
            .collect();
        assert_eq!(items, vec![(1, 1), (2, 0)]);
        assert_eq!(count(&doc, DiagnosticKind::InvalidMcid), 1);
        assert_eq!(count(&doc, DiagnosticKind::InvalidPageRef), 1);
        assert_eq!(count(&doc, DiagnosticKind::PageNotFound), 1);
        assert_eq!(count(&doc, DiagnosticKind::UnrecognizedKid), 1);
        assert_eq!(count(&doc, DiagnosticKind::InvalidObjectRef), 1);
    }

    #[test]
    fn test_unresolvable_child_is_skipped() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let missing = pdf_structure::object::ObjectRef::new(999, 0);
        let p = fx.add(elem_on(
            "P",
            pg,
            Some(Object::Array(vec![missing.into(), Object::Integer(0)])),
        ));
        fx.root_kids(p.into());
        let doc = fx.open();

        assert_eq!(first_element(&doc).mcids(), vec![0]);
        assert_eq!(count(&doc, DiagnosticKind::Unresolved), 1);
    }

    #[test]
    fn test_marked_content_in_form_xobject() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let form = fx.add(Object::Stream {
            dict: dict(vec![
                ("Type", Object::name("XObject")),
                ("Subtype", Object::name("Form")),
                ("BBox", rect(0, 0, 100, 100)),
            ]),
            data: bytes::Bytes::new(),
        });
        let first_section = || dict(vec![("Type", Object::name("MCR")), ("MCID", 0i64.into())]);
        let mut in_form = first_section();
        in_form.insert("Stm".to_string(), form.into());
        let mut bad_stream = first_section();
        bad_stream.insert("Stm".to_string(), Object::Integer(7));
        let p = fx.add(elem_on(
            "P",
            pg,
            Some(Object::Array(vec![
                Object::Dictionary(in_form),
                Object::Dictionary(bad_stream),
            ])),
        ));
        fx.root_kids(p.into());

        let mut form_content = MarkedContent::default();
        form_content.push_object(Some(0), Rect::new(5.0, 5.0, 20.0, 10.0));
        form_content.push_text(0, "inside form");
        let mut content = content_with(
            &[(0, Rect::new(300.0, 300.0, 10.0, 10.0))],
            &[(0, "on page")],
        );
        content.xobjects.push(FormXObject {
            objid: form,
            bbox: Rect::new(0.0, 0.0, 100.0, 100.0),
            mcid: Some(4),
            content: form_content,
        });
        fx.content(0, content);
        let doc = fx.open();

        let items: Vec<Node> = first_element(&doc).children().collect();
        assert_eq!(items.len(), 2);
        let (Node::Item(in_form), Node::Item(on_page)) = (&items[0], &items[1]) else {
            panic!("expected two content items");
        };
        assert_eq!(in_form.stream(), Some(form));
        assert_eq!(in_form.text(), Some("inside form"));
        assert_eq!(in_form.bbox(), Some(Rect::new(5.0, 5.0, 20.0, 10.0)));
        assert_eq!(on_page.stream(), None);
        assert_eq!(on_page.text(), Some("on page"));
        assert_eq!(count(&doc, DiagnosticKind::InvalidStream), 1);
    }
}

// =============================================================================
// ELEMENT TESTS
// =============================================================================

mod element_tests {
    use super::*;

    #[test]
    fn test_role_falls_back_to_type() {
        let mut fx = Fixture::new(1);
        let widget = fx.add(elem("Widget", None));
        fx.root_kids(widget.into());
        let doc = fx.open();

        let el = first_element(&doc);
        assert_eq!(el.struct_type(), "Widget");
        assert_eq!(el.role(), "Widget");
        assert_eq!(el.standard_type(), StructType::Custom("Widget".into()));
        assert!(doc.structure().unwrap().role_map().is_empty());
    }

    #[test]
    fn test_role_map_is_applied() {
        let mut fx = Fixture::new(1);
        let para = fx.add(elem("Para", None));
        let heading = fx.add(elem("Heading", None));
        let other = fx.add(elem("Other", None));
        fx.root_entry(
            "RoleMap",
            Object::dict([
                ("Para", Object::name("P")),
                ("Heading", Object::name("H2")),
                ("Broken", Object::Integer(1)),
            ]),
        );
        fx.root_kids(Object::Array(vec![para.into(), heading.into(), other.into()]));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let roles: Vec<String> = tree.children().map(|n| describe(&n)).collect();
        assert_eq!(roles, vec!["P", "H2", "Other"]);
        let heading = tree.find("H2").and_then(Node::into_element).unwrap();
        assert_eq!(heading.struct_type(), "Heading");
        assert!(heading.standard_type().is_heading());
        assert_eq!(heading.standard_type().heading_level(), Some(2));
        let para = tree.find("P").and_then(Node::into_element).unwrap();
        assert!(para.standard_type().is_block());
        let other = tree.find("Other").and_then(Node::into_element).unwrap();
        assert_eq!(other.standard_type(), StructType::Custom("Other".to_string()));
        assert!(!other.standard_type().is_block());
        assert_eq!(
            tree.role_map().keys().collect::<Vec<_>>(),
            vec!["Heading", "Para"]
        );
        assert_eq!(count(&doc, DiagnosticKind::MalformedRoleMap), 1);
    }

    #[test]
    fn test_role_is_never_absent() {
        let mut fx = Fixture::new(1);
        let untyped = fx.add(dict(vec![("Type", Object::name("StructElem"))]));
        fx.root_kids(untyped.into());
        let doc = fx.open();

        let el = first_element(&doc);
        assert_eq!(el.role(), "");
        assert_eq!(count(&doc, DiagnosticKind::MissingStructType), 1);
        // Cached: asking again records nothing new.
        assert_eq!(el.role(), "");
        assert_eq!(count(&doc, DiagnosticKind::MissingStructType), 1);
    }

    #[test]
    fn test_supplied_role_bypasses_role_map() {
        let doc = example();
        let el = first_element(&doc).with_role("Art");
        assert_eq!(el.role(), "Art");
        assert_eq!(el.struct_type(), "Document");
    }

    #[test]
    fn test_parent_resolution() {
        let mut fx = Fixture::new(1);
        let root = fx.root;
        let sect = fx.reserve();
        let mut p = elem("P", None);
        p.insert("P".to_string(), sect.into());
        let p = fx.add(p);
        let mut sect_dict = elem("Sect", Some(p.into()));
        sect_dict.insert("P".to_string(), root.into());
        fx.set(sect, sect_dict);
        let mut orphan = elem("Note", None);
        orphan.insert("P".to_string(), Object::Integer(3));
        let orphan = fx.add(orphan);
        fx.root_kids(Object::Array(vec![sect.into(), orphan.into()]));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let sect = tree.find("Sect").and_then(Node::into_element).unwrap();
        match sect.parent() {
            Some(Parent::Tree(parent)) => assert!(Arc::ptr_eq(&parent, &tree)),
            other => panic!("expected the tree root, got {:?}", other),
        }
        let p = tree.find("P").and_then(Node::into_element).unwrap();
        match p.parent() {
            Some(Parent::Element(parent)) => assert_eq!(parent.role(), "Sect"),
            other => panic!("expected an element, got {:?}", other),
        }
        let orphan = tree.find("Note").and_then(Node::into_element).unwrap();
        assert!(orphan.parent().is_none());
        assert_eq!(count(&doc, DiagnosticKind::MalformedParent), 1);
    }

    #[test]
    fn test_explicit_bbox_is_transformed() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let mut figure = elem_on("Figure", pg, None);
        figure.insert("BBox".to_string(), rect(0, 0, 100, 100));
        let figure = fx.add(figure);
        fx.root_kids(figure.into());
        let doc = fx.open();

        assert_eq!(
            first_element(&doc).bbox(),
            Some(Rect::from_corners(0.0, 692.0, 100.0, 792.0))
        );
    }

    #[test]
    fn test_explicit_bbox_without_page_is_undefined() {
        let mut fx = Fixture::new(1);
        let mut figure = elem("Figure", None);
        figure.insert("BBox".to_string(), rect(0, 0, 100, 100));
        let figure = fx.add(figure);
        fx.root_kids(figure.into());
        let doc = fx.open();

        assert_eq!(first_element(&doc).bbox(), None);
    }

    #[test]
    fn test_malformed_page_is_reported_once() {
        let mut fx = Fixture::new(1);
        let mut props = elem("P", Some(Object::Array(vec![mcr(0, None)])));
        props.insert("Pg".to_string(), Object::Integer(3));
        let p = fx.add(props);
        fx.root_kids(p.into());
        let doc = fx.open();

        let p = first_element(&doc);
        assert!(p.page().is_none());
        assert!(p.page().is_none());
        assert_eq!(p.children().count(), 0);
        assert_eq!(p.bbox(), None);
        assert_eq!(count(&doc, DiagnosticKind::InvalidPageRef), 1);
    }

    #[test]
    fn test_bbox_without_content_is_undefined() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let empty = fx.add(elem_on("P", pg, Some(Object::Array(Vec::new()))));
        fx.root_kids(empty.into());
        let doc = fx.open();

        assert_eq!(first_element(&doc).bbox(), None);
    }

    #[test]
    fn test_bbox_unions_content_on_own_page() {
        let mut fx = Fixture::new(2);
        let (pg0, pg1) = (fx.page(0), fx.page(1));
        let p = fx.add(elem_on(
            "P",
            pg0,
            Some(Object::Array(vec![
                Object::Integer(0),
                Object::Integer(1),
                mcr(2, Some(pg1)),
            ])),
        ));
        fx.root_kids(p.into());
        fx.content(
            0,
            content_with(
                &[
                    (0, Rect::new(10.0, 10.0, 10.0, 10.0)),
                    (1, Rect::new(50.0, 40.0, 10.0, 10.0)),
                ],
                &[],
            ),
        );
        fx.content(1, content_with(&[(2, Rect::new(500.0, 500.0, 10.0, 10.0))], &[]));
        let doc = fx.open();

        assert_eq!(
            first_element(&doc).bbox(),
            Some(Rect::new(10.0, 10.0, 50.0, 40.0))
        );
    }

    #[test]
    fn test_bbox_falls_back_when_explicit_box_is_malformed() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let mut p = elem_on("P", pg, Some(Object::Integer(0)));
        p.insert("BBox".to_string(), Object::name("Nope"));
        let p = fx.add(p);
        fx.root_kids(p.into());
        fx.content(0, content_with(&[(0, Rect::new(1.0, 2.0, 3.0, 4.0))], &[]));
        let doc = fx.open();

        assert_eq!(first_element(&doc).bbox(), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(count(&doc, DiagnosticKind::MalformedRect), 1);
    }

    #[test]
    fn test_contents_never_yields_elements() {
        let doc = example();
        let document = first_element(&doc);

        let mcids: Vec<String> = document
            .contents()
            .map(|content| match content {
                Content::Item(item) => format!("mcid:{}", item.mcid()),
                Content::Object(obj) => format!("obj:{}", obj.object_type()),
            })
            .collect();
        assert_eq!(mcids, vec!["mcid:0", "mcid:1", "mcid:2", "obj:Annot", "mcid:3"]);
    }

    #[test]
    fn test_text_concatenates_sections() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let sect = tree.find("Sect").and_then(Node::into_element).unwrap();
        assert_eq!(sect.text().as_deref(), Some("First. Second."));
        assert_eq!(first_element(&doc).text().as_deref(), Some("TitleFirst. Second.End"));

        let figure = tree.find("Figure").and_then(Node::into_element).unwrap();
        assert_eq!(figure.text(), None);
    }

    #[test]
    fn test_text_attributes() {
        let mut fx = Fixture::new(1);
        let mut figure = elem("Figure", None);
        figure.insert("Alt".to_string(), Object::String(b"A chart".to_vec()));
        figure.insert("Lang".to_string(), Object::String(b"en-US".to_vec()));
        figure.insert(
            "ActualText".to_string(),
            Object::String(vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]),
        );
        figure.insert("T".to_string(), Object::String(b"Sales".to_vec()));
        let figure = fx.add(figure);
        fx.root_kids(figure.into());
        let doc = fx.open();

        let el = first_element(&doc);
        assert_eq!(el.alt_text().as_deref(), Some("A chart"));
        assert_eq!(el.lang().as_deref(), Some("en-US"));
        assert_eq!(el.actual_text().as_deref(), Some("Hi"));
        assert_eq!(el.title().as_deref(), Some("Sales"));
        assert_eq!(el.id(), None);
    }
}

// =============================================================================
// TREE TESTS
// =============================================================================

mod tree_tests {
    use super::*;

    #[test]
    fn test_untagged_document_has_no_tree() {
        let mut fx = Fixture::new(1);
        fx.untagged();
        let doc = fx.open();
        assert!(doc.structure().is_none());
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_tree_is_shared() {
        let doc = example();
        let first = doc.structure().unwrap();
        let second = doc.structure().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lazy_maps_are_memoized() {
        let doc = example();
        let tree = doc.structure().unwrap();
        assert!(std::ptr::eq(tree.role_map(), tree.role_map()));
        assert!(std::ptr::eq(tree.parent_tree(), tree.parent_tree()));
    }

    #[test]
    fn test_missing_parent_tree_finds_nothing() {
        let doc = example();
        let tree = doc.structure().unwrap();
        assert!(tree.parent_tree().is_empty());
        for key in [-1, 0, 1, 100] {
            assert!(tree.parent_tree().get(key).is_none());
        }
        assert!(tree.element_for_mcid(&doc.pages()[0], 0).is_none());
    }

    #[test]
    fn test_parent_tree_lookups() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let title = fx.add(elem_on("Title", pg, Some(Object::Integer(0))));
        let body = fx.add(elem_on("P", pg, Some(Object::Integer(1))));
        let link = fx.add(elem_on("Link", pg, None));
        let leaf_a = fx.add(Object::dict([(
            "Nums",
            Object::Array(vec![
                Object::Integer(0),
                Object::Array(vec![title.into(), body.into()]),
            ]),
        )]));
        let leaf_b = fx.add(Object::dict([(
            "Nums",
            Object::Array(vec![Object::Integer(7), link.into()]),
        )]));
        let parent_tree = fx.add(Object::dict([(
            "Kids",
            Object::Array(vec![leaf_a.into(), leaf_b.into(), leaf_a.into()]),
        )]));
        fx.root_entry("ParentTree", parent_tree.into());
        fx.root_kids(Object::Array(vec![title.into(), body.into(), link.into()]));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let page = &doc.pages()[0];
        assert_eq!(tree.parent_tree().len(), 2);
        assert_eq!(
            tree.element_for_mcid(page, 1).map(|el| el.role().to_string()),
            Some("P".to_string())
        );
        assert_eq!(tree.element_for_mcid(page, 0).and_then(|el| el.objid()), Some(title));
        assert!(tree.element_for_mcid(page, 5).is_none());
        assert_eq!(tree.element_for_object(7).and_then(|el| el.objid()), Some(link));
        assert!(tree.element_for_object(8).is_none());
        // leaf_a is listed twice.
        assert_eq!(count(&doc, DiagnosticKind::MalformedNumberTree), 1);
    }

    #[test]
    fn test_root_kids_of_wrong_shape() {
        let mut fx = Fixture::new(1);
        fx.root_kids(Object::Integer(3));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        assert_eq!(tree.children().count(), 0);
        assert_eq!(count(&doc, DiagnosticKind::IrregularRoot), 1);
    }

    #[test]
    fn test_root_without_kids_is_empty() {
        let doc = Fixture::new(1).open();
        let tree = doc.structure().unwrap();
        assert_eq!(tree.children().count(), 0);
        assert_eq!(tree.find_all(Matcher::All).count(), 0);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_irregular_root_entries_are_tolerated() {
        init_logging();
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let annot = fx.annotate(0, dict(vec![("Rect", rect(0, 0, 10, 10))]));
        let p = fx.add(elem("P", None));
        fx.root_kids(Object::Array(vec![
            mcr(0, None),
            objr(annot, Some(pg)),
            p.into(),
        ]));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let kids: Vec<String> = tree.children().map(|n| describe(&n)).collect();
        assert_eq!(kids, vec!["obj:Annot", "P"]);
        assert_eq!(count(&doc, DiagnosticKind::IrregularRoot), 2);
        assert_eq!(count(&doc, DiagnosticKind::MissingPage), 1);
    }

    #[test]
    fn test_reading_order_per_page() {
        let mut fx = Fixture::new(2);
        let (pg0, pg1) = (fx.page(0), fx.page(1));
        let a = fx.add(elem_on(
            "P",
            pg0,
            Some(Object::Array(vec![Object::Integer(0), Object::Integer(1)])),
        ));
        let b = fx.add(elem_on("P", pg1, Some(Object::Integer(0))));
        let c = fx.add(elem_on("P", pg0, Some(Object::Integer(2))));
        fx.root_kids(Object::Array(vec![a.into(), b.into(), c.into()]));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        assert_eq!(tree.reading_order(0), vec![0, 1, 2]);
        assert_eq!(tree.reading_order(1), vec![0]);
        assert!(tree.reading_order(2).is_empty());
        assert_eq!(tree.contents().count(), 4);
    }
}

// =============================================================================
// TRAVERSAL TESTS
// =============================================================================

mod traversal_tests {
    use super::*;

    #[test]
    fn test_find_all_is_preorder() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let order: Vec<String> = tree.find_all(None::<&str>).map(|n| describe(&n)).collect();
        assert_eq!(
            order,
            vec![
                "Document",
                "H1",
                "mcid:0",
                "Sect",
                "P",
                "mcid:1",
                "P",
                "mcid:2",
                "Figure",
                "obj:Annot",
                "P",
                "mcid:3",
            ]
        );
        assert_eq!(tree.descendants().count(), order.len());
    }

    #[test]
    fn test_find_all_from_element() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let sect = tree.find("Sect").and_then(Node::into_element).unwrap();
        let order: Vec<String> = sect.find_all(Matcher::All).map(|n| describe(&n)).collect();
        assert_eq!(order, vec!["P", "mcid:1", "P", "mcid:2", "Figure", "obj:Annot"]);
    }

    #[test]
    fn test_string_matcher() {
        let doc = example();
        let tree = doc.structure().unwrap();
        assert_eq!(tree.find_all("P").count(), 3);
        assert!(tree.find("Figure").is_some());
        assert!(tree.find("Table").is_none());
    }

    #[test]
    fn test_pattern_matches_from_start() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let headings: Vec<String> = tree
            .find_all(Regex::new("H[1-6]").unwrap())
            .map(|n| describe(&n))
            .collect();
        assert_eq!(headings, vec!["H1"]);
        assert_eq!(tree.find_all(Regex::new("S").unwrap()).count(), 1);
        // "1" occurs in "H1" but not at the start.
        assert_eq!(tree.find_all(Regex::new("1").unwrap()).count(), 0);
    }

    #[test]
    fn test_predicate_matcher() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let items = tree
            .find_all(Matcher::predicate(|n| matches!(n, Node::Item(_))))
            .count();
        assert_eq!(items, 4);
        let on_page = tree
            .find_all(Matcher::predicate(|n| {
                n.page().map(|p| p.index()) == Some(0) && n.is_element()
            }))
            .count();
        assert_eq!(on_page, 7);
    }

    #[test]
    fn test_deep_tree_does_not_overflow() {
        const DEPTH: usize = 5_000;
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let mut child = fx.add(elem_on("Span", pg, Some(Object::Integer(0))));
        for _ in 1..DEPTH {
            child = fx.add(elem("Div", Some(child.into())));
        }
        fx.root_kids(child.into());
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        assert_eq!(tree.find_all(Matcher::All).count(), DEPTH + 1);
        assert_eq!(first_element(&doc).contents().count(), 1);
        assert!(tree.find("Span").is_some());
    }

    #[test]
    fn test_self_containing_element_terminates() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let looped = fx.reserve();
        fx.set(
            looped,
            elem_on(
                "Div",
                pg,
                Some(Object::Array(vec![looped.into(), Object::Integer(0)])),
            ),
        );
        fx.root_kids(looped.into());
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let order: Vec<String> = tree.find_all(Matcher::All).map(|n| describe(&n)).collect();
        assert_eq!(order, vec!["Div", "mcid:0"]);
        assert_eq!(first_element(&doc).contents().count(), 1);
        assert!(count(&doc, DiagnosticKind::CyclicStructure) >= 1);
    }

    #[test]
    fn test_inline_element_inside_its_own_array_terminates() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let array = fx.reserve();
        fx.set(
            array,
            Object::Array(vec![
                Object::Dictionary(elem_on("Div", pg, Some(array.into()))),
                Object::Integer(0),
            ]),
        );
        let sect = fx.add(elem_on("Sect", pg, Some(array.into())));
        fx.root_kids(sect.into());
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let order: Vec<String> = tree.find_all(Matcher::All).map(|n| describe(&n)).collect();
        assert_eq!(order, vec!["Sect", "Div", "mcid:0"]);
        assert_eq!(tree.contents().count(), 1);

        let roots = snapshot_tree(&tree);
        assert_eq!(roots[0].element_count(), 2);
        assert_eq!(roots[0].mcids, vec![0]);
        assert!(roots[0].children[0].mcids.is_empty());
        assert!(count(&doc, DiagnosticKind::CyclicStructure) >= 1);
    }

    #[test]
    fn test_root_array_containing_itself_terminates() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let array = fx.reserve();
        fx.set(
            array,
            Object::Array(vec![
                Object::Dictionary(elem_on("Div", pg, Some(array.into()))),
                array.into(),
            ]),
        );
        fx.root_kids(array.into());
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let order: Vec<String> = tree.find_all(Matcher::All).map(|n| describe(&n)).collect();
        assert_eq!(order, vec!["Div"]);
        assert_eq!(tree.contents().count(), 0);
        assert_eq!(snapshot_tree(&tree).len(), 1);
        assert!(count(&doc, DiagnosticKind::CyclicStructure) >= 2);
    }

    #[test]
    fn test_find_leaves_children_of_match_unread() {
        let mut fx = Fixture::new(1);
        let pg = fx.page(0);
        let sect = fx.add(elem_on(
            "Sect",
            pg,
            Some(Object::Array(vec![Object::Real(1.5), Object::Integer(0)])),
        ));
        fx.root_kids(sect.into());
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        let found = tree.find("Sect").and_then(Node::into_element).unwrap();
        assert_eq!(found.objid(), Some(sect));
        assert!(doc.diagnostics().is_empty());

        let mut all = tree.find_all(Matcher::All);
        assert!(matches!(all.next(), Some(Node::Element(_))));
        assert_eq!(count(&doc, DiagnosticKind::UnrecognizedKid), 0);
        assert!(matches!(all.next(), Some(Node::Item(item)) if item.mcid() == 0));
        assert_eq!(count(&doc, DiagnosticKind::UnrecognizedKid), 1);
    }
}

// =============================================================================
// WEAK HANDLE TESTS
// =============================================================================

mod lifetime_tests {
    use super::*;

    #[test]
    fn test_nodes_do_not_keep_document_alive() {
        let doc = example();
        let docref = doc.docref();
        let tree = doc.structure().unwrap();
        let document = first_element(&doc);
        let item = tree
            .find_all(Matcher::predicate(|n| matches!(n, Node::Item(_))))
            .next()
            .unwrap();
        drop(doc);

        assert!(!docref.is_live());
        assert!(docref.deref().is_err());
        assert_eq!(tree.children().count(), 0);
        assert!(document.page().is_none());
        assert!(document.bbox().is_none());
        assert_eq!(document.role(), "Document");
        assert!(item.page().is_none());
        assert!(item.bbox().is_none());
    }
}

// =============================================================================
// SNAPSHOT TESTS
// =============================================================================

mod snapshot_tests {
    use super::*;

    #[test]
    fn test_snapshot_tree_shape() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let roots = snapshot_tree(&tree);
        assert_eq!(roots.len(), 1);

        let document = &roots[0];
        assert_eq!(document.role, "Document");
        assert_eq!(document.page_index, Some(0));
        assert_eq!(document.element_count(), 7);
        let roles: Vec<&str> = document.children.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["H1", "Sect", "P"]);
        assert_eq!(document.children[0].mcids, vec![0]);
        let figure = &document.children[1].children[2];
        assert_eq!(figure.role, "Figure");
        assert_eq!(figure.objects, 1);

        let json = to_json(&roots).unwrap();
        assert!(json.contains("\"role\": \"Figure\""));
        assert!(json.contains("\"objects\": 1"));
    }

    #[test]
    fn test_snapshot_element() {
        let doc = example();
        let tree = doc.structure().unwrap();
        let sect = tree.find("Sect").and_then(Node::into_element).unwrap();
        let snapshot = snapshot_element(&sect);
        assert_eq!(snapshot.role, "Sect");
        assert_eq!(snapshot.children.len(), 3);
        assert_eq!(snapshot.children[1].mcids, vec![2]);
    }
}

// =============================================================================
// OPTIONS TESTS
// =============================================================================

mod options_tests {
    use super::*;

    #[test]
    fn test_strict_options_recover_without_recording() {
        let mut fx = Fixture::new(1);
        let p = fx.add(elem("P", Some(Object::Integer(5))));
        fx.root_kids(p.into());
        fx.options(ReaderOptions::strict());
        let doc = fx.open();

        assert_eq!(first_element(&doc).children().count(), 0);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_diagnostics_can_be_cleared() {
        let mut fx = Fixture::new(1);
        fx.root_kids(Object::Real(0.5));
        let doc = fx.open();

        let tree = doc.structure().unwrap();
        assert_eq!(tree.children().count(), 0);
        assert_eq!(doc.diagnostics().len(), 1);
        assert!(doc.diagnostics()[0].to_string().contains("should be dict or list"));
        doc.clear_diagnostics();
        assert!(doc.diagnostics().is_empty());
    }
}
