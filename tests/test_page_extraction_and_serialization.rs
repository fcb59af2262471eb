//! Integration tests for single-page extraction and whole-document serialization.

use pdfgraph::page_extractor::extract_page;
use pdfgraph::serializer::{write_document, NumberedObject};
use pdfgraph::{Dict, Object, ObjectRef, PdfDocument};
use std::io::Write;

/// Build a three-page document where each page has its own content stream and a shared
/// `/Resources` dictionary inherited from the `/Pages` root, and write it to a temp file.
fn write_three_page_pdf() -> tempfile::NamedTempFile {
    let pages_ref = ObjectRef::new(2, 0);

    let mut shared_resources = Dict::new();
    shared_resources.insert("Font".to_string(), Object::Dictionary(Dict::new()));

    let mut catalog = Dict::new();
    catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
    catalog.insert("Pages".to_string(), Object::Reference(pages_ref));

    let mut pages = Dict::new();
    pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
    pages.insert(
        "Kids".to_string(),
        Object::Array(vec![
            Object::Reference(ObjectRef::new(3, 0)),
            Object::Reference(ObjectRef::new(5, 0)),
            Object::Reference(ObjectRef::new(7, 0)),
        ]),
    );
    pages.insert("Count".to_string(), Object::Integer(3));
    pages.insert(
        "MediaBox".to_string(),
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ]),
    );
    pages.insert("Resources".to_string(), Object::Dictionary(shared_resources));

    let mut objects = vec![
        NumberedObject { id: 1, gen: 0, value: Object::Dictionary(catalog) },
        NumberedObject { id: 2, gen: 0, value: Object::Dictionary(pages) },
    ];

    let mut next_id = 3u32;
    for page_num in 0..3 {
        let content_ref = ObjectRef::new(next_id + 1, 0);
        let mut page = Dict::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert("Parent".to_string(), Object::Reference(pages_ref));
        page.insert("Contents".to_string(), Object::Reference(content_ref));
        objects.push(NumberedObject { id: next_id, gen: 0, value: Object::Dictionary(page) });

        let text = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", page_num + 1);
        objects.push(NumberedObject {
            id: next_id + 1,
            gen: 0,
            value: Object::Stream { dict: Dict::new(), data: bytes::Bytes::from(text.into_bytes()) },
        });
        next_id += 2;
    }

    let bytes = write_document((1, 7), &objects, ObjectRef::new(1, 0), None);
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(&bytes).expect("write pdf bytes");
    tmp
}

#[test]
fn test_extract_page_produces_single_page_document() {
    let tmp = write_three_page_pdf();
    let mut doc = PdfDocument::open(tmp.path()).expect("open failed");

    let extracted = extract_page(&mut doc, 2).expect("extract_page failed");

    let mut extracted_file = tempfile::NamedTempFile::new().unwrap();
    extracted_file.write_all(&extracted).unwrap();

    let mut reopened = PdfDocument::open(extracted_file.path()).expect("reopen extracted pdf");
    assert_eq!(reopened.page_count().expect("page_count failed"), 1);
}

#[test]
fn test_extract_page_inherits_media_box() {
    let tmp = write_three_page_pdf();
    let mut doc = PdfDocument::open(tmp.path()).expect("open failed");
    let extracted = extract_page(&mut doc, 1).expect("extract_page failed");

    let mut extracted_file = tempfile::NamedTempFile::new().unwrap();
    extracted_file.write_all(&extracted).unwrap();

    let mut reopened = PdfDocument::open(extracted_file.path()).unwrap();
    let page = reopened.get_page(0).unwrap();
    let dict = page.as_dict().unwrap();
    let media_box = dict.get("MediaBox").and_then(|o| o.as_array()).expect("MediaBox missing");
    assert_eq!(media_box[2].as_integer(), Some(595));
    assert_eq!(media_box[3].as_integer(), Some(842));
}

#[test]
fn test_extract_page_rejects_zero_page_number() {
    let tmp = write_three_page_pdf();
    let mut doc = PdfDocument::open(tmp.path()).expect("open failed");
    assert!(extract_page(&mut doc, 0).is_err());
}

#[test]
fn test_document_to_bytes_round_trips_page_count() {
    let tmp = write_three_page_pdf();
    let mut doc = PdfDocument::open(tmp.path()).expect("open failed");

    let saved = doc.to_bytes().expect("to_bytes failed");
    let mut saved_file = tempfile::NamedTempFile::new().unwrap();
    saved_file.write_all(&saved).unwrap();

    let mut reopened = PdfDocument::open(saved_file.path()).expect("reopen saved pdf");
    assert_eq!(reopened.page_count().expect("page_count failed"), 3);
}

#[test]
fn test_document_save_writes_openable_file() {
    let tmp = write_three_page_pdf();
    let mut doc = PdfDocument::open(tmp.path()).expect("open failed");

    let out_path = tempfile::NamedTempFile::new().unwrap().path().to_path_buf();
    doc.save(&out_path).expect("save failed");

    let mut reopened = PdfDocument::open(&out_path).expect("reopen saved pdf");
    assert_eq!(reopened.page_count().unwrap(), 3);
}
