//! Integration tests for the PDF parsing foundation: header, classic xref, trailer, catalog.

use pdfgraph::serializer::{write_document, NumberedObject};
use pdfgraph::{Dict, Object, ObjectRef, PdfDocument};
use std::io::Write;

/// Build a single-page PDF with one content stream and write it to a temp file, returning its
/// path so `PdfDocument::open` can exercise the full file-backed path (not just in-memory bytes).
fn write_simple_pdf() -> tempfile::NamedTempFile {
    let mut catalog = Dict::new();
    catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
    catalog.insert("Pages".to_string(), Object::Reference(ObjectRef::new(2, 0)));

    let mut pages = Dict::new();
    pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
    pages.insert("Kids".to_string(), Object::Array(vec![Object::Reference(ObjectRef::new(3, 0))]));
    pages.insert("Count".to_string(), Object::Integer(1));

    let mut page = Dict::new();
    page.insert("Type".to_string(), Object::Name("Page".to_string()));
    page.insert("Parent".to_string(), Object::Reference(ObjectRef::new(2, 0)));
    page.insert(
        "MediaBox".to_string(),
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    );
    page.insert("Contents".to_string(), Object::Reference(ObjectRef::new(4, 0)));
    page.insert("Resources".to_string(), Object::Dictionary(Dict::new()));

    let content = bytes::Bytes::from_static(b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET");

    let objects = vec![
        NumberedObject { id: 1, gen: 0, value: Object::Dictionary(catalog) },
        NumberedObject { id: 2, gen: 0, value: Object::Dictionary(pages) },
        NumberedObject { id: 3, gen: 0, value: Object::Dictionary(page) },
        NumberedObject { id: 4, gen: 0, value: Object::Stream { dict: Dict::new(), data: content } },
    ];

    let bytes = write_document((1, 7), &objects, ObjectRef::new(1, 0), None);

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(&bytes).expect("write pdf bytes");
    tmp
}

#[test]
fn test_open_simple_pdf() {
    let tmp = write_simple_pdf();
    let pdf = PdfDocument::open(tmp.path()).expect("failed to open simple pdf");
    let _ = format!("{:?}", pdf); // Debug impl should not panic
}

#[test]
fn test_pdf_version() {
    let tmp = write_simple_pdf();
    let pdf = PdfDocument::open(tmp.path()).expect("failed to open simple pdf");
    assert_eq!(pdf.version(), (1, 7));
}

#[test]
fn test_page_count() {
    let tmp = write_simple_pdf();
    let mut pdf = PdfDocument::open(tmp.path()).expect("failed to open simple pdf");
    assert_eq!(pdf.page_count().expect("page_count failed"), 1);
}

#[test]
fn test_load_catalog() {
    let tmp = write_simple_pdf();
    let mut pdf = PdfDocument::open(tmp.path()).expect("failed to open simple pdf");
    let catalog = pdf.catalog().expect("failed to load catalog");
    let dict = catalog.as_dict().expect("catalog should be a dictionary");
    assert_eq!(dict.get("Type").and_then(|o| o.as_name()), Some("Catalog"));
}

#[test]
fn test_get_page_has_inherited_media_box() {
    let tmp = write_simple_pdf();
    let mut pdf = PdfDocument::open(tmp.path()).expect("failed to open simple pdf");
    let page = pdf.get_page(0).expect("get_page failed");
    let dict = page.as_dict().expect("page should be a dictionary");
    assert!(dict.get("MediaBox").is_some());
}

#[test]
fn test_open_rejects_bad_header() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(b"NOT A PDF AT ALL").unwrap();
    let result = PdfDocument::open(tmp.path());
    assert!(result.is_err());
}

#[test]
fn test_open_nonexistent_path() {
    let result = PdfDocument::open("/no/such/path/does-not-exist.pdf");
    assert!(result.is_err());
}
