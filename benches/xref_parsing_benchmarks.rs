//! Benchmarks for opening a document (header + xref + trailer parsing) and walking its page tree.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pdfgraph::serializer::{write_document, NumberedObject};
use pdfgraph::{Dict, Object, ObjectRef, PdfDocument};
use std::io::Write;

/// Build a synthetic multi-page PDF with a minimal content stream per page, serialized the same
/// way `PdfDocument::save` would write a real one.
fn build_pdf(num_pages: usize) -> Vec<u8> {
    let mut objects = Vec::with_capacity(num_pages * 2 + 2);

    let pages_ref = ObjectRef::new(2, 0);
    let mut kids = Vec::with_capacity(num_pages);
    let mut next_id = 3u32;
    for _ in 0..num_pages {
        kids.push(Object::Reference(ObjectRef::new(next_id, 0)));
        next_id += 2;
    }

    let mut catalog = Dict::new();
    catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
    catalog.insert("Pages".to_string(), Object::Reference(pages_ref));
    objects.push(NumberedObject { id: 1, gen: 0, value: Object::Dictionary(catalog) });

    let mut pages = Dict::new();
    pages.insert("Type".to_string(), Object::Name("Pages".to_string()));
    pages.insert("Kids".to_string(), Object::Array(kids));
    pages.insert("Count".to_string(), Object::Integer(num_pages as i64));
    objects.push(NumberedObject { id: 2, gen: 0, value: Object::Dictionary(pages) });

    let mut next_id = 3u32;
    for _ in 0..num_pages {
        let content_ref = ObjectRef::new(next_id + 1, 0);

        let mut page = Dict::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert("Parent".to_string(), Object::Reference(pages_ref));
        page.insert(
            "MediaBox".to_string(),
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        page.insert("Contents".to_string(), Object::Reference(content_ref));
        page.insert("Resources".to_string(), Object::Dictionary(Dict::new()));
        objects.push(NumberedObject { id: next_id, gen: 0, value: Object::Dictionary(page) });

        let content_dict = Dict::new();
        let content_bytes = bytes::Bytes::from_static(b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET");
        objects.push(NumberedObject {
            id: next_id + 1,
            gen: 0,
            value: Object::Stream { dict: content_dict, data: content_bytes },
        });

        next_id += 2;
    }

    write_document((1, 7), &objects, ObjectRef::new(1, 0), None)
}

fn bench_open_small_document(c: &mut Criterion) {
    let bytes = build_pdf(10);
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&bytes).unwrap();
    let path = tmp.path().to_path_buf();

    c.bench_function("open_10_page_document", |b| {
        b.iter(|| {
            let doc = PdfDocument::open(black_box(&path)).unwrap();
            black_box(doc);
        })
    });
}

fn bench_open_large_document(c: &mut Criterion) {
    let bytes = build_pdf(500);
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&bytes).unwrap();
    let path = tmp.path().to_path_buf();

    c.bench_function("open_500_page_document", |b| {
        b.iter(|| {
            let doc = PdfDocument::open(black_box(&path)).unwrap();
            black_box(doc);
        })
    });
}

fn bench_page_count(c: &mut Criterion) {
    let bytes = build_pdf(500);
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&bytes).unwrap();
    let path = tmp.path().to_path_buf();

    c.bench_function("page_count_500_pages", |b| {
        b.iter(|| {
            let mut doc = PdfDocument::open(&path).unwrap();
            black_box(doc.page_count().unwrap());
        })
    });
}

fn bench_walk_all_pages(c: &mut Criterion) {
    let bytes = build_pdf(200);
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&bytes).unwrap();
    let path = tmp.path().to_path_buf();

    c.bench_function("walk_all_pages_200_pages", |b| {
        b.iter(|| {
            let mut doc = PdfDocument::open(&path).unwrap();
            for i in 0..200 {
                black_box(doc.get_page(i).unwrap());
            }
        })
    });
}

criterion_group!(
    benches,
    bench_open_small_document,
    bench_open_large_document,
    bench_page_count,
    bench_walk_all_pages
);
criterion_main!(benches);
