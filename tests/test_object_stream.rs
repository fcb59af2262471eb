//! Integration tests for PDF 1.5+ object streams (`/Type /ObjStm`).

use bytes::Bytes;
use pdfgraph::object::Object;
use pdfgraph::objstm::parse_object_stream;
use pdfgraph::Dict;

/// Build an uncompressed object stream with `n` (object_number, body) pairs, the way a
/// `FlateDecode`-free `/ObjStm` stream looks on the wire.
fn build_object_stream(entries: &[(u32, &str)]) -> Object {
    let mut pairs = String::new();
    let mut bodies = String::new();
    let mut offset = 0usize;
    for (obj_num, body) in entries {
        pairs.push_str(&format!("{} {} ", obj_num, offset));
        bodies.push_str(body);
        bodies.push(' ');
        offset = bodies.len();
    }

    let first = pairs.len();
    let data = format!("{}{}", pairs, bodies);

    let mut dict = Dict::new();
    dict.insert("Type".to_string(), Object::Name("ObjStm".to_string()));
    dict.insert("N".to_string(), Object::Integer(entries.len() as i64));
    dict.insert("First".to_string(), Object::Integer(first as i64));

    Object::Stream { dict, data: Bytes::from(data.into_bytes()) }
}

#[test]
fn test_parse_object_stream_basic() {
    let stream = build_object_stream(&[(10, "42"), (11, "(hello)"), (12, "/Name")]);
    let objects = parse_object_stream(&stream).expect("parse_object_stream failed");

    assert_eq!(objects.len(), 3);
    assert_eq!(objects.get(&10).unwrap().as_integer(), Some(42));
    assert_eq!(objects.get(&12).unwrap().as_name(), Some("Name"));
}

#[test]
fn test_parse_object_stream_dictionary_entries() {
    let stream = build_object_stream(&[(1, "<< /Type /Catalog /Pages 2 0 R >>")]);
    let objects = parse_object_stream(&stream).expect("parse_object_stream failed");

    let dict = objects.get(&1).unwrap().as_dict().expect("should be a dictionary");
    assert_eq!(dict.get("Type").and_then(|o| o.as_name()), Some("Catalog"));
}

#[test]
fn test_parse_object_stream_rejects_non_stream() {
    let result = parse_object_stream(&Object::Integer(5));
    assert!(result.is_err());
}

#[test]
fn test_parse_object_stream_rejects_wrong_type() {
    let mut dict = Dict::new();
    dict.insert("Type".to_string(), Object::Name("Catalog".to_string()));
    dict.insert("N".to_string(), Object::Integer(0));
    dict.insert("First".to_string(), Object::Integer(0));
    let stream = Object::Stream { dict, data: Bytes::new() };

    let result = parse_object_stream(&stream);
    assert!(result.is_err());
}

#[test]
fn test_parse_object_stream_missing_n() {
    let mut dict = Dict::new();
    dict.insert("Type".to_string(), Object::Name("ObjStm".to_string()));
    dict.insert("First".to_string(), Object::Integer(0));
    let stream = Object::Stream { dict, data: Bytes::new() };

    assert!(parse_object_stream(&stream).is_err());
}

#[test]
fn test_parse_object_stream_missing_first() {
    let mut dict = Dict::new();
    dict.insert("Type".to_string(), Object::Name("ObjStm".to_string()));
    dict.insert("N".to_string(), Object::Integer(0));
    let stream = Object::Stream { dict, data: Bytes::new() };

    assert!(parse_object_stream(&stream).is_err());
}
