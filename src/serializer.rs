//! Serializes `Object` values to their PDF byte syntax, and assembles a full document (header,
//! objects in ascending object-number order, a fresh xref table, trailer, `startxref`/`%%EOF`)
//! from a flat set of numbered objects — the counterpart `page_extractor` re-emits a closure
//! through.

use crate::object::{Dict, Object, ObjectRef};
use crate::xref::{CrossRefTable, XRefEntry};
use std::io::Write;

/// Serializer for PDF objects, following ISO 32000-1:2008's syntax rules.
#[derive(Debug, Clone, Default)]
pub struct ObjectSerializer {
    /// Whether to use compact formatting (minimal whitespace)
    compact: bool,
}

impl ObjectSerializer {
    /// Create a new object serializer with default (pretty) formatting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact serializer (minimal whitespace).
    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_object(&mut buf, obj).expect("writing to a Vec<u8> never fails");
        buf
    }

    /// Serialize an object to a string (for debugging).
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        String::from_utf8_lossy(&self.serialize(obj)).to_string()
    }

    /// Serialize an indirect object definition: `{id} {gen} obj\n{object}\nendobj\n`.
    pub fn serialize_indirect(&self, id: u32, gen: u16, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        writeln!(buf, "{} {} obj", id, gen).unwrap();
        self.write_object(&mut buf, obj).unwrap();
        write!(buf, "\nendobj\n").unwrap();
        buf
    }

    fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" }),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => self.write_real(w, *r),
            Object::String(s) => self.write_string(w, s),
            Object::Name(n) => self.write_name(w, n),
            Object::Array(arr) => self.write_array(w, arr),
            Object::Dictionary(dict) => self.write_dictionary(w, dict),
            Object::Stream { dict, data } => self.write_stream(w, dict, data),
            Object::Reference(r) => write!(w, "{} {} R", r.id, r.gen),
        }
    }

    /// Write a real number, trimming trailing zeros for compact output.
    fn write_real<W: Write>(&self, w: &mut W, value: f64) -> std::io::Result<()> {
        if value.fract() == 0.0 {
            write!(w, "{}", value as i64)
        } else {
            let formatted = format!("{:.5}", value);
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            write!(w, "{}", trimmed)
        }
    }

    /// Write a PDF string: literal `(...)` syntax for printable ASCII, hex `<...>` otherwise.
    fn write_string<W: Write>(&self, w: &mut W, data: &[u8]) -> std::io::Result<()> {
        let is_printable = data
            .iter()
            .all(|&b| b == b'\n' || b == b'\r' || b == b'\t' || (0x20..=0x7E).contains(&b));

        if is_printable {
            write!(w, "(")?;
            for &byte in data {
                match byte {
                    b'(' => write!(w, "\\(")?,
                    b')' => write!(w, "\\)")?,
                    b'\\' => write!(w, "\\\\")?,
                    b'\n' => write!(w, "\\n")?,
                    b'\r' => write!(w, "\\r")?,
                    b'\t' => write!(w, "\\t")?,
                    _ => w.write_all(&[byte])?,
                }
            }
            write!(w, ")")
        } else {
            write!(w, "<")?;
            for byte in data {
                write!(w, "{:02X}", byte)?;
            }
            write!(w, ">")
        }
    }

    /// Write a PDF name, escaping non-regular bytes as `#xx`.
    fn write_name<W: Write>(&self, w: &mut W, name: &str) -> std::io::Result<()> {
        write!(w, "/")?;
        for byte in name.bytes() {
            match byte {
                b'!'
                | b'"'
                | b'$'..=b'&'
                | b'\''..=b'.'
                | b'0'..=b'9'
                | b';'
                | b'<'
                | b'>'
                | b'?'
                | b'@'
                | b'A'..=b'Z'
                | b'^'..=b'z'
                | b'|'
                | b'~' => w.write_all(&[byte])?,
                _ => write!(w, "#{:02X}", byte)?,
            }
        }
        Ok(())
    }

    fn write_array<W: Write>(&self, w: &mut W, arr: &[Object]) -> std::io::Result<()> {
        write!(w, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            self.write_object(w, obj)?;
        }
        write!(w, "]")
    }

    /// Write a PDF dictionary, preserving `Dict`'s insertion order.
    fn write_dictionary<W: Write>(&self, w: &mut W, dict: &Dict) -> std::io::Result<()> {
        write!(w, "<<")?;
        for (key, value) in dict.iter() {
            if !self.compact {
                write!(w, "\n  ")?;
            }
            self.write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }
        if !self.compact && !dict.is_empty() {
            writeln!(w)?;
        }
        write!(w, ">>")
    }

    fn write_stream<W: Write>(&self, w: &mut W, dict: &Dict, data: &[u8]) -> std::io::Result<()> {
        let mut dict_with_length = dict.clone();
        dict_with_length.insert("Length".to_string(), Object::Integer(data.len() as i64));

        self.write_dictionary(w, &dict_with_length)?;
        write!(w, "\nstream\n")?;
        w.write_all(data)?;
        write!(w, "\nendstream")
    }
}

/// One numbered object ready to be written into a document body.
pub struct NumberedObject {
    pub id: u32,
    pub gen: u16,
    pub value: Object,
}

/// Assemble a complete PDF byte stream from `version`, a flat list of numbered objects (need not
/// be pre-sorted), and the trailer's `Root`/`Info` references — per §4.11: header, objects in
/// ascending object-number order (recording byte offsets as they're written), a fresh classic
/// xref table built from those offsets, a trailer with `Size = max_id + 1`, then
/// `startxref`/`%%EOF`.
pub fn write_document(
    version: (u8, u8),
    objects: &[NumberedObject],
    root: ObjectRef,
    info: Option<ObjectRef>,
) -> Vec<u8> {
    let serializer = ObjectSerializer::compact();
    let mut out = Vec::new();
    writeln!(out, "%PDF-{}.{}", version.0, version.1).unwrap();

    let mut sorted: Vec<&NumberedObject> = objects.iter().collect();
    sorted.sort_by_key(|o| o.id);

    let max_id = sorted.last().map(|o| o.id).unwrap_or(0);
    let mut xref = CrossRefTable::new();
    xref.add_entry(0, XRefEntry::free(0, 65535));

    for obj in &sorted {
        let offset = out.len() as u64;
        out.extend_from_slice(&serializer.serialize_indirect(obj.id, obj.gen, &obj.value));
        xref.add_entry(obj.id, XRefEntry::uncompressed(offset, obj.gen));
    }

    let xref_start = out.len();
    out.extend_from_slice(&xref.serialize_subsections());

    let mut trailer = Dict::new();
    trailer.insert("Size".to_string(), Object::Integer(max_id as i64 + 1));
    trailer.insert("Root".to_string(), Object::Reference(root));
    if let Some(info_ref) = info {
        trailer.insert("Info".to_string(), Object::Reference(info_ref));
    }

    writeln!(out, "trailer").unwrap();
    out.extend_from_slice(&serializer.serialize(&Object::Dictionary(trailer)));
    writeln!(out).unwrap();
    writeln!(out, "startxref").unwrap();
    writeln!(out, "{}", xref_start).unwrap();
    write!(out, "%%EOF").unwrap();

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_null() {
        let s = ObjectSerializer::new();
        assert_eq!(s.serialize_to_string(&Object::Null), "null");
    }

    #[test]
    fn test_serialize_boolean() {
        let s = ObjectSerializer::new();
        assert_eq!(s.serialize_to_string(&Object::Boolean(true)), "true");
        assert_eq!(s.serialize_to_string(&Object::Boolean(false)), "false");
    }

    #[test]
    fn test_serialize_real_trims_trailing_zeros() {
        let s = ObjectSerializer::new();
        assert_eq!(s.serialize_to_string(&Object::Real(3.14258)), "3.14258");
        assert_eq!(s.serialize_to_string(&Object::Real(1.0)), "1");
        assert_eq!(s.serialize_to_string(&Object::Real(0.5)), "0.5");
    }

    #[test]
    fn test_serialize_string_literal_vs_hex() {
        let s = ObjectSerializer::new();
        assert_eq!(s.serialize_to_string(&Object::String(b"Hello".to_vec())), "(Hello)");
        assert_eq!(
            s.serialize_to_string(&Object::String(b"Test (parens)".to_vec())),
            "(Test \\(parens\\))"
        );
        assert_eq!(s.serialize_to_string(&Object::String(vec![0x00, 0xFF, 0x80])), "<00FF80>");
    }

    #[test]
    fn test_serialize_name_with_special_chars() {
        let s = ObjectSerializer::new();
        assert_eq!(s.serialize_to_string(&Object::Name("Type".to_string())), "/Type");
        assert_eq!(
            s.serialize_to_string(&Object::Name("Name With Space".to_string())),
            "/Name#20With#20Space"
        );
    }

    #[test]
    fn test_serialize_array() {
        let s = ObjectSerializer::compact();
        let arr = Object::Array(vec![Object::Integer(1), Object::Integer(2), Object::Integer(3)]);
        assert_eq!(s.serialize_to_string(&arr), "[1 2 3]");
    }

    #[test]
    fn test_serialize_dictionary_preserves_insertion_order() {
        let s = ObjectSerializer::compact();
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::Name("Page".to_string()));
        dict.insert("Count".to_string(), Object::Integer(1));
        let result = s.serialize_to_string(&Object::Dictionary(dict));
        let type_pos = result.find("/Type").unwrap();
        let count_pos = result.find("/Count").unwrap();
        assert!(type_pos < count_pos);
    }

    #[test]
    fn test_serialize_stream_adds_length() {
        let s = ObjectSerializer::compact();
        let dict = Dict::new();
        let stream = Object::Stream { dict, data: bytes::Bytes::from_static(b"stream data") };
        let result = s.serialize_to_string(&stream);
        assert!(result.contains("/Length 11"));
        assert!(result.contains("stream\n"));
        assert!(result.contains("stream data"));
        assert!(result.contains("\nendstream"));
    }

    #[test]
    fn test_serialize_reference() {
        let s = ObjectSerializer::new();
        let r = Object::Reference(ObjectRef::new(10, 0));
        assert_eq!(s.serialize_to_string(&r), "10 0 R");
    }

    #[test]
    fn test_write_document_has_valid_shape() {
        let mut catalog_dict = Dict::new();
        catalog_dict.insert("Type".to_string(), Object::Name("Catalog".to_string()));
        catalog_dict.insert("Pages".to_string(), Object::Reference(ObjectRef::new(2, 0)));

        let mut pages_dict = Dict::new();
        pages_dict.insert("Type".to_string(), Object::Name("Pages".to_string()));
        pages_dict.insert("Kids".to_string(), Object::Array(vec![]));
        pages_dict.insert("Count".to_string(), Object::Integer(0));

        let objects = vec![
            NumberedObject { id: 1, gen: 0, value: Object::Dictionary(catalog_dict) },
            NumberedObject { id: 2, gen: 0, value: Object::Dictionary(pages_dict) },
        ];
        let bytes = write_document((1, 7), &objects, ObjectRef::new(1, 0), None);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.7\n"));
        assert!(text.contains("xref"));
        assert!(text.contains("trailer"));
        assert!(text.contains("startxref"));
        assert!(text.ends_with("%%EOF"));
        assert!(!bytes.is_empty());
    }
}
