//! PDF object types: the value sum type, indirect-object references, and the wrapper that
//! associates a value with its object/generation number and (when lazily loaded) its file offset.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Dictionary backing type. `IndexMap` preserves insertion order, which PDF itself does not
/// require but which round-trips more faithfully through parse→serialize.
pub type Dict = IndexMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs, insertion order preserved)
    Dictionary(Dict),
    /// Stream (dictionary + data)
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Stream data
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

/// One indirect object: an object/generation number paired with its parsed value.
///
/// `offset` is populated when the node was lazy-loaded from a source file (for diagnostics and
/// for repair scans) and is otherwise `None` — e.g. for nodes built in memory during page
/// extraction, which have no source offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// Object number
    pub obj: u32,
    /// Generation number
    pub gen: u16,
    /// Byte offset this node was parsed from, if loaded from a file
    pub offset: Option<u64>,
    /// The parsed value
    pub value: Object,
}

impl ObjectNode {
    /// Build a node for a value parsed from a known file offset.
    pub fn from_offset(obj: u32, gen: u16, offset: u64, value: Object) -> Self {
        Self {
            obj,
            gen,
            offset: Some(offset),
            value,
        }
    }

    /// Build a node for a value with no source offset (e.g. synthesized in memory).
    pub fn in_memory(obj: u32, gen: u16, value: Object) -> Self {
        Self {
            obj,
            gen,
            offset: None,
            value,
        }
    }

    /// The (obj, gen) reference identifying this node.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.obj, self.gen)
    }

    /// Reassign this node's object number, e.g. during registry renumbering. Leaves the
    /// generation and offset untouched.
    pub fn set_object_number(&mut self, obj: u32) {
        self.obj = obj;
    }

    /// Whether this node's value transitively contains a `Stream` anywhere in its structure.
    ///
    /// Used by the registry (§4.10) to decide cacheability: nodes containing a stream are never
    /// cached in the bounded external cache, since following them may drag in large payloads.
    pub fn contains_stream(&self) -> bool {
        value_contains_stream(&self.value)
    }
}

/// Recursively check whether a value contains a `Stream` variant anywhere in arrays/dictionaries.
///
/// References are not followed (doing so would require registry access); per §4.10 they are
/// conservatively treated as potentially stream-bearing by the registry's cacheability check,
/// not by this function, which only inspects the value actually in hand.
pub(crate) fn value_contains_stream(value: &Object) -> bool {
    match value {
        Object::Stream { .. } => true,
        Object::Array(items) => items.iter().any(value_contains_stream),
        Object::Dictionary(dict) => dict.values().any(value_contains_stream),
        _ => false,
    }
}

impl Object {
    /// Get the type name of this object (without data).
    ///
    /// Returns a human-readable type name like "String", "Array", "Dictionary", etc.
    /// without including the actual data content.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to cast to real number.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to string (bytes).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Decode stream data using filters specified in the stream dictionary.
    ///
    /// # Returns
    ///
    /// The decoded stream data, or an error if this is not a stream object
    /// or if decoding fails.
    pub fn decode_stream_data(&self) -> Result<Vec<u8>> {
        self.decode_stream_data_with_options(None)
    }

    /// Decode stream data, applying parser-configured decompression-bomb limits.
    pub fn decode_stream_data_with_options(
        &self,
        options: Option<&crate::parser_config::ParserOptions>,
    ) -> Result<Vec<u8>> {
        match self {
            Object::Stream { dict, data } => {
                let trimmed_data = trim_leading_stream_whitespace(data);

                let filters = dict
                    .get("Filter")
                    .map(extract_filter_names)
                    .unwrap_or_default();

                if filters.is_empty() {
                    Ok(trimmed_data.to_vec())
                } else {
                    let decode_params = extract_decode_params(dict.get("DecodeParms"));
                    let ccitt_params = extract_ccitt_params(dict.get("DecodeParms"), &filters);

                    crate::decoders::decode_stream_with_options(
                        trimmed_data,
                        &filters,
                        decode_params.as_ref(),
                        ccitt_params.as_ref(),
                        options,
                    )
                }
            },
            _ => Err(Error::InvalidObjectType {
                expected: "Stream".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }
}

/// Trim leading PDF whitespace from stream data.
///
/// PDF Spec ISO 32000-1:2008, Section 7.3.4.2 states that stream data begins
/// immediately after the EOL marker following "stream". However, some PDF generators
/// add extra whitespace characters.
///
/// PDF whitespace characters (Section 7.2.2):
/// - NUL (0x00)
/// - TAB (0x09)
/// - LF (0x0A)
/// - FF (0x0C)
/// - CR (0x0D)
/// - SPACE (0x20)
fn trim_leading_stream_whitespace(data: &[u8]) -> &[u8] {
    let mut start = 0;
    while start < data.len() {
        match data[start] {
            0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20 => start += 1,
            _ => break,
        }
    }
    &data[start..]
}

/// Extract filter names from a Filter object.
///
/// The Filter entry can be either:
/// - A single Name (e.g., /FlateDecode)
/// - An Array of Names (e.g., [/ASCII85Decode /FlateDecode])
fn extract_filter_names(filter_obj: &Object) -> Vec<String> {
    match filter_obj {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

/// Extract decode parameters from a DecodeParms object.
///
/// The DecodeParms entry can be:
/// - A dictionary (for single filter)
/// - An array of dictionaries (for multiple filters)
/// - Null or absent (no parameters)
///
/// This function extracts predictor parameters used for PNG/TIFF encoding.
fn extract_decode_params(params_obj: Option<&Object>) -> Option<crate::decoders::DecodeParams> {
    let dict = match params_obj? {
        Object::Dictionary(d) => d,
        Object::Array(arr) => arr.iter().filter_map(|obj| obj.as_dict()).next()?,
        _ => return None,
    };

    let predictor = dict
        .get("Predictor")
        .and_then(|obj| obj.as_integer())
        .unwrap_or(1);

    let columns = dict
        .get("Columns")
        .and_then(|obj| obj.as_integer())
        .unwrap_or(1) as usize;

    let colors = dict
        .get("Colors")
        .and_then(|obj| obj.as_integer())
        .unwrap_or(1) as usize;

    let bits_per_component = dict
        .get("BitsPerComponent")
        .and_then(|obj| obj.as_integer())
        .unwrap_or(8) as usize;

    Some(crate::decoders::DecodeParams {
        predictor,
        columns,
        colors,
        bits_per_component,
    })
}

/// Extract CCITTFaxDecode parameters from a DecodeParms object, only when `/CCITTFaxDecode` is
/// actually among `filters` — the same DecodeParms slot is shared with unrelated filters like
/// FlateDecode's predictor, so this must not misread a predictor dict as CCITT parameters.
fn extract_ccitt_params(
    params_obj: Option<&Object>,
    filters: &[String],
) -> Option<crate::decoders::CcittParams> {
    if !filters.iter().any(|f| f == "CCITTFaxDecode") {
        return None;
    }
    let defaults = crate::decoders::CcittParams::default();
    let dict = match params_obj {
        Some(Object::Dictionary(d)) => Some(d),
        Some(Object::Array(arr)) => arr.iter().filter_map(|obj| obj.as_dict()).next(),
        _ => None,
    };
    let dict = match dict {
        Some(d) => d,
        None => return Some(defaults),
    };

    let k = dict.get("K").and_then(|o| o.as_integer()).unwrap_or(defaults.k as i64) as i32;
    let end_of_line = dict
        .get("EndOfLine")
        .and_then(|o| o.as_bool())
        .unwrap_or(defaults.end_of_line);
    let encoded_byte_align = dict
        .get("EncodedByteAlign")
        .and_then(|o| o.as_bool())
        .unwrap_or(defaults.encoded_byte_align);
    let columns = dict
        .get("Columns")
        .and_then(|o| o.as_integer())
        .unwrap_or(defaults.columns as i64) as u32;
    let rows = dict
        .get("Rows")
        .and_then(|o| o.as_integer())
        .unwrap_or(defaults.rows as i64) as u32;
    let end_of_block = dict
        .get("EndOfBlock")
        .and_then(|o| o.as_bool())
        .unwrap_or(defaults.end_of_block);
    let black_is_1 = dict
        .get("BlackIs1")
        .and_then(|o| o.as_bool())
        .unwrap_or(defaults.black_is_1);
    let damaged_rows_before_error = dict
        .get("DamagedRowsBeforeError")
        .and_then(|o| o.as_integer())
        .unwrap_or(defaults.damaged_rows_before_error as i64) as u32;

    Some(crate::decoders::CcittParams {
        k,
        end_of_line,
        encoded_byte_align,
        columns,
        rows,
        end_of_block,
        black_is_1,
        damaged_rows_before_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_integer() {
        let obj = Object::Integer(42);
        assert_eq!(obj.as_integer(), Some(42));
        assert!(obj.as_name().is_none());
        assert!(!obj.is_null());
    }

    #[test]
    fn test_object_name() {
        let obj = Object::Name("Type".to_string());
        assert_eq!(obj.as_name(), Some("Type"));
        assert!(obj.as_integer().is_none());
    }

    #[test]
    fn test_object_bool() {
        let obj = Object::Boolean(true);
        assert_eq!(obj.as_bool(), Some(true));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_object_real() {
        let obj = Object::Real(3.14);
        assert_eq!(obj.as_real(), Some(3.14));
    }

    #[test]
    fn test_object_string() {
        let obj = Object::String(b"Hello".to_vec());
        assert_eq!(obj.as_string(), Some(&b"Hello"[..]));
    }

    #[test]
    fn test_object_null() {
        let obj = Object::Null;
        assert!(obj.is_null());
        assert!(obj.as_integer().is_none());
    }

    #[test]
    fn test_object_array() {
        let obj = Object::Array(vec![Object::Integer(1), Object::Integer(2)]);
        let arr = obj.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0].as_integer(), Some(1));
    }

    #[test]
    fn test_object_dictionary() {
        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::Name("Page".to_string()));
        let obj = Object::Dictionary(dict);

        let d = obj.as_dict().unwrap();
        assert_eq!(d.get("Type").unwrap().as_name(), Some("Page"));
    }

    #[test]
    fn test_dictionary_preserves_insertion_order() {
        let mut dict = Dict::new();
        dict.insert("Z".to_string(), Object::Integer(1));
        dict.insert("A".to_string(), Object::Integer(2));
        dict.insert("M".to_string(), Object::Integer(3));

        let keys: Vec<&str> = dict.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_object_stream_dict_access() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(100));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"stream data"),
        };

        // Stream objects should also be accessible as dictionaries
        let d = obj.as_dict().unwrap();
        assert_eq!(d.get("Length").unwrap().as_integer(), Some(100));
    }

    #[test]
    fn test_object_reference() {
        let obj_ref = ObjectRef::new(10, 0);
        let obj = Object::Reference(obj_ref);

        assert_eq!(obj.as_reference(), Some(obj_ref));
        assert_eq!(obj_ref.id, 10);
        assert_eq!(obj_ref.gen, 0);
    }

    #[test]
    fn test_object_ref_display() {
        let obj_ref = ObjectRef::new(10, 0);
        assert_eq!(format!("{}", obj_ref), "10 0 R");
    }

    #[test]
    fn test_object_clone() {
        let obj = Object::Integer(42);
        let cloned = obj.clone();
        assert_eq!(obj, cloned);
    }

    #[test]
    fn test_object_ref_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ObjectRef::new(1, 0));
        set.insert(ObjectRef::new(2, 0));
        set.insert(ObjectRef::new(1, 0)); // Duplicate

        assert_eq!(set.len(), 2); // Should only have 2 unique refs
    }

    #[test]
    fn test_decode_stream_no_filter() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(5));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"Hello"),
        };

        let decoded = obj.decode_stream_data().unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_stream_single_filter() {
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), Object::Name("ASCIIHexDecode".to_string()));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"48656C6C6F"), // "Hello" in hex
        };

        let decoded = obj.decode_stream_data().unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_stream_filter_array() {
        let mut dict = Dict::new();
        dict.insert(
            "Filter".to_string(),
            Object::Array(vec![Object::Name("ASCIIHexDecode".to_string())]),
        );
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"48656C6C6F"),
        };

        let decoded = obj.decode_stream_data().unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_decode_stream_not_a_stream() {
        let obj = Object::Integer(42);
        let result = obj.decode_stream_data();
        assert!(result.is_err());
        match result {
            Err(Error::InvalidObjectType { expected, found }) => {
                assert_eq!(expected, "Stream");
                assert_eq!(found, "Integer");
            },
            _ => panic!("Expected InvalidObjectType error"),
        }
    }

    #[test]
    fn test_extract_filter_names_single() {
        let filter = Object::Name("FlateDecode".to_string());
        let names = extract_filter_names(&filter);
        assert_eq!(names, vec!["FlateDecode"]);
    }

    #[test]
    fn test_extract_filter_names_array() {
        let filter = Object::Array(vec![
            Object::Name("ASCII85Decode".to_string()),
            Object::Name("FlateDecode".to_string()),
        ]);
        let names = extract_filter_names(&filter);
        assert_eq!(names, vec!["ASCII85Decode", "FlateDecode"]);
    }

    #[test]
    fn test_extract_filter_names_invalid() {
        let filter = Object::Integer(42);
        let names = extract_filter_names(&filter);
        assert!(names.is_empty());
    }

    #[test]
    fn test_object_node_contains_stream() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(3));
        let stream = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"abc"),
        };
        let mut outer = Dict::new();
        outer.insert("Contents".to_string(), stream);
        let node = ObjectNode::in_memory(1, 0, Object::Dictionary(outer));
        assert!(node.contains_stream());

        let plain = ObjectNode::in_memory(2, 0, Object::Integer(5));
        assert!(!plain.contains_stream());
    }
}
