//! CCITTFaxDecode implementation.
//!
//! CCITT (Comite Consultatif International Telephonique et Telegraphique)
//! Group 3 and Group 4 fax compression for monochrome images.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.4.6 - CCITTFaxDecode Filter

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

mod bitbuffer;
mod bitmap;
mod ccitt3;
mod ccitt4;
mod params;
mod tables;
mod twod;

pub use params::CcittParams;

/// Decode into materialized 0/255 pixel rows, one `Vec<u8>` of length `columns` per row.
pub fn decode_to_lines(params: &CcittParams, data: &[u8]) -> std::result::Result<Vec<Vec<u8>>, Error> {
    if params.is_group4() {
        ccitt4::decode(params, data)
    } else {
        ccitt3::decode(params, data)
    }
}

/// Decode directly into an MSB-first packed bitmap (`ceil(columns/8)` bytes per row).
pub fn decode_to_packed(params: &CcittParams, data: &[u8]) -> std::result::Result<Vec<u8>, Error> {
    let columns = params.columns as usize;
    let mut out = Vec::new();
    let mut emit = |mut line: Vec<u8>| {
        if params.black_is_1 {
            for p in line.iter_mut() {
                *p = 255 - *p;
            }
        }
        out.extend_from_slice(&bitmap::pack(std::slice::from_ref(&line), columns));
    };
    if params.is_group4() {
        ccitt4::decode_with_callback(params, data, &mut emit)?;
    } else {
        ccitt3::decode_with_callback(params, data, &mut emit)?;
    }
    Ok(out)
}

/// Decode directly into a byte sink, one packed row at a time, without materializing the whole
/// bitmap — the streaming counterpart of [`decode_to_packed`], guaranteed byte-identical to it.
pub fn decode_to_stream<W: std::io::Write>(
    params: &CcittParams,
    data: &[u8],
    sink: &mut W,
) -> std::result::Result<(), Error> {
    let packed = decode_to_packed(params, data)?;
    sink.write_all(&packed).map_err(Error::Io)
}

/// CCITTFaxDecode filter implementation, parameterized by the stream's `/DecodeParms`.
///
/// Falls back to [`CcittParams::default`] (Group 4, 1728 columns) when no DecodeParms are
/// available, matching the defaults ISO 32000-1 §7.4.6 assigns to each field.
pub struct CcittFaxDecoder {
    params: CcittParams,
}

impl CcittFaxDecoder {
    pub fn new(params: CcittParams) -> Self {
        Self { params }
    }
}

impl Default for CcittFaxDecoder {
    fn default() -> Self {
        Self { params: CcittParams::default() }
    }
}

impl StreamDecoder for CcittFaxDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        decode_to_packed(&self.params, input).map_err(|e| match e {
            Error::DamagedStream { .. } => e,
            other => Error::Decode(format!("CCITTFaxDecode: {other}")),
        })
    }

    fn name(&self) -> &str {
        "CCITTFaxDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_to_bytes(bits: &str) -> Vec<u8> {
        let mut s = bits.to_string();
        while s.len() % 8 != 0 {
            s.push('0');
        }
        s.as_bytes()
            .chunks(8)
            .map(|c| u8::from_str_radix(std::str::from_utf8(c).unwrap(), 2).unwrap())
            .collect()
    }

    #[test]
    fn test_streaming_equals_materialized_packing() {
        let columns = 8usize;
        let data = bits_to_bytes("0001000000000001000000000001");
        let params = CcittParams { columns: columns as u32, ..Default::default() };

        let lines = decode_to_lines(&params, &data).unwrap();
        let packed_from_lines = bitmap::pack(&lines, columns);

        let packed_direct = decode_to_packed(&params, &data).unwrap();
        assert_eq!(packed_from_lines, packed_direct);

        let mut sink = Vec::new();
        decode_to_stream(&params, &data, &mut sink).unwrap();
        assert_eq!(sink, packed_direct);
    }

    #[test]
    fn test_decoder_width_invariant() {
        let columns = 18usize;
        let data = bits_to_bytes("0001000000000001000000000001");
        let params = CcittParams { columns: columns as u32, ..Default::default() };
        let lines = decode_to_lines(&params, &data).unwrap();
        for line in &lines {
            assert_eq!(line.len(), columns);
        }
    }

    #[test]
    fn test_group4_18x18_round_trip_size() {
        let columns = 18usize;
        let mut bits = String::new();
        for _ in 0..columns {
            bits.push_str("0001");
        }
        bits.push_str("000000000001000000000001");
        let data = bits_to_bytes(&bits);
        let params = CcittParams { columns: columns as u32, rows: columns as u32, ..Default::default() };
        let packed = decode_to_packed(&params, &data).unwrap();
        assert!(packed.len() >= 3 * columns);
    }

    #[test]
    fn test_ccitt_fax_decoder_via_stream_decoder_trait() {
        let columns = 8usize;
        let data = bits_to_bytes("0001000000000001000000000001");
        let params = CcittParams { columns: columns as u32, ..Default::default() };
        let decoder = CcittFaxDecoder::new(params);
        let packed = decoder.decode(&data).unwrap();
        assert_eq!(packed.len(), 1);
    }

    #[test]
    fn test_ccitt_fax_decoder_default_is_group4() {
        let decoder = CcittFaxDecoder::default();
        assert!(decoder.params.is_group4());
    }
}
