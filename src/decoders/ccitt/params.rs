//! CCITT decode parameters, mirroring the defaults a PDF `/DecodeParms` dictionary would carry
//! for a `CCITTFaxDecode` filter (ISO 32000-1 Table 11).

/// Immutable CCITT decode parameters for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcittParams {
    /// Encoding scheme selector: `k < 0` is Group 4 (pure 2D), `k == 0` is Group 3 1D,
    /// `k > 0` is Group 3 mixed 1D/2D with at most `k` consecutive 2D lines.
    pub k: i32,
    /// Whether encoded lines are preceded by an EOL code.
    pub end_of_line: bool,
    /// Whether each encoded line is padded to a byte boundary.
    pub encoded_byte_align: bool,
    /// Pixels per row.
    pub columns: u32,
    /// Expected row count, or 0 if unknown (decode until EOFB/exhaustion).
    pub rows: u32,
    /// Whether the data is expected to end with an EOB (RTC / EOFB) marker.
    pub end_of_block: bool,
    /// If true, a 1 bit means black (the PDF default is 0 = black).
    pub black_is_1: bool,
    /// Number of consecutive damaged rows tolerated before failing with `DamagedStream`.
    pub damaged_rows_before_error: u32,
}

impl Default for CcittParams {
    fn default() -> Self {
        Self {
            k: -1,
            end_of_line: false,
            encoded_byte_align: false,
            columns: 1728,
            rows: 0,
            end_of_block: true,
            black_is_1: false,
            damaged_rows_before_error: 0,
        }
    }
}

impl CcittParams {
    /// Group 4 (T.6) pure two-dimensional encoding.
    pub fn is_group4(&self) -> bool {
        self.k < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pdf_decode_parms() {
        let p = CcittParams::default();
        assert_eq!(p.k, -1);
        assert!(!p.end_of_line);
        assert!(!p.encoded_byte_align);
        assert_eq!(p.columns, 1728);
        assert_eq!(p.rows, 0);
        assert!(p.end_of_block);
        assert!(!p.black_is_1);
        assert_eq!(p.damaged_rows_before_error, 0);
        assert!(p.is_group4());
    }
}
