//! ITU-T T.4 / T.6 code tables: white and black run-length (modified Huffman) codes, the shared
//! extended make-up codes, and the 2D mode codes used by both the Group 3 2D and Group 4 decoders.
//!
//! Each entry is `(code, bits, value)`: `code` is the bit pattern left-justified in its `bits`
//! width (so a 4-bit code `0b0001` is stored as `0b0001`, not shifted), `value` is the run length
//! (for run tables) or the `Mode` it decodes to (for the mode table). Lookup compares the top
//! `bits` bits of a 16-bit peek against `code`.

use lazy_static::lazy_static;

/// A 2D/extension mode decoded from the mode-code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pass,
    Horizontal,
    Vertical(i8),
    Extension,
}

/// White run-length terminating codes, runs 0-63.
pub const WHITE_TERMINATING: &[(u16, u8, u16)] = &[
    (0x35, 8, 0),
    (0x07, 6, 1),
    (0x07, 4, 2),
    (0x08, 4, 3),
    (0x0B, 4, 4),
    (0x0C, 4, 5),
    (0x0E, 4, 6),
    (0x0F, 4, 7),
    (0x13, 5, 8),
    (0x14, 5, 9),
    (0x07, 5, 10),
    (0x08, 5, 11),
    (0x08, 6, 12),
    (0x03, 6, 13),
    (0x34, 6, 14),
    (0x35, 6, 15),
    (0x2A, 6, 16),
    (0x2B, 6, 17),
    (0x27, 7, 18),
    (0x0C, 7, 19),
    (0x08, 7, 20),
    (0x17, 7, 21),
    (0x03, 7, 22),
    (0x04, 7, 23),
    (0x28, 7, 24),
    (0x2B, 7, 25),
    (0x13, 7, 26),
    (0x24, 7, 27),
    (0x18, 7, 28),
    (0x02, 8, 29),
    (0x03, 8, 30),
    (0x1A, 8, 31),
    (0x1B, 8, 32),
    (0x12, 8, 33),
    (0x13, 8, 34),
    (0x14, 8, 35),
    (0x15, 8, 36),
    (0x16, 8, 37),
    (0x17, 8, 38),
    (0x28, 8, 39),
    (0x29, 8, 40),
    (0x2A, 8, 41),
    (0x2B, 8, 42),
    (0x2C, 8, 43),
    (0x2D, 8, 44),
    (0x04, 8, 45),
    (0x05, 8, 46),
    (0x0A, 8, 47),
    (0x0B, 8, 48),
    (0x52, 8, 49),
    (0x53, 8, 50),
    (0x54, 8, 51),
    (0x55, 8, 52),
    (0x24, 8, 53),
    (0x25, 8, 54),
    (0x58, 8, 55),
    (0x59, 8, 56),
    (0x5A, 8, 57),
    (0x5B, 8, 58),
    (0x4A, 8, 59),
    (0x4B, 8, 60),
    (0x32, 8, 61),
    (0x33, 8, 62),
    (0x34, 8, 63),
];

/// White run-length make-up codes, runs 64-1728 (step 64).
pub const WHITE_MAKEUP: &[(u16, u8, u16)] = &[
    (0x1B, 5, 64),
    (0x12, 5, 128),
    (0x17, 6, 192),
    (0x37, 7, 256),
    (0x36, 8, 320),
    (0x37, 8, 384),
    (0x64, 8, 448),
    (0x65, 8, 512),
    (0x68, 8, 576),
    (0x67, 8, 640),
    (0xCC, 9, 704),
    (0xCD, 9, 768),
    (0xD2, 9, 832),
    (0xD3, 9, 896),
    (0xD4, 9, 960),
    (0xD5, 9, 1024),
    (0xD6, 9, 1088),
    (0xD7, 9, 1152),
    (0xD8, 9, 1216),
    (0xD9, 9, 1280),
    (0xDA, 9, 1344),
    (0xDB, 9, 1408),
    (0x98, 9, 1472),
    (0x99, 9, 1536),
    (0x9A, 9, 1600),
    (0x18, 6, 1664),
    (0x9B, 9, 1728),
];

/// Black run-length terminating codes, runs 0-63.
pub const BLACK_TERMINATING: &[(u16, u8, u16)] = &[
    (0x37, 10, 0),
    (0x02, 3, 1),
    (0x03, 2, 2),
    (0x02, 2, 3),
    (0x03, 3, 4),
    (0x03, 4, 5),
    (0x02, 4, 6),
    (0x03, 5, 7),
    (0x05, 6, 8),
    (0x04, 6, 9),
    (0x04, 7, 10),
    (0x05, 7, 11),
    (0x07, 7, 12),
    (0x04, 8, 13),
    (0x07, 8, 14),
    (0x18, 9, 15),
    (0x17, 10, 16),
    (0x18, 10, 17),
    (0x08, 10, 18),
    (0x67, 11, 19),
    (0x68, 11, 20),
    (0x6C, 11, 21),
    (0x37, 11, 22),
    (0x28, 11, 23),
    (0x17, 11, 24),
    (0x18, 11, 25),
    (0xCA, 12, 26),
    (0xCB, 12, 27),
    (0xCC, 12, 28),
    (0xCD, 12, 29),
    (0x68, 12, 30),
    (0x69, 12, 31),
    (0x6A, 12, 32),
    (0x6B, 12, 33),
    (0xD2, 12, 34),
    (0xD3, 12, 35),
    (0xD4, 12, 36),
    (0xD5, 12, 37),
    (0xD6, 12, 38),
    (0xD7, 12, 39),
    (0x6C, 12, 40),
    (0x6D, 12, 41),
    (0xDA, 12, 42),
    (0xDB, 12, 43),
    (0x54, 12, 44),
    (0x55, 12, 45),
    (0x56, 12, 46),
    (0x57, 12, 47),
    (0x64, 12, 48),
    (0x65, 12, 49),
    (0x52, 12, 50),
    (0x53, 12, 51),
    (0x24, 12, 52),
    (0x37, 12, 53),
    (0x38, 12, 54),
    (0x27, 12, 55),
    (0x28, 12, 56),
    (0x58, 12, 57),
    (0x59, 12, 58),
    (0x2B, 12, 59),
    (0x2C, 12, 60),
    (0x5A, 12, 61),
    (0x66, 12, 62),
    (0x67, 12, 63),
];

/// Black run-length make-up codes, runs 64-1728 (step 64).
pub const BLACK_MAKEUP: &[(u16, u8, u16)] = &[
    (0x0F, 10, 64),
    (0xC8, 12, 128),
    (0xC9, 12, 192),
    (0x5B, 12, 256),
    (0x33, 12, 320),
    (0x34, 12, 384),
    (0x35, 12, 448),
    (0x6C, 13, 512),
    (0x6D, 13, 576),
    (0x4A, 13, 640),
    (0x4B, 13, 704),
    (0x4C, 13, 768),
    (0x4D, 13, 832),
    (0x72, 13, 896),
    (0x73, 13, 960),
    (0x74, 13, 1024),
    (0x75, 13, 1088),
    (0x76, 13, 1152),
    (0x77, 13, 1216),
    (0x52, 13, 1280),
    (0x53, 13, 1344),
    (0x54, 13, 1408),
    (0x55, 13, 1472),
    (0x5A, 13, 1536),
    (0x5B, 13, 1600),
    (0x64, 13, 1664),
    (0x65, 13, 1728),
];

/// Extended make-up codes shared by both colors, runs 1792-2560 (step 64).
pub const EXTENDED_MAKEUP: &[(u16, u8, u16)] = &[
    (0x08, 11, 1792),
    (0x0C, 11, 1856),
    (0x0D, 11, 1920),
    (0x12, 12, 1984),
    (0x13, 12, 2048),
    (0x14, 12, 2112),
    (0x15, 12, 2176),
    (0x16, 12, 2240),
    (0x17, 12, 2304),
    (0x1C, 12, 2368),
    (0x1D, 12, 2432),
    (0x1E, 12, 2496),
    (0x1F, 12, 2560),
];

/// 2D mode codes (§4.2): Pass, Horizontal, Vertical(-3..=3), Extension.
pub const MODE_CODES: &[(u16, u8, Mode)] = &[
    (0b1, 1, Mode::Vertical(0)),
    (0b011, 3, Mode::Vertical(1)),
    (0b010, 3, Mode::Vertical(-1)),
    (0b001, 3, Mode::Horizontal),
    (0b0001, 4, Mode::Pass),
    (0b000011, 6, Mode::Vertical(2)),
    (0b000010, 6, Mode::Vertical(-2)),
    (0b0000011, 7, Mode::Vertical(3)),
    (0b0000010, 7, Mode::Vertical(-3)),
    (0b0000001, 7, Mode::Extension),
];

/// The 12-bit EOL pattern `000000000001`.
pub const EOL_CODE: (u16, u8) = (0b0000_0000_0001, 12);

lazy_static! {
    /// Combined white table: terminating + make-up + shared extended, sorted longest-code-first
    /// so ambiguous shorter prefixes never shadow a longer, more specific match.
    pub static ref WHITE_CODES: Vec<(u16, u8, u16)> = {
        let mut v = Vec::new();
        v.extend_from_slice(WHITE_TERMINATING);
        v.extend_from_slice(WHITE_MAKEUP);
        v.extend_from_slice(EXTENDED_MAKEUP);
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    };

    /// Combined black table: terminating + make-up + shared extended.
    pub static ref BLACK_CODES: Vec<(u16, u8, u16)> = {
        let mut v = Vec::new();
        v.extend_from_slice(BLACK_TERMINATING);
        v.extend_from_slice(BLACK_MAKEUP);
        v.extend_from_slice(EXTENDED_MAKEUP);
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    };
}

/// Look up a run-length code by peeking `bits_window` (up to 16 bits) from a bit source.
///
/// Returns `(run_length, bits_consumed)`. Matches longest-code-first (the tables above are
/// pre-sorted) so a code that is a prefix of a longer one never wins spuriously.
pub fn match_run_code(peek16: u32, table: &[(u16, u8, u16)]) -> Option<(u16, u8)> {
    for &(code, bits, run) in table {
        let candidate = (peek16 >> (16 - bits as u32)) as u16;
        if candidate == code {
            return Some((run, bits));
        }
    }
    None
}

/// Look up a 2D mode code. Returns `(mode, bits_consumed)`.
pub fn match_mode_code(peek16: u32) -> Option<(Mode, u8)> {
    for &(code, bits, mode) in MODE_CODES {
        let candidate = (peek16 >> (16 - bits as u32)) as u16;
        if candidate == code {
            return Some((mode, bits));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_justify(code: u16, bits: u8) -> u32 {
        (code as u32) << (16 - bits as u32)
    }

    #[test]
    fn test_white_terminating_lookup() {
        let peek = left_justify(0x35, 8);
        let (run, bits) = match_run_code(peek, &WHITE_CODES).unwrap();
        assert_eq!(run, 0);
        assert_eq!(bits, 8);
    }

    #[test]
    fn test_black_terminating_lookup() {
        let peek = left_justify(0x02, 2); // black run 3
        let (run, bits) = match_run_code(peek, &BLACK_CODES).unwrap();
        assert_eq!(run, 3);
        assert_eq!(bits, 2);
    }

    #[test]
    fn test_white_makeup_lookup() {
        let peek = left_justify(0x1B, 5); // white run 64
        let (run, bits) = match_run_code(peek, &WHITE_CODES).unwrap();
        assert_eq!(run, 64);
        assert_eq!(bits, 5);
    }

    #[test]
    fn test_extended_makeup_shared() {
        let peek = left_justify(0x08, 11); // run 1792
        let (white_run, _) = match_run_code(peek, &WHITE_CODES).unwrap();
        let (black_run, _) = match_run_code(peek, &BLACK_CODES).unwrap();
        assert_eq!(white_run, 1792);
        assert_eq!(black_run, 1792);
    }

    #[test]
    fn test_mode_vertical_zero() {
        let peek = left_justify(0b1, 1);
        let (mode, bits) = match_mode_code(peek).unwrap();
        assert_eq!(mode, Mode::Vertical(0));
        assert_eq!(bits, 1);
    }

    #[test]
    fn test_mode_pass() {
        let peek = left_justify(0b0001, 4);
        let (mode, bits) = match_mode_code(peek).unwrap();
        assert_eq!(mode, Mode::Pass);
        assert_eq!(bits, 4);
    }

    #[test]
    fn test_mode_horizontal() {
        let peek = left_justify(0b001, 3);
        let (mode, bits) = match_mode_code(peek).unwrap();
        assert_eq!(mode, Mode::Horizontal);
        assert_eq!(bits, 3);
    }

    #[test]
    fn test_mode_extension() {
        let peek = left_justify(0b0000001, 7);
        let (mode, bits) = match_mode_code(peek).unwrap();
        assert_eq!(mode, Mode::Extension);
        assert_eq!(bits, 7);
    }

    #[test]
    fn test_no_shorter_code_shadows_longer() {
        // Vertical(-3) 0000010 (7 bits) must not be shadowed by VL2's 000010 (6 bits) check
        // happening to match a 7-bit peek incorrectly; matching is exact-width comparison.
        let peek = left_justify(0b0000010, 7);
        let (mode, bits) = match_mode_code(peek).unwrap();
        assert_eq!(mode, Mode::Vertical(-3));
        assert_eq!(bits, 7);
    }
}
