//! Shared two-dimensional (Read) line decoding used by both the Group 3 2D lines and the pure
//! Group 4 decoder, plus the one-dimensional line decoder used by Group 3 1D/mixed lines.

use super::bitbuffer::BitBuffer;
use super::tables::{self, Mode};

/// A line- or run-level decode failure, reported without a row number; the caller (CCITT3/CCITT4)
/// attaches the row index when converting this into `crate::error::Error::DamagedStream`.
#[derive(Debug, Clone)]
pub struct LineDecodeError(pub String);

const WHITE: u8 = 0;
const BLACK: u8 = 255;

fn flip(color: u8) -> u8 {
    if color == WHITE { BLACK } else { WHITE }
}

/// Find `b1`: the first changing element on `ref_line` to the right of `a0`, of color opposite to
/// `color` (the color currently being coded on the line being built).
fn find_b1(ref_line: &[u8], columns: usize, a0: i64, color: u8) -> usize {
    let start = if a0 < 0 { 0 } else { (a0 + 1) as usize };
    let mut i = start;
    while i < columns {
        let prev = if i == 0 { WHITE } else { ref_line[i - 1] };
        if ref_line[i] != prev && ref_line[i] != color {
            return i;
        }
        i += 1;
    }
    columns
}

/// Find `b2`: the next changing element on `ref_line` after `b1`.
fn find_b2(ref_line: &[u8], columns: usize, b1: usize) -> usize {
    let mut i = b1 + 1;
    while i < columns {
        let prev = ref_line[i - 1];
        if ref_line[i] != prev {
            return i;
        }
        i += 1;
    }
    columns
}

fn fill(line: &mut [u8], from: i64, to: usize, color: u8) {
    let start = if from < 0 { 0usize } else { from as usize };
    let end = to.min(line.len());
    for x in start..end {
        line[x] = color;
    }
}

/// Decode one run-length (terminating, optionally preceded by make-up codes) for `color`.
fn decode_run(bitbuf: &mut BitBuffer, color: u8) -> Result<u32, LineDecodeError> {
    let table: &[(u16, u8, u16)] = if color == WHITE { &tables::WHITE_CODES } else { &tables::BLACK_CODES };
    let mut total = 0u32;
    loop {
        let peek = bitbuf.peek(16);
        let (run, bits) = tables::match_run_code(peek, table)
            .ok_or_else(|| LineDecodeError("unmatched run-length code".to_string()))?;
        bitbuf.consume(bits as u32);
        total += run as u32;
        if run < 64 {
            return Ok(total);
        }
    }
}

/// Decode one purely one-dimensional (T.4 1D) line: alternating white/black runs starting white.
pub fn decode_1d_line(bitbuf: &mut BitBuffer, columns: usize) -> Result<Vec<u8>, LineDecodeError> {
    let mut line = vec![WHITE; columns];
    let mut pos = 0usize;
    let mut color = WHITE;
    let mut guard = 0usize;
    while pos < columns {
        guard += 1;
        if guard > columns * 2 + 16 {
            return Err(LineDecodeError("1D line decode did not terminate".to_string()));
        }
        let run = decode_run(bitbuf, color)?;
        let end = (pos + run as usize).min(columns);
        fill(&mut line, pos as i64, end, color);
        pos = end;
        color = flip(color);
    }
    Ok(line)
}

/// Decode one two-dimensional (Read) line against `ref_line`, per T.6 §4.3 step 4 semantics.
pub fn decode_2d_line(bitbuf: &mut BitBuffer, ref_line: &[u8], columns: usize) -> Result<Vec<u8>, LineDecodeError> {
    let mut line = vec![WHITE; columns];
    let mut a0: i64 = -1;
    let mut color = WHITE;
    let mut guard = 0usize;

    while a0 < columns as i64 {
        guard += 1;
        if guard > columns * 4 + 16 {
            return Err(LineDecodeError("2D line decode did not terminate".to_string()));
        }
        let peek = bitbuf.peek(16);
        let (mode, mode_bits) =
            tables::match_mode_code(peek).ok_or_else(|| LineDecodeError("unmatched mode code".to_string()))?;
        bitbuf.consume(mode_bits as u32);

        match mode {
            Mode::Pass => {
                let b1 = find_b1(ref_line, columns, a0, color);
                let b2 = find_b2(ref_line, columns, b1);
                fill(&mut line, a0, b2, color);
                a0 = b2 as i64;
            }
            Mode::Horizontal => {
                let run1 = decode_run(bitbuf, color)?;
                let run2 = decode_run(bitbuf, flip(color))?;
                let start = if a0 < 0 { 0usize } else { a0 as usize };
                let mid = (start + run1 as usize).min(columns);
                fill(&mut line, a0, mid, color);
                let end = (mid + run2 as usize).min(columns);
                fill(&mut line, mid as i64, end, flip(color));
                a0 = end as i64;
            }
            Mode::Vertical(d) => {
                let b1 = find_b1(ref_line, columns, a0, color) as i64;
                let a1 = (b1 + d as i64).clamp(0, columns as i64);
                fill(&mut line, a0, a1 as usize, color);
                a0 = a1;
                color = flip(color);
            }
            Mode::Extension => {
                // 0000001xxx: the 7-bit prefix is already consumed above; consume the 3-bit
                // payload too so bit alignment is preserved, per SPEC_FULL.md's redesign note —
                // do not just `continue` without consuming, that desyncs the bitstream.
                bitbuf.consume(3);
            }
        }
    }
    Ok(line)
}

/// Scan forward bit-by-bit for the 12-bit EOL pattern `000000000001`, consuming through it.
/// Returns `false` if the source is exhausted before an EOL is found.
pub fn skip_to_eol(bitbuf: &mut BitBuffer) -> bool {
    while bitbuf.has_data() {
        let peek16 = bitbuf.peek(16);
        if (peek16 >> 4) == 0x001 {
            bitbuf.consume(12);
            return true;
        }
        bitbuf.consume(1);
    }
    false
}

/// Detect RTC/EOFB: two consecutive EOL codes, i.e. the pattern `0x001001` in the top 24 bits.
pub fn is_eofb(bitbuf: &BitBuffer) -> bool {
    let peek32 = bitbuf.peek(32);
    (peek32 >> 8) == 0x001001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_b1_b2_all_white_reference() {
        let ref_line = vec![WHITE; 10];
        // No changing elements on an all-white line; b1/b2 both fall off the end.
        assert_eq!(find_b1(&ref_line, 10, -1, WHITE), 10);
        assert_eq!(find_b2(&ref_line, 10, 10), 10);
    }

    #[test]
    fn test_find_b1_locates_first_opposite_transition() {
        let mut ref_line = vec![WHITE; 10];
        for p in ref_line.iter_mut().skip(4) {
            *p = BLACK;
        }
        // a0 = -1, coding white -> b1 is the first transition to black, at index 4.
        assert_eq!(find_b1(&ref_line, 10, -1, WHITE), 4);
        assert_eq!(find_b2(&ref_line, 10, 4), 10);
    }

    #[test]
    fn test_decode_1d_line_white_then_black() {
        // White terminating run=2 is "0111" (4 bits); black terminating run=2 is "11" (2 bits).
        // Concatenated and padded: 0111 11 00 = 0x7C.
        let mut bb = BitBuffer::new(&[0b0111_1100]);
        let line = decode_1d_line(&mut bb, 4).unwrap();
        assert_eq!(line, vec![WHITE, WHITE, BLACK, BLACK]);
    }
}
