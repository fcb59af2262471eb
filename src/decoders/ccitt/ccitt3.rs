//! T.4 Group 3 decoder: pure one-dimensional lines (`K == 0`) and mixed 1D/2D lines (`K > 0`),
//! with EOL handling, byte alignment, and damaged-row tolerance.

use super::bitbuffer::BitBuffer;
use super::params::CcittParams;
use super::twod;
use crate::error::Error;

/// Decode a Group 3 (T.4) stream, invoking `on_line` once per successfully decoded row.
///
/// Holds at most the current line and the previous (reference) line in memory regardless of
/// image size; the caller decides whether to materialize all lines or stream them onward.
pub fn decode_with_callback(
    params: &CcittParams,
    data: &[u8],
    mut on_line: impl FnMut(Vec<u8>),
) -> Result<(), Error> {
    let columns = params.columns as usize;
    let mut bitbuf = BitBuffer::new(data);
    let mut ref_line = vec![0u8; columns];
    let mut row_idx = 0usize;
    let mut damaged_budget = params.damaged_rows_before_error;
    // Used only when mixed (k > 0) and no EOL tag bit is available: every (k+1)th line is 1D.
    let mut line_in_k_group = 0u32;

    loop {
        if params.rows > 0 && row_idx as u32 >= params.rows {
            break;
        }
        if !bitbuf.has_data() {
            break;
        }

        if params.end_of_line && !twod::skip_to_eol(&mut bitbuf) {
            break;
        }
        if params.encoded_byte_align {
            bitbuf.align_to_byte();
        }
        if !bitbuf.has_data() || twod::is_eofb(&bitbuf) {
            break;
        }
        // 16 leading zero bits can never prefix a valid mode/run/EOL code (EOL's own zero run
        // tops out at 12): treat this as clean exhaustion rather than a malformed code.
        if bitbuf.peek(16) == 0 {
            break;
        }

        let use_1d = if params.k == 0 {
            true
        } else if params.k > 0 {
            if params.end_of_line {
                let tag = bitbuf.peek(1);
                bitbuf.consume(1);
                tag == 1
            } else {
                let is_1d = line_in_k_group == 0;
                line_in_k_group = (line_in_k_group + 1) % (params.k as u32 + 1);
                is_1d
            }
        } else {
            false
        };

        let decoded = if use_1d {
            twod::decode_1d_line(&mut bitbuf, columns)
        } else {
            twod::decode_2d_line(&mut bitbuf, &ref_line, columns)
        };

        match decoded {
            Ok(line) => {
                ref_line = line.clone();
                on_line(line);
                row_idx += 1;
            }
            Err(e) => {
                if damaged_budget > 0 {
                    damaged_budget -= 1;
                    log::warn!(
                        "ccitt3: dropping damaged row {row_idx} ({}), {damaged_budget} damaged rows remaining",
                        e.0
                    );
                    row_idx += 1;
                    if params.end_of_line {
                        if !twod::skip_to_eol(&mut bitbuf) {
                            break;
                        }
                    } else {
                        bitbuf.align_to_byte();
                    }
                    continue;
                }
                return Err(Error::DamagedStream { row: row_idx, reason: e.0 });
            }
        }
    }
    Ok(())
}

/// Decode a Group 3 (T.4) stream into materialized 0/255 pixel rows.
pub fn decode(params: &CcittParams, data: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    let mut lines = Vec::new();
    decode_with_callback(params, data, |line| lines.push(line))?;
    if params.black_is_1 {
        for line in lines.iter_mut() {
            for p in line.iter_mut() {
                *p = 255 - *p;
            }
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_stream_decodes_to_zero_lines() {
        let params = CcittParams {
            k: 0,
            columns: 8,
            rows: 0,
            ..Default::default()
        };
        let lines = decode(&params, &[0x00, 0x00, 0x00]).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_1d_single_line_width() {
        let params = CcittParams {
            k: 0,
            columns: 4,
            rows: 1,
            ..Default::default()
        };
        // White run=2 "0111" + black run=2 "11", padded: 0x7C.
        let lines = decode(&params, &[0b0111_1100]).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(lines[0], vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_black_is_1_inverts_output() {
        let params = CcittParams {
            k: 0,
            columns: 4,
            rows: 1,
            black_is_1: true,
            ..Default::default()
        };
        let lines = decode(&params, &[0b0111_1100]).unwrap();
        assert_eq!(lines[0], vec![255, 255, 0, 0]);
    }

    #[test]
    fn test_damaged_row_budget_exhausted_errors() {
        let params = CcittParams {
            k: 0,
            columns: 4,
            rows: 1,
            damaged_rows_before_error: 0,
            ..Default::default()
        };
        // 0xFF has no valid white run-length prefix at all (0b1111_1111 doesn't match any
        // terminating/make-up code), so the first line decode fails immediately.
        let err = decode(&params, &[0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, Error::DamagedStream { row: 0, .. }));
    }

    #[test]
    fn test_damaged_row_tolerated_within_budget() {
        // Row 0 decodes fine (white=2, black=2); row 1 is garbage (0xFF) but tolerated; a
        // trailing good row never arrives since we can't easily re-sync mid-stream here, so we
        // just assert the tolerated path doesn't propagate an error and keeps the first row.
        let params = CcittParams {
            k: 0,
            columns: 4,
            rows: 2,
            damaged_rows_before_error: 1,
            ..Default::default()
        };
        let lines = decode(&params, &[0b0111_1100, 0xFF, 0xFF]).unwrap();
        assert_eq!(lines[0], vec![0, 0, 255, 255]);
    }
}
