//! T.6 Group 4 decoder: pure two-dimensional coding, no tag bits, no EOL between lines. Starts
//! from a virtual all-white reference line and stops on RTC (EOFB), exhaustion, or a prolonged
//! run of zero bits at the start of a line.

use super::bitbuffer::BitBuffer;
use super::params::CcittParams;
use super::twod;
use crate::error::Error;

/// Decode a Group 4 (T.6) stream, invoking `on_line` once per successfully decoded row.
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

    loop {
        if params.rows > 0 && row_idx as u32 >= params.rows {
            break;
        }
        if !bitbuf.has_data() || twod::is_eofb(&bitbuf) {
            break;
        }
        if bitbuf.peek(16) == 0 {
            break;
        }

        match twod::decode_2d_line(&mut bitbuf, &ref_line, columns) {
            Ok(line) => {
                ref_line = line.clone();
                on_line(line);
                row_idx += 1;
                if params.encoded_byte_align {
                    bitbuf.align_to_byte();
                }
            }
            Err(e) => {
                if damaged_budget > 0 {
                    damaged_budget -= 1;
                    log::warn!(
                        "ccitt4: dropping damaged row {row_idx} ({}), {damaged_budget} damaged rows remaining",
                        e.0
                    );
                    row_idx += 1;
                    bitbuf.align_to_byte();
                    continue;
                }
                return Err(Error::DamagedStream { row: row_idx, reason: e.0 });
            }
        }
    }
    Ok(())
}

/// Decode a Group 4 (T.6) stream into materialized 0/255 pixel rows.
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
