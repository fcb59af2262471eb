//! MSB-first packing between decoded pixel rows (one byte per pixel, 0 or 255) and the packed
//! bitonal byte rows a `CCITTFaxDecode` consumer expects.

/// Pack decoded pixel rows (each byte 0 or 255) into MSB-first bytes, `ceil(columns/8)` per row.
///
/// A pixel value >= 128 sets its bit.
pub fn pack(lines: &[Vec<u8>], columns: usize) -> Vec<u8> {
    let row_bytes = columns.div_ceil(8);
    let mut out = Vec::with_capacity(row_bytes * lines.len());
    for line in lines {
        let mut row = vec![0u8; row_bytes];
        for (x, &pixel) in line.iter().enumerate().take(columns) {
            if pixel >= 128 {
                row[x / 8] |= 0x80 >> (x % 8);
            }
        }
        out.extend_from_slice(&row);
    }
    out
}

/// Inverse of [`pack`]: unpack `rows` rows of `ceil(columns/8)` MSB-first bytes into one-byte
/// (0 or 255) pixel rows.
pub fn unpack(data: &[u8], columns: usize, rows: usize) -> Vec<Vec<u8>> {
    let row_bytes = columns.div_ceil(8);
    let mut out = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut line = vec![0u8; columns];
        let base = r * row_bytes;
        for x in 0..columns {
            let byte = data.get(base + x / 8).copied().unwrap_or(0);
            let bit = (byte >> (7 - (x % 8))) & 1;
            line[x] = if bit == 1 { 255 } else { 0 };
        }
        out.push(line);
    }
    out
}

/// Expand packed lines into one byte per pixel (0 or 255), row-major, without re-packing.
pub fn to_uncompressed(lines: &[Vec<u8>]) -> Vec<u8> {
    lines.iter().flat_map(|line| line.iter().copied()).collect()
}
