//! T.4 one-dimensional (Modified Huffman) row encoding.

use crate::bit_writer::BitSink;
use crate::encode_run::write_run;
use crate::runs::next_run_length;
use crate::EncodeResult;

/// Encodes a single row as alternating white/black runs, starting with
/// white. A row that starts with a black pixel gets a zero-length
/// white run first, which the kept decoder requires to stay in sync.
pub(crate) fn encode_row_1d(sink: &mut BitSink, row: &[u8], width: u32) -> EncodeResult<()> {
    let mut col = 0u32;
    let mut white = true;

    while col < width {
        let len = next_run_length(row, col, width, white);
        write_run(sink, white, len)?;
        col += len;
        white = !white;
    }

    Ok(())
}
