//! Run length -> Huffman code emission, shared by the 1-D and 2-D
//! encoders.

use crate::bit_writer::BitSink;
use crate::tables::{
    BLACK_MAKEUP_CODES, BLACK_TERM_CODES, MAKEUP_STRIDE, MAX_MAKEUP_RUN, WHITE_MAKEUP_CODES,
    WHITE_TERM_CODES,
};
use crate::{EncodeError, EncodeResult};

/// Emits `length` pixels of the given color as zero or more make-up
/// codes followed by exactly one terminating code.
///
/// Lengths above [`MAX_MAKEUP_RUN`] repeat the largest make-up code
/// until the remainder fits, which is the extended-range behavior T.6
/// requires for runs longer than a single strip row could ever need in
/// T.4 but that T.6's unlimited vertical runs can produce.
pub(crate) fn write_run(sink: &mut BitSink, white: bool, length: u32) -> EncodeResult<()> {
    let (term_codes, makeup_codes) = if white {
        (&WHITE_TERM_CODES, &WHITE_MAKEUP_CODES)
    } else {
        (&BLACK_TERM_CODES, &BLACK_MAKEUP_CODES)
    };

    let mut remaining = length;
    while remaining > MAX_MAKEUP_RUN {
        emit(sink, makeup_codes, MAX_MAKEUP_RUN)?;
        remaining -= MAX_MAKEUP_RUN;
    }

    if remaining >= MAKEUP_STRIDE {
        let boundary = (remaining / MAKEUP_STRIDE) * MAKEUP_STRIDE;
        emit(sink, makeup_codes, boundary)?;
        remaining -= boundary;
    }

    debug_assert!(remaining < MAKEUP_STRIDE);
    let (bits, pattern) = term_codes[remaining as usize];
    if bits == 0 {
        return Err(EncodeError::InternalInvariant);
    }
    sink.write_bits(pattern as u32, bits as u32);
    Ok(())
}

fn emit(sink: &mut BitSink, makeup_codes: &[(u8, u16); 40], run_length: u32) -> EncodeResult<()> {
    let slot = (run_length / MAKEUP_STRIDE - 1) as usize;
    let (bits, pattern) = *makeup_codes
        .get(slot)
        .ok_or(EncodeError::InternalInvariant)?;
    if bits == 0 {
        return Err(EncodeError::InternalInvariant);
    }
    sink.write_bits(pattern as u32, bits as u32);
    Ok(())
}
