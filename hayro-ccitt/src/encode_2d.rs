//! T.6 two-dimensional (Modified READ) row encoding.
//!
//! Mirrors the mode-selection rules the kept decoder already applies
//! in reverse (`decode_2d_line` / `DecoderContext` in `lib.rs`): Pass
//! when `b2 < a1`, Vertical when `|a1 - b1| <= 3`, Horizontal
//! otherwise. Unlike the decoder, which discovers the coding line's
//! changing elements incrementally as it decodes, the encoder has the
//! whole row up front, so it computes the coding line's changes in one
//! pass before the mode loop starts.

use alloc::vec::Vec;

use crate::bit_writer::BitSink;
use crate::encode_run::write_run;
use crate::tables::{HORIZONTAL_CODE, PASS_CODE, VERTICAL_CODES};
use crate::{Color, ColorChange, EncodeResult};

/// Computes the changing elements of a coded row, in column order.
/// The color at column `-1` is defined as white, so the first entry
/// (if any) is always black.
pub(crate) fn changing_elements(row: &[u8], width: u32) -> Vec<ColorChange> {
    let mut changes = Vec::new();
    let mut white = true;

    for col in 0..width {
        let pixel_white = row[col as usize] == 0;
        if pixel_white != white {
            changes.push(ColorChange {
                idx: col,
                color: if pixel_white { Color::White } else { Color::Black },
            });
            white = pixel_white;
        }
    }

    changes
}

/// First changing element strictly right of `after` (or `width` if
/// none), found by binary search since `changes` is sorted by
/// construction.
fn next_after(changes: &[ColorChange], after: i64, width: u32) -> u32 {
    let idx = changes.partition_point(|c| (c.idx as i64) <= after);
    changes.get(idx).map_or(width, |c| c.idx)
}

/// `b1`/`b2`: the first reference-line changing element right of `a0`
/// whose color differs from the color at `a0`, and the one after that
/// (regardless of color).
fn b1_b2(ref_changes: &[ColorChange], a0: i64, color: Color, width: u32) -> (u32, u32) {
    let opposite = color.opposite();
    let mut idx = ref_changes.partition_point(|c| (c.idx as i64) <= a0);
    while idx < ref_changes.len() && ref_changes[idx].color != opposite {
        idx += 1;
    }
    let b1 = ref_changes.get(idx).map_or(width, |c| c.idx);
    let b2 = ref_changes.get(idx + 1).map_or(width, |c| c.idx);
    (b1, b2)
}

/// Encodes one row against `ref_changes` (the previous coded row's
/// changing elements, or empty for the imaginary all-white row before
/// row 0).
pub(crate) fn encode_row_2d(
    sink: &mut BitSink,
    coding_changes: &[ColorChange],
    ref_changes: &[ColorChange],
    width: u32,
) -> EncodeResult<()> {
    let mut a0: i64 = -1;
    let mut color = Color::White;

    while a0 < width as i64 {
        let a1 = next_after(coding_changes, a0, width);
        let (b1, b2) = b1_b2(ref_changes, a0, color, width);

        if b2 < a1 {
            // Pass mode: the run continues past b2 without a color
            // change, since a0..b2 on the coding line is all one color.
            write_mode(sink, PASS_CODE);
            a0 = b2 as i64;
        } else {
            let delta = a1 as i64 - b1 as i64;
            if (-3..=3).contains(&delta) {
                write_mode(sink, VERTICAL_CODES[(delta + 3) as usize]);
                a0 = a1 as i64;
                color = color.opposite();
            } else {
                write_mode(sink, HORIZONTAL_CODE);
                let start = if a0 < 0 { 0 } else { a0 as u32 };
                let run1 = a1 - start;
                write_run(sink, color.is_white(), run1)?;

                let a2 = next_after(coding_changes, a1 as i64, width);
                let run2 = a2 - a1;
                write_run(sink, color.opposite().is_white(), run2)?;

                a0 = a2 as i64;
                // Two toggles cancel out; `color` is unchanged.
            }
        }
    }

    Ok(())
}

fn write_mode(sink: &mut BitSink, (bits, pattern): (u8, u16)) {
    sink.write_bits(pattern as u32, bits as u32);
}
