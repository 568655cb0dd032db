//! Codec facade tying the row encoders, bit sink and code tables
//! together into a strip-at-a-time encoder.

use alloc::vec::Vec;

use crate::bit_writer::BitSink;
use crate::encode_1d::encode_row_1d;
use crate::encode_2d::{changing_elements, encode_row_2d};
use crate::tables::EOL;
use crate::{ColorChange, EncodeError, EncodeResult};

/// A minimal, `no_std`-friendly output callback, analogous to the
/// existing [`Decoder`](crate::Decoder) trait on the decode side.
pub trait Sink {
    /// Appends `bytes` to the output. An `Err` aborts the current
    /// strip; bytes already written to prior sinks (or earlier calls)
    /// are not rolled back.
    fn write_bytes(&mut self, bytes: &[u8]) -> EncodeResult<()>;
}

impl Sink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> EncodeResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Which ITU-T recommendation governs row coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// T.4 one-dimensional (Modified Huffman) coding.
    T4,
    /// T.6 two-dimensional (Modified READ) coding.
    T6,
}

/// Options governing T.4 strip framing. Ignored entirely when
/// [`Scheme::T6`] is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct T4Options {
    /// Bit 0 of the real TIFF `T4Options` tag: 2-D (Group 3 2-D, T.4
    /// Section 4.2) coding. This encoder only ever produces 1-D rows
    /// under [`Scheme::T4`], so this must be `false`.
    pub group3_2d: bool,
    /// Bit 1 of the real TIFF `T4Options` tag: uncompressed mode is
    /// permitted. Not implemented; must be `false`.
    pub uncompressed_mode: bool,
    /// Bit 2 of the real TIFF `T4Options` tag: insert 0-7 zero fill
    /// bits before each EOL so the EOL's trailing `1` bit lands on a
    /// byte boundary.
    pub fill: bool,
    /// Emit six consecutive EOLs (RTC) after the last row of the
    /// strip, in addition to each row's own EOL.
    pub eol_rtc: bool,
    /// Emit a single EOL before the first coded row.
    pub leading_eol: bool,
}

impl Default for T4Options {
    fn default() -> Self {
        Self {
            group3_2d: false,
            uncompressed_mode: false,
            fill: false,
            eol_rtc: false,
            leading_eol: false,
        }
    }
}

/// A stateful encoder for one or more image strips sharing the same
/// scheme, width and options.
///
/// One instance encodes strips sequentially; [`Self::compress_strip`]
/// resets the internal bit sink and reference line at the start of
/// each call, so the same instance can be reused across every strip of
/// an image without reallocating the scratch buffers.
pub struct CcittEncoder {
    sink: BitSink,
    scheme: Scheme,
    t4_options: T4Options,
    width: u32,
    ref_changes: Vec<ColorChange>,
    coding_changes: Vec<ColorChange>,
}

impl CcittEncoder {
    /// Allocates the encoder's scratch buffers.
    ///
    /// Returns [`EncodeError::UnsupportedOption`] if `scheme` is
    /// [`Scheme::T4`] and `t4_options` requests 2-D coding or
    /// uncompressed mode; this check is skipped entirely under
    /// [`Scheme::T6`], where `t4_options` has no meaning and is never
    /// consulted again.
    pub fn initialize(
        scheme: Scheme,
        width: u32,
        rows_per_strip: u32,
        t4_options: T4Options,
    ) -> EncodeResult<Self> {
        if scheme == Scheme::T4 && (t4_options.group3_2d || t4_options.uncompressed_mode) {
            log::warn!(
                "rejecting unsupported T4Options (group3_2d={}, uncompressed_mode={})",
                t4_options.group3_2d,
                t4_options.uncompressed_mode
            );
            return Err(EncodeError::UnsupportedOption);
        }

        let capacity = (width as usize)
            .saturating_mul(rows_per_strip as usize)
            .max(1);

        Ok(Self {
            sink: BitSink::with_capacity(capacity),
            scheme,
            t4_options,
            width,
            ref_changes: Vec::new(),
            coding_changes: Vec::new(),
        })
    }

    /// Encodes one strip of `height` rows and writes the resulting
    /// bytes to `sink`.
    ///
    /// `pixels` must contain exactly `width * height` bytes, one per
    /// pixel (zero is white, non-zero is black), row-major. Returns
    /// the number of bytes written.
    pub fn compress_strip(
        &mut self,
        pixels: &[u8],
        height: u32,
        sink: &mut impl Sink,
    ) -> EncodeResult<usize> {
        let width = self.width;
        if width == 0 || height == 0 {
            return Err(EncodeError::InvalidDimension);
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(EncodeError::InvalidDimension);
        }

        self.sink.reset();
        self.ref_changes.clear();

        match self.scheme {
            Scheme::T4 => self.compress_strip_1d(pixels, height)?,
            Scheme::T6 => self.compress_strip_2d(pixels, height)?,
        }

        self.sink.pad_to_byte();
        let bytes = self.sink.as_slice();
        sink.write_bytes(bytes)?;
        Ok(bytes.len())
    }

    fn compress_strip_1d(&mut self, pixels: &[u8], height: u32) -> EncodeResult<()> {
        let width = self.width;

        if self.t4_options.leading_eol {
            self.write_eol();
        }

        for row_idx in 0..height {
            let row = row_slice(pixels, row_idx, width);
            encode_row_1d(&mut self.sink, row, width)?;
            self.write_eol();
        }

        if self.t4_options.eol_rtc {
            for _ in 0..5 {
                self.write_eol();
            }
        }

        Ok(())
    }

    fn compress_strip_2d(&mut self, pixels: &[u8], height: u32) -> EncodeResult<()> {
        let width = self.width;

        for row_idx in 0..height {
            let row = row_slice(pixels, row_idx, width);
            self.coding_changes = changing_elements(row, width);

            if log::log_enabled!(log::Level::Trace) {
                log::trace!(
                    "row {row_idx}: {} changing elements against {} reference",
                    self.coding_changes.len(),
                    self.ref_changes.len()
                );
            }

            encode_row_2d(&mut self.sink, &self.coding_changes, &self.ref_changes, width)?;
            core::mem::swap(&mut self.ref_changes, &mut self.coding_changes);
        }

        // EOFB: two consecutive EOL markers, written directly rather
        // than through `write_eol` since `t4_options.fill` has no
        // meaning under T6 and must not perturb the 24-bit marker.
        self.sink.write_bits(EOL, 12);
        self.sink.write_bits(EOL, 12);

        Ok(())
    }

    /// Inserts the configured fill bits (if any), then the 12-bit EOL
    /// marker.
    fn write_eol(&mut self) {
        if self.t4_options.fill {
            let pending = self.sink.bit_pos();
            let fill_bits = (8 - ((pending + 12) % 8)) % 8;
            if fill_bits > 0 {
                self.sink.write_bits(0, fill_bits);
            }
        }

        self.sink.write_bits(EOL, 12);
    }

    /// Releases the encoder's buffers.
    ///
    /// Exists to give callers porting from a manual-lifecycle API an
    /// explicit place to relinquish the encoder; `Drop` already frees
    /// everything, so this is equivalent to letting `self` go out of
    /// scope.
    pub fn dispose(self) {}
}

fn row_slice(pixels: &[u8], row_idx: u32, width: u32) -> &[u8] {
    let start = (row_idx as usize) * (width as usize);
    &pixels[start..start + width as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn rejects_unsupported_group3_2d_before_writing_anything() {
        let opts = T4Options {
            group3_2d: true,
            ..T4Options::default()
        };
        let result = CcittEncoder::initialize(Scheme::T4, 8, 1, opts);
        assert_eq!(result.err(), Some(EncodeError::UnsupportedOption));
    }

    #[test]
    fn t4_options_ignored_entirely_under_t6() {
        let opts = T4Options {
            group3_2d: true,
            uncompressed_mode: true,
            ..T4Options::default()
        };
        // Same invalid options, but under T6 they're never checked.
        assert!(CcittEncoder::initialize(Scheme::T6, 8, 1, opts).is_ok());
    }

    #[test]
    fn rejects_zero_height() {
        let mut encoder =
            CcittEncoder::initialize(Scheme::T4, 8, 1, T4Options::default()).unwrap();
        let mut out = Vec::new();
        let result = encoder.compress_strip(&[], 0, &mut out);
        assert_eq!(result.err(), Some(EncodeError::InvalidDimension));
    }

    #[test]
    fn rejects_zero_width() {
        let mut encoder =
            CcittEncoder::initialize(Scheme::T4, 0, 1, T4Options::default()).unwrap();
        let mut out = Vec::new();
        let result = encoder.compress_strip(&[], 1, &mut out);
        assert_eq!(result.err(), Some(EncodeError::InvalidDimension));
    }

    #[test]
    fn rejects_mismatched_pixel_count() {
        let mut encoder =
            CcittEncoder::initialize(Scheme::T4, 8, 1, T4Options::default()).unwrap();
        let mut out = Vec::new();
        let pixels = vec![0u8; 4];
        let result = encoder.compress_strip(&pixels, 1, &mut out);
        assert_eq!(result.err(), Some(EncodeError::InvalidDimension));
    }

    #[test]
    fn width_8_all_white_t4_matches_published_code_book() {
        // white-term(8) [5 bits, 10011] + EOL [12 bits].
        let mut encoder =
            CcittEncoder::initialize(Scheme::T4, 8, 1, T4Options::default()).unwrap();
        let mut out = Vec::new();
        let pixels = vec![0u8; 8];
        let written = encoder.compress_strip(&pixels, 1, &mut out).unwrap();
        // 5 + 12 = 17 bits -> 3 bytes after padding.
        assert_eq!(written, 3);
        assert_eq!(out.len(), 3);
        // 10011 000000000001 -> 10011000 00000001 1000_0000
        assert_eq!(out[0], 0b10011_000);
        assert_eq!(out[1], 0b00000001);
        assert_eq!(out[2], 0b1000_0000);
    }

    #[test]
    fn width_3_all_black_t4_leads_with_zero_length_white_run() {
        // white-term(0) [8 bits] + black-term(3) [2 bits] + EOL [12 bits].
        let mut encoder =
            CcittEncoder::initialize(Scheme::T4, 3, 1, T4Options::default()).unwrap();
        let mut out = Vec::new();
        let pixels = vec![1u8; 3];
        let written = encoder.compress_strip(&pixels, 1, &mut out).unwrap();
        // 8 + 2 + 12 = 22 bits -> 3 bytes.
        assert_eq!(written, 3);
        assert_eq!(out[0], 0b00110101);
    }

    #[test]
    fn second_row_identical_to_reference_is_all_vertical_zero() {
        // Width 4, two identical rows "W B W B".
        //
        // Row0 is coded against the virtual all-white reference, where
        // b1 is always `width` (no reference changes at all): its
        // three changing elements at columns 1, 2, 3 end up just
        // inside vertical range (n = -3, -2, -1) plus a closing V0,
        // costing 7 + 6 + 3 + 1 = 17 bits.
        //
        // Row1 is identical to row0, so every changing element lines
        // up with its own b1 exactly (n = 0 throughout): 4 V0 codes,
        // 4 bits total.
        //
        // Total: 17 + 4 + 24 (EOFB) = 45 bits -> 6 bytes after padding.
        let mut encoder =
            CcittEncoder::initialize(Scheme::T6, 4, 2, T4Options::default()).unwrap();
        let mut out = Vec::new();
        let pixels = [0u8, 1, 0, 1, 0, 1, 0, 1];
        encoder.compress_strip(&pixels, 2, &mut out).unwrap();
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn rtc_appends_five_eols_after_row_eol() {
        let opts = T4Options {
            eol_rtc: true,
            ..T4Options::default()
        };
        let mut encoder = CcittEncoder::initialize(Scheme::T4, 8, 1, opts).unwrap();
        let mut out = Vec::new();
        let pixels = vec![0u8; 8];
        encoder.compress_strip(&pixels, 1, &mut out).unwrap();
        // white-term(8) [5] + 6 EOLs [72] = 77 bits -> 10 bytes.
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn leading_eol_is_emitted_before_first_row() {
        let opts = T4Options {
            leading_eol: true,
            ..T4Options::default()
        };
        let mut encoder = CcittEncoder::initialize(Scheme::T4, 8, 1, opts).unwrap();
        let mut out = Vec::new();
        let pixels = vec![0u8; 8];
        encoder.compress_strip(&pixels, 1, &mut out).unwrap();
        // leading EOL [12] + white-term(8) [5] + row EOL [12] = 29 bits -> 4 bytes.
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn fill_bits_pad_eol_to_byte_boundary() {
        // White-term(8) [5 bits] leaves the sink at bit offset 5; 7 zero
        // fill bits bring it to 12, then the 12-bit EOL lands its
        // trailing `1` exactly on a byte boundary (24 bits total, no
        // padding needed): 10011_000 | 0000_0000 | 0000_0001.
        let opts = T4Options {
            fill: true,
            ..T4Options::default()
        };
        let mut encoder = CcittEncoder::initialize(Scheme::T4, 8, 1, opts).unwrap();
        let mut out = Vec::new();
        let pixels = vec![0u8; 8];
        let written = encoder.compress_strip(&pixels, 1, &mut out).unwrap();
        assert_eq!(written, 3);
        assert_eq!(out[0], 0b10011_000);
        assert_eq!(out[1], 0b00000000);
        assert_eq!(out[2], 0b00000001);
    }

    #[test]
    fn t6_eofb_ignores_fill_option() {
        // Width 4, one row "W B W B", T6, with `fill` set (meaningless
        // under T6). The EOFB must stay exactly two 12-bit EOLs with no
        // fill bits inserted, regardless of the row's bit position.
        let opts = T4Options {
            fill: true,
            ..T4Options::default()
        };
        let mut encoder_with_fill = CcittEncoder::initialize(Scheme::T6, 4, 1, opts).unwrap();
        let mut encoder_without_fill =
            CcittEncoder::initialize(Scheme::T6, 4, 1, T4Options::default()).unwrap();
        let pixels = [0u8, 1, 0, 1];
        let mut out_with_fill = Vec::new();
        let mut out_without_fill = Vec::new();
        encoder_with_fill
            .compress_strip(&pixels, 1, &mut out_with_fill)
            .unwrap();
        encoder_without_fill
            .compress_strip(&pixels, 1, &mut out_without_fill)
            .unwrap();
        assert_eq!(out_with_fill, out_without_fill);
    }

    #[test]
    fn reusing_encoder_across_strips_resets_reference_line() {
        let mut encoder =
            CcittEncoder::initialize(Scheme::T6, 4, 1, T4Options::default()).unwrap();
        let mut out1 = Vec::new();
        let mut out2 = Vec::new();
        let pixels = [0u8, 1, 0, 1];
        encoder.compress_strip(&pixels, 1, &mut out1).unwrap();
        encoder.compress_strip(&pixels, 1, &mut out2).unwrap();
        // Every strip starts from an all-white reference, so encoding
        // the same single row twice must produce identical output.
        assert_eq!(out1, out2);
    }
}
