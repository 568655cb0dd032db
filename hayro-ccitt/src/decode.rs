use crate::bit_reader::BitReader;
use crate::tables::{
    BLACK_STATES, EOL, INVALID, MODE_STATES, Mode, State, VALUE_FLAG, VALUE_MASK, WHITE_STATES,
};
use crate::{DecodeError, Result};

impl BitReader<'_> {
    #[inline(always)]
    fn decode_run_inner(&mut self, states: &[State]) -> Result<u16> {
        let mut total: u16 = 0;
        let mut state: usize = 0;

        loop {
            let bit = self.read_bit()?;

            let transition = if bit == 0 {
                states[state].on_0
            } else {
                states[state].on_1
            };

            if transition == INVALID {
                return Err(DecodeError::InvalidCode);
            } else if transition & VALUE_FLAG != 0 {
                let len = transition & VALUE_MASK;
                total = total.checked_add(len).ok_or(DecodeError::Overflow)?;

                // For decoding black/white runs, less than 64 means we have
                // a terminating code. For mode decoding, all values are less
                // than 64 anyway, so this condition can be used for all methods.
                if len < 64 {
                    return Ok(total);
                }

                state = 0;
            } else {
                state = transition as usize;
            }
        }
    }

    #[inline(always)]
    pub(crate) fn decode_white_run(&mut self) -> Result<u16> {
        self.decode_run_inner(&WHITE_STATES)
    }

    #[inline(always)]
    pub(crate) fn decode_black_run(&mut self) -> Result<u16> {
        self.decode_run_inner(&BLACK_STATES)
    }

    #[inline(always)]
    pub(crate) fn decode_run(&mut self, is_white: bool) -> Result<u16> {
        if is_white {
            self.decode_white_run()
        } else {
            self.decode_black_run()
        }
    }

    #[inline(always)]
    pub(crate) fn decode_mode(&mut self) -> Result<Mode> {
        let mode_id = self.decode_run_inner(&MODE_STATES)?;
        Ok(match mode_id {
            0 => Mode::Pass,
            1 => Mode::Horizontal,
            2 => Mode::Vertical(0),
            3 => Mode::Vertical(1),
            4 => Mode::Vertical(2),
            5 => Mode::Vertical(3),
            6 => Mode::Vertical(-1),
            7 => Mode::Vertical(-2),
            8 => Mode::Vertical(-3),
            _ => return Err(DecodeError::InvalidCode),
        })
    }

    #[inline(always)]
    pub(crate) fn read_eol_if_available(&mut self) -> usize {
        let mut count = 0;
        while self.peak_bits(12) == Ok(EOL) {
            count += 1;
            self.read_bits(12).unwrap();
        }

        count
    }
}
