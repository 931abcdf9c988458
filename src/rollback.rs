// src/rollback.rs
//
// Exact inverses of the forward clock. Offline key-recovery tools run the
// register backwards through a captured transcript to reach the state that
// existed right after key load, then read the key out of the register.
//
// Rolling back one step has to reconstruct the tap bit that the forward
// shift pushed out of the even half. The feedback bit that was inserted is
// known (it sits at the bottom of the shifted half), and the feedback
// equation has exactly one unknown left in it, so its parity yields the
// lost bit.

use crate::bits::{be_bit, even_parity32};
use crate::filter::{filter, LF_POLY_EVEN, LF_POLY_ODD};
use crate::state::Crypto1State;

impl Crypto1State {
    /// Undo one [`clock_bit`](Crypto1State::clock_bit) and return the
    /// keystream bit that forward step had emitted. `input` and `feedback`
    /// must match the values used on the way forward.
    pub fn rollback_bit(&mut self, input: u8, feedback: bool) -> u8 {
        self.odd &= 0xFF_FFFF;
        core::mem::swap(&mut self.odd, &mut self.even);

        let inserted = self.even & 1;
        self.even >>= 1;

        let mut acc = inserted;
        acc ^= LF_POLY_EVEN & self.even;
        acc ^= LF_POLY_ODD & self.odd;
        acc ^= (input & 1) as u32;
        let out = filter(self.odd);
        acc ^= (out & feedback as u8) as u32;

        self.even |= (even_parity32(acc) as u32) << 23;
        out
    }

    /// Undo one [`clock_byte`](Crypto1State::clock_byte); bits retire in
    /// reverse transmission order.
    pub fn rollback_byte(&mut self, input: u8, feedback: bool) -> u8 {
        let mut out = 0;
        for i in (0..8).rev() {
            out |= self.rollback_bit((input >> i) & 1, feedback) << i;
        }
        out
    }

    /// Undo one [`clock_word`](Crypto1State::clock_word); bits retire in
    /// reverse wire order.
    pub fn rollback_word(&mut self, input: u32, feedback: bool) -> u32 {
        let mut out = 0;
        for i in (0..32).rev() {
            out |= (self.rollback_bit(be_bit(input, i), feedback) as u32) << (i ^ 24);
        }
        out
    }
}
