// src/state.rs
//
// The cipher state and the forward clock. The 48-bit LFSR is kept split
// into its odd- and even-indexed bits, 24 bits per half, because the
// filter only ever reads odd-indexed bits and the feedback polynomial
// splits cleanly the same way. One forward clock shifts the register by
// one position, which swaps the roles of the two halves.

use log::trace;

use crate::bits::{be_bit, bit, even_parity32, reverse24};
use crate::filter::{filter, LF_POLY_EVEN, LF_POLY_ODD};

const HALF_MASK: u32 = 0xFF_FFFF;

/// The Crypto1 cipher state: 48 bits as two packed 24-bit halves.
///
/// Only the low 24 bits of each half are ever set. The state is a plain
/// stack value; clone it freely to fork a keystream position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Crypto1State {
    pub(crate) odd: u32,
    pub(crate) even: u32,
}

impl Crypto1State {
    /// Create a zeroed state. The all-zero state is the LFSR fixed point
    /// and produces an all-zero keystream until something is fed in.
    pub fn new() -> Self {
        Self { odd: 0, even: 0 }
    }

    /// Create a state loaded with a 48-bit sector key.
    pub fn from_key(key: u64) -> Self {
        let mut state = Self::new();
        state.load_key(key);
        state
    }

    /// Load a 48-bit key, replacing the current state.
    ///
    /// Key bits enter byte-reversed per octet (bit index XOR 7), matching
    /// how Mifare readers feed the sector key into the register.
    pub fn load_key(&mut self, key: u64) {
        self.odd = 0;
        self.even = 0;
        let mut i = 47;
        while i > 0 {
            self.odd = (self.odd << 1) | ((key >> ((i - 1) ^ 7)) & 1) as u32;
            self.even = (self.even << 1) | ((key >> (i ^ 7)) & 1) as u32;
            i -= 2;
        }
        trace!("crypto1 state loaded, lfsr={:012x}", self.lfsr());
    }

    /// Export the state as the 48-bit register value, interleaving the two
    /// halves back into shift order. `Crypto1State::from_key(k).lfsr() == k`.
    pub fn lfsr(&self) -> u64 {
        let mut lfsr = 0u64;
        for i in (0..24).rev() {
            lfsr = (lfsr << 1) | bit(self.odd, i ^ 3) as u64;
            lfsr = (lfsr << 1) | bit(self.even, i ^ 3) as u64;
        }
        lfsr
    }

    /// Current filter output without advancing the register.
    ///
    /// This is the keystream bit the next clock would emit. It is also the
    /// bit Mifare reuses to encrypt the parity of the byte just sent, so
    /// the parity-aware bulk operations peek it at byte boundaries.
    #[inline]
    pub fn peek_bit(&self) -> u8 {
        filter(self.odd)
    }

    /// Advance the register one position and return the keystream bit.
    ///
    /// `input` feeds one plaintext/ciphertext bit into the feedback;
    /// `encrypted` additionally folds the filter output into the feedback,
    /// so that feeding ciphertext makes the register see plaintext.
    #[inline]
    pub fn clock_bit(&mut self, input: u8, encrypted: bool) -> u8 {
        let out = filter(self.odd);
        let mut feed = (out & encrypted as u8) as u32;
        feed ^= (input & 1) as u32;
        feed ^= LF_POLY_ODD & self.odd;
        feed ^= LF_POLY_EVEN & self.even;
        let shifted = ((self.even << 1) | even_parity32(feed) as u32) & HALF_MASK;
        self.even = self.odd;
        self.odd = shifted;
        out
    }

    /// Clock 8 bits, LSB first. Returns the keystream byte with bit i of
    /// `input` paired with bit i of the result.
    pub fn clock_byte(&mut self, input: u8, encrypted: bool) -> u8 {
        let mut out = 0;
        for i in 0..8 {
            out |= self.clock_bit((input >> i) & 1, encrypted) << i;
        }
        out
    }

    /// Clock 32 bits in Mifare wire order: most significant byte first,
    /// LSB first within each byte. Bit i of the input maps to bit `i ^ 24`,
    /// and the output uses the same layout.
    pub fn clock_word(&mut self, input: u32, encrypted: bool) -> u32 {
        let mut out = 0;
        for i in 0..32 {
            out |= (self.clock_bit(be_bit(input, i), encrypted) as u32) << (i ^ 24);
        }
        out
    }
}

/// Byte-split mask equivalent of [`LF_POLY_ODD`].
pub const LFSR_MASK_ODD: u32 = 0x3A7394;
/// Byte-split mask equivalent of [`LF_POLY_EVEN`].
pub const LFSR_MASK_EVEN: u32 = 0x2010E1;

/// The byte-split register layout: each 24-bit half bit-reversed and held
/// as three little-endian bytes, the form bulk implementations keep in
/// registers. Equivalent to [`Crypto1State`]; convert freely in both
/// directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitState {
    pub even: [u8; 3],
    pub odd: [u8; 3],
}

impl SplitState {
    fn pack(half: u32) -> [u8; 3] {
        let b = reverse24(half).to_le_bytes();
        [b[0], b[1], b[2]]
    }

    fn unpack(half: [u8; 3]) -> u32 {
        reverse24(u32::from_le_bytes([half[0], half[1], half[2], 0]))
    }
}

impl From<&Crypto1State> for SplitState {
    fn from(state: &Crypto1State) -> Self {
        SplitState {
            even: SplitState::pack(state.even),
            odd: SplitState::pack(state.odd),
        }
    }
}

impl From<&SplitState> for Crypto1State {
    fn from(split: &SplitState) -> Self {
        Crypto1State {
            even: SplitState::unpack(split.even),
            odd: SplitState::unpack(split.odd),
        }
    }
}
