// src/prng.rs
//
// The tag's nonce generator: a 16-bit LFSR (x^16 + x^14 + x^13 + x^11 + 1)
// viewed through a 32-bit window of its output stream. Card nonces are 32
// consecutive output bits, so they carry only 16 bits of entropy and the
// distance between any two nonces is well defined. Internally the word is
// byte-swapped so the shift runs in wire bit order.

use crate::bits::{even_parity32, swap_endian};
use crate::error::{Crypto1Error, Result};

/// The n-th successor of a 32-bit nonce value.
///
/// `n = 16` slides the window by one half, `n = 64`/`96` give the reader
/// and tag answers aR = suc64(nT), aT = suc96(nT) used to close mutual
/// authentication.
pub fn prng_successor(x: u32, n: u32) -> u32 {
    let mut x = swap_endian(x);
    for _ in 0..n {
        x = (x >> 1) | ((((x >> 16) ^ (x >> 18) ^ (x >> 19) ^ (x >> 21)) & 1) << 31);
    }
    swap_endian(x)
}

/// Candidate card nonces consistent with a captured parity-leak pattern.
///
/// For each 16-bit seed the iterator chains PRNG successors and compares
/// `width` observed filter bits against the even parity of the masked
/// state; seeds that survive all checks yield their expanded 32-bit nonce.
/// Restartable and lazy; collect it or stop at the first hit.
#[derive(Debug, Clone)]
pub struct ValidNonces {
    filter: u32,
    width: u8,
    seed: u32,
}

/// Enumerate the card nonces consistent with `width` leaked parity bits
/// held in the low bits of `filter`.
pub fn valid_nonces(filter: u32, width: u8) -> Result<ValidNonces> {
    if width == 0 || width > 32 {
        return Err(Crypto1Error::InvalidArgument(
            "parity filter width must be between 1 and 32",
        ));
    }
    Ok(ValidNonces {
        filter,
        width,
        seed: 0,
    })
}

impl ValidNonces {
    fn matches(&self, seed: u32) -> bool {
        let mut m = seed;
        for j in 0..self.width as u32 {
            let steps = if j == self.width as u32 - 1 { 48 } else { 8 };
            m = prng_successor(m, steps);
            if ((self.filter >> j) & 1) as u8 != even_parity32(m & 0xFF01) {
                return false;
            }
        }
        true
    }
}

impl Iterator for ValidNonces {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.seed <= 0xFFFF {
            let seed = self.seed;
            self.seed += 1;
            if self.matches(seed) {
                return Some(prng_successor(seed, 16));
            }
        }
        None
    }
}
