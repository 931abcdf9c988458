// src/stream.rs
//
// Bulk traffic operations: plain keystream generation and the in-place
// XOR passes used for encrypted Mifare frames. The parity-aware variants
// reproduce the wire format exactly: every transmitted byte carries a 9th
// bit holding the odd parity of the plaintext byte, encrypted with the
// keystream bit that also encrypts the first bit of the next byte. That
// bit is peeked, not clocked, so the cipher position stays bit-exact.

use crate::bits::odd_parity8;
use crate::error::{Crypto1Error, Result};
use crate::state::Crypto1State;

impl Crypto1State {
    /// One keystream bit (clocks with no input).
    #[inline]
    pub fn keystream_bit(&mut self) -> u8 {
        self.clock_bit(0, false)
    }

    /// One keystream byte, bit i in position i.
    #[inline]
    pub fn keystream_byte(&mut self) -> u8 {
        self.clock_byte(0, false)
    }

    /// Half a keystream byte, in bits 3..0. Used for the 4-bit ACK/NAK
    /// answers Mifare tags send.
    pub fn keystream_nibble(&mut self) -> u8 {
        let mut out = 0;
        for i in 0..4 {
            out |= self.keystream_bit() << i;
        }
        out
    }

    /// XOR keystream into `buf` in place. Encrypts and decrypts alike.
    pub fn xor_bytes(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b ^= self.keystream_byte();
        }
    }

    /// As [`xor_bytes`](Self::xor_bytes), also emitting one encrypted
    /// parity bit per byte into `parity` (values 0 or 1).
    pub fn xor_bytes_with_parity(&mut self, buf: &mut [u8], parity: &mut [u8]) -> Result<()> {
        if parity.len() != buf.len() {
            return Err(Crypto1Error::InvalidArgument(
                "parity buffer length must match data length",
            ));
        }
        for (b, p) in buf.iter_mut().zip(parity.iter_mut()) {
            let plain = *b;
            *b ^= self.keystream_byte();
            *p = odd_parity8(plain) ^ self.peek_bit();
        }
        Ok(())
    }

    /// As [`xor_bytes_with_parity`](Self::xor_bytes_with_parity), but each
    /// bit of the input buffer (its pre-XOR value) is also fed into the
    /// register. Used where the protocol clocks the transmitted frame back
    /// into the cipher.
    pub fn xor_bytes_with_parity_feedback(
        &mut self,
        buf: &mut [u8],
        parity: &mut [u8],
    ) -> Result<()> {
        if parity.len() != buf.len() {
            return Err(Crypto1Error::InvalidArgument(
                "parity buffer length must match data length",
            ));
        }
        for (b, p) in buf.iter_mut().zip(parity.iter_mut()) {
            let plain = *b;
            *b ^= self.clock_byte(plain, false);
            *p = odd_parity8(plain) ^ self.peek_bit();
        }
        Ok(())
    }

    /// XOR keystream over a raw bit frame in which every 9th bit (indices
    /// 8, 17, 26, …) is a parity bit. Parity bits are encrypted with the
    /// current filter output without clocking; all other bits clock
    /// normally with no input. Bit i lives at `buf[i / 8]`, position
    /// `i % 8`.
    pub fn xor_frame_bits(&mut self, buf: &mut [u8], bit_count: usize) -> Result<()> {
        if bit_count > buf.len() * 8 {
            return Err(Crypto1Error::InvalidArgument(
                "bit count exceeds buffer size",
            ));
        }
        for i in 0..bit_count {
            let ks = if i % 9 == 8 {
                self.peek_bit()
            } else {
                self.keystream_bit()
            };
            buf[i / 8] ^= ks << (i % 8);
        }
        Ok(())
    }

    /// Process the 72-bit reader authentication answer ({nR} {aR} with
    /// interleaved parity). The first 36 bits feed their pre-XOR value
    /// into the register, the rest clock with no input; parity positions
    /// are encrypted without clocking, as in
    /// [`xor_frame_bits`](Self::xor_frame_bits).
    pub fn reader_auth_with_parity(&mut self, frame: &mut [u8; 9]) {
        let pre = *frame;
        for i in 0..72 {
            let ks = if i % 9 == 8 {
                self.peek_bit()
            } else {
                let input = if i < 36 { (pre[i / 8] >> (i % 8)) & 1 } else { 0 };
                self.clock_bit(input, false)
            };
            frame[i / 8] ^= ks << (i % 8);
        }
    }
}
