// src/auth.rs
//
// Authentication-time state mixing. The reader and the tag both fold the
// sector key, the card UID, the card nonce and the reader nonce into the
// register; after `absorb_reader_nonce` both sides hold the same state and
// all further traffic is plain keystream XOR.

use log::debug;

use crate::bits::odd_parity8;
use crate::state::Crypto1State;

fn key_to_u64(key: &[u8; 6]) -> u64 {
    u64::from_be_bytes([0, 0, key[0], key[1], key[2], key[3], key[4], key[5]])
}

impl Crypto1State {
    /// First-authentication setup.
    ///
    /// Loads the key, mixes in `uid ^ nonce` byte by byte and encrypts the
    /// card nonce in place with the keystream produced while mixing. The
    /// returned state is ready for [`absorb_reader_nonce`](Self::absorb_reader_nonce).
    pub fn setup(key: &[u8; 6], uid: &[u8; 4], nonce: &mut [u8; 4]) -> Self {
        let mut state = Self::from_key(key_to_u64(key));
        for i in 0..4 {
            let ks = state.clock_byte(nonce[i] ^ uid[i], false);
            nonce[i] ^= ks;
        }
        debug!("auth setup complete, lfsr={:012x}", state.lfsr());
        state
    }

    /// Nested-authentication setup.
    ///
    /// As [`setup`](Self::setup), but additionally emits the four encrypted
    /// parity bits the tag sends with the nonce. The parity of each
    /// plaintext nonce byte is encrypted with the filter output of the
    /// state after that byte's eight clocks; the same bit then becomes
    /// the first keystream bit of the following byte, which is the parity
    /// leak nested-authentication attacks rely on.
    ///
    /// With `decrypt` set, `nonce` holds ciphertext (reader side): the
    /// register is fed plaintext recovered on the fly and the in-place XOR
    /// decrypts the nonce instead of encrypting it.
    pub fn setup_nested(
        key: &[u8; 6],
        uid: &[u8; 4],
        nonce: &mut [u8; 4],
        parity: &mut [u8; 4],
        decrypt: bool,
    ) -> Self {
        let mut state = Self::from_key(key_to_u64(key));
        for i in 0..4 {
            let ks = state.clock_byte(nonce[i] ^ uid[i], decrypt);
            let plain = if decrypt { nonce[i] ^ ks } else { nonce[i] };
            nonce[i] ^= ks;
            parity[i] = odd_parity8(plain) ^ state.peek_bit();
        }
        debug!("nested auth setup complete, lfsr={:012x}", state.lfsr());
        state
    }

    /// Clock the encrypted reader nonce into the register.
    ///
    /// Runs with the encrypted flag set, so the filter output is folded
    /// into the feedback and the register sees the plaintext nR even
    /// though the input is ciphertext. No output; the only effect is the
    /// 32-position advance.
    pub fn absorb_reader_nonce(&mut self, enc_nr: &[u8; 4]) {
        self.clock_word(u32::from_be_bytes(*enc_nr), true);
        debug!("reader nonce absorbed, lfsr={:012x}", self.lfsr());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_FF: [u8; 6] = [0xFF; 6];
    const UID_1: [u8; 4] = [0xCD, 0x76, 0x91, 0xF6];
    const NT_1: [u8; 4] = [0x4E, 0x63, 0x42, 0xEA];

    const KEY_TRANSPORT: [u8; 6] = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
    const UID_2: [u8; 4] = [0xF4, 0xEA, 0x54, 0x8E];
    const NT_2: [u8; 4] = [0x81, 0xBD, 0x23, 0x75];

    #[test]
    fn setup_encrypts_the_nonce_and_lands_on_the_known_state() {
        let mut nonce = NT_1;
        let state = Crypto1State::setup(&KEY_FF, &UID_1, &mut nonce);
        assert_eq!(nonce, [0xB1, 0x9C, 0x23, 0x4D]);
        assert_eq!(state.lfsr(), 0xFFFF_03B3_C9D3);
    }

    #[test]
    fn setup_keystream_trace() {
        let mut nonce = NT_1;
        let mut state = Crypto1State::setup(&KEY_FF, &UID_1, &mut nonce);
        let trace: Vec<u8> = (0..8).map(|_| state.keystream_byte()).collect();
        assert_eq!(trace, [0xE2, 0xF2, 0xE7, 0xAE, 0xF7, 0xC7, 0x7B, 0xE5]);
    }

    #[test]
    fn all_zero_setup_keystream_is_zero() {
        // the all-zero register is the LFSR fixed point
        let mut nonce = [0u8; 4];
        let mut state = Crypto1State::setup(&[0; 6], &[0; 4], &mut nonce);
        assert_eq!(nonce, [0; 4]);
        for _ in 0..16 {
            assert_eq!(state.keystream_byte(), 0);
        }
    }

    #[test]
    fn nested_setup_emits_encrypted_parity() {
        let mut nonce = NT_2;
        let mut parity = [0u8; 4];
        let state =
            Crypto1State::setup_nested(&KEY_TRANSPORT, &UID_2, &mut nonce, &mut parity, false);
        assert_eq!(nonce, [0xFB, 0xCA, 0xE9, 0x0F]);
        assert_eq!(parity, [0, 1, 0, 0]);
        assert_eq!(state.lfsr(), 0xA4A5_938F_40BB);
    }

    #[test]
    fn nested_setup_decrypt_recovers_the_plain_nonce() {
        let mut nonce = NT_2;
        let mut parity = [0u8; 4];
        let tag =
            Crypto1State::setup_nested(&KEY_TRANSPORT, &UID_2, &mut nonce, &mut parity, false);

        // reader side: same key, ciphertext in, decrypt on
        let mut reader_parity = [0u8; 4];
        let reader = Crypto1State::setup_nested(
            &KEY_TRANSPORT,
            &UID_2,
            &mut nonce,
            &mut reader_parity,
            true,
        );
        assert_eq!(nonce, NT_2);
        assert_eq!(reader_parity, parity);
        assert_eq!(reader, tag);
    }

    #[test]
    fn nested_parity_leaks_the_boundary_filter_outputs() {
        // replay byte by byte and check each parity bit against the filter
        // output at its byte boundary
        let mut nonce = NT_2;
        let mut parity = [0u8; 4];
        Crypto1State::setup_nested(&KEY_TRANSPORT, &UID_2, &mut nonce, &mut parity, false);

        let mut replay = Crypto1State::from_key(0xA0A1_A2A3_A4A5);
        for i in 0..4 {
            replay.clock_byte(NT_2[i] ^ UID_2[i], false);
            assert_eq!(parity[i] ^ odd_parity8(NT_2[i]), replay.peek_bit());
        }
    }

    #[test]
    fn absorbing_the_reader_nonce_advances_to_the_session_state() {
        let mut nonce = NT_1;
        let mut state = Crypto1State::setup(&KEY_FF, &UID_1, &mut nonce);
        state.absorb_reader_nonce(&[0x59, 0xD5, 0x92, 0x0F]);
        assert_eq!(state.lfsr(), 0xC9D3_A547_83C2);
    }
}
