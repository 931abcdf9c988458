// tests/mutual_auth.rs
//
// Full mutual-authentication transcript with the tag and the reader both
// driven by this crate: nested-auth nonce decryption, reader nonce
// exchange, the suc64/suc96 answers, and a post-auth encrypted read with
// parity. Pinned hex values guard against regressions in any single step.

use mifare_crypto1::{prng_successor, Crypto1State};

const KEY: [u8; 6] = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
const UID: [u8; 4] = [0xF4, 0xEA, 0x54, 0x8E];
const NT: [u8; 4] = [0x81, 0xBD, 0x23, 0x75];
const NR: [u8; 4] = [0x11, 0x22, 0x33, 0x44];

#[test]
fn tag_and_reader_agree_through_a_full_handshake() {
    // tag encrypts its nonce while mixing it in
    let mut nt_enc = NT;
    let mut tag = Crypto1State::setup(&KEY, &UID, &mut nt_enc);
    assert_eq!(nt_enc, [0xFB, 0xCA, 0xE9, 0x0F]);

    // reader receives the encrypted nonce and decrypts it on the fly
    let mut nt_dec = nt_enc;
    let mut parity = [0u8; 4];
    let mut reader = Crypto1State::setup_nested(&KEY, &UID, &mut nt_dec, &mut parity, true);
    assert_eq!(nt_dec, NT);
    assert_eq!(parity, [0, 1, 0, 0]);
    assert_eq!(reader, tag);

    // reader encrypts its own nonce, feeding the plaintext into the register
    let mut nr_enc = [0u8; 4];
    for i in 0..4 {
        nr_enc[i] = NR[i] ^ reader.clock_byte(NR[i], false);
    }
    assert_eq!(nr_enc, [0xFD, 0x18, 0x09, 0xD0]);

    // tag absorbs the ciphertext and lands on the same state
    tag.absorb_reader_nonce(&nr_enc);
    assert_eq!(tag, reader);

    // reader proves knowledge of the key with aR = suc64(nT)
    let nt_word = u32::from_be_bytes(NT);
    let ar = prng_successor(nt_word, 64);
    assert_eq!(ar, 0x60FA67C4);
    let ar_enc = ar ^ reader.clock_word(0, false);
    assert_eq!(ar_enc, 0xEF80D0DA);
    assert_eq!(ar_enc ^ tag.clock_word(0, false), ar);

    // tag answers with aT = suc96(nT)
    let at = prng_successor(nt_word, 96);
    assert_eq!(at, 0xD103416B);
    let at_enc = at ^ tag.clock_word(0, false);
    assert_eq!(at_enc, 0xB0B86E6A);
    assert_eq!(at_enc ^ reader.clock_word(0, false), at);

    assert_eq!(tag, reader);
    assert_eq!(tag.lfsr(), 0xB35E_C80C_A1A0);

    // session traffic: reader encrypts a command, tag decrypts it
    let command = [0x30, 0x04, 0x26, 0xEE];
    let mut frame = command;
    let mut parity = [0u8; 4];
    reader
        .xor_bytes_with_parity(&mut frame, &mut parity)
        .expect("matching lengths");
    assert_ne!(frame, command);

    let mut tag_parity = [0u8; 4];
    tag.xor_bytes_with_parity(&mut frame, &mut tag_parity)
        .expect("matching lengths");
    assert_eq!(frame, command);
    assert_eq!(tag_parity, parity);
    assert_eq!(tag, reader);
}

#[test]
fn rollback_walks_the_handshake_backwards_to_the_key() {
    // run a first (non-nested) authentication, then undo it from the
    // final state alone, the way key-recovery tools do
    let mut nt_enc = NT;
    let mut state = Crypto1State::setup(&KEY, &UID, &mut nt_enc);
    let enc_nr = [0x5A, 0xC3, 0x99, 0x10];
    state.absorb_reader_nonce(&enc_nr);

    state.rollback_word(u32::from_be_bytes(enc_nr), true);
    let mut mixed = 0u32;
    for i in 0..4 {
        mixed = (mixed << 8) | (NT[i] ^ UID[i]) as u32;
    }
    state.rollback_word(mixed, false);

    let key = u64::from_be_bytes([0, 0, KEY[0], KEY[1], KEY[2], KEY[3], KEY[4], KEY[5]]);
    assert_eq!(state.lfsr(), key);
}
