//! CRYPTO1 stream cipher engine used by Mifare Classic cards.
//!
//! This is a Rust implementation of the cipher core found in the Proxmark3
//! and Chameleon firmware families: the 48-bit nonlinear-filtered LFSR, the
//! 16-bit tag PRNG, the authentication mixing steps, bulk traffic
//! encryption with the encrypted parity quirk, and the rollback primitives
//! that offline key-recovery tools are built on.
//!
//! Everything operates on caller-owned [`Crypto1State`] values; there is no
//! global state and no I/O. RFID framing, CRC handling and reader hardware
//! live elsewhere and only call into this crate.

// Export modules
pub mod auth;
pub mod bits;
pub mod error;
pub mod filter;
pub mod prng;
pub mod rollback;
pub mod state;
pub mod stream;

pub use error::{Crypto1Error, Result};
pub use filter::{filter, LF_POLY_EVEN, LF_POLY_ODD};
pub use prng::{prng_successor, valid_nonces, ValidNonces};
pub use state::{Crypto1State, SplitState, LFSR_MASK_EVEN, LFSR_MASK_ODD};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
