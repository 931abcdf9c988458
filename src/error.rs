// src/error.rs
use thiserror::Error;

/// Errors produced by the cipher engine.
///
/// The cipher itself has no runtime failure modes; every operation over
/// fixed-width integers and fixed-length arrays is infallible. Only the
/// slice-based bulk operations can be called with mismatched buffer
/// lengths, which is a caller bug and is rejected rather than recovered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Crypto1Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, Crypto1Error>;
