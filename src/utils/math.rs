//! Checked integer arithmetic for stake accounting.
//!
//! Weight sums and ceilings must never wrap. Every operation here reports
//! overflow explicitly so the caller can decide between rejecting and
//! saturating.

use thiserror::Error;

pub use std::cmp::{max, min};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("overflow")]
    Overflow,
    #[error("underflow")]
    Underflow,
}

pub fn mul64(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

pub fn add64(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

pub fn sub64(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}
