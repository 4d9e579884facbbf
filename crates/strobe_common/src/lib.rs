//! Shared foundational types used across the strobe pattern generator.
//!
//! This crate provides content hashing for pattern comparison, pin direction
//! capabilities, and the bit-width arithmetic every pin value goes through.

#![warn(missing_docs)]

pub mod direction;
pub mod hash;
pub mod width;

pub use direction::PinDirection;
pub use hash::ContentHash;
pub use width::{fits_width, mask, MAX_PIN_WIDTH};
