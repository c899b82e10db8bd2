//! Shared types for the curve sale program
//!
//! Error taxonomy, fixed-point math, instruction byte helpers and the
//! address/time primitives used by the sale program and the keeper.

pub mod types;
pub mod math;
pub mod error;
pub mod instruction;

pub use types::*;
pub use math::*;
pub use error::*;
pub use instruction::*;
