// ============================================================================
// Float Module
// Arbitrary-precision floating point with explicit rounding control
// ============================================================================
//
// This module provides:
// - BigFloat: sign/exponent/mantissa float with unbounded range
// - Class: closed classification of the special values
// - Rounding: per-operation rounding modes
// - Newton kernels for very high precision reciprocal and quotient
//
// Design principles:
// - Precision is an operation parameter, never stored in the value
// - Every arithmetic call reports exactness through a boolean flag
// - Special values are explicit variants, never sentinel bit patterns

mod arith;
pub mod newton;
mod round;
mod value;

pub use round::{Rounding, PREC_EXACT};
pub use value::{BigFloat, Class};
