// ============================================================================
// Ball Arithmetic Library
// Rigorous arbitrary-precision enclosures with correctly rounded division
// ============================================================================

//! # Ball Arithmetic
//!
//! A rigorous arbitrary-precision numeric kernel. Real numbers are
//! represented as balls: an arbitrary-precision floating midpoint plus a
//! separately tracked, always-conservative error radius. Arithmetic
//! guarantees that the returned interval encloses the true mathematical
//! result at any requested working precision.
//!
//! ## Features
//!
//! - **Correctly rounded floats** with explicit per-operation precision
//!   and rounding mode, and an inexact flag instead of silent error
//! - **One-sided magnitude bounds** with separate upper- and lower-rounding
//!   operation families, so radius arithmetic can never understate
//! - **Strategy-dispatched division**: exact-divisor fast path,
//!   wide-interval fallback, and Newton/Karp-Markstein acceleration at
//!   very high precision
//! - **Infectious indeterminate state** replacing exceptions: degenerate
//!   inputs produce a well-defined "anything" ball that poisons downstream
//!   results
//!
//! ## Example
//!
//! ```rust
//! use ball_arithmetic::prelude::*;
//!
//! // 1/3 is not exactly representable: the enclosure carries the error
//! let x = Ball::one();
//! let y = Ball::from_i64(3);
//! let z = x.div(&y, 128);
//! assert!(!z.is_exact());
//!
//! // the true value never escapes, at any precision
//! let fine = x.div(&y, 4096);
//! assert!(z.overlaps(&fine));
//!
//! // dividing by an interval containing zero is indeterminate, and the
//! // indeterminate state poisons everything that consumes it
//! let bad = x.div(&Ball::zero(), 128);
//! assert!(bad.is_indeterminate());
//! assert!(bad.mul(&y, 128).is_indeterminate());
//! ```

pub mod ball;
pub mod float;
pub mod magnitude;
pub mod tuning;

// Re-exports for convenience
pub mod prelude {
    pub use crate::ball::Ball;
    pub use crate::float::{BigFloat, Class, Rounding, PREC_EXACT};
    pub use crate::magnitude::Magnitude;
}
