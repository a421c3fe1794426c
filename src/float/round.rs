// ============================================================================
// Rounding
// Rounding modes and the shared mantissa-rounding core
// ============================================================================

use super::value::BigFloat;
use num_bigint::BigUint;
use num_traits::One;
use std::cmp::Ordering;

/// Precision sentinel requesting an exact (unrounded) result.
///
/// Valid for addition, subtraction and multiplication, whose exact results
/// are finitely representable. Division ignores it.
pub const PREC_EXACT: u32 = u32::MAX;

/// Rounding mode for float operations.
///
/// `Down`/`Up` are magnitude-directed (toward/away from zero);
/// `Floor`/`Ceil` are value-directed (toward -Inf/+Inf); `Nearest` breaks
/// ties to even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Toward zero.
    Down,
    /// Away from zero.
    Up,
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
    /// To nearest, ties to even.
    Nearest,
}

/// Round `(-1)^negative * mantissa * 2^exponent` to `prec` significant bits.
///
/// Returns the rounded float and the inexact flag (true iff the exact value
/// differs from the returned one). The mantissa need not be normalized.
pub(crate) fn round_finite(
    negative: bool,
    mantissa: BigUint,
    exponent: i64,
    prec: u32,
    rnd: Rounding,
) -> (BigFloat, bool) {
    use num_traits::Zero;

    if mantissa.is_zero() {
        return (BigFloat::zero(), false);
    }

    // canonicalize to an odd mantissa before measuring significant bits
    let tz = mantissa.trailing_zeros().unwrap_or(0);
    let (mantissa, exponent) = if tz > 0 {
        (&mantissa >> tz, checked_exp(exponent as i128 + tz as i128))
    } else {
        (mantissa, exponent)
    };

    let bits = mantissa.bits();
    if prec == PREC_EXACT || bits <= prec as u64 {
        return (
            BigFloat::from_odd_parts(negative, mantissa, exponent),
            false,
        );
    }

    let shift = bits - prec as u64;
    let dropped = &mantissa & &((BigUint::one() << shift) - 1u32);
    let mut kept = &mantissa >> shift;
    let exponent = checked_exp(exponent as i128 + shift as i128);

    // the mantissa is odd here, so the dropped bits are never all zero
    let increment = match rnd {
        Rounding::Down => false,
        Rounding::Up => true,
        Rounding::Floor => negative,
        Rounding::Ceil => !negative,
        Rounding::Nearest => {
            let half = BigUint::one() << (shift - 1);
            match dropped.cmp(&half) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => kept.bit(0),
            }
        }
    };
    if increment {
        kept += 1u32;
    }

    // an increment can carry into prec + 1 bits; the carry result is even
    // and renormalizes back down inside from_parts
    (BigFloat::from_parts(negative, kept, exponent), true)
}

/// Exponent arithmetic helper; overflowing i64 here is a kernel defect.
#[inline]
pub(crate) fn checked_exp(e: i128) -> i64 {
    i64::try_from(e).expect("float exponent overflow")
}
