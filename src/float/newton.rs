// ============================================================================
// Newton Kernels
// Recursive-doubling reciprocal and Karp-Markstein quotient
// ============================================================================

//! High-precision division accelerators.
//!
//! Both kernels work purely on floats and leave every soundness question to
//! the caller: the ball layer computes its radius from the exact-division
//! linearization and only routes the midpoint through these functions. The
//! guard-bit budget guarantees the midpoint lands within one ulp at
//! `prec + GUARD_BITS / 2`, which is the error term the ball layer adds.

use super::{BigFloat, Rounding};
use crate::tuning::{GUARD_BITS, INV_NEWTON_CUTOFF};

/// Reciprocal `1/x` accurate to strictly more than `prec + GUARD_BITS / 2`
/// bits, for finite nonzero `x`.
///
/// Below [`INV_NEWTON_CUTOFF`] this is a direct division. Above it, the
/// reciprocal is computed at half precision and refined with one Newton
/// step `r - r*(x*r - 1)`, so the recursion depth is logarithmic in the
/// precision and the total cost is dominated by the top-level
/// multiplications.
pub fn reciprocal_newton(x: &BigFloat, prec: u32) -> BigFloat {
    debug_assert!(!x.is_special(), "reciprocal of a special value");
    let wp = prec + GUARD_BITS;
    let hp = prec / 2 + GUARD_BITS;

    if prec < INV_NEWTON_CUTOFF {
        let (xr, _) = x.set_round(wp, Rounding::Down);
        return BigFloat::one().div(&xr, wp, Rounding::Down).0;
    }

    tracing::trace!(prec, "newton reciprocal refinement");
    let r = reciprocal_newton(x, hp);

    // r - r*(x*r - 1), with the long products at wp and the small
    // correction terms at hp
    let t = if x.bits() <= wp as u64 {
        x.mul(&r, wp, Rounding::Down).0
    } else {
        let (xr, _) = x.set_round(wp, Rounding::Down);
        xr.mul(&r, wp, Rounding::Down).0
    };
    let (t, _) = t.sub(&BigFloat::one(), hp, Rounding::Down);
    let (t, _) = t.mul(&r, hp, Rounding::Down);
    r.sub(&t, wp, Rounding::Down).0
}

/// Quotient `x/y` accurate to strictly more than `prec + GUARD_BITS / 2`
/// bits, for finite nonzero operands.
///
/// Karp-Markstein: a half-precision reciprocal of `y` and a half-precision
/// quotient estimate are lifted to full accuracy by a single correction
/// `q + (x - y*q)*recip`, costing one full-precision multiplication instead
/// of the two a full reciprocal would need.
pub fn div_newton(x: &BigFloat, y: &BigFloat, prec: u32) -> BigFloat {
    debug_assert!(!x.is_special() && !y.is_special(), "newton division of a special value");
    let wp = prec + GUARD_BITS;
    let hp = prec / 2 + GUARD_BITS;

    let recip = reciprocal_newton(y, hp);
    let (xh, _) = x.set_round(hp, Rounding::Down);
    let (q, _) = recip.mul(&xh, hp, Rounding::Down);
    let (t, _) = y.mul(&q, wp, Rounding::Down);
    let (t, _) = x.sub(&t, hp, Rounding::Down);
    let (t, _) = t.mul(&recip, hp, Rounding::Down);
    q.add(&t, wp, Rounding::Down).0
}

// ============================================================================
// Tests
// ============================================================================
