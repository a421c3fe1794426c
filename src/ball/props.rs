//! Property-based tests using `proptest` for the enclosure invariants.
//!
//! Covers the load-bearing properties of division:
//!
//! 1. **Soundness**: the midpoint quotient always lies in the enclosure
//!    when the divisor interval excludes zero.
//! 2. **Monotonic refinement**: higher precision never moves the result
//!    to a disjoint region.
//! 3. **Round-trip exactness**: `(x*y)/y` recovers `x` when the product
//!    was exact.
//! 4. **Determinism**: same inputs and precision, same output.
//! 5. **Magnitude bracketing**: the upper family dominates the lower
//!    family on every operation pair.

use proptest::prelude::*;

use super::value::Ball;
use crate::float::{BigFloat, Rounding};
use crate::magnitude::Magnitude;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Finite nonzero floats over a healthy exponent range.
fn nonzero_float() -> impl Strategy<Value = BigFloat> {
    (any::<bool>(), 1u64..=u64::MAX, -60i64..=60)
        .prop_map(|(neg, m, e)| BigFloat::from_mantissa_exponent(neg, m, e))
}

/// Small radii so operands stay reasonably accurate.
fn small_radius() -> impl Strategy<Value = Magnitude> {
    prop_oneof![
        Just(Magnitude::ZERO),
        (-120i64..=-80).prop_map(Magnitude::pow2),
    ]
}

fn accurate_ball() -> impl Strategy<Value = Ball> {
    (nonzero_float(), small_radius()).prop_map(|(mid, rad)| Ball::with_radius(mid, rad))
}

/// A reference ball for the midpoint quotient: computed at much higher
/// precision, with a one-ulp radius when inexact.
fn reference_quotient(x: &Ball, y: &Ball) -> Ball {
    let (q, inexact) = x.midpoint().div(y.midpoint(), 512, Rounding::Down);
    let rad = if inexact {
        Magnitude::ulp(&q, 512)
    } else {
        Magnitude::ZERO
    };
    Ball::with_radius(q, rad)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_division_soundness(x in accurate_ball(), y in accurate_ball(), prec in 8u32..256) {
        prop_assume!(!y.contains_zero());
        let z = x.div(&y, prec);
        prop_assert!(!z.is_indeterminate());
        prop_assert!(
            z.contains(&reference_quotient(&x, &y)),
            "mid(x)/mid(y) escaped the enclosure"
        );
    }

    #[test]
    fn prop_monotonic_refinement(x in accurate_ball(), y in accurate_ball(), p1 in 8u32..128) {
        prop_assume!(!y.contains_zero());
        let p2 = p1 * 2;
        let coarse = x.div(&y, p1);
        let fine = x.div(&y, p2);
        prop_assert!(coarse.overlaps(&fine));
        // the finer radius never exceeds the coarser one by more than the
        // inputs' own width allows; at minimum the two results agree on
        // the reference point
        let reference = reference_quotient(&x, &y);
        prop_assert!(coarse.contains(&reference));
        prop_assert!(fine.contains(&reference));
    }

    #[test]
    fn prop_round_trip(x in -1000i64..1000, y in -1000i64..1000, prec in 64u32..256) {
        prop_assume!(y != 0);
        let xb = Ball::from_i64(x);
        let yb = Ball::from_i64(y);
        let product = xb.mul(&yb, prec);
        prop_assume!(product.is_exact());
        let back = product.div(&yb, prec);
        prop_assert!(back.is_exact());
        prop_assert_eq!(back, xb);
    }

    #[test]
    fn prop_determinism(x in accurate_ball(), y in accurate_ball(), prec in 8u32..256) {
        let a = x.div(&y, prec);
        let b = x.div(&y, prec);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_indeterminate_poisons_chains(x in accurate_ball(), prec in 8u32..128) {
        let poisoned = x.div(&Ball::zero(), prec);
        prop_assert!(poisoned.is_indeterminate());
        prop_assert!(poisoned.div(&x, prec).is_indeterminate());
        prop_assert!(x.mul(&poisoned, prec).is_indeterminate());
    }

    #[test]
    fn prop_magnitude_families_bracket(a in 1u64..=u64::MAX, b in 1u64..=u64::MAX) {
        let ma = Magnitude::from_u64(a);
        let mb = Magnitude::from_u64(b);
        prop_assert!(ma.mul_lower(&mb) <= ma.mul_upper(&mb));
        prop_assert!(ma.div_lower(&mb) <= ma.div_upper(&mb));
        prop_assert!(ma.sub_lower(&mb) <= ma.sub_upper(&mb));
    }

    #[test]
    fn prop_division_scales_with_exponent(
        x in accurate_ball(),
        y in accurate_ball(),
        shift in -40i64..=40,
        prec in 16u32..128,
    ) {
        // (x*2^s)/y and x/y differ by exactly a power of two; enclosures
        // must agree after shifting back
        prop_assume!(!y.contains_zero());
        let z = x.div(&y, prec);
        let shifted = Ball::with_radius(x.midpoint().mul_pow2(shift), *x.radius());
        let zs = shifted.div(&y, prec);
        prop_assert!(!zs.is_indeterminate());
        let reference = reference_quotient(&x, &y);
        let shifted_reference = Ball::with_radius(
            reference.midpoint().mul_pow2(shift),
            *reference.radius(),
        );
        prop_assert!(zs.overlaps(&shifted_reference));
        prop_assert!(z.overlaps(&reference));
    }
}
