// ============================================================================
// Ball Value
// The enclosure type: classification, accuracy, intervals, containment
// ============================================================================

use crate::float::{BigFloat, Rounding, PREC_EXACT};
use crate::magnitude::Magnitude;
use crate::tuning::NORMAL_EXP_LIMIT;
use std::cmp::Ordering;
use std::fmt;

/// A real number enclosure: the closed interval `[mid - rad, mid + rad]`.
///
/// The composability invariant: at every step of every computation chain
/// the interval contains the true mathematical value being approximated.
/// Radii may grow (wide results are legal), but the true value never
/// escapes (unsound results are not).
///
/// The distinguished indeterminate ball (NaN midpoint, infinite radius)
/// means "value unknown, possibly anything" and propagates through all
/// arithmetic that consumes it. Callers detect failure by classifying the
/// final result, never by catching anything mid-computation.
///
/// Precision is a parameter of each operation, not part of the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Ball {
    pub(crate) mid: BigFloat,
    pub(crate) rad: Magnitude,
}

impl Ball {
    // ========================================================================
    // Construction
    // ========================================================================

    /// The exact zero ball.
    #[inline]
    pub fn zero() -> Self {
        Self::exact(BigFloat::zero())
    }

    /// The exact one ball.
    #[inline]
    pub fn one() -> Self {
        Self::from_i64(1)
    }

    /// A zero-radius ball around a float.
    #[inline]
    pub fn exact(mid: BigFloat) -> Self {
        Self {
            mid,
            rad: Magnitude::ZERO,
        }
    }

    /// A zero-radius ball around an integer.
    #[inline]
    pub fn from_i64(value: i64) -> Self {
        Self::exact(BigFloat::from_i64(value))
    }

    /// A ball with the given midpoint and radius.
    #[inline]
    pub fn with_radius(mid: BigFloat, rad: Magnitude) -> Self {
        Self { mid, rad }
    }

    /// The indeterminate ball: value unknown, possibly anything.
    #[inline]
    pub fn indeterminate() -> Self {
        Self {
            mid: BigFloat::nan(),
            rad: Magnitude::INF,
        }
    }

    /// The whole real line: `[0 +/- inf]`.
    #[inline]
    pub fn zero_pm_inf() -> Self {
        Self {
            mid: BigFloat::zero(),
            rad: Magnitude::INF,
        }
    }

    // ========================================================================
    // Accessors and classification
    // ========================================================================

    #[inline]
    pub fn midpoint(&self) -> &BigFloat {
        &self.mid
    }

    #[inline]
    pub fn radius(&self) -> &Magnitude {
        &self.rad
    }

    /// Zero-radius ball: the midpoint is the exact value.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// Finite midpoint and finite radius.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.mid.is_finite() && self.rad.is_finite()
    }

    /// The poisoning "value unknown" state (NaN midpoint).
    #[inline]
    pub fn is_indeterminate(&self) -> bool {
        self.mid.is_nan()
    }

    /// Whether the interval contains zero (as an interior or boundary
    /// point). Indeterminate contains everything.
    pub fn contains_zero(&self) -> bool {
        if self.mid.is_nan() {
            return true;
        }
        self.mid.cmpabs_mag(&self.rad) != Ordering::Greater
    }

    /// How many leading bits of the midpoint are still meaningful given
    /// the radius: the exponent gap between midpoint and radius.
    ///
    /// `i64::MAX` for exact balls, `i64::MIN` when no bit of the midpoint
    /// is trustworthy (indeterminate, infinite radius, special midpoint
    /// with nonzero radius).
    pub fn rel_accuracy_bits(&self) -> i64 {
        if self.rad.is_zero() {
            return i64::MAX;
        }
        if self.mid.is_special() || self.rad.is_inf() {
            return i64::MIN;
        }
        self.mid
            .top_exponent()
            .saturating_sub(self.rad.top_exponent())
    }

    /// Finite, nonzero midpoint, and every exponent in a normal range:
    /// the precondition for the fast division path's radius shortcut.
    pub(crate) fn is_well_conditioned(&self) -> bool {
        if !self.is_finite() || self.mid.is_zero() {
            return false;
        }
        if self.mid.top_exponent().abs() >= NORMAL_EXP_LIMIT {
            return false;
        }
        self.rad.is_zero() || self.rad.top_exponent().abs() < NORMAL_EXP_LIMIT
    }

    // ========================================================================
    // Magnitude extraction
    // ========================================================================

    /// Upper bound on `|x|` over the whole interval.
    pub fn mag_upper(&self) -> Magnitude {
        Magnitude::from_float_upper(&self.mid).add_upper(&self.rad)
    }

    /// Lower bound on `|x|` over the whole interval; zero when the
    /// interval contains or touches zero.
    pub fn mag_lower(&self) -> Magnitude {
        if self.mid.is_nan() {
            return Magnitude::ZERO;
        }
        Magnitude::from_float_lower(&self.mid).sub_lower(&self.rad)
    }

    // ========================================================================
    // Structural operations
    // ========================================================================

    /// Negation; exact.
    pub fn neg(&self) -> Self {
        Self {
            mid: self.mid.neg(),
            rad: self.rad,
        }
    }

    /// Round the midpoint to `prec` bits, folding the rounding error into
    /// the radius.
    pub fn set_round(&self, prec: u32) -> Self {
        let (mid, inexact) = self.mid.set_round(prec, Rounding::Down);
        let rad = if inexact {
            self.rad.add_upper(&Magnitude::ulp(&mid, prec))
        } else {
            self.rad
        };
        Self { mid, rad }
    }

    // ========================================================================
    // Interval constructors
    // ========================================================================

    /// The ball enclosing `[a, b]` for magnitude bounds `0 <= a <= b`.
    pub fn from_interval_mag(a: &Magnitude, b: &Magnitude, prec: u32) -> Self {
        debug_assert!(a <= b, "interval endpoints out of order");
        if a.is_inf() {
            return Self::exact(BigFloat::pos_inf());
        }
        if b.is_inf() {
            return Self::zero_pm_inf();
        }
        let af = a.to_float();
        let bf = b.to_float();
        let (sum, _) = af.add(&bf, PREC_EXACT, Rounding::Down);
        let (mid, inexact) = sum.mul_pow2(-1).set_round(prec, Rounding::Down);
        let (diff, _) = bf.sub(&af, PREC_EXACT, Rounding::Down);
        let half_width = Magnitude::from_float_upper(&diff.mul_pow2(-1));
        let rad = if inexact {
            half_width.add_upper(&Magnitude::ulp(&mid, prec))
        } else {
            half_width
        };
        Self { mid, rad }
    }

    /// The ball enclosing `[-a, b]` for magnitude bounds `a, b >= 0`.
    pub fn from_interval_neg_pos_mag(a: &Magnitude, b: &Magnitude, prec: u32) -> Self {
        if a.is_inf() || b.is_inf() {
            return Self::zero_pm_inf();
        }
        let af = a.to_float();
        let bf = b.to_float();
        let (diff, _) = bf.sub(&af, PREC_EXACT, Rounding::Down);
        let (mid, inexact) = diff.mul_pow2(-1).set_round(prec, Rounding::Down);
        let (sum, _) = af.add(&bf, PREC_EXACT, Rounding::Down);
        let half_width = Magnitude::from_float_upper(&sum.mul_pow2(-1));
        let rad = if inexact {
            half_width.add_upper(&Magnitude::ulp(&mid, prec))
        } else {
            half_width
        };
        Self { mid, rad }
    }

    // ========================================================================
    // Containment and overlap (exact predicates)
    // ========================================================================

    /// Whether the interval contains the float `f`.
    pub fn contains_float(&self, f: &BigFloat) -> bool {
        if self.is_indeterminate() {
            return true;
        }
        if f.is_nan() {
            return false;
        }
        if self.rad.is_inf() {
            return true;
        }
        if self.mid.is_inf() || f.is_inf() {
            return self.mid == *f;
        }
        let (diff, _) = self.mid.sub(f, PREC_EXACT, Rounding::Down);
        diff.cmpabs(&self.rad.to_float()) != Ordering::Greater
    }

    /// Whether every point of `other` lies in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        if self.is_indeterminate() {
            return true;
        }
        if other.is_indeterminate() {
            return false;
        }
        if other.rad.is_inf() {
            return self.rad.is_inf();
        }
        if other.mid.is_inf() {
            return self.contains_float(&other.mid);
        }
        if self.rad.is_inf() {
            return true;
        }
        if self.mid.is_inf() {
            return false;
        }
        // |mid(self) - mid(other)| + rad(other) <= rad(self), exactly
        let (diff, _) = self.mid.sub(&other.mid, PREC_EXACT, Rounding::Down);
        let (lhs, _) = diff
            .abs()
            .add(&other.rad.to_float(), PREC_EXACT, Rounding::Down);
        lhs.cmp_value(&self.rad.to_float()) != Ordering::Greater
    }

    /// Whether the two intervals share at least one point.
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_indeterminate() || other.is_indeterminate() {
            return true;
        }
        if self.mid.is_inf() && self.rad.is_finite() {
            return other.contains_float(&self.mid);
        }
        if other.mid.is_inf() && other.rad.is_finite() {
            return self.contains_float(&other.mid);
        }
        if self.rad.is_inf() || other.rad.is_inf() {
            return true;
        }
        // |mid(self) - mid(other)| <= rad(self) + rad(other), exactly
        let (diff, _) = self.mid.sub(&other.mid, PREC_EXACT, Rounding::Down);
        let (rhs, _) = self
            .rad
            .to_float()
            .add(&other.rad.to_float(), PREC_EXACT, Rounding::Down);
        diff.abs().cmp_value(&rhs) != Ordering::Greater
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Debug for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ball[{:?} +/- {:?}]", self.mid, self.rad)
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} +/- {}]", self.mid, self.rad)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ball() {
        let b = Ball::from_i64(5);
        assert!(b.is_exact());
        assert!(b.is_finite());
        assert!(!b.is_indeterminate());
        assert!(!b.contains_zero());
        assert_eq!(b.rel_accuracy_bits(), i64::MAX);
    }

    #[test]
    fn test_indeterminate_classification() {
        let b = Ball::indeterminate();
        assert!(b.is_indeterminate());
        assert!(!b.is_finite());
        assert!(b.contains_zero());
        assert_eq!(b.rel_accuracy_bits(), i64::MIN);
        assert!(b.contains_float(&BigFloat::from_i64(42)));
        assert!(b.contains(&Ball::from_i64(-7)));
    }

    #[test]
    fn test_contains_zero_boundary() {
        // [3 +/- 3] touches zero
        let b = Ball::with_radius(BigFloat::from_i64(3), Magnitude::from_u64(3));
        assert!(b.contains_zero());
        // [3 +/- 2] does not
        let b = Ball::with_radius(BigFloat::from_i64(3), Magnitude::from_u64(2));
        assert!(!b.contains_zero());
    }

    #[test]
    fn test_rel_accuracy() {
        // midpoint near 2^10, radius near 2^-10: about 20 good bits
        let b = Ball::with_radius(BigFloat::from_i64(1024), Magnitude::pow2(-10));
        assert_eq!(b.rel_accuracy_bits(), 11 - (-9));
        let wide = Ball::with_radius(BigFloat::from_i64(1), Magnitude::INF);
        assert_eq!(wide.rel_accuracy_bits(), i64::MIN);
    }

    #[test]
    fn test_mag_bounds() {
        let b = Ball::with_radius(BigFloat::from_i64(10), Magnitude::from_u64(2));
        // |x| over [8, 12]
        assert!(b.mag_lower() <= Magnitude::from_u64(8));
        assert!(b.mag_upper() >= Magnitude::from_u64(12));

        let straddle = Ball::with_radius(BigFloat::from_i64(1), Magnitude::from_u64(5));
        assert!(straddle.mag_lower().is_zero());
    }

    #[test]
    fn test_set_round_folds_error() {
        let b = Ball::from_i64(11);
        let r = b.set_round(3);
        assert!(!r.is_exact());
        assert!(r.contains_float(&BigFloat::from_i64(11)));

        // an exactly representable midpoint stays exact
        let b = Ball::from_i64(8);
        assert!(b.set_round(3).is_exact());
    }

    #[test]
    fn test_interval_constructors() {
        let a = Magnitude::from_u64(2);
        let b = Magnitude::from_u64(6);
        let ball = Ball::from_interval_mag(&a, &b, 64);
        assert!(ball.contains_float(&BigFloat::from_i64(2)));
        assert!(ball.contains_float(&BigFloat::from_i64(4)));
        assert!(ball.contains_float(&BigFloat::from_i64(6)));
        assert!(!ball.contains_float(&BigFloat::from_i64(7)));

        let ball = Ball::from_interval_neg_pos_mag(&a, &b, 64);
        assert!(ball.contains_float(&BigFloat::from_i64(-2)));
        assert!(ball.contains_float(&BigFloat::zero()));
        assert!(ball.contains_float(&BigFloat::from_i64(6)));
        assert!(!ball.contains_float(&BigFloat::from_i64(-3)));
    }

    #[test]
    fn test_interval_constructor_low_precision() {
        // the midpoint rounds; the enclosure must still cover both ends
        let a = Magnitude::from_u64(1);
        let b = Magnitude::from_u64(1000);
        let ball = Ball::from_interval_mag(&a, &b, 4);
        assert!(ball.contains_float(&BigFloat::from_i64(1)));
        assert!(ball.contains_float(&BigFloat::from_i64(1000)));
    }

    #[test]
    fn test_contains_and_overlaps() {
        let outer = Ball::with_radius(BigFloat::from_i64(0), Magnitude::from_u64(10));
        let inner = Ball::with_radius(BigFloat::from_i64(3), Magnitude::from_u64(2));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));

        let left = Ball::with_radius(BigFloat::from_i64(-5), Magnitude::from_u64(2));
        let right = Ball::with_radius(BigFloat::from_i64(5), Magnitude::from_u64(2));
        assert!(!left.overlaps(&right));
        // touching endpoints do overlap
        let touch = Ball::with_radius(BigFloat::from_i64(-1), Magnitude::from_u64(2));
        let other = Ball::with_radius(BigFloat::from_i64(3), Magnitude::from_u64(2));
        assert!(touch.overlaps(&other));
    }

    #[test]
    fn test_neg() {
        let b = Ball::with_radius(BigFloat::from_i64(3), Magnitude::from_u64(1));
        let n = b.neg();
        assert!(n.contains_float(&BigFloat::from_i64(-3)));
        assert!(n.contains_float(&BigFloat::from_i64(-4)));
        assert!(!n.contains_float(&BigFloat::from_i64(3)));
    }

    #[test]
    fn test_well_conditioned() {
        assert!(Ball::from_i64(5).is_well_conditioned());
        assert!(!Ball::zero().is_well_conditioned());
        assert!(!Ball::indeterminate().is_well_conditioned());
        assert!(!Ball::zero_pm_inf().is_well_conditioned());
        let huge = Ball::exact(BigFloat::from_i64(1).mul_pow2(NORMAL_EXP_LIMIT + 1));
        assert!(!huge.is_well_conditioned());
    }

    #[test]
    fn test_display() {
        assert_eq!(Ball::from_i64(3).to_string(), "[3 +/- 0]");
        assert_eq!(Ball::indeterminate().to_string(), "[nan +/- inf]");
    }
}
