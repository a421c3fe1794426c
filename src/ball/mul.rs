// ============================================================================
// Ball Multiplication
// Enclosure product, used for chaining and round-trip verification
// ============================================================================

use super::value::Ball;
use crate::float::Rounding;
use crate::magnitude::Magnitude;
use crate::tuning::MIN_PREC;

impl Ball {
    /// Rigorous multiplication: the result encloses `u*v` for every `u` in
    /// `self` and `v` in `rhs`.
    ///
    /// The radius bound is `|x|*yrad + |y|*xrad + xrad*yrad` in
    /// upper-rounded magnitude arithmetic, plus the midpoint rounding ulp.
    /// Non-finite operands collapse to indeterminate, which encloses
    /// everything and keeps the poisoning invariant.
    pub fn mul(&self, rhs: &Self, prec: u32) -> Self {
        let prec = prec.max(MIN_PREC);

        if !self.is_finite() || !rhs.is_finite() {
            return Self::indeterminate();
        }

        let (mid, inexact) = self.mid.mul(&rhs.mid, prec, Rounding::Down);
        let xm = Magnitude::from_float_upper(&self.mid);
        let ym = Magnitude::from_float_upper(&rhs.mid);
        let rad = xm
            .mul_upper(&rhs.rad)
            .add_upper(&ym.mul_upper(&self.rad))
            .add_upper(&self.rad.mul_upper(&rhs.rad));
        let rad = if inexact {
            rad.add_upper(&Magnitude::ulp(&mid, prec))
        } else {
            rad
        };
        Self { mid, rad }
    }
}

// ============================================================================
// Tests
// ============================================================================
