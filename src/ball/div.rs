// ============================================================================
// Ball Division
// Strategy dispatch: exact-divisor, wide-interval, fast and Newton paths
// ============================================================================

use super::value::Ball;
use crate::float::{newton, BigFloat, Rounding};
use crate::magnitude::{Magnitude, ONE_PLUS_EPS, MAG_BITS};
use crate::tuning::{want_newton, GUARD_BITS, MIN_PREC, WIDE_ACCURACY_CUTOFF};
use std::cmp::Ordering;

/// Accuracy-guided precision reduction: there is no point computing
/// midpoint digits the error bars render meaningless.
fn reduced_prec(x: &Ball, y: &Ball, prec: u32) -> (i64, u32) {
    let acc = x.rel_accuracy_bits().min(y.rel_accuracy_bits());
    let acc = acc.clamp(0, prec as i64);
    let wprec = (prec as i64).min(acc + MAG_BITS as i64).max(MIN_PREC as i64) as u32;
    (acc, wprec)
}

impl Ball {
    /// Rigorous division: the result encloses `u/v` for every `u` in
    /// `self` and `v` in `rhs`.
    ///
    /// The dispatcher classifies the operands and picks a strategy:
    /// an exact (zero-radius) divisor delegates to [`Ball::div_float`];
    /// a divisor interval containing zero yields indeterminate; operands
    /// with too little relative accuracy go through the wide-interval
    /// fallback; well-conditioned operands take a single float division
    /// plus a magnitude-arithmetic radius bound; and at very high
    /// precision the midpoint routes through the Newton kernels.
    pub fn div(&self, rhs: &Self, prec: u32) -> Self {
        let prec = prec.max(MIN_PREC);

        if rhs.rad.is_zero() {
            return self.div_float(&rhs.mid, prec);
        }
        if rhs.mid.is_zero() {
            // the divisor interval has zero as an interior point
            return Self::indeterminate();
        }
        if self.mid.is_zero() && rhs.is_finite() {
            return self.div_wide(rhs, prec);
        }

        if self.is_well_conditioned() && rhs.is_well_conditioned() {
            let (acc, wprec) = reduced_prec(self, rhs, prec);

            if acc <= WIDE_ACCURACY_CUTOFF {
                tracing::debug!(acc, "ball division: wide fallback");
                return self.div_wide(rhs, wprec);
            }
            if want_newton(wprec, self.mid.bits(), rhs.mid.bits()) {
                tracing::debug!(wprec, "ball division: newton midpoint");
                return self.div_newton(rhs, wprec);
            }

            // Fast path. The exact linearization is
            //     (x*yrad + y*xrad) / (y*(y - yrad))
            //  <= (1+eps) (x*yrad + y*xrad) / y^2
            //  <= (1+eps) ((x/y)*yrad + xrad) / y
            // and the (1+eps) slop also covers the rounding of the bound
            // computation itself.
            let t = Magnitude::from_float_lower(&rhs.mid);
            let (mid, inexact) = self.mid.div(&rhs.mid, wprec, Rounding::Down);
            let u = Magnitude::from_float_upper(&mid);
            let v = self.rad.add_mul_upper(&rhs.rad, &u);
            let mut rad = v.div_upper(&t).mul_upper(&ONE_PLUS_EPS);
            if inexact {
                rad = rad.add_upper(&Magnitude::ulp(&mid, wprec));
            }
            return Self { mid, rad };
        }

        if !rhs.is_finite() {
            // finite / inf-ball = 0
            if rhs.mid.is_inf() && rhs.rad.is_finite() && self.is_finite() {
                return Self::zero();
            }
            return Self::indeterminate();
        }
        if !self.is_finite() {
            if rhs.contains_zero() || self.mid.is_nan() {
                return Self::indeterminate();
            }
            if self.mid.is_inf() && self.rad.is_finite() {
                // +/-inf / finite nonzero = +/-inf, exactly
                let (mid, _) = self.mid.div(&rhs.mid, prec, Rounding::Down);
                return Self::exact(mid);
            }
            if self.rad.is_inf() {
                return Self::zero_pm_inf();
            }
            return Self::indeterminate();
        }

        // both finite but badly scaled or inaccurate
        let (acc, wprec) = reduced_prec(self, rhs, prec);
        if acc <= WIDE_ACCURACY_CUTOFF {
            return self.div_wide(rhs, wprec);
        }

        // full radius bound: (|x|*yrad + |y|*xrad) / (|y|*(|y| - yrad))
        let xm = Magnitude::from_float_upper(&self.mid);
        let ym = Magnitude::from_float_upper(&rhs.mid);
        let zr = xm
            .mul_upper(&rhs.rad)
            .add_upper(&ym.mul_upper(&self.rad));
        let yw = rhs.mag_lower();
        let yl = Magnitude::from_float_lower(&rhs.mid).mul_lower(&yw);
        let zr = zr.div_upper(&yl);

        let (mid, inexact) = self.mid.div(&rhs.mid, wprec, Rounding::Down);
        let rad = if inexact {
            zr.add_upper(&Magnitude::ulp(&mid, wprec))
        } else {
            zr
        };
        Self { mid, rad }
    }

    /// Division by an exact float divisor.
    ///
    /// The divisor contributes no radius term, so the output radius is the
    /// input radius scaled by a lower bound of `|f|`, plus the midpoint
    /// rounding ulp.
    pub fn div_float(&self, f: &BigFloat, prec: u32) -> Self {
        let prec = prec.max(MIN_PREC);

        if f.is_special() || !self.is_finite() {
            return if self.mid.is_inf() && self.rad.is_finite() && !f.is_special() {
                // +/-inf / finite nonzero = +/-inf
                let (mid, _) = self.mid.div(f, prec, Rounding::Down);
                Self::exact(mid)
            } else if self.is_finite() && f.is_inf() {
                Self::zero()
            } else if !self.mid.is_nan() && self.rad.is_inf() && !f.is_special() {
                Self::zero_pm_inf()
            } else {
                Self::indeterminate()
            };
        }

        if self.rad.is_zero() {
            let (mid, inexact) = self.mid.div(f, prec, Rounding::Down);
            let rad = if inexact {
                Magnitude::ulp(&mid, prec)
            } else {
                Magnitude::ZERO
            };
            return Self { mid, rad };
        }

        if self.mid.is_zero() {
            // [0 +/- eps] / f = [0 +/- eps/f]
            let ym = Magnitude::from_float_lower(f);
            return Self {
                mid: BigFloat::zero(),
                rad: self.rad.div_upper(&ym),
            };
        }

        if want_newton(prec, self.mid.bits(), f.bits()) {
            return self.div_float_newton(f, prec);
        }

        let ym = Magnitude::from_float_lower(f);
        let zr = self.rad.div_upper(&ym);
        let (mid, inexact) = self.mid.div(f, prec, Rounding::Down);
        let rad = if inexact {
            zr.add_upper(&Magnitude::ulp(&mid, prec))
        } else {
            zr
        };
        Self { mid, rad }
    }

    /// Wide-interval fallback: a direct interval division over magnitude
    /// bounds, branching on the sign configuration of the dividend.
    ///
    /// Sound whenever the divisor interval excludes zero, no matter how
    /// wide the operands are; used when the relative accuracy is too low
    /// for the fast path's linearized radius bound.
    fn div_wide(&self, rhs: &Self, prec: u32) -> Self {
        let t = rhs.mag_lower();
        if t.is_zero() {
            return Self::indeterminate();
        }
        if self.mid.is_zero() {
            return Self {
                mid: BigFloat::zero(),
                rad: self.rad.div_upper(&t),
            };
        }

        let negate = (self.mid.sign() < 0) != (rhs.mid.sign() < 0);

        if self.mid.cmpabs_mag(&self.rad) != Ordering::Less {
            //  [a,b] /  [t,u] =  [a/u, b/t]
            //  [a,b] / -[t,u] = -[a/u, b/t]
            // -[a,b] /  [t,u] = -[a/u, b/t]
            // -[a,b] / -[t,u] =  [a/u, b/t]
            let u = rhs.mag_upper();
            let a = self.mag_lower().div_lower(&u);
            let b = self.mag_upper().div_upper(&t);
            let z = Self::from_interval_mag(&a, &b, prec);
            if negate {
                z.neg()
            } else {
                z
            }
        } else {
            // [-a,b] /  [t,u] = [-a/t, b/t]
            // [-a,b] / -[t,u] = [-b/t, a/t]
            let b = self.mag_upper();
            let a = Magnitude::from_float_lower(&self.mid);
            let a = self.rad.sub_upper(&a);
            let (a, b) = if negate { (b, a) } else { (a, b) };
            let a = a.div_upper(&t);
            let b = b.div_upper(&t);
            Self::from_interval_neg_pos_mag(&a, &b, prec)
        }
    }

    /// Newton-accelerated division: only the midpoint computation changes;
    /// the radius is established exactly as in the general path, plus an
    /// ulp at the guard-adjusted precision the kernel guarantees.
    pub fn div_newton(&self, rhs: &Self, prec: u32) -> Self {
        if self.mid.is_special() || rhs.mid.is_special() {
            return Self::indeterminate();
        }

        let xm = Magnitude::from_float_upper(&self.mid);
        let ym = Magnitude::from_float_upper(&rhs.mid);
        let zr = xm
            .mul_upper(&rhs.rad)
            .add_upper(&ym.mul_upper(&self.rad));
        let yw = rhs.mag_lower();
        let yl = Magnitude::from_float_lower(&rhs.mid).mul_lower(&yw);
        let zr = zr.div_upper(&yl);

        let mid = newton::div_newton(&self.mid, &rhs.mid, prec);
        let rad = zr.add_upper(&Magnitude::ulp(&mid, prec + GUARD_BITS / 2));
        Self { mid, rad }.set_round(prec)
    }

    fn div_float_newton(&self, f: &BigFloat, prec: u32) -> Self {
        let ym = Magnitude::from_float_lower(f);
        let zr = self.rad.div_upper(&ym);

        let mid = newton::div_newton(&self.mid, f, prec);
        let rad = zr.add_upper(&Magnitude::ulp(&mid, prec + GUARD_BITS / 2));
        Self { mid, rad }.set_round(prec)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::INV_NEWTON_CUTOFF;
    use num_bigint::BigUint;

    const P: u32 = 64;

    fn ball(mid: i64, rad: u64) -> Ball {
        Ball::with_radius(BigFloat::from_i64(mid), Magnitude::from_u64(rad))
    }

    /// The quotient of the midpoints, at generous precision, as a tight
    /// reference ball.
    fn mid_quotient(x: &Ball, y: &Ball, prec: u32) -> Ball {
        let (q, inexact) = x.midpoint().div(y.midpoint(), prec, Rounding::Down);
        let rad = if inexact {
            Magnitude::ulp(&q, prec)
        } else {
            Magnitude::ZERO
        };
        Ball::with_radius(q, rad)
    }

    #[test]
    fn test_exact_division() {
        let z = Ball::from_i64(42).div(&Ball::from_i64(6), P);
        assert!(z.is_exact());
        assert_eq!(z.midpoint(), &BigFloat::from_i64(7));
    }

    #[test]
    fn test_inexact_exact_operands() {
        // 1/3 is inexact: the result carries a one-ulp radius and still
        // contains the true value
        let z = Ball::one().div(&Ball::from_i64(3), P);
        assert!(!z.is_exact());
        let reference = mid_quotient(&Ball::one(), &Ball::from_i64(3), 200);
        assert!(z.contains(&reference));
    }

    #[test]
    fn test_soundness_with_radii() {
        // x in [9, 11], y in [3, 5]: quotient range [9/5, 11/3]
        let x = ball(10, 1);
        let y = ball(4, 1);
        let z = x.div(&y, P);
        for &(num, den) in &[(9i64, 5i64), (9, 3), (11, 5), (11, 3), (10, 4)] {
            let point = mid_quotient(&Ball::from_i64(num), &Ball::from_i64(den), 200);
            assert!(
                z.contains(&point),
                "{num}/{den} escaped the enclosure {z}"
            );
        }
    }

    #[test]
    fn test_exact_divisor_fast_path() {
        // divisor radius is zero: output radius is input radius / |y|
        let x = ball(10, 2);
        let y = Ball::from_i64(2);
        let z = x.div(&y, P);
        assert_eq!(z.midpoint(), &BigFloat::from_i64(5));
        assert!(z.contains_float(&BigFloat::from_i64(4)));
        assert!(z.contains_float(&BigFloat::from_i64(6)));
        assert!(!z.contains_float(&BigFloat::from_i64(8)));
    }

    #[test]
    fn test_divisor_straddling_zero_is_indeterminate() {
        let x = Ball::from_i64(1);
        let y = ball(0, 1);
        assert!(x.div(&y, P).is_indeterminate());
        // touching zero at the boundary is just as bad
        let y = ball(2, 2);
        assert!(x.div(&y, P).is_indeterminate());
        let y = ball(1, 2);
        assert!(x.div(&y, P).is_indeterminate());
    }

    #[test]
    fn test_division_by_exact_zero_is_indeterminate() {
        assert!(Ball::from_i64(5).div(&Ball::zero(), P).is_indeterminate());
        assert!(Ball::zero().div(&Ball::zero(), P).is_indeterminate());
        assert!(ball(5, 1).div(&Ball::zero(), P).is_indeterminate());
    }

    #[test]
    fn test_zero_dividend() {
        // exact zero / finite nonzero = exact zero
        let z = Ball::zero().div(&Ball::from_i64(7), P);
        assert!(z.is_exact());
        assert!(z.midpoint().is_zero());

        // [0 +/- eps] / y keeps a zero midpoint and scales the radius
        let x = Ball::with_radius(BigFloat::zero(), Magnitude::from_u64(1));
        let z = x.div(&Ball::from_i64(4), P);
        assert!(z.midpoint().is_zero());
        assert!(z.contains_float(&BigFloat::from_f64(0.25)));
        assert!(!z.contains_float(&BigFloat::from_i64(1)));
    }

    #[test]
    fn test_special_value_table() {
        let pos_inf = Ball::exact(BigFloat::pos_inf());
        let neg_inf = Ball::exact(BigFloat::neg_inf());
        let finite = Ball::from_i64(3);
        let neg_finite = Ball::from_i64(-3);
        let fuzzy = ball(3, 1);
        let indet = Ball::indeterminate();
        let whole_line = Ball::zero_pm_inf();

        // +inf (zero radius) / finite nonzero = +/-inf (zero radius)
        let z = pos_inf.div(&finite, P);
        assert!(z.is_exact() && z.midpoint().is_inf() && z.midpoint().sign() > 0);
        let z = pos_inf.div(&neg_finite, P);
        assert!(z.is_exact() && z.midpoint().is_inf() && z.midpoint().sign() < 0);
        let z = neg_inf.div(&finite, P);
        assert!(z.is_exact() && z.midpoint().is_inf() && z.midpoint().sign() < 0);
        let z = pos_inf.div(&fuzzy, P);
        assert!(z.is_exact() && z.midpoint().is_inf() && z.midpoint().sign() > 0);

        // finite / +/-inf = exact zero
        for x in [&finite, &neg_finite, &fuzzy] {
            for y in [&pos_inf, &neg_inf] {
                let z = x.div(y, P);
                assert!(z.is_exact() && z.midpoint().is_zero(), "{x} / {y}");
            }
        }

        // inf / inf and anything involving indeterminate poison
        assert!(pos_inf.div(&pos_inf, P).is_indeterminate());
        assert!(pos_inf.div(&neg_inf, P).is_indeterminate());
        assert!(indet.div(&finite, P).is_indeterminate());
        assert!(finite.div(&indet, P).is_indeterminate());
        assert!(indet.div(&indet, P).is_indeterminate());

        // [0 +/- inf] / finite nonzero stays the whole line
        let z = whole_line.div(&finite, P);
        assert!(!z.is_indeterminate());
        assert!(z.midpoint().is_zero() && z.radius().is_inf());
        // and dividing by the whole line is indeterminate
        assert!(finite.div(&whole_line, P).is_indeterminate());

        // an infinite midpoint with nonzero finite radius still represents
        // exactly +inf
        let inf_with_rad = Ball::with_radius(BigFloat::pos_inf(), Magnitude::from_u64(1));
        let z = inf_with_rad.div(&finite, P);
        assert!(z.is_exact() && z.midpoint().is_inf() && z.midpoint().sign() > 0);
        // and dividing by it gives exact zero, like any infinite divisor
        let z = finite.div(&inf_with_rad, P);
        assert!(z.is_exact() && z.midpoint().is_zero());
    }

    #[test]
    fn test_identity_divisor_idempotence() {
        let cases = [
            Ball::from_i64(123),
            ball(-77, 3),
            Ball::with_radius(BigFloat::from_f64(1.625), Magnitude::pow2(-20)),
            Ball::exact(BigFloat::from_f64(-0.1)),
        ];
        for x in &cases {
            let z = x.div(&Ball::one(), P);
            assert_eq!(&z, x, "dividing {x} by one changed it");
        }
    }

    #[test]
    fn test_wide_fallback_soundness() {
        // radius comparable to the midpoint: the linearized bound is not
        // sound, the wide path must take over and still enclose
        let x = ball(4, 3); // [1, 7]
        let y = ball(4, 2); // [2, 6]
        let z = x.div(&y, P);
        for &(num, den) in &[(1i64, 2i64), (1, 6), (7, 2), (7, 6), (4, 4)] {
            let point = mid_quotient(&Ball::from_i64(num), &Ball::from_i64(den), 200);
            assert!(z.contains(&point), "{num}/{den} escaped {z}");
        }
    }

    #[test]
    fn test_wide_fallback_straddling_dividend() {
        // x in [-2, 6], y in [2, 6]: quotient range [-1, 3]
        let x = ball(2, 4);
        let y = ball(4, 2);
        let z = x.div(&y, P);
        for v in [-1.0f64, -0.5, 0.0, 1.0, 3.0] {
            assert!(z.contains_float(&BigFloat::from_f64(v)), "{v} escaped {z}");
        }
        // the enclosure must not be absurdly loose on the negative side
        assert!(!z.contains_float(&BigFloat::from_i64(-4)));
    }

    #[test]
    fn test_wide_fallback_negative_divisor() {
        // x in [3, 5], y in [-6, -2]: quotient range [-2.5, -0.5]
        let x = ball(4, 1);
        let y = ball(-4, 2);
        let z = x.div(&y, P);
        assert!(z.contains_float(&BigFloat::from_f64(-0.5)));
        assert!(z.contains_float(&BigFloat::from_f64(-2.5)));
        assert!(!z.contains_float(&BigFloat::from_f64(0.5)));
        assert!(z.midpoint().sign() < 0);
    }

    #[test]
    fn test_monotonic_refinement() {
        // accurate operands: the fast path runs at every precision
        let x = Ball::with_radius(BigFloat::from_i64(100), Magnitude::pow2(-40));
        let y = Ball::from_i64(7);
        let mut previous: Option<Ball> = None;
        for prec in [8u32, 16, 32, 64, 128] {
            let z = x.div(&y, prec);
            if let Some(p) = &previous {
                assert!(z.overlaps(p), "precision {prec} moved to a disjoint region");
            }
            previous = Some(z);
        }
        // and the same holds for wide operands
        let x = ball(100, 1);
        let mut previous: Option<Ball> = None;
        for prec in [8u32, 32, 128] {
            let z = x.div(&y, prec);
            if let Some(p) = &previous {
                assert!(z.overlaps(p), "precision {prec} moved to a disjoint region");
            }
            previous = Some(z);
        }
    }

    #[test]
    fn test_accuracy_guided_precision_reduction() {
        // only ~10 good bits in x: requesting 10000 bits must not produce
        // a long midpoint
        let x = Ball::with_radius(BigFloat::from_i64(1000), Magnitude::from_u64(1));
        let y = Ball::with_radius(BigFloat::from_i64(3), Magnitude::pow2(-8));
        let z = x.div(&y, 10_000);
        assert!(z.midpoint().bits() < 100);
        let reference = mid_quotient(&x, &y, 200);
        assert!(z.overlaps(&reference));
    }

    fn dense_ball(bits: u64, seed: u64, rad: Magnitude) -> Ball {
        let mut state = seed | 1;
        let mut bytes = Vec::with_capacity((bits / 8 + 1) as usize);
        for _ in 0..=(bits / 8) {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            bytes.push((state >> 33) as u8);
        }
        let mantissa = BigUint::from_bytes_le(&bytes) | BigUint::from(1u32);
        Ball::with_radius(BigFloat::from_parts(false, mantissa, -(bits as i64)), rad)
    }

    #[test]
    fn test_newton_and_classical_paths_agree() {
        let prec = INV_NEWTON_CUTOFF + 256;
        let x = dense_ball(prec as u64, 17, Magnitude::pow2(-(prec as i64)));
        let y = dense_ball(prec as u64, 19, Magnitude::pow2(-(prec as i64)));

        let via_dispatch = x.div(&y, prec);
        let via_newton = x.div_newton(&y, prec);
        assert!(via_dispatch.overlaps(&via_newton));
        assert!(!via_newton.is_indeterminate());

        let reference = mid_quotient(&x, &y, prec + 64);
        assert!(via_newton.overlaps(&reference));
    }

    #[test]
    fn test_cutoff_boundary_consistency() {
        // a short numerator over a long exact divisor flips the Newton
        // gate right at the cutoff; crossing it by one bit must not
        // break overlap
        let bits = (INV_NEWTON_CUTOFF + 64) as u64;
        let x = Ball::with_radius(BigFloat::from_i64(3), Magnitude::pow2(-40_000));
        let y = dense_ball(bits, 29, Magnitude::ZERO);
        let below = x.div(&y, INV_NEWTON_CUTOFF - 1);
        let above = x.div(&y, INV_NEWTON_CUTOFF + 1);
        assert!(below.overlaps(&above));
        assert!(!below.is_indeterminate());
        assert!(!above.is_indeterminate());
    }

    #[test]
    fn test_newton_path_high_precision() {
        // past the division cutoff even long numerators route through
        // the Karp-Markstein kernel
        let prec = crate::tuning::DIV_NEWTON_CUTOFF + 64;
        let x = dense_ball(prec as u64, 31, Magnitude::pow2(-(prec as i64)));
        let y = dense_ball(prec as u64, 37, Magnitude::pow2(-(prec as i64)));
        let z = x.div(&y, prec);
        assert!(!z.is_indeterminate());
        let reference = mid_quotient(&x, &y, prec + 64);
        assert!(z.overlaps(&reference));
    }

    #[test]
    fn test_round_trip_through_multiply() {
        for &(x, y) in &[(7i64, 3i64), (-44, 5), (1023, -17)] {
            let xb = Ball::from_i64(x);
            let yb = Ball::from_i64(y);
            let p = xb.mul(&yb, P);
            assert!(p.is_exact());
            let q = p.div(&yb, P);
            assert!(q.is_exact());
            assert_eq!(q, xb);
        }
    }

    #[test]
    fn test_badly_scaled_operands_take_general_path() {
        // exponents beyond the well-conditioned window
        let x = Ball::with_radius(
            BigFloat::from_i64(3).mul_pow2(1 << 25),
            Magnitude::pow2((1 << 25) - 40),
        );
        let y = Ball::with_radius(
            BigFloat::from_i64(5).mul_pow2(-(1 << 25)),
            Magnitude::pow2(-(1 << 25) - 40),
        );
        let z = x.div(&y, P);
        assert!(!z.is_indeterminate());
        let reference = mid_quotient(&x, &y, 200);
        assert!(z.overlaps(&reference));
    }

    #[test]
    fn test_determinism() {
        let x = ball(355, 1);
        let y = ball(113, 1);
        let a = x.div(&y, P);
        let b = x.div(&y, P);
        assert_eq!(a, b);
    }
}
