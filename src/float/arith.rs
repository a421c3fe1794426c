// ============================================================================
// Float Arithmetic
// Correctly rounded add/sub/mul/div with explicit special-value tables
// ============================================================================

use super::round::{checked_exp, round_finite, Rounding, PREC_EXACT};
use super::value::{BigFloat, Class};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Guard bits appended to the raw quotient before rounding, so the sticky
/// bit sits well below every rounding decision.
const DIV_GUARD_BITS: u64 = 32;

/// Exponent gap beyond which a distant addend collapses to a sticky bit.
const STICKY_GUARD_BITS: u32 = 8;

impl BigFloat {
    /// Correctly rounded addition.
    ///
    /// Returns the result and the inexact flag. `Inf + (-Inf)` and any NaN
    /// operand yield NaN.
    pub fn add(&self, rhs: &Self, prec: u32, rnd: Rounding) -> (Self, bool) {
        match (self.class(), rhs.class()) {
            (Class::Nan, _) | (_, Class::Nan) => (Self::nan(), false),
            (Class::PosInfinity, Class::NegInfinity)
            | (Class::NegInfinity, Class::PosInfinity) => (Self::nan(), false),
            (Class::PosInfinity, _) | (_, Class::PosInfinity) => (Self::pos_inf(), false),
            (Class::NegInfinity, _) | (_, Class::NegInfinity) => (Self::neg_inf(), false),
            (Class::Zero, _) => rhs.set_round(prec, rnd),
            (_, Class::Zero) => self.set_round(prec, rnd),
            (Class::Finite, Class::Finite) => self.add_finite(rhs, prec, rnd),
        }
    }

    /// Correctly rounded subtraction.
    #[inline]
    pub fn sub(&self, rhs: &Self, prec: u32, rnd: Rounding) -> (Self, bool) {
        self.add(&rhs.neg(), prec, rnd)
    }

    fn add_finite(&self, rhs: &Self, prec: u32, rnd: Rounding) -> (Self, bool) {
        let (big, small) = if self.cmpabs(rhs) != std::cmp::Ordering::Less {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let (nb, eb, mb) = big.finite_parts();
        let (ns, es, ms) = small.finite_parts();

        // a far-smaller addend only perturbs the result below the rounding
        // precision; collapse it to a sticky bit instead of materializing
        // an enormous shift. The shift must place the sticky strictly
        // below the kept bits even when the dominant mantissa is short.
        if prec != PREC_EXACT {
            let gap = big.top_exponent() as i128 - small.top_exponent() as i128;
            if gap > prec as i128 + STICKY_GUARD_BITS as i128 {
                let shift = (prec as u64 + STICKY_GUARD_BITS as u64)
                    .saturating_sub(mb.bits())
                    .max(STICKY_GUARD_BITS as u64);
                let shifted = mb << shift;
                let m = if nb == ns {
                    shifted + 1u32
                } else {
                    shifted - 1u32
                };
                return round_finite(
                    nb,
                    m,
                    checked_exp(eb as i128 - shift as i128),
                    prec,
                    rnd,
                );
            }
        }

        let e = eb.min(es);
        let sb = u64::try_from(eb as i128 - e as i128).expect("alignment shift overflow");
        let ss = u64::try_from(es as i128 - e as i128).expect("alignment shift overflow");
        let mb = mb << sb;
        let ms = ms << ss;

        if nb == ns {
            round_finite(nb, mb + ms, e, prec, rnd)
        } else {
            // |big| >= |small| by the ordering above
            match mb.cmp(&ms) {
                std::cmp::Ordering::Equal => (Self::zero(), false),
                _ => round_finite(nb, mb - ms, e, prec, rnd),
            }
        }
    }

    /// Correctly rounded multiplication.
    ///
    /// `0 * Inf` and any NaN operand yield NaN.
    pub fn mul(&self, rhs: &Self, prec: u32, rnd: Rounding) -> (Self, bool) {
        match (self.class(), rhs.class()) {
            (Class::Nan, _) | (_, Class::Nan) => (Self::nan(), false),
            (Class::Zero, Class::PosInfinity | Class::NegInfinity)
            | (Class::PosInfinity | Class::NegInfinity, Class::Zero) => (Self::nan(), false),
            (Class::Zero, _) | (_, Class::Zero) => (Self::zero(), false),
            (Class::PosInfinity | Class::NegInfinity, _)
            | (_, Class::PosInfinity | Class::NegInfinity) => {
                if self.sign() * rhs.sign() > 0 {
                    (Self::pos_inf(), false)
                } else {
                    (Self::neg_inf(), false)
                }
            }
            (Class::Finite, Class::Finite) => {
                let (n1, e1, m1) = self.finite_parts();
                let (n2, e2, m2) = rhs.finite_parts();
                round_finite(
                    n1 != n2,
                    m1 * m2,
                    checked_exp(e1 as i128 + e2 as i128),
                    prec,
                    rnd,
                )
            }
        }
    }

    /// Correctly rounded division.
    ///
    /// The special-value table follows extended-real conventions:
    ///
    /// | x \ y      | zero   | finite!=0 | +/-Inf | NaN |
    /// |------------|--------|-----------|--------|-----|
    /// | zero       | NaN    | zero      | zero   | NaN |
    /// | finite!=0  | sgn(x)*Inf | quotient | zero | NaN |
    /// | +/-Inf     | sgn(x)*Inf | sgn(x*y)*Inf | NaN | NaN |
    /// | NaN        | NaN    | NaN       | NaN    | NaN |
    ///
    /// A divisor that is an exact power of two reduces to exponent
    /// subtraction with no digit-level work.
    pub fn div(&self, rhs: &Self, prec: u32, rnd: Rounding) -> (Self, bool) {
        if self.is_special() || rhs.is_special() {
            return (self.div_special(rhs), false);
        }
        let prec = prec.clamp(1, 1 << 30);

        let (n1, e1, m1) = self.finite_parts();
        let (n2, e2, m2) = rhs.finite_parts();
        let negative = n1 != n2;

        if m2.is_one() {
            return round_finite(
                negative,
                m1.clone(),
                checked_exp(e1 as i128 - e2 as i128),
                prec,
                rnd,
            );
        }

        // extend the dividend so the raw quotient carries the target
        // precision plus guard bits
        let (b1, b2) = (m1.bits(), m2.bits());
        let shift = (prec as u64 + DIV_GUARD_BITS + b2).saturating_sub(b1);
        let (mut q, r) = (m1 << shift).div_rem(m2);
        if !r.is_zero() {
            // the true quotient lies strictly above the floor quotient;
            // a sticky low bit makes every rounding mode decide correctly
            q |= BigUint::one();
        }
        round_finite(
            negative,
            q,
            checked_exp(e1 as i128 - e2 as i128 - shift as i128),
            prec,
            rnd,
        )
    }

    fn div_special(&self, rhs: &Self) -> Self {
        use Class::*;
        match (self.class(), rhs.class()) {
            (Nan, _) | (_, Nan) => Self::nan(),
            (Zero, Zero) => Self::nan(),
            (Zero, _) => Self::zero(),
            (_, Zero) => {
                if self.sign() >= 0 {
                    Self::pos_inf()
                } else {
                    Self::neg_inf()
                }
            }
            (PosInfinity | NegInfinity, PosInfinity | NegInfinity) => Self::nan(),
            (PosInfinity | NegInfinity, Finite) => {
                if self.sign() * rhs.sign() > 0 {
                    Self::pos_inf()
                } else {
                    Self::neg_inf()
                }
            }
            (Finite, PosInfinity | NegInfinity) => Self::zero(),
            (Finite, Finite) => unreachable!("both operands finite nonzero"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
