// ============================================================================
// Arbitrary-Precision Float
// Tagged sign/exponent/mantissa representation with special values
// ============================================================================

use super::round::{checked_exp, round_finite, Rounding};
use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;

/// Closed classification of a [`BigFloat`].
///
/// Dispatch tables over special values match on this enum so the compiler
/// checks them for exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Zero,
    Finite,
    PosInfinity,
    NegInfinity,
    Nan,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Repr {
    Zero,
    PosInf,
    NegInf,
    Nan,
    /// `(-1)^negative * mantissa * 2^exponent` with an odd mantissa, so the
    /// representation of every nonzero finite value is canonical.
    Finite {
        negative: bool,
        exponent: i64,
        mantissa: BigUint,
    },
}

/// An arbitrary-precision binary floating-point value.
///
/// The exponent range is unbounded (i64) and the mantissa holds as many
/// bits as an operation produced. Precision is not a property of the value:
/// it is passed to each operation together with a [`Rounding`] mode, and
/// each operation reports through its inexact flag whether rounding
/// discarded information.
///
/// Equality is structural; because finite values are canonical this is
/// value equality, and (unlike IEEE) `nan == nan` holds, which is what the
/// containment tests want.
///
/// # Example
/// ```ignore
/// use ball_arithmetic::float::{BigFloat, Rounding};
///
/// let x = BigFloat::from_i64(1);
/// let y = BigFloat::from_i64(3);
/// let (q, inexact) = x.div(&y, 53, Rounding::Nearest);
/// assert!(inexact);
/// assert_eq!(q.bits(), 53);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BigFloat {
    repr: Repr,
}

impl BigFloat {
    // ========================================================================
    // Construction
    // ========================================================================

    #[inline]
    pub fn zero() -> Self {
        Self { repr: Repr::Zero }
    }

    #[inline]
    pub fn one() -> Self {
        Self::from_i64(1)
    }

    #[inline]
    pub fn pos_inf() -> Self {
        Self { repr: Repr::PosInf }
    }

    #[inline]
    pub fn neg_inf() -> Self {
        Self { repr: Repr::NegInf }
    }

    #[inline]
    pub fn nan() -> Self {
        Self { repr: Repr::Nan }
    }

    /// Exact conversion from a machine integer.
    pub fn from_i64(value: i64) -> Self {
        if value == 0 {
            return Self::zero();
        }
        Self::from_mantissa_exponent(value < 0, value.unsigned_abs(), 0)
    }

    /// Exact conversion from `(-1)^negative * mantissa * 2^exponent`.
    pub fn from_mantissa_exponent(negative: bool, mantissa: u64, exponent: i64) -> Self {
        Self::from_parts(negative, BigUint::from(mantissa), exponent)
    }

    /// Exact conversion from an arbitrary-size mantissa.
    pub fn from_biguint(negative: bool, mantissa: BigUint, exponent: i64) -> Self {
        Self::from_parts(negative, mantissa, exponent)
    }

    /// Exact conversion from an `f64`. NaN and infinities map to the
    /// matching tags.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::nan();
        }
        if value.is_infinite() {
            return if value > 0.0 {
                Self::pos_inf()
            } else {
                Self::neg_inf()
            };
        }
        if value == 0.0 {
            return Self::zero();
        }
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exponent) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        Self::from_mantissa_exponent(negative, mantissa, exponent)
    }

    /// Build from a possibly unnormalized mantissa, stripping trailing
    /// zeros into the exponent.
    pub(crate) fn from_parts(negative: bool, mantissa: BigUint, exponent: i64) -> Self {
        if mantissa.is_zero() {
            return Self::zero();
        }
        let tz = mantissa.trailing_zeros().unwrap_or(0);
        if tz > 0 {
            Self::from_odd_parts(
                negative,
                &mantissa >> tz,
                checked_exp(exponent as i128 + tz as i128),
            )
        } else {
            Self::from_odd_parts(negative, mantissa, exponent)
        }
    }

    /// Build from an already odd mantissa.
    pub(crate) fn from_odd_parts(negative: bool, mantissa: BigUint, exponent: i64) -> Self {
        debug_assert!(mantissa.bit(0), "mantissa must be odd");
        Self {
            repr: Repr::Finite {
                negative,
                exponent,
                mantissa,
            },
        }
    }

    // ========================================================================
    // Classification
    // ========================================================================

    /// The value's class; the basis of every special-value dispatch table.
    #[inline]
    pub fn class(&self) -> Class {
        match &self.repr {
            Repr::Zero => Class::Zero,
            Repr::PosInf => Class::PosInfinity,
            Repr::NegInf => Class::NegInfinity,
            Repr::Nan => Class::Nan,
            Repr::Finite { .. } => Class::Finite,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self.repr, Repr::Zero)
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self.repr, Repr::Nan)
    }

    #[inline]
    pub fn is_inf(&self) -> bool {
        matches!(self.repr, Repr::PosInf | Repr::NegInf)
    }

    /// Anything that is not a nonzero finite value: zero, infinities, NaN.
    #[inline]
    pub fn is_special(&self) -> bool {
        !matches!(self.repr, Repr::Finite { .. })
    }

    /// Finite including zero (not infinite, not NaN).
    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self.repr, Repr::Zero | Repr::Finite { .. })
    }

    /// -1, 0 or +1. Zero and NaN report 0.
    #[inline]
    pub fn sign(&self) -> i32 {
        match &self.repr {
            Repr::Zero | Repr::Nan => 0,
            Repr::PosInf => 1,
            Repr::NegInf => -1,
            Repr::Finite { negative, .. } => {
                if *negative {
                    -1
                } else {
                    1
                }
            }
        }
    }

    /// Number of significant mantissa bits; 0 for special values.
    #[inline]
    pub fn bits(&self) -> u64 {
        match &self.repr {
            Repr::Finite { mantissa, .. } => mantissa.bits(),
            _ => 0,
        }
    }

    /// Exponent such that `|value|` lies in `[2^(top-1), 2^top)`.
    ///
    /// # Panics
    /// Panics on special values.
    #[inline]
    pub fn top_exponent(&self) -> i64 {
        match &self.repr {
            Repr::Finite {
                exponent, mantissa, ..
            } => checked_exp(*exponent as i128 + mantissa.bits() as i128),
            _ => panic!("top_exponent of a special value"),
        }
    }

    /// Sign, exponent and mantissa of a finite nonzero value.
    ///
    /// # Panics
    /// Panics on special values; callers dispatch on class first.
    pub(crate) fn finite_parts(&self) -> (bool, i64, &BigUint) {
        match &self.repr {
            Repr::Finite {
                negative,
                exponent,
                mantissa,
            } => (*negative, *exponent, mantissa),
            _ => panic!("finite_parts of a special value"),
        }
    }

    /// Low 64 bits of the mantissa; the whole mantissa when it fits.
    pub(crate) fn mantissa_low_u64(&self) -> u64 {
        match &self.repr {
            Repr::Finite { mantissa, .. } => mantissa.iter_u64_digits().next().unwrap_or(0),
            _ => 0,
        }
    }

    /// Top `n` bits of the mantissa. Requires `bits() >= n`.
    pub(crate) fn mantissa_high_bits(&self, n: u32) -> u64 {
        match &self.repr {
            Repr::Finite { mantissa, .. } => {
                let bits = mantissa.bits();
                debug_assert!(bits >= n as u64);
                (mantissa >> (bits - n as u64))
                    .iter_u64_digits()
                    .next()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    // ========================================================================
    // Structural operations
    // ========================================================================

    /// Negation; exact for every class.
    pub fn neg(&self) -> Self {
        match &self.repr {
            Repr::Zero => Self::zero(),
            Repr::Nan => Self::nan(),
            Repr::PosInf => Self::neg_inf(),
            Repr::NegInf => Self::pos_inf(),
            Repr::Finite {
                negative,
                exponent,
                mantissa,
            } => Self::from_odd_parts(!negative, mantissa.clone(), *exponent),
        }
    }

    /// Absolute value; exact. NaN stays NaN.
    pub fn abs(&self) -> Self {
        match &self.repr {
            Repr::NegInf => Self::pos_inf(),
            Repr::Finite {
                exponent, mantissa, ..
            } => Self::from_odd_parts(false, mantissa.clone(), *exponent),
            _ => self.clone(),
        }
    }

    /// Exact multiplication by `2^shift`.
    pub fn mul_pow2(&self, shift: i64) -> Self {
        match &self.repr {
            Repr::Finite {
                negative,
                exponent,
                mantissa,
            } => Self::from_odd_parts(
                *negative,
                mantissa.clone(),
                checked_exp(*exponent as i128 + shift as i128),
            ),
            _ => self.clone(),
        }
    }

    /// Round to `prec` bits. Special values pass through exactly.
    pub fn set_round(&self, prec: u32, rnd: Rounding) -> (Self, bool) {
        match &self.repr {
            Repr::Finite {
                negative,
                exponent,
                mantissa,
            } => round_finite(*negative, mantissa.clone(), *exponent, prec, rnd),
            _ => (self.clone(), false),
        }
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Compare absolute values. Infinities compare above all finite values.
    ///
    /// # Panics
    /// Panics if either operand is NaN.
    pub fn cmpabs(&self, rhs: &Self) -> Ordering {
        assert!(!self.is_nan() && !rhs.is_nan(), "cmpabs of NaN");
        match (self.is_inf(), rhs.is_inf()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        match (self.is_zero(), rhs.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let top = self.top_exponent().cmp(&rhs.top_exponent());
        if top != Ordering::Equal {
            return top;
        }
        // align the shorter mantissa to the longer one's least bit
        match (&self.repr, &rhs.repr) {
            (
                Repr::Finite { mantissa: m1, .. },
                Repr::Finite { mantissa: m2, .. },
            ) => {
                let (b1, b2) = (m1.bits(), m2.bits());
                if b1 == b2 {
                    m1.cmp(m2)
                } else if b1 < b2 {
                    (m1 << (b2 - b1)).cmp(m2)
                } else {
                    m1.cmp(&(m2 << (b1 - b2)))
                }
            }
            _ => unreachable!("specials handled above"),
        }
    }

    /// Compare `|self|` against a magnitude bound, exactly.
    ///
    /// # Panics
    /// Panics if `self` is NaN.
    pub fn cmpabs_mag(&self, bound: &crate::magnitude::Magnitude) -> Ordering {
        self.cmpabs(&bound.to_float())
    }

    /// Sign-aware comparison.
    ///
    /// # Panics
    /// Panics if either operand is NaN; use [`BigFloat::partial_cmp`] when
    /// NaN may flow through.
    pub fn cmp_value(&self, rhs: &Self) -> Ordering {
        assert!(!self.is_nan() && !rhs.is_nan(), "cmp_value of NaN");
        let (s1, s2) = (self.sign(), rhs.sign());
        if s1 != s2 {
            return s1.cmp(&s2);
        }
        if s1 >= 0 {
            self.cmpabs(rhs)
        } else {
            rhs.cmpabs(self)
        }
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            None
        } else {
            Some(self.cmp_value(other))
        }
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Debug for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Zero => write!(f, "BigFloat(0)"),
            Repr::PosInf => write!(f, "BigFloat(+inf)"),
            Repr::NegInf => write!(f, "BigFloat(-inf)"),
            Repr::Nan => write!(f, "BigFloat(nan)"),
            Repr::Finite {
                negative,
                exponent,
                mantissa,
            } => write!(
                f,
                "BigFloat({}{} * 2^{}, {} bits)",
                if *negative { "-" } else { "" },
                mantissa,
                exponent,
                mantissa.bits()
            ),
        }
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Zero => write!(f, "0"),
            Repr::PosInf => write!(f, "+inf"),
            Repr::NegInf => write!(f, "-inf"),
            Repr::Nan => write!(f, "nan"),
            Repr::Finite {
                negative,
                exponent,
                mantissa,
            } => {
                let sign = if *negative { "-" } else { "" };
                if *exponent == 0 {
                    write!(f, "{sign}{mantissa}")
                } else {
                    write!(f, "{sign}{mantissa}*2^{exponent}")
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
