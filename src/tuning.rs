// ============================================================================
// Tuning Constants
// Performance cutoffs for the division strategy selection
// ============================================================================

//! Compile-time tuning knobs.
//!
//! Every constant in this module affects performance only, never
//! correctness: the enclosure returned by any operation is sound for any
//! combination of values here. Tests therefore exercise behavior *across*
//! the cutoff boundaries rather than asserting the numeric values.

/// Extra working bits carried through Newton refinement.
///
/// The refined reciprocal is accurate to strictly more than `GUARD_BITS / 2`
/// bits beyond the target precision, which is what the ball layer assumes
/// when it converts the midpoint error into an ulp term.
pub const GUARD_BITS: u32 = 32;

/// Precision (in bits) above which the recursive Newton reciprocal beats
/// classical long division.
pub const INV_NEWTON_CUTOFF: u32 = 24_000;

/// Precision above which Karp-Markstein division is used even for long
/// numerators.
pub const DIV_NEWTON_CUTOFF: u32 = 70_000;

/// Relative accuracy (in bits) at or below which the well-conditioned fast
/// path is abandoned for the wide-interval fallback.
pub const WIDE_ACCURACY_CUTOFF: i64 = 20;

/// Smallest working precision any ball operation computes at.
pub const MIN_PREC: u32 = 2;

/// Midpoint/radius exponents must stay within this window for a ball to
/// take the well-conditioned fast path.
pub const NORMAL_EXP_LIMIT: i64 = 1 << 24;

/// Whether the Newton midpoint route pays off for a division at `prec` bits
/// with a `numerator_bits`-bit numerator and `divisor_bits`-bit divisor.
///
/// Newton only wins when the divisor carries a large fraction of the target
/// precision and the numerator is either short or the precision is past the
/// higher division-specific cutoff.
#[inline]
pub fn want_newton(prec: u32, numerator_bits: u64, divisor_bits: u64) -> bool {
    prec >= INV_NEWTON_CUTOFF
        && divisor_bits > prec as u64 / 2
        && (numerator_bits * 100 < prec as u64 || prec >= DIV_NEWTON_CUTOFF)
}
