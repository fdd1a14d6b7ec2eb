//! Fixed-point helpers. All ratios are integer ratios with floor rounding.

use crate::types::Amount;

/// `floor(value * numerator / denominator)` for `numerator <= denominator`.
///
/// Splits `value` into quotient and remainder so the product never exceeds
/// `value`; with a `u64` denominator the remainder term always fits.
pub(crate) fn mul_div_u64(value: Amount, numerator: u64, denominator: u64) -> Amount {
    debug_assert!(denominator > 0 && numerator <= denominator);
    let den = denominator as u128;
    let num = numerator as u128;
    (value / den) * num + (value % den) * num / den
}

/// Same as [`mul_div_u64`] over full-width operands. `None` on overflow.
pub(crate) fn mul_div_floor(value: Amount, numerator: Amount, denominator: Amount) -> Option<Amount> {
    debug_assert!(denominator > 0 && numerator <= denominator);
    let whole = (value / denominator).checked_mul(numerator)?;
    let part = (value % denominator).checked_mul(numerator)? / denominator;
    whole.checked_add(part)
}
