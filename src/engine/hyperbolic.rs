// ============================================================================
// Hyperbolic Functions and Remainder
// sinh, cosh, tanh from exponential identities; fmod from floor division
// ============================================================================

use crate::numeric::{NumericError, NumericResult, Real};

fn exp_or_zero(x: &Real) -> NumericResult<Real> {
    match x.exp() {
        Err(NumericError::Underflow) => Ok(Real::zero()),
        other => other,
    }
}

/// `(expm1(z) - expm1(-z)) / 2`.
///
/// # Errors
/// Returns `Overflow` when `e^|z|` is out of range.
pub fn sinh(z: &Real) -> NumericResult<Real> {
    if z.is_zero() {
        return Ok(Real::zero());
    }
    let magnitude = z.abs();
    let up = magnitude.expm1()?;
    let down = (-magnitude).expm1()?;
    let value = (up - down).ldexp(-1);
    Ok(if z.is_negative() { -value } else { value })
}

/// `(exp(z) + exp(-z)) / 2`.
///
/// # Errors
/// Returns `Overflow` when `e^|z|` is out of range.
pub fn cosh(z: &Real) -> NumericResult<Real> {
    let magnitude = z.abs();
    let up = magnitude.exp()?;
    let down = exp_or_zero(&-magnitude)?;
    Ok((up + down).ldexp(-1))
}

/// `sinh(z) / cosh(z)`, saturating to ±1 once the exponentials overflow.
pub fn tanh(z: &Real) -> NumericResult<Real> {
    let ratio = sinh(z).and_then(|s| cosh(z).and_then(|c| s.checked_div(&c)));
    match ratio {
        Err(NumericError::Overflow) => {
            Ok(if z.is_negative() { -Real::one() } else { Real::one() })
        },
        other => other,
    }
}

/// `x - floor(x / y) * y`; the result takes the sign of `y`.
///
/// # Errors
/// Returns `DivisionByZero` when `y` is zero.
pub fn fmod(x: &Real, y: &Real) -> NumericResult<Real> {
    let quotient = x.checked_div(y)?.floor();
    Ok(x - &(&quotient * y))
}
