// ============================================================================
// Inverse Trigonometric Functions
// asin, acos, atan and atan2 by Halley refinement of a double-precision seed
// ============================================================================

use super::roots::halley_iterate;
use crate::domain::Context;
use crate::interfaces::NumericTraits;
use crate::numeric::{NumericError, NumericResult, Real};

/// Extra bits carried while iterating so residual noise stays below the
/// stopping tolerance.
const GUARD_BITS: u32 = 16;

/// Polish `seed` to a root of `f` inside `[min, max]` to the working
/// precision, with an iteration budget equal to the digit count.
fn refine<F>(f: F, seed: Real, min: Real, max: Real) -> Real
where
    F: FnMut(&Real) -> (Real, Real, Real),
{
    let ctx = Context::current();
    let digits = (NumericTraits::<Real>::REAL.digits)(&ctx);
    let mut iterations = u64::from(digits);
    let seed = seed.max(min.clone()).min(max.clone());

    let root = Context::new(ctx.precision() + GUARD_BITS)
        .with_output_precision(ctx.output_precision())
        .scoped(|| halley_iterate(f, seed, min, max, digits, &mut iterations));
    tracing::trace!(iterations, digits, "inverse trig root refined");
    Real::from_big_float(root.value().round(ctx.precision()))
}

fn half_pi() -> Real {
    Real::pi().ldexp(-1)
}

/// `a / b`, saturating instead of failing when `b` is zero.
fn saturating_div(a: &Real, b: &Real) -> Real {
    a.checked_div(b).unwrap_or_else(|_| {
        let max = (NumericTraits::<Real>::REAL.max_value)(&Context::current());
        if a.is_negative() {
            -max
        } else {
            max
        }
    })
}

fn check_unit_interval(z: &Real) -> NumericResult<()> {
    if z.abs() > Real::one() {
        return Err(NumericError::Domain);
    }
    Ok(())
}

/// Arc sine in `[-π/2, π/2]`.
///
/// # Errors
/// Returns `Domain` when `|z| > 1`.
pub fn asin(z: &Real) -> NumericResult<Real> {
    check_unit_interval(z)?;
    if z.is_zero() {
        return Ok(Real::zero());
    }
    if z.abs() == Real::one() {
        let quarter_turn = half_pi();
        return Ok(if z.is_negative() { -quarter_turn } else { quarter_turn });
    }

    let bound = half_pi();
    let seed = <Real as crate::interfaces::RootScalar>::from_f64(z.to_f64().asin());
    Ok(refine(
        |p: &Real| {
            let sin = p.sin();
            (&sin - z, p.cos(), -sin)
        },
        seed,
        -bound.clone(),
        bound,
    ))
}

/// Arc cosine in `[0, π]`.
///
/// # Errors
/// Returns `Domain` when `|z| > 1`.
pub fn acos(z: &Real) -> NumericResult<Real> {
    check_unit_interval(z)?;
    if *z == Real::one() {
        return Ok(Real::zero());
    }
    if *z == -Real::one() {
        return Ok(Real::pi());
    }
    if z.is_zero() {
        return Ok(half_pi());
    }

    let seed = <Real as crate::interfaces::RootScalar>::from_f64(z.to_f64().acos());
    Ok(refine(
        |p: &Real| {
            let cos = p.cos();
            (&cos - z, -p.sin(), -cos)
        },
        seed,
        Real::zero(),
        Real::pi(),
    ))
}

/// Arc tangent in `(-π/2, π/2)`.
pub fn atan(z: &Real) -> NumericResult<Real> {
    if z.is_zero() {
        return Ok(Real::zero());
    }
    let one = Real::one();
    if z.abs() == one {
        let eighth_turn = Real::pi().ldexp(-2);
        return Ok(if z.is_negative() { -eighth_turn } else { eighth_turn });
    }
    if z.abs() > one {
        // atan(z) = sign(z) π/2 - atan(1/z)
        let inner = atan(&one.checked_div(z)?)?;
        let quarter_turn = half_pi();
        let signed = if z.is_negative() { -quarter_turn } else { quarter_turn };
        return Ok(signed - inner);
    }

    let bound = half_pi();
    let seed = <Real as crate::interfaces::RootScalar>::from_f64(z.to_f64().atan());
    Ok(refine(
        |p: &Real| {
            let cos = p.cos();
            let sec2 = saturating_div(&one, &(&cos * &cos));
            let tan = saturating_div(&p.sin(), &cos);
            let curvature = &(&tan * &sec2) * &Real::from(2);
            (&tan - z, sec2, curvature)
        },
        seed,
        -bound.clone(),
        bound,
    ))
}

/// Angle of the point `(x, y)` in `(-π, π]`. `atan2(0, 0)` is zero.
pub fn atan2(y: &Real, x: &Real) -> NumericResult<Real> {
    if x.is_zero() {
        if y.is_zero() {
            return Ok(Real::zero());
        }
        let quarter_turn = half_pi();
        return Ok(if y.is_negative() { -quarter_turn } else { quarter_turn });
    }

    let principal = atan(&y.checked_div(x)?)?;
    if !x.is_negative() {
        return Ok(principal);
    }
    if y.is_negative() {
        Ok(principal - Real::pi())
    } else {
        Ok(principal + Real::pi())
    }
}
