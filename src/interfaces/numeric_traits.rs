// ============================================================================
// Numeric Traits Interface
// Capability records and the scalar contract used by generic algorithms
// ============================================================================

use crate::domain::Context;
use crate::engine::limits;
use crate::numeric::Real;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Per-type numeric limits and constants, looked up through plain function
/// pointers.
///
/// Generic code picks the record for its type at the call site
/// (`T::TRAITS`, or [`NumericTraits::REAL`] / [`NumericTraits::NATIVE`]
/// directly) and calls the hooks with the context it is working under.
pub struct NumericTraits<T> {
    /// Short type name for logging
    pub name: &'static str,

    /// Significand width in bits
    pub digits: fn(&Context) -> u32,

    /// Decimal digits guaranteed to round trip
    pub digits10: fn(&Context) -> u32,

    /// Smallest positive value
    pub min_value: fn(&Context) -> T,

    /// Largest finite value
    pub max_value: fn(&Context) -> T,

    /// ln(min_value)
    pub log_min_value: fn(&Context) -> T,

    /// ln(max_value)
    pub log_max_value: fn(&Context) -> T,

    /// Gap between one and the next representable value
    pub epsilon: fn(&Context) -> T,

    pub pi: fn(&Context) -> T,
    pub e: fn(&Context) -> T,
}

// Manual impls: fn pointers are Copy whatever T is.
impl<T> Clone for NumericTraits<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NumericTraits<T> {}

impl<T> fmt::Debug for NumericTraits<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericTraits")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl NumericTraits<Real> {
    /// Hooks for [`Real`], all following the context's working precision.
    pub const REAL: Self = Self {
        name: "Real",
        digits: limits::digits,
        digits10: limits::digits10,
        min_value: limits::min_value,
        max_value: limits::max_value,
        log_min_value: limits::log_min_value,
        log_max_value: limits::log_max_value,
        epsilon: limits::epsilon,
        pi: limits::pi,
        e: limits::e,
    };
}

impl NumericTraits<f64> {
    /// Hooks for `f64`; the context is ignored.
    pub const NATIVE: Self = Self {
        name: "f64",
        digits: native_digits,
        digits10: native_digits10,
        min_value: native_min_value,
        max_value: native_max_value,
        log_min_value: native_log_min_value,
        log_max_value: native_log_max_value,
        epsilon: native_epsilon,
        pi: native_pi,
        e: native_e,
    };
}

fn native_digits(_: &Context) -> u32 {
    f64::MANTISSA_DIGITS
}

fn native_digits10(_: &Context) -> u32 {
    f64::DIGITS
}

fn native_min_value(_: &Context) -> f64 {
    f64::MIN_POSITIVE
}

fn native_max_value(_: &Context) -> f64 {
    f64::MAX
}

fn native_log_min_value(_: &Context) -> f64 {
    f64::MIN_POSITIVE.ln()
}

fn native_log_max_value(_: &Context) -> f64 {
    f64::MAX.ln()
}

fn native_epsilon(_: &Context) -> f64 {
    f64::EPSILON
}

fn native_pi(_: &Context) -> f64 {
    std::f64::consts::PI
}

fn native_e(_: &Context) -> f64 {
    std::f64::consts::E
}

// ============================================================================
// Root Scalar
// ============================================================================

/// What the root finders need from a number type.
pub trait RootScalar:
    Clone
    + PartialOrd
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Capability record for this type
    const TRAITS: NumericTraits<Self>;

    /// Nearest value to a native double. Infinities saturate, NaN maps to zero.
    fn from_f64(value: f64) -> Self;

    fn abs(&self) -> Self;

    fn is_zero(&self) -> bool;

    /// Largest finite value under the active context.
    fn max_value() -> Self;

    /// Exactly `2^n`.
    fn ldexp_one(n: i32) -> Self;
}

impl RootScalar for f64 {
    const TRAITS: NumericTraits<Self> = NumericTraits::NATIVE;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    #[inline]
    fn max_value() -> Self {
        f64::MAX
    }

    #[inline]
    fn ldexp_one(n: i32) -> Self {
        2f64.powi(n)
    }
}

impl RootScalar for Real {
    const TRAITS: NumericTraits<Self> = NumericTraits::REAL;

    fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Real::zero();
        }
        Real::from_f64(value).unwrap_or_else(|_| {
            let max = limits::max_value(&Context::current());
            if value < 0.0 {
                -max
            } else {
                max
            }
        })
    }

    fn abs(&self) -> Self {
        Real::abs(self)
    }

    fn is_zero(&self) -> bool {
        Real::is_zero(self)
    }

    fn max_value() -> Self {
        limits::max_value(&Context::current())
    }

    fn ldexp_one(n: i32) -> Self {
        Real::one().ldexp(i64::from(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_record() {
        let ctx = Context::default();
        let traits = NumericTraits::<f64>::NATIVE;
        assert_eq!((traits.digits)(&ctx), 53);
        assert_eq!((traits.digits10)(&ctx), 15);
        assert_eq!((traits.epsilon)(&ctx), f64::EPSILON);
        assert!(((traits.log_max_value)(&ctx) - 709.78).abs() < 0.01);
        assert_eq!(traits.name, "f64");
    }

    #[test]
    fn test_real_record_follows_context() {
        let traits = NumericTraits::<Real>::REAL;
        let low = Context::new(64);
        let high = Context::new(256);
        assert_eq!((traits.digits)(&low), 64);
        assert_eq!((traits.digits)(&high), 256);
        assert!((traits.epsilon)(&high) < (traits.epsilon)(&low));
    }

    #[test]
    fn test_record_resolved_through_trait() {
        fn digits_of<T: RootScalar>(ctx: &Context) -> u32 {
            (T::TRAITS.digits)(ctx)
        }
        let ctx = Context::new(200);
        assert_eq!(digits_of::<f64>(&ctx), 53);
        assert_eq!(digits_of::<Real>(&ctx), 200);
    }

    #[test]
    fn test_real_scalar_from_f64() {
        let _guard = Context::new(100).enter();
        assert_eq!(<Real as RootScalar>::from_f64(0.5), Real::from_f64(0.5).unwrap());
        assert_eq!(<Real as RootScalar>::from_f64(f64::NAN), Real::zero());
        assert_eq!(<Real as RootScalar>::from_f64(f64::INFINITY), <Real as RootScalar>::max_value());
        assert_eq!(<Real as RootScalar>::ldexp_one(-3), Real::from_f64(0.125).unwrap());
    }
}
