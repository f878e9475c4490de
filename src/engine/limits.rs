// ============================================================================
// Numeric Limits
// Digit counts, extremes, epsilon and constants for Real
// ============================================================================

use crate::domain::Context;
use crate::numeric::{elementary, BigFloat, Real, EXPONENT_LIMIT};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Binary exponent beyond which the engine treats results as overflowing.
pub const OVERFLOW_BOUND: i64 = EXPONENT_LIMIT;

/// Exponent headroom kept below the overflow bound for the extremes.
const EXTREME_MARGIN: i64 = 20;

static MAX_VALUE: OnceLock<Real> = OnceLock::new();
static MIN_VALUE: OnceLock<Real> = OnceLock::new();

// ln(max_value), keyed by the precision it was computed at
static LOG_MAX_CACHE: Mutex<BTreeMap<u32, Real>> = Mutex::new(BTreeMap::new());

pub fn digits(ctx: &Context) -> u32 {
    ctx.precision()
}

pub fn digits10(ctx: &Context) -> u32 {
    ctx.digits10()
}

/// `2^(OVERFLOW_BOUND - 20)`. Exact, so independent of the precision.
pub fn max_value(_ctx: &Context) -> Real {
    MAX_VALUE
        .get_or_init(|| Real::one().ldexp(OVERFLOW_BOUND - EXTREME_MARGIN))
        .clone()
}

/// `2^-(OVERFLOW_BOUND - 20)`.
pub fn min_value(_ctx: &Context) -> Real {
    MIN_VALUE
        .get_or_init(|| Real::one().ldexp(-(OVERFLOW_BOUND - EXTREME_MARGIN)))
        .clone()
}

/// `ln(max_value)` at the context's precision.
pub fn log_max_value(ctx: &Context) -> Real {
    let prec = ctx.precision();
    let mut cache = LOG_MAX_CACHE.lock();
    if let Some(cached) = cache.get(&prec) {
        return cached.clone();
    }

    let value = elementary::ln2(prec).mul(
        &BigFloat::from_i64(OVERFLOW_BOUND - EXTREME_MARGIN),
        prec,
    );
    let value = Real::from_big_float(value);
    tracing::debug!(precision = prec, "cached log of largest value");
    cache.insert(prec, value.clone());
    value
}

/// `ln(min_value)`, the negation of [`log_max_value`].
pub fn log_min_value(ctx: &Context) -> Real {
    -log_max_value(ctx)
}

/// `2^(1 - digits)`.
pub fn epsilon(ctx: &Context) -> Real {
    Real::one().ldexp(1 - i64::from(digits(ctx)))
}

/// π at the context's precision. Not cached.
pub fn pi(ctx: &Context) -> Real {
    Real::from_big_float(elementary::pi(ctx.precision()))
}

/// e at the context's precision. Not cached.
pub fn e(ctx: &Context) -> Real {
    Real::from_big_float(elementary::e(ctx.precision()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_follow_context() {
        assert_eq!(digits(&Context::new(80)), 80);
        assert_eq!(digits(&Context::new(300)), 300);
        assert_eq!(digits10(&Context::new(300)), 90);
    }

    #[test]
    fn test_extremes() {
        let ctx = Context::default();
        let max = max_value(&ctx);
        let min = min_value(&ctx);
        assert_eq!(max.exponent(), OVERFLOW_BOUND - 20);
        assert_eq!(min.exponent(), -(OVERFLOW_BOUND - 20));
        assert_eq!(&max * &min, Real::one());
    }

    #[test]
    fn test_log_extremes_cached_per_precision() {
        let low = Context::new(64);
        let high = Context::new(200);
        let a = log_max_value(&low);
        let b = log_max_value(&high);
        assert!(b.value().bit_length() > a.value().bit_length());
        assert_eq!(log_max_value(&low), a);
        assert_eq!(log_min_value(&high), -b.clone());

        // (2^60 - 20) * ln 2
        let _guard = high.enter();
        let approx = b.to_f64();
        assert!((approx / 7.991_442_903_251_659_6e17 - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_epsilon() {
        let ctx = Context::new(100);
        assert_eq!(epsilon(&ctx), Real::one().ldexp(-99));
        let _guard = ctx.enter();
        let one_plus = Real::one() + epsilon(&ctx);
        assert_ne!(one_plus, Real::one());
        let one_plus_half = Real::one() + epsilon(&ctx).ldexp(-1);
        // ties to even
        assert_eq!(one_plus_half, Real::one());
    }

    #[test]
    fn test_constants_track_precision() {
        let low = pi(&Context::new(60));
        let high = pi(&Context::new(240));
        assert!(low.value().bit_length() <= 60);
        assert!(high.value().bit_length() > 200);
        assert!((high.to_f64() - std::f64::consts::PI).abs() < 1e-15);
        assert!((e(&Context::new(120)).to_f64() - std::f64::consts::E).abs() < 1e-15);
    }
}
