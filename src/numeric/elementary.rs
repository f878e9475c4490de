// ============================================================================
// Elementary Functions
// Base transcendental functions of the binary floating-point engine
// ============================================================================
//
// Every function takes the target precision explicitly and works internally
// with GUARD_BITS extra bits before rounding the final result once.

use super::big_float::{BigFloat, EXPONENT_LIMIT};
use super::errors::{NumericError, NumericResult};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// Extra working bits carried by every series evaluation.
const GUARD_BITS: u32 = 32;

// ============================================================================
// Fixed-Point Series
// ============================================================================

/// `sum_k s_k / ((2k+1) n^(2k+1))` scaled by `2^wp`, where `s_k` alternates in
/// sign for arctangent and stays positive for the hyperbolic arctangent.
fn inverse_series(n: u32, wp: u64, alternating: bool) -> BigInt {
    let n = BigInt::from(n);
    let n_squared = &n * &n;
    let mut power = (BigInt::one() << wp) / &n;
    let mut sum = BigInt::zero();
    let mut k: u64 = 0;
    while !power.is_zero() {
        let term = &power / BigInt::from(2 * k + 1);
        if alternating && k % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }
        power /= &n_squared;
        k += 1;
    }
    sum
}

/// π rounded to `prec` bits (Machin's formula).
pub fn pi(prec: u32) -> BigFloat {
    let wp = u64::from(prec) + u64::from(GUARD_BITS);
    let scaled = inverse_series(5, wp, true) * 16 - inverse_series(239, wp, true) * 4;
    BigFloat::with_precision(scaled, -(wp as i64), prec)
}

/// ln 2 rounded to `prec` bits (`2 atanh(1/3)`).
pub fn ln2(prec: u32) -> BigFloat {
    let wp = u64::from(prec) + u64::from(GUARD_BITS);
    let scaled = inverse_series(3, wp, false) * 2;
    BigFloat::with_precision(scaled, -(wp as i64), prec)
}

/// e rounded to `prec` bits (sum of 1/n!).
pub fn e(prec: u32) -> BigFloat {
    let wp = u64::from(prec) + u64::from(GUARD_BITS);
    let mut term = BigInt::one() << wp;
    let mut sum = term.clone();
    let mut n: u32 = 1;
    while !term.is_zero() {
        term /= n;
        sum += &term;
        n += 1;
    }
    BigFloat::with_precision(sum, -(wp as i64), prec)
}

/// Bits needed to hold `|n|` for an exponent multiplier.
fn bits_of(n: i64) -> u32 {
    64 - n.unsigned_abs().leading_zeros()
}

/// Whether `term` no longer affects a sum of magnitude `sum` at `wp` bits.
fn negligible(term: &BigFloat, sum: &BigFloat, wp: u32) -> bool {
    term.is_zero() || (!sum.is_zero() && term.top() < sum.top() - i64::from(wp) - 2)
}

// ============================================================================
// Exponential Family
// ============================================================================

/// e^x rounded to `prec` bits.
///
/// # Errors
/// `Overflow` or `Underflow` when the result leaves the exponent range.
pub fn exp(x: &BigFloat, prec: u32) -> NumericResult<BigFloat> {
    if x.is_zero() {
        return Ok(BigFloat::one());
    }
    if x.top() > 62 {
        return Err(if x.is_negative() {
            NumericError::Underflow
        } else {
            NumericError::Overflow
        });
    }

    // x = k ln2 + r with |r| <= ln2 / 2
    let k_bits = x.top().max(0) as u32 + 8;
    let coarse_ln2 = ln2(k_bits + 8);
    let k = x
        .div_nonzero(&coarse_ln2, k_bits + 8)
        .round_to_integer()
        .to_i64()
        .ok_or(NumericError::Overflow)?;
    if k > EXPONENT_LIMIT {
        return Err(NumericError::Overflow);
    }
    if k < -EXPONENT_LIMIT {
        return Err(NumericError::Underflow);
    }

    // Halve the reduced argument `halvings` times, then square back up.
    let halvings = (f64::from(prec).sqrt() as u32) / 2 + 4;
    let wp = prec + GUARD_BITS + halvings;
    let reduction_prec = wp + bits_of(k) + 8;
    let reduced = x.sub(
        &ln2(reduction_prec).mul(&BigFloat::from_i64(k), reduction_prec),
        reduction_prec,
    );
    let y = reduced.ldexp(-i64::from(halvings));

    let mut sum = BigFloat::one();
    let mut term = BigFloat::one();
    let mut n: u64 = 1;
    loop {
        term = term.mul(&y, wp).div_u64(n, wp);
        if negligible(&term, &sum, wp) {
            break;
        }
        sum = sum.add(&term, wp);
        n += 1;
    }
    for _ in 0..halvings {
        sum = sum.mul(&sum, wp);
    }
    Ok(sum.ldexp(k).round(prec))
}

/// e^x - 1 rounded to `prec` bits, accurate for small `x`.
///
/// # Errors
/// `Overflow` when e^x leaves the exponent range.
pub fn expm1(x: &BigFloat, prec: u32) -> NumericResult<BigFloat> {
    if x.is_zero() {
        return Ok(BigFloat::zero());
    }
    if x.top() <= -1 {
        let wp = prec + GUARD_BITS;
        let mut sum = x.clone();
        let mut term = x.clone();
        let mut n: u64 = 2;
        loop {
            term = term.mul(x, wp).div_u64(n, wp);
            if negligible(&term, &sum, wp) {
                break;
            }
            sum = sum.add(&term, wp);
            n += 1;
        }
        return Ok(sum.round(prec));
    }
    match exp(x, prec + GUARD_BITS) {
        Ok(value) => Ok(value.sub(&BigFloat::one(), prec)),
        Err(NumericError::Underflow) => Ok(BigFloat::from_i64(-1)),
        Err(err) => Err(err),
    }
}

// ============================================================================
// Logarithms
// ============================================================================

/// Natural logarithm rounded to `prec` bits.
///
/// # Errors
/// `Domain` for zero or negative input.
pub fn ln(x: &BigFloat, prec: u32) -> NumericResult<BigFloat> {
    if !x.is_positive() {
        return Err(NumericError::Domain);
    }
    if *x == BigFloat::one() {
        return Ok(BigFloat::zero());
    }

    // x = f 2^e with f in [11/16, 11/8)
    let (mut fraction, mut e) = x.frexp();
    if fraction < BigFloat::from_i64(11).ldexp(-4) {
        fraction = fraction.ldexp(1);
        e -= 1;
    }

    let wp = prec + GUARD_BITS + bits_of(e);
    let exact = wp.max(fraction.bit_length() as u32 + 2);
    let numerator = fraction.sub(&BigFloat::one(), exact);
    let denominator = fraction.add(&BigFloat::one(), exact);

    // ln f = 2 atanh(z), z = (f - 1) / (f + 1), |z| < 0.19
    let z = numerator.div_nonzero(&denominator, wp);
    let z_squared = z.mul(&z, wp);
    let mut sum = z.clone();
    let mut power = z;
    let mut k: u64 = 1;
    loop {
        power = power.mul(&z_squared, wp);
        let term = power.div_u64(2 * k + 1, wp);
        if negligible(&term, &sum, wp) {
            break;
        }
        sum = sum.add(&term, wp);
        k += 1;
    }
    let log_fraction = sum.ldexp(1);

    if e == 0 {
        return Ok(log_fraction.round(prec));
    }
    let scaled_ln2 = ln2(wp).mul(&BigFloat::from_i64(e), wp);
    Ok(log_fraction.add(&scaled_ln2, prec))
}

/// Base-10 logarithm rounded to `prec` bits.
///
/// # Errors
/// `Domain` for zero or negative input.
pub fn log10(x: &BigFloat, prec: u32) -> NumericResult<BigFloat> {
    let wp = prec + GUARD_BITS;
    let numerator = ln(x, wp)?;
    let denominator = ln(&BigFloat::from_i64(10), wp)?;
    Ok(numerator.div_nonzero(&denominator, prec))
}

// ============================================================================
// Trigonometry
// ============================================================================

/// Reduce `x` to `r` in about `[-π/4, π/4]` with `x = r + q π/2`; returns
/// `(r, q mod 4)`.
fn reduce_half_pi(x: &BigFloat, prec: u32) -> (BigFloat, u8) {
    if x.top() <= -1 {
        return (x.clone(), 0);
    }
    let magnitude_bits = x.top().max(0) as u32;
    let mut extra: u32 = 0;
    loop {
        let wp = prec + GUARD_BITS + magnitude_bits + extra;
        let half_pi = pi(wp).ldexp(-1);
        let quadrant = x.div_nonzero(&half_pi, magnitude_bits + 8).round_to_integer();
        let reduced = x.sub(&half_pi.mul(&BigFloat::from_bigint(quadrant.clone()), wp), wp);

        // Cancellation near a multiple of π/2 eats into the guard bits.
        let lost = if reduced.is_zero() {
            0
        } else {
            (-reduced.top()).max(0) as u32
        };
        if lost + 8 <= GUARD_BITS + extra || extra > prec {
            let q = quadrant.mod_floor(&BigInt::from(4)).to_u8().unwrap_or(0);
            return (reduced, q);
        }
        extra += lost;
    }
}

/// Taylor series of sin(r) for |r| <= 1.
fn sin_series(r: &BigFloat, wp: u32) -> BigFloat {
    let r_squared = r.mul(r, wp);
    let mut sum = r.clone();
    let mut term = r.clone();
    let mut n: u64 = 1;
    loop {
        term = term.mul(&r_squared, wp).div_u64((2 * n) * (2 * n + 1), wp).neg();
        if negligible(&term, &sum, wp) {
            break;
        }
        sum = sum.add(&term, wp);
        n += 1;
    }
    sum
}

/// Taylor series of cos(r) for |r| <= 1.
fn cos_series(r: &BigFloat, wp: u32) -> BigFloat {
    let r_squared = r.mul(r, wp);
    let mut sum = BigFloat::one();
    let mut term = BigFloat::one();
    let mut n: u64 = 1;
    loop {
        term = term.mul(&r_squared, wp).div_u64((2 * n - 1) * (2 * n), wp).neg();
        if negligible(&term, &sum, wp) {
            break;
        }
        sum = sum.add(&term, wp);
        n += 1;
    }
    sum
}

/// Sine rounded to `prec` bits.
pub fn sin(x: &BigFloat, prec: u32) -> BigFloat {
    if x.is_zero() {
        return BigFloat::zero();
    }
    let wp = prec + GUARD_BITS;
    let (r, quadrant) = reduce_half_pi(x, wp);
    let value = match quadrant {
        0 => sin_series(&r, wp),
        1 => cos_series(&r, wp),
        2 => sin_series(&r, wp).neg(),
        _ => cos_series(&r, wp).neg(),
    };
    value.round(prec)
}

/// Cosine rounded to `prec` bits.
pub fn cos(x: &BigFloat, prec: u32) -> BigFloat {
    if x.is_zero() {
        return BigFloat::one();
    }
    let wp = prec + GUARD_BITS;
    let (r, quadrant) = reduce_half_pi(x, wp);
    let value = match quadrant {
        0 => cos_series(&r, wp),
        1 => sin_series(&r, wp).neg(),
        2 => cos_series(&r, wp).neg(),
        _ => sin_series(&r, wp),
    };
    value.round(prec)
}

// ============================================================================
// Powers
// ============================================================================

/// `x^n` for an integer power, rounded to `prec` bits.
///
/// # Errors
/// `DivisionByZero` for zero raised to a negative power.
pub fn powi(x: &BigFloat, n: i64, prec: u32) -> NumericResult<BigFloat> {
    if n == 0 {
        return Ok(BigFloat::one());
    }
    let wp = prec + GUARD_BITS + bits_of(n);
    let magnitude = x.powu(n.unsigned_abs(), wp);
    if n > 0 {
        Ok(magnitude.round(prec))
    } else {
        BigFloat::one().div(&magnitude, prec)
    }
}

/// `x^y` rounded to `prec` bits.
///
/// Integral exponents use repeated squaring and accept negative bases; other
/// exponents go through `exp(y ln x)`.
///
/// # Errors
/// `Domain` for a negative base with a fractional exponent, `DivisionByZero`
/// for zero raised to a negative power, `Overflow`/`Underflow` from `exp`.
pub fn pow(x: &BigFloat, y: &BigFloat, prec: u32) -> NumericResult<BigFloat> {
    if y.is_integer() && y.top() <= 62 {
        if let Some(n) = y.to_i128().and_then(|n| i64::try_from(n).ok()) {
            return powi(x, n, prec);
        }
    }
    if x.is_zero() {
        return if y.is_positive() {
            Ok(BigFloat::zero())
        } else {
            Err(NumericError::DivisionByZero)
        };
    }
    if x.is_negative() {
        return Err(NumericError::Domain);
    }

    let wp = prec + GUARD_BITS;
    let coarse = y.mul(&ln(x, 64)?, 64);
    let extra = coarse.top().max(0) as u32;
    let exponent = y.mul(&ln(x, wp + extra)?, wp + extra);
    exp(&exponent, prec)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PREC: u32 = 150;

    fn close(actual: &BigFloat, expected: &BigFloat, bits: u32) -> bool {
        let diff = actual.sub(expected, PREC * 2).abs();
        if diff.is_zero() {
            return true;
        }
        let scale = if expected.is_zero() { 1 } else { expected.top() };
        diff.top() <= scale - i64::from(bits)
    }

    fn parse(text: &str) -> BigFloat {
        BigFloat::parse(text, PREC).unwrap()
    }

    #[test]
    fn test_pi() {
        let expected = parse("3.14159265358979323846264338327950288419716939937510582097494459");
        assert!(close(&pi(PREC), &expected, PREC - 1));
        assert_eq!(pi(53).to_f64(), std::f64::consts::PI);
    }

    #[test]
    fn test_ln2() {
        let expected = parse("0.693147180559945309417232121458176568075500134360255254120680009");
        assert!(close(&ln2(PREC), &expected, PREC - 1));
    }

    #[test]
    fn test_e_matches_exp_one() {
        let expected = exp(&BigFloat::one(), PREC).unwrap();
        assert!(close(&e(PREC), &expected, PREC - 2));
        assert_eq!(e(53).to_f64(), std::f64::consts::E);
    }

    #[test]
    fn test_exp() {
        let e = parse("2.71828182845904523536028747135266249775724709369995957496696763");
        assert!(close(&exp(&BigFloat::one(), PREC).unwrap(), &e, PREC - 2));
        assert_eq!(exp(&BigFloat::zero(), PREC).unwrap(), BigFloat::one());

        let inverse = exp(&BigFloat::from_i64(-1), PREC).unwrap();
        let product = inverse.mul(&exp(&BigFloat::one(), PREC).unwrap(), PREC);
        assert!(close(&product, &BigFloat::one(), PREC - 4));
    }

    #[test]
    fn test_exp_range() {
        let huge = BigFloat::one().ldexp(70);
        assert_eq!(exp(&huge, PREC), Err(NumericError::Overflow));
        assert_eq!(exp(&huge.neg(), PREC), Err(NumericError::Underflow));

        let big = exp(&BigFloat::from_i64(1000), PREC).unwrap();
        assert_eq!(big.to_decimal_string(10), "1.970071114e434");
    }

    #[test]
    fn test_expm1_small_argument() {
        let x = BigFloat::one().ldexp(-80);
        let value = expm1(&x, PREC).unwrap();
        // expm1(x) = x + x^2/2 + ...
        let expected = x.add(&x.mul(&x, PREC).ldexp(-1), PREC);
        assert!(close(&value, &expected, PREC - 2));

        let large = expm1(&BigFloat::from_i64(2), PREC).unwrap();
        let direct = exp(&BigFloat::from_i64(2), PREC).unwrap().sub(&BigFloat::one(), PREC);
        assert!(close(&large, &direct, PREC - 2));
    }

    #[test]
    fn test_ln() {
        assert_eq!(ln(&BigFloat::one(), PREC).unwrap(), BigFloat::zero());
        assert!(close(&ln(&BigFloat::from_i64(2), PREC).unwrap(), &ln2(PREC), PREC - 2));
        assert_eq!(ln(&BigFloat::zero(), PREC), Err(NumericError::Domain));
        assert_eq!(ln(&BigFloat::from_i64(-3), PREC), Err(NumericError::Domain));

        let ten = parse("2.30258509299404568401799145468436420760110148862877297603332790");
        assert!(close(&ln(&BigFloat::from_i64(10), PREC).unwrap(), &ten, PREC - 2));
    }

    #[test]
    fn test_ln_exp_inverse() {
        let x = parse("0.3");
        let round_trip = ln(&exp(&x, PREC).unwrap(), PREC).unwrap();
        assert!(close(&round_trip, &x, PREC - 4));
    }

    #[test]
    fn test_log10() {
        let value = log10(&BigFloat::from_i64(1000), PREC).unwrap();
        assert!(close(&value, &BigFloat::from_i64(3), PREC - 2));
    }

    #[test]
    fn test_sin_cos() {
        assert_eq!(sin(&BigFloat::zero(), PREC), BigFloat::zero());
        assert_eq!(cos(&BigFloat::zero(), PREC), BigFloat::one());

        let one = BigFloat::one();
        let sin1 = parse("0.841470984807896506652502321630298999622563060798371065672751709");
        let cos1 = parse("0.540302305868139717400936607442976603732310420617922227670097255");
        assert!(close(&sin(&one, PREC), &sin1, PREC - 2));
        assert!(close(&cos(&one, PREC), &cos1, PREC - 2));
    }

    #[test]
    fn test_sin_cos_quadrants() {
        let half_pi = pi(PREC + 20).ldexp(-1);
        assert!(close(&sin(&half_pi, PREC), &BigFloat::one(), PREC - 2));
        let p = pi(PREC + 20);
        assert!(close(&cos(&p, PREC), &BigFloat::from_i64(-1), PREC - 2));

        let x = BigFloat::from_i64(10);
        let s = sin(&x, PREC);
        let c = cos(&x, PREC);
        let identity = s.mul(&s, PREC).add(&c.mul(&c, PREC), PREC);
        assert!(close(&identity, &BigFloat::one(), PREC - 4));
        assert!(s.is_negative());
        assert!(c.is_negative());
    }

    #[test]
    fn test_sin_near_multiple_of_pi() {
        // sin(π rounded to 150 bits) is the rounding error of π itself.
        let p = pi(PREC);
        let tiny = sin(&p, PREC);
        let error = pi(PREC * 2).sub(&p, PREC * 2);
        assert!(close(&tiny, &error, PREC - 8));
    }

    #[test]
    fn test_powi() {
        assert_eq!(powi(&BigFloat::from_i64(2), 10, PREC).unwrap(), BigFloat::from_i64(1024));
        assert_eq!(powi(&BigFloat::from_i64(2), -2, PREC).unwrap(), BigFloat::one().ldexp(-2));
        assert_eq!(powi(&BigFloat::from_i64(-3), 3, PREC).unwrap(), BigFloat::from_i64(-27));
        assert_eq!(powi(&BigFloat::zero(), -1, PREC), Err(NumericError::DivisionByZero));
    }

    #[test]
    fn test_pow() {
        let two = BigFloat::from_i64(2);
        let half = BigFloat::one().ldexp(-1);
        let root = pow(&two, &half, PREC).unwrap();
        assert!(close(&root, &two.sqrt(PREC).unwrap(), PREC - 4));
        assert_eq!(pow(&BigFloat::from_i64(-2), &half, PREC), Err(NumericError::Domain));
        assert_eq!(pow(&BigFloat::zero(), &half, PREC).unwrap(), BigFloat::zero());
        assert_eq!(pow(&BigFloat::from_i64(-2), &BigFloat::from_i64(3), PREC).unwrap(), BigFloat::from_i64(-8));
    }
}
