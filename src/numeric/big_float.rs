// ============================================================================
// Binary Floating Point
// Arbitrary-precision mantissa × 2^exponent with explicit rounding precision
// ============================================================================

use super::errors::{NumericError, NumericResult};
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Arbitrary-precision binary floating-point value.
///
/// Represents `mantissa × 2^exponent`. The representation is normalized: the
/// mantissa is either zero (with exponent 0) or odd, so two values are equal
/// exactly when their fields are equal.
///
/// Every rounding operation takes the target precision in bits and rounds to
/// nearest, ties to even. Values are never rounded after the fact, so a value
/// keeps whatever precision it was produced with.
///
/// # Example
/// ```
/// use bigreal::numeric::BigFloat;
///
/// let third = BigFloat::from_i64(1).div(&BigFloat::from_i64(3), 64).unwrap();
/// let back = third.mul(&BigFloat::from_i64(3), 64);
/// assert_eq!(back, BigFloat::one());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigFloat {
    mantissa: BigInt,
    exponent: i64,
}

/// Round `magnitude / 2^shift` to the nearest integer, ties to even.
fn shift_round_half_even(magnitude: &BigUint, shift: u64) -> BigUint {
    if shift == 0 {
        return magnitude.clone();
    }
    let mut kept = magnitude >> shift;
    let dropped = magnitude - (&kept << shift);
    let half = BigUint::one() << (shift - 1);
    match dropped.cmp(&half) {
        Ordering::Greater => kept += 1u32,
        Ordering::Equal if kept.is_odd() => kept += 1u32,
        _ => {},
    }
    kept
}

/// Round `numerator / denominator` to the nearest integer, ties to even.
fn ratio_round_half_even(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    let (mut quotient, remainder) = numerator.div_rem(denominator);
    let twice = remainder << 1u32;
    match twice.cmp(denominator) {
        Ordering::Greater => quotient += 1u32,
        Ordering::Equal if quotient.is_odd() => quotient += 1u32,
        _ => {},
    }
    quotient
}

/// Binary exponent bound of the representable range. Values whose leading
/// bit lies beyond `±EXPONENT_LIMIT` overflow or underflow; exponent
/// arithmetic inside the engine saturates instead of wrapping.
pub const EXPONENT_LIMIT: i64 = 1 << 60;

/// Largest decimal scaling handled with exact integer arithmetic when formatting.
const EXACT_FORMAT_LIMIT: u64 = 1 << 16;

/// floor(log10(2)) scaled by 10^15.
const LOG10_2_SCALED: i128 = 301_029_995_663_981;

impl BigFloat {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Zero.
    pub fn zero() -> Self {
        Self {
            mantissa: BigInt::zero(),
            exponent: 0,
        }
    }

    /// One.
    pub fn one() -> Self {
        Self {
            mantissa: BigInt::one(),
            exponent: 0,
        }
    }

    /// Create the exact value `mantissa × 2^exponent`.
    pub fn from_parts(mantissa: BigInt, exponent: i64) -> Self {
        match mantissa.trailing_zeros() {
            None => Self::zero(),
            Some(0) => Self { mantissa, exponent },
            Some(tz) => Self {
                mantissa: mantissa >> tz,
                exponent: exponent.saturating_add(tz as i64),
            },
        }
    }

    /// Create `mantissa × 2^exponent` rounded to `prec` bits.
    pub fn with_precision(mantissa: BigInt, exponent: i64, prec: u32) -> Self {
        let prec = u64::from(prec.max(1));
        let bits = mantissa.bits();
        if bits <= prec {
            return Self::from_parts(mantissa, exponent);
        }
        let shift = bits - prec;
        let (sign, magnitude) = mantissa.into_parts();
        let kept = shift_round_half_even(&magnitude, shift);
        Self::from_parts(
            BigInt::from_biguint(sign, kept),
            exponent.saturating_add(shift as i64),
        )
    }

    /// Exact conversion from a native integer.
    pub fn from_i64(value: i64) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }

    /// Exact conversion from an unsigned native integer.
    pub fn from_u64(value: u64) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }

    /// Exact conversion from a finite `f64`.
    pub fn from_f64_exact(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let (mantissa, exponent, sign) = num_traits::Float::integer_decode(value);
        Some(Self::from_parts(
            BigInt::from(sign) * BigInt::from(mantissa),
            i64::from(exponent),
        ))
    }

    /// Exact conversion from an arbitrary-precision integer.
    pub fn from_bigint(value: BigInt) -> Self {
        Self::from_parts(value, 0)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The (odd or zero) mantissa.
    #[inline]
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// The binary exponent.
    #[inline]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Number of significant bits in the mantissa.
    #[inline]
    pub fn bit_length(&self) -> u64 {
        self.mantissa.bits()
    }

    /// Position just above the leading bit: `2^(top-1) <= |x| < 2^top`.
    ///
    /// Zero reports `i64::MIN`.
    #[inline]
    pub fn top(&self) -> i64 {
        if self.is_zero() {
            i64::MIN
        } else {
            self.exponent.saturating_add(self.mantissa.bits() as i64)
        }
    }

    /// Whether the leading bit lies inside `±EXPONENT_LIMIT`. Zero is in range.
    pub fn in_exponent_range(&self) -> bool {
        self.is_zero() || (-EXPONENT_LIMIT..=EXPONENT_LIMIT).contains(&self.top())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.mantissa.is_positive()
    }

    /// -1, 0 or 1.
    #[inline]
    pub fn signum(&self) -> i32 {
        match self.mantissa.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    /// Whether the value has no fractional part.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.exponent >= 0
    }

    /// Round to `prec` bits.
    pub fn round(&self, prec: u32) -> Self {
        if self.mantissa.bits() <= u64::from(prec.max(1)) {
            return self.clone();
        }
        Self::with_precision(self.mantissa.clone(), self.exponent, prec)
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    pub fn neg(&self) -> Self {
        Self {
            mantissa: -&self.mantissa,
            exponent: self.exponent,
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// `self + other` rounded to `prec` bits.
    pub fn add(&self, other: &Self, prec: u32) -> Self {
        if self.is_zero() {
            return other.round(prec);
        }
        if other.is_zero() {
            return self.round(prec);
        }
        let (big, small) = if self.top() >= other.top() {
            (self, other)
        } else {
            (other, self)
        };

        // An operand entirely below the rounding position of the result only
        // matters through its sign; replace it by a sticky bit so the
        // alignment shift stays bounded.
        let floor_pos = big.exponent.min(big.top() - i64::from(prec) - 2) - 1;
        let sticky;
        let small = if small.top() <= floor_pos {
            sticky = Self {
                mantissa: BigInt::from(small.signum()),
                exponent: floor_pos - 1,
            };
            &sticky
        } else {
            small
        };

        let base = big.exponent.min(small.exponent);
        let lhs = &big.mantissa << (big.exponent - base) as u64;
        let rhs = &small.mantissa << (small.exponent - base) as u64;
        Self::with_precision(lhs + rhs, base, prec)
    }

    /// `self - other` rounded to `prec` bits.
    pub fn sub(&self, other: &Self, prec: u32) -> Self {
        self.add(&other.neg(), prec)
    }

    /// `self × other` rounded to `prec` bits.
    pub fn mul(&self, other: &Self, prec: u32) -> Self {
        Self::with_precision(
            &self.mantissa * &other.mantissa,
            self.exponent.saturating_add(other.exponent),
            prec,
        )
    }

    /// `self ÷ other` rounded to `prec` bits.
    ///
    /// # Errors
    /// Returns `DivisionByZero` if `other` is zero.
    pub fn div(&self, other: &Self, prec: u32) -> NumericResult<Self> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(self.div_nonzero(other, prec))
    }

    /// Division by a divisor known to be nonzero.
    pub(crate) fn div_nonzero(&self, other: &Self, prec: u32) -> Self {
        debug_assert!(!other.is_zero());
        if self.is_zero() {
            return Self::zero();
        }
        // The quotient needs prec + 2 bits plus a sticky bit.
        let shift =
            (i64::from(prec) + 2 + other.bit_length() as i64 - self.bit_length() as i64).max(0);
        let numerator = self.mantissa.magnitude() << shift as u64;
        let (mut quotient, remainder) = numerator.div_rem(other.mantissa.magnitude());
        let mut exponent = self
            .exponent
            .saturating_sub(shift)
            .saturating_sub(other.exponent);
        if !remainder.is_zero() {
            quotient = (quotient << 1u32) + 1u32;
            exponent -= 1;
        }
        let sign = if self.is_negative() != other.is_negative() {
            Sign::Minus
        } else {
            Sign::Plus
        };
        Self::with_precision(BigInt::from_biguint(sign, quotient), exponent, prec)
    }

    /// Division by a small positive integer.
    pub(crate) fn div_u64(&self, divisor: u64, prec: u32) -> Self {
        self.div_nonzero(&Self::from_u64(divisor.max(1)), prec)
    }

    /// Square root rounded to `prec` bits.
    ///
    /// # Errors
    /// Returns `Domain` for negative input.
    pub fn sqrt(&self, prec: u32) -> NumericResult<Self> {
        if self.is_negative() {
            return Err(NumericError::Domain);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let target = 2 * (i64::from(prec) + 2);
        let mut shift = (target - self.bit_length() as i64).max(0);
        if self.exponent.saturating_sub(shift).rem_euclid(2) != 0 {
            shift += 1;
        }
        let radicand = self.mantissa.magnitude() << shift as u64;
        let mut root = radicand.sqrt();
        let mut exponent = self.exponent.saturating_sub(shift) / 2;
        if &root * &root != radicand {
            root = (root << 1u32) + 1u32;
            exponent -= 1;
        }
        Ok(Self::with_precision(BigInt::from(root), exponent, prec))
    }

    /// `self^n` for a non-negative integer power, rounded to `prec` bits.
    pub fn powu(&self, mut n: u64, prec: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base, prec);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(&base, prec);
            }
        }
        result
    }

    /// Exact multiplication by `2^n`.
    #[inline]
    pub fn ldexp(&self, n: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            mantissa: self.mantissa.clone(),
            exponent: self.exponent.saturating_add(n),
        }
    }

    /// Split into a fraction with `0.5 <= |f| < 1` and a binary exponent.
    pub fn frexp(&self) -> (Self, i64) {
        if self.is_zero() {
            return (Self::zero(), 0);
        }
        let top = self.top();
        (self.ldexp(-top), top)
    }

    // ========================================================================
    // Integer Rounding
    // ========================================================================

    /// Largest integer not greater than the value.
    pub fn floor(&self) -> Self {
        if self.is_integer() {
            return self.clone();
        }
        if self.top() <= 0 {
            return if self.is_negative() {
                Self::from_i64(-1)
            } else {
                Self::zero()
            };
        }
        let divisor = BigInt::one() << (-self.exponent) as u64;
        Self::from_bigint(self.mantissa.div_floor(&divisor))
    }

    /// Smallest integer not less than the value.
    pub fn ceil(&self) -> Self {
        self.neg().floor().neg()
    }

    /// Integer part, rounding toward zero.
    pub fn trunc(&self) -> Self {
        if self.is_negative() {
            self.ceil()
        } else {
            self.floor()
        }
    }

    /// Nearest integer, ties to even.
    pub fn round_to_integer(&self) -> BigInt {
        if self.is_zero() {
            return BigInt::zero();
        }
        if self.exponent >= 0 {
            return &self.mantissa << self.exponent as u64;
        }
        if self.top() < 0 {
            return BigInt::zero();
        }
        let magnitude = shift_round_half_even(self.mantissa.magnitude(), (-self.exponent) as u64);
        BigInt::from_biguint(self.mantissa.sign(), magnitude)
    }

    // ========================================================================
    // Native Conversions
    // ========================================================================

    /// Nearest `f64`; saturates to ±infinity and flushes to zero outside the range.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let rounded = self.round(53);
        let mantissa = rounded.mantissa.to_f64().unwrap_or(0.0);
        ldexp_f64(mantissa, rounded.exponent)
    }

    /// Integer part as an `i128`, or `None` when it does not fit.
    pub fn to_i128(&self) -> Option<i128> {
        self.to_bigint_checked(128)?.to_i128()
    }

    /// Integer part as an arbitrary-precision integer, if it has at most
    /// `max_bits` bits.
    pub fn to_bigint_checked(&self, max_bits: i64) -> Option<BigInt> {
        let truncated = self.trunc();
        if truncated.is_zero() {
            return Some(BigInt::zero());
        }
        if truncated.top() > max_bits {
            return None;
        }
        Some(&truncated.mantissa << truncated.exponent as u64)
    }

    // ========================================================================
    // Decimal Text
    // ========================================================================

    /// Decimal representation with `digits` significant digits.
    ///
    /// Values whose decimal exponent lies in `[-5, digits)` print in plain
    /// notation, others as `d.ddde±x`. Trailing zeros are removed.
    pub fn to_decimal_string(&self, digits: usize) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let digits = digits.max(1);
        let upper = num_traits::pow(BigUint::from(10u32), digits);
        let lower = num_traits::pow(BigUint::from(10u32), digits - 1);

        let mut exp10 = self.decimal_exponent_estimate();
        let mut scaled = self.scaled_decimal(digits as i64 - 1 - exp10, digits);
        for _ in 0..4 {
            if scaled >= upper {
                exp10 += 1;
            } else if scaled < lower {
                exp10 -= 1;
            } else {
                break;
            }
            scaled = self.scaled_decimal(digits as i64 - 1 - exp10, digits);
        }

        let text = scaled.to_string();
        let significant = text.trim_end_matches('0');
        let significant = if significant.is_empty() { "0" } else { significant };
        let sign = if self.is_negative() { "-" } else { "" };

        if (-5..digits as i64).contains(&exp10) {
            if exp10 >= 0 {
                let int_len = exp10 as usize + 1;
                if significant.len() <= int_len {
                    format!("{}{:0<width$}", sign, significant, width = int_len)
                } else {
                    let (int_part, frac_part) = significant.split_at(int_len);
                    format!("{}{}.{}", sign, int_part, frac_part)
                }
            } else {
                let zeros = "0".repeat((-exp10 - 1) as usize);
                format!("{}0.{}{}", sign, zeros, significant)
            }
        } else {
            let (lead, rest) = significant.split_at(1);
            if rest.is_empty() {
                format!("{}{}e{}", sign, lead, exp10)
            } else {
                format!("{}{}.{}e{}", sign, lead, rest, exp10)
            }
        }
    }

    /// Lower estimate of floor(log10|x|), off by at most one.
    fn decimal_exponent_estimate(&self) -> i64 {
        let bits_below = i128::from(self.top() - 1);
        (bits_below * LOG10_2_SCALED).div_euclid(1_000_000_000_000_000) as i64
    }

    /// round(|x| × 10^scale) as an integer.
    fn scaled_decimal(&self, scale: i64, digits: usize) -> BigUint {
        let magnitude = self.mantissa.magnitude();
        let exact_cost = self
            .exponent
            .unsigned_abs()
            .saturating_add(scale.unsigned_abs().saturating_mul(4));
        if exact_cost < EXACT_FORMAT_LIMIT {
            let pow10 = num_traits::pow(BigUint::from(10u32), scale.unsigned_abs() as usize);
            let mut numerator = magnitude.clone();
            let mut denominator = BigUint::one();
            if scale >= 0 {
                numerator *= pow10;
            } else {
                denominator *= pow10;
            }
            if self.exponent >= 0 {
                numerator <<= self.exponent as u64;
            } else {
                denominator <<= (-self.exponent) as u64;
            }
            return ratio_round_half_even(&numerator, &denominator);
        }

        // Extreme exponents: scale in floating point with generous guard bits.
        let wp = (digits as u32).saturating_mul(4).saturating_add(64);
        let power = Self::from_u64(10).powu(scale.unsigned_abs(), wp);
        let scaled = if scale >= 0 {
            self.abs().mul(&power, wp)
        } else {
            self.abs().div_nonzero(&power, wp)
        };
        scaled.round_to_integer().into_parts().1
    }

    /// Parse `[+-]digits[.digits][(e|E)[+-]digits]`, rounding to `prec` bits.
    ///
    /// # Errors
    /// Returns `InvalidInput` for anything else, `Overflow`/`Underflow` when
    /// the value lies outside the exponent range.
    pub fn parse(text: &str, prec: u32) -> NumericResult<Self> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (number, exp_text) = match body.find(['e', 'E']) {
            Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
            None => (body, None),
        };
        let (int_text, frac_text) = match number.find('.') {
            Some(pos) => (&number[..pos], &number[pos + 1..]),
            None => (number, ""),
        };

        if int_text.is_empty() && frac_text.is_empty() {
            return Err(NumericError::InvalidInput);
        }
        if !int_text.bytes().chain(frac_text.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(NumericError::InvalidInput);
        }

        let exp10 = match exp_text {
            Some(e) => parse_exponent(e)?,
            None => 0,
        };
        let exp10 = exp10.saturating_sub(frac_text.len() as i64);

        let all_digits = format!("{}{}", int_text, frac_text);
        let digits: BigUint = all_digits
            .parse()
            .map_err(|_| NumericError::InvalidInput)?;
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        let integer = Self::from_bigint(BigInt::from_biguint(sign, digits));
        if integer.is_zero() {
            return Ok(Self::zero());
        }

        // Reject decimal exponents whose binary counterpart is certainly
        // out of range before building the power of ten.
        if exp10 > DECIMAL_EXPONENT_LIMIT {
            return Err(NumericError::Overflow);
        }
        if exp10.saturating_add(decimal_digits_upper(integer.top())) < -DECIMAL_EXPONENT_LIMIT {
            return Err(NumericError::Underflow);
        }

        let scale = exp10.unsigned_abs();
        let power = if scale < EXACT_FORMAT_LIMIT {
            Self::from_bigint(BigInt::from(num_traits::pow(
                BigUint::from(10u32),
                scale as usize,
            )))
        } else {
            Self::from_u64(10).powu(scale, prec.saturating_add(64))
        };

        let value = if exp10 >= 0 {
            integer.mul(&power, prec)
        } else {
            integer.div_nonzero(&power, prec)
        };
        match value.top() {
            top if top > EXPONENT_LIMIT => Err(NumericError::Overflow),
            top if top < -EXPONENT_LIMIT => Err(NumericError::Underflow),
            _ => Ok(value),
        }
    }
}

/// Decimal exponent bound for parsing. `log2(10) > 3`, so a power of ten
/// past it is beyond `2^EXPONENT_LIMIT` whatever the digits.
const DECIMAL_EXPONENT_LIMIT: i64 = EXPONENT_LIMIT / 3;

/// Upper bound on the decimal digit count of an integer below `2^top`.
fn decimal_digits_upper(top: i64) -> i64 {
    top / 3 + 1
}

/// Exponent field of a decimal literal. Digit strings too long for an `i64`
/// saturate so the range check reports them as overflow or underflow.
fn parse_exponent(text: &str) -> NumericResult<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NumericError::InvalidInput);
    }
    Ok(match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}

/// Multiply by `2^exponent` in steps that keep the intermediate finite.
pub(crate) fn ldexp_f64(mut value: f64, mut exponent: i64) -> f64 {
    const STEP: i64 = 1000;
    while exponent > STEP && value.is_finite() {
        value *= 2f64.powi(STEP as i32);
        exponent -= STEP;
    }
    while exponent < -STEP && value != 0.0 {
        value *= 2f64.powi(-STEP as i32);
        exponent += STEP;
    }
    if exponent.unsigned_abs() > STEP as u64 {
        return value;
    }
    value * 2f64.powi(exponent as i32)
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for BigFloat {
    fn default() -> Self {
        Self::zero()
    }
}

impl Ord for BigFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        let (lhs_sign, rhs_sign) = (self.signum(), other.signum());
        if lhs_sign != rhs_sign {
            return lhs_sign.cmp(&rhs_sign);
        }
        if lhs_sign == 0 {
            return Ordering::Equal;
        }
        let magnitude = match self.top().cmp(&other.top()) {
            Ordering::Equal => {
                let base = self.exponent.min(other.exponent);
                let lhs = self.mantissa.magnitude() << (self.exponent - base) as u64;
                let rhs = other.mantissa.magnitude() << (other.exponent - base) as u64;
                lhs.cmp(&rhs)
            },
            ordering => ordering,
        };
        if lhs_sign < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigFloat({} * 2^{})", self.mantissa, self.exponent)
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(10);
        f.write_str(&self.to_decimal_string(digits))
    }
}

// ============================================================================
// Tests
// ============================================================================
