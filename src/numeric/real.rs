// ============================================================================
// Real
// Arbitrary-precision real number behind a generic numeric interface
// ============================================================================

use super::big_float::BigFloat;
use super::elementary;
use super::errors::{NumericError, NumericResult};
use crate::domain::Context;
use crate::engine::{hyperbolic, inverse_trig, limits};
use crate::utils::chunking::{float_chunks, int_chunks, INT_CHUNK_BITS};
use num_bigint::BigInt;
use num_traits::Bounded;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Arbitrary-precision real number.
///
/// Owns exactly one [`BigFloat`]; clones are deep. Every operation rounds to
/// the working precision of the active [`Context`] at the time it runs, so
/// changing the precision affects later operations only.
///
/// # Example
/// ```
/// use bigreal::domain::Context;
/// use bigreal::numeric::Real;
///
/// let _guard = Context::new(200).enter();
/// let third = Real::from(1) / Real::from(3);
/// let sum = &third + &third + &third;
/// assert_eq!(sum, Real::from(1));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Real {
    value: BigFloat,
}

#[inline]
fn working_precision() -> u32 {
    Context::current().precision()
}

impl Real {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::from_big_float(BigFloat::one())
    }

    /// Wrap an engine value without rounding.
    #[inline]
    pub fn from_big_float(value: BigFloat) -> Self {
        Self { value }
    }

    /// Build from a finite `f64`.
    ///
    /// # Errors
    /// Returns `Overflow` for infinities and NaN.
    pub fn from_f64(value: f64) -> NumericResult<Self> {
        Self::assign_large_real(value)
    }

    /// Build from a finite `f32`.
    ///
    /// # Errors
    /// Returns `Overflow` for infinities and NaN.
    pub fn from_f32(value: f32) -> NumericResult<Self> {
        Self::assign_large_real(value)
    }

    /// Accumulate 16-bit slices of the magnitude at their bit positions.
    fn assign_large_int(negative: bool, magnitude: u128) -> Self {
        let prec = working_precision();
        let mut accumulated = BigFloat::zero();
        for (index, chunk) in int_chunks(magnitude).into_iter().enumerate() {
            let shift = i64::from(INT_CHUNK_BITS) * index as i64;
            let term = BigFloat::from_u64(u64::from(chunk)).ldexp(shift);
            accumulated = accumulated.add(&term, prec);
        }
        if negative {
            accumulated = accumulated.neg();
        }
        Self::from_big_float(accumulated)
    }

    /// Accumulate 30-bit slices of the binary significand.
    fn assign_large_real<F: num_traits::Float>(value: F) -> NumericResult<Self> {
        if value.is_zero() {
            return Ok(Self::zero());
        }
        if value == F::one() {
            return Ok(Self::one());
        }
        if !value.is_finite() {
            return Err(NumericError::Overflow);
        }

        let prec = working_precision();
        let (mantissa, exponent, sign) = value.integer_decode();
        let mut accumulated = BigFloat::zero();
        for chunk in float_chunks(mantissa, i64::from(exponent)) {
            let term = BigFloat::from_parts(BigInt::from(chunk.bits), chunk.exponent);
            accumulated = accumulated.add(&term, prec);
        }
        if sign < 0 {
            accumulated = accumulated.neg();
        }
        Ok(Self::from_big_float(accumulated))
    }

    /// Convert from a decimal, rounding to the working precision.
    pub fn from_decimal(d: rust_decimal::Decimal) -> Self {
        let mantissa = BigFloat::from_bigint(BigInt::from(d.mantissa()));
        if d.scale() == 0 {
            return Self::from_big_float(mantissa.round(working_precision()));
        }
        let divisor = BigFloat::from_bigint(num_traits::pow(BigInt::from(10), d.scale() as usize));
        Self::from_big_float(mantissa.div_nonzero(&divisor, working_precision()))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The underlying engine value.
    #[inline]
    pub fn value(&self) -> &BigFloat {
        &self.value
    }

    #[inline]
    pub fn into_inner(self) -> BigFloat {
        self.value
    }

    #[inline]
    pub fn mantissa(&self) -> &BigInt {
        self.value.mantissa()
    }

    #[inline]
    pub fn exponent(&self) -> i64 {
        self.value.exponent()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    #[inline]
    pub fn signum(&self) -> i32 {
        self.value.signum()
    }

    // ========================================================================
    // Process-Wide Precision
    // ========================================================================

    /// Working precision of the active context, in bits.
    pub fn precision() -> u32 {
        working_precision()
    }

    /// Set the working precision of the process default context.
    pub fn set_precision(bits: u32) {
        Context::update_default(|ctx| ctx.set_precision(bits));
    }

    /// Significant digits printed by `Display` in the active context.
    pub fn output_precision() -> u32 {
        Context::current().output_precision()
    }

    /// Set the output precision of the process default context.
    pub fn set_output_precision(digits: u32) {
        Context::update_default(|ctx| ctx.set_output_precision(digits));
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64()
    }

    /// Nearest `f32`, rounded once from the full value.
    pub fn to_f32(&self) -> f32 {
        // Below 2^-126 the f32 spacing is fixed at 2^-149.
        const MIN_NORMAL_TOP: i64 = -125;
        const SUBNORMAL_SHIFT: i64 = 149;
        if self.value.top() >= MIN_NORMAL_TOP {
            // 24 bits convert to f64 exactly, and from there to f32 exactly
            // unless the value is past f32::MAX.
            return self.value.round(f32::MANTISSA_DIGITS).to_f64() as f32;
        }
        let units = self.value.ldexp(SUBNORMAL_SHIFT).round_to_integer();
        let units = num_traits::ToPrimitive::to_f64(&units).unwrap_or(0.0);
        (units * 2f64.powi(-(SUBNORMAL_SHIFT as i32))) as f32
    }

    /// Integer part, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Integer part, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.value.to_i128().and_then(|v| u64::try_from(v).ok())
    }

    /// Integer part, if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        self.value.to_i128()
    }

    /// Convert to `rust_decimal::Decimal`, keeping as many fractional digits
    /// as the 96-bit decimal mantissa allows.
    ///
    /// # Errors
    /// Returns `Overflow` if the integer part does not fit.
    pub fn to_decimal(&self) -> NumericResult<rust_decimal::Decimal> {
        const MAX_SCALE: u32 = 28;
        if self.is_zero() {
            return Ok(rust_decimal::Decimal::ZERO);
        }
        if self.value.top() > 96 {
            return Err(NumericError::Overflow);
        }
        let exact = self.value.bit_length() as u32 + 4 * MAX_SCALE + 8;
        for scale in (0..=MAX_SCALE).rev() {
            let factor = BigFloat::from_bigint(num_traits::pow(BigInt::from(10), scale as usize));
            let scaled = self.value.mul(&factor, exact).round_to_integer();
            if scaled.bits() > 96 {
                continue;
            }
            let Some(mantissa) = num_traits::ToPrimitive::to_i128(&scaled) else {
                continue;
            };
            return rust_decimal::Decimal::try_from_i128_with_scale(mantissa, scale)
                .map(|d| d.normalize())
                .map_err(|_| NumericError::Overflow);
        }
        Err(NumericError::Overflow)
    }

    /// Decimal text with enough digits to parse back to the same value at
    /// the working precision.
    pub fn to_round_trip_string(&self) -> String {
        let bits = self.value.bit_length().max(u64::from(working_precision()));
        let digits = (bits * 30_103 / 100_000) as usize + 3;
        self.value.to_decimal_string(digits)
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Checked division.
    ///
    /// # Errors
    /// Returns `DivisionByZero` if `rhs` is zero.
    pub fn checked_div(&self, rhs: &Real) -> NumericResult<Real> {
        self.value
            .div(&rhs.value, working_precision())
            .map(Self::from_big_float)
    }

    pub fn abs(&self) -> Real {
        Self::from_big_float(self.value.abs())
    }

    pub fn floor(&self) -> Real {
        Self::from_big_float(self.value.floor())
    }

    pub fn ceil(&self) -> Real {
        Self::from_big_float(self.value.ceil())
    }

    pub fn trunc(&self) -> Real {
        Self::from_big_float(self.value.trunc())
    }

    /// Fractional and integer parts, both with the sign of the value. The
    /// split is exact whatever the working precision.
    pub fn modf(&self) -> (Real, Real) {
        let integer = self.value.trunc();
        let exact = u32::try_from(self.value.bit_length()).unwrap_or(u32::MAX);
        let fraction = self.value.sub(&integer, exact);
        (Self::from_big_float(fraction), Self::from_big_float(integer))
    }

    /// Exact multiplication by `2^n`.
    pub fn ldexp(&self, n: i64) -> Real {
        Self::from_big_float(self.value.ldexp(n))
    }

    /// Fraction in `[0.5, 1)` (by magnitude) and binary exponent.
    pub fn frexp(&self) -> (Real, i64) {
        let (fraction, exponent) = self.value.frexp();
        (Self::from_big_float(fraction), exponent)
    }

    // ========================================================================
    // Base Functions (delegated to the engine)
    // ========================================================================

    /// # Errors
    /// Returns `Domain` for negative input.
    pub fn sqrt(&self) -> NumericResult<Real> {
        self.value.sqrt(working_precision()).map(Self::from_big_float)
    }

    /// # Errors
    /// Returns `Overflow`/`Underflow` beyond the exponent range.
    pub fn exp(&self) -> NumericResult<Real> {
        elementary::exp(&self.value, working_precision()).map(Self::from_big_float)
    }

    /// e^x - 1 without cancellation for small x.
    pub fn expm1(&self) -> NumericResult<Real> {
        elementary::expm1(&self.value, working_precision()).map(Self::from_big_float)
    }

    /// Natural logarithm.
    ///
    /// # Errors
    /// Returns `Domain` for zero or negative input.
    pub fn ln(&self) -> NumericResult<Real> {
        elementary::ln(&self.value, working_precision()).map(Self::from_big_float)
    }

    pub fn log10(&self) -> NumericResult<Real> {
        elementary::log10(&self.value, working_precision()).map(Self::from_big_float)
    }

    pub fn sin(&self) -> Real {
        Self::from_big_float(elementary::sin(&self.value, working_precision()))
    }

    pub fn cos(&self) -> Real {
        Self::from_big_float(elementary::cos(&self.value, working_precision()))
    }

    /// `sin(x) / cos(x)`.
    pub fn tan(&self) -> NumericResult<Real> {
        self.sin().checked_div(&self.cos())
    }

    pub fn pow(&self, exponent: &Real) -> NumericResult<Real> {
        elementary::pow(&self.value, &exponent.value, working_precision())
            .map(Self::from_big_float)
    }

    pub fn powi(&self, n: i64) -> NumericResult<Real> {
        elementary::powi(&self.value, n, working_precision()).map(Self::from_big_float)
    }

    // ========================================================================
    // Fallback Functions
    // ========================================================================

    pub fn asin(&self) -> NumericResult<Real> {
        inverse_trig::asin(self)
    }

    pub fn acos(&self) -> NumericResult<Real> {
        inverse_trig::acos(self)
    }

    pub fn atan(&self) -> NumericResult<Real> {
        inverse_trig::atan(self)
    }

    /// Angle of the point `(x, self)`.
    pub fn atan2(&self, x: &Real) -> NumericResult<Real> {
        inverse_trig::atan2(self, x)
    }

    pub fn sinh(&self) -> NumericResult<Real> {
        hyperbolic::sinh(self)
    }

    pub fn cosh(&self) -> NumericResult<Real> {
        hyperbolic::cosh(self)
    }

    pub fn tanh(&self) -> NumericResult<Real> {
        hyperbolic::tanh(self)
    }

    /// `self - floor(self / y) * y`.
    pub fn fmod(&self, y: &Real) -> NumericResult<Real> {
        hyperbolic::fmod(self, y)
    }

    // ========================================================================
    // Constants
    // ========================================================================

    /// π at the working precision, recomputed on every call.
    pub fn pi() -> Real {
        limits::pi(&Context::current())
    }

    /// e at the working precision, recomputed on every call.
    pub fn e() -> Real {
        limits::e(&Context::current())
    }
}

// ============================================================================
// Native Conversions
// ============================================================================

macro_rules! impl_from_small_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Real {
                #[inline]
                fn from(value: $t) -> Self {
                    Self::from_big_float(BigFloat::from_i64(i64::from(value)))
                }
            }
        )*
    };
}

macro_rules! impl_from_large_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Real {
                fn from(value: $t) -> Self {
                    let wide = value as i128;
                    Self::assign_large_int(wide < 0, wide.unsigned_abs())
                }
            }
        )*
    };
}

macro_rules! impl_from_large_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Real {
                fn from(value: $t) -> Self {
                    Self::assign_large_int(false, value as u128)
                }
            }
        )*
    };
}

impl_from_small_int!(i8, u8, i16, u16);
impl_from_large_signed!(i32, i64, i128, isize);
impl_from_large_unsigned!(u32, u64, u128, usize);

impl From<char> for Real {
    /// The character's code point.
    fn from(value: char) -> Self {
        Self::from_big_float(BigFloat::from_u64(u64::from(u32::from(value))))
    }
}

impl From<BigFloat> for Real {
    fn from(value: BigFloat) -> Self {
        Self::from_big_float(value)
    }
}

impl TryFrom<f64> for Real {
    type Error = NumericError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for Real {
    type Error = NumericError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::from_f32(value)
    }
}

// ============================================================================
// Casts
// ============================================================================

/// Conversion out of [`Real`] into the types generic numeric code asks for.
pub trait RealCast: Sized {
    fn real_cast(value: &Real) -> Self;
}

impl RealCast for f64 {
    fn real_cast(value: &Real) -> Self {
        value.to_f64()
    }
}

impl RealCast for f32 {
    fn real_cast(value: &Real) -> Self {
        value.to_f32()
    }
}

impl RealCast for Real {
    fn real_cast(value: &Real) -> Self {
        value.clone()
    }
}

/// Convert through repeated `f64` approximations: peel off the integer part
/// of each approximation until what is left is below one, then correct the
/// truncation. Saturates at the bounds of `I`.
fn convert_to_long_result<I>(value: &BigFloat) -> I
where
    I: num_traits::NumCast + Bounded,
{
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127
    let saturate = |positive: bool| if positive { I::max_value() } else { I::min_value() };

    let mut result: i128 = 0;
    let mut remainder = value.clone();
    loop {
        let whole = remainder.to_f64().trunc();
        if whole == 0.0 {
            break;
        }
        if whole.abs() >= LIMIT {
            return saturate(whole > 0.0);
        }
        result = match result.checked_add(whole as i128) {
            Some(sum) => sum,
            None => return saturate(whole > 0.0),
        };
        let Some(step) = BigFloat::from_f64_exact(whole) else {
            break;
        };
        let exact = remainder.bit_length().max(step.bit_length()) as u32 + 64;
        remainder = remainder.sub(&step, exact);
    }

    if value.is_positive() && remainder.is_negative() {
        result -= 1;
    } else if value.is_negative() && remainder.is_positive() {
        result += 1;
    }
    <I as num_traits::NumCast>::from(result).unwrap_or_else(|| saturate(result > 0))
}

macro_rules! impl_real_cast_int {
    ($($t:ty),*) => {
        $(
            impl RealCast for $t {
                fn real_cast(value: &Real) -> Self {
                    convert_to_long_result::<$t>(&value.value)
                }
            }
        )*
    };
}

impl_real_cast_int!(i32, u32, i64, u64);

/// Cast a real to `T`.
pub fn real_cast<T: RealCast>(value: &Real) -> T {
    T::real_cast(value)
}

// ============================================================================
// Operators
// ============================================================================

impl<'a> Add<&'a Real> for &'a Real {
    type Output = Real;

    fn add(self, rhs: &'a Real) -> Real {
        Real::from_big_float(self.value.add(&rhs.value, working_precision()))
    }
}

impl<'a> Sub<&'a Real> for &'a Real {
    type Output = Real;

    fn sub(self, rhs: &'a Real) -> Real {
        Real::from_big_float(self.value.sub(&rhs.value, working_precision()))
    }
}

impl<'a> Mul<&'a Real> for &'a Real {
    type Output = Real;

    fn mul(self, rhs: &'a Real) -> Real {
        Real::from_big_float(self.value.mul(&rhs.value, working_precision()))
    }
}

// Infallible Div for ergonomics (panics on a zero divisor - use checked_div where it matters)
impl<'a> Div<&'a Real> for &'a Real {
    type Output = Real;

    fn div(self, rhs: &'a Real) -> Real {
        self.checked_div(rhs).expect("Real division by zero")
    }
}

macro_rules! forward_binop {
    ($($imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident);*) => {
        $(
            impl $imp<Real> for Real {
                type Output = Real;

                #[inline]
                fn $method(self, rhs: Real) -> Real {
                    (&self).$method(&rhs)
                }
            }

            impl<'a> $imp<&'a Real> for Real {
                type Output = Real;

                #[inline]
                fn $method(self, rhs: &'a Real) -> Real {
                    (&self).$method(rhs)
                }
            }

            impl<'a> $imp<Real> for &'a Real {
                type Output = Real;

                #[inline]
                fn $method(self, rhs: Real) -> Real {
                    self.$method(&rhs)
                }
            }

            impl<'a> $assign_imp<&'a Real> for Real {
                #[inline]
                fn $assign_method(&mut self, rhs: &'a Real) {
                    *self = (&*self).$method(rhs);
                }
            }

            impl $assign_imp<Real> for Real {
                #[inline]
                fn $assign_method(&mut self, rhs: Real) {
                    *self = (&*self).$method(&rhs);
                }
            }
        )*
    };
}

forward_binop!(
    Add, add, AddAssign, add_assign;
    Sub, sub, SubAssign, sub_assign;
    Mul, mul, MulAssign, mul_assign;
    Div, div, DivAssign, div_assign
);

impl Neg for Real {
    type Output = Real;

    #[inline]
    fn neg(self) -> Real {
        Real::from_big_float(self.value.neg())
    }
}

impl Neg for &Real {
    type Output = Real;

    #[inline]
    fn neg(self) -> Real {
        Real::from_big_float(self.value.neg())
    }
}

// ============================================================================
// Display and Parsing
// ============================================================================

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f
            .precision()
            .unwrap_or(Context::current().output_precision() as usize);
        let text = self.value.to_decimal_string(digits);

        // The formatter precision counts significant digits, so only width
        // and fill are applied here.
        let len = text.chars().count();
        let Some(width) = f.width().filter(|&w| w > len) else {
            return f.write_str(&text);
        };
        let padding = width - len;
        let (before, after) = match f.align() {
            Some(fmt::Alignment::Left) => (0, padding),
            Some(fmt::Alignment::Center) => (padding / 2, padding - padding / 2),
            _ => (padding, 0),
        };
        let fill = f.fill();
        for _ in 0..before {
            write!(f, "{fill}")?;
        }
        f.write_str(&text)?;
        for _ in 0..after {
            write!(f, "{fill}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Real({}, bits={})",
            self.to_round_trip_string(),
            self.value.bit_length()
        )
    }
}

impl FromStr for Real {
    type Err = NumericError;

    /// Parse decimal or scientific notation at the working precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigFloat::parse(s, working_precision()).map(Self::from_big_float)
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for Real {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_round_trip_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Real {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> crate::domain::ContextGuard {
        Context::new(150).with_output_precision(10).enter()
    }

    #[test]
    fn test_small_integers_are_exact() {
        let _guard = ctx();
        assert_eq!(Real::from(-7i8).to_i64(), Some(-7));
        assert_eq!(Real::from(u16::MAX).to_i64(), Some(65535));
        assert_eq!(Real::from('A').to_i64(), Some(65));
    }

    #[test]
    fn test_large_integer_assignment() {
        let _guard = ctx();
        assert_eq!(Real::from(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(Real::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(Real::from(i128::MIN).to_i128(), Some(i128::MIN));
        assert_eq!(Real::from(0u32), Real::zero());
        assert_eq!(Real::from(-1i32), -Real::one());
    }

    #[test]
    fn test_large_integer_rounds_at_low_precision() {
        let _guard = Context::new(53).enter();
        let value = Real::from(u64::MAX);
        // 2^64 - 1 needs 64 bits; at 53 bits it rounds up to 2^64.
        assert_eq!(value, Real::one().ldexp(64));
    }

    #[test]
    fn test_float_assignment() {
        let _guard = ctx();
        assert_eq!(Real::from_f64(0.0).unwrap(), Real::zero());
        assert_eq!(Real::from_f64(1.0).unwrap(), Real::one());
        assert_eq!(Real::from_f64(-2.5).unwrap().to_f64(), -2.5);
        assert_eq!(Real::from_f64(0.1).unwrap().to_f64(), 0.1);
        assert_eq!(Real::from_f32(1.5f32).unwrap().to_f32(), 1.5f32);
        assert_eq!(Real::from_f64(f64::MIN_POSITIVE).unwrap().to_f64(), f64::MIN_POSITIVE);
    }

    #[test]
    fn test_non_finite_float_overflows() {
        let _guard = ctx();
        assert_eq!(Real::from_f64(f64::INFINITY), Err(NumericError::Overflow));
        assert_eq!(Real::from_f64(f64::NEG_INFINITY), Err(NumericError::Overflow));
        assert_eq!(Real::from_f64(f64::NAN), Err(NumericError::Overflow));
        assert_eq!(Real::try_from(f32::INFINITY), Err(NumericError::Overflow));
    }

    #[test]
    fn test_arithmetic_operators() {
        let _guard = ctx();
        let a = Real::from(6);
        let b = Real::from(4);
        assert_eq!(&a + &b, Real::from(10));
        assert_eq!(&a - &b, Real::from(2));
        assert_eq!(&a * &b, Real::from(24));
        assert_eq!(&a / &b, Real::from_f64(1.5).unwrap());
        assert_eq!(-a.clone(), Real::from(-6));

        let mut c = a.clone();
        c += &b;
        c -= Real::from(1);
        c *= Real::from(2);
        c /= &b;
        assert_eq!(c, Real::from_f64(4.5).unwrap());
    }

    #[test]
    fn test_checked_div_by_zero() {
        let _guard = ctx();
        assert_eq!(Real::one().checked_div(&Real::zero()), Err(NumericError::DivisionByZero));
    }

    #[test]
    #[should_panic(expected = "Real division by zero")]
    fn test_div_operator_panics_on_zero() {
        let _guard = ctx();
        let _ = Real::one() / Real::zero();
    }

    #[test]
    fn test_ordering() {
        let _guard = ctx();
        let values: Vec<Real> = [3, -1, 2, 0].iter().map(|&v| Real::from(v)).collect();
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(sorted, vec![Real::from(-1), Real::from(0), Real::from(2), Real::from(3)]);
        assert!(Real::from(2) > Real::from(1));
        assert_ne!(Real::from(2), Real::from(1));
    }

    #[test]
    fn test_display_uses_output_precision() {
        let _guard = ctx();
        let third = Real::one() / Real::from(3);
        assert_eq!(third.to_string(), "0.3333333333");
        assert_eq!(format!("{:.4}", third), "0.3333");

        let _wide = Context::new(150).with_output_precision(20).enter();
        assert_eq!(third.to_string(), "0.33333333333333333333");
    }

    #[test]
    fn test_display_precision_counts_significant_digits() {
        let _guard = ctx();
        let third = Real::one() / Real::from(3);
        assert_eq!(format!("{:.4}", third), "0.3333");
        assert_eq!(format!("{:.1}", third), "0.3");
        assert_eq!(format!("{:.6}", Real::from(1234)), "1234");
        assert_eq!(format!("{:.3}", Real::from(-12345)), "-1.23e4");
    }

    #[test]
    fn test_display_width_and_fill() {
        let _guard = ctx();
        let half = Real::from_f64(0.5).unwrap();
        assert_eq!(format!("{:>6}", half), "   0.5");
        assert_eq!(format!("{:<6}|", half), "0.5   |");
        assert_eq!(format!("{:*^7.2}", Real::from(2)), "***2***");
        assert_eq!(format!("{:2}", Real::from(1234)), "1234");
    }

    #[test]
    fn test_to_f32_rounds_once() {
        let _guard = Context::new(100).enter();
        let x = Real::one() + Real::one().ldexp(-24) + Real::one().ldexp(-60);
        assert_eq!(x.to_f32(), 1.0 + f32::EPSILON);
        assert_eq!((-x).to_f32(), -(1.0 + f32::EPSILON));

        assert_eq!(Real::from_f64(0.1).unwrap().to_f32(), 0.1f32);
        assert_eq!(Real::one().ldexp(200).to_f32(), f32::INFINITY);
        assert_eq!(Real::zero().to_f32(), 0.0);
    }

    #[test]
    fn test_to_f32_subnormals() {
        let _guard = Context::new(100).enter();
        let smallest = f32::from_bits(1);
        assert_eq!(Real::one().ldexp(-149).to_f32(), smallest);
        // 1.5 units ties to 2 units
        let one_and_half = Real::from(3).ldexp(-150);
        assert_eq!(one_and_half.to_f32(), f32::from_bits(2));
        // just over half a unit rounds up, exactly half rounds to zero
        let over_half = Real::one().ldexp(-150) + Real::one().ldexp(-200);
        assert_eq!(over_half.to_f32(), smallest);
        assert_eq!(Real::one().ldexp(-150).to_f32(), 0.0);
        assert_eq!(Real::one().ldexp(-126).to_f32(), f32::MIN_POSITIVE);
    }

    #[test]
    fn test_modf() {
        let _guard = ctx();
        let (fraction, integer) = Real::from_f64(3.75).unwrap().modf();
        assert_eq!(fraction, Real::from_f64(0.75).unwrap());
        assert_eq!(integer, Real::from(3));

        let (fraction, integer) = Real::from_f64(-2.25).unwrap().modf();
        assert_eq!(fraction, Real::from_f64(-0.25).unwrap());
        assert_eq!(integer, Real::from(-2));

        let (fraction, integer) = Real::from_f64(-0.5).unwrap().modf();
        assert_eq!(fraction, Real::from_f64(-0.5).unwrap());
        assert!(integer.is_zero());

        let (fraction, integer) = Real::from(-7).modf();
        assert!(fraction.is_zero());
        assert_eq!(integer, Real::from(-7));
    }

    #[test]
    fn test_modf_is_exact_below_value_precision() {
        let value = Context::new(200).scoped(|| Real::from(1_000_000) + Real::one() / Real::from(3));
        let _guard = Context::new(60).enter();
        let (fraction, integer) = value.modf();
        assert_eq!(integer, Real::from(1_000_000));
        assert!(fraction.value().bit_length() > 60);
        assert_eq!(
            BigFloat::add(integer.value(), fraction.value(), 400),
            value.value().clone()
        );
    }

    #[test]
    fn test_parse() {
        let _guard = ctx();
        let x: Real = "12.5".parse().unwrap();
        assert_eq!(x, Real::from_f64(12.5).unwrap());
        assert_eq!("nope".parse::<Real>(), Err(NumericError::InvalidInput));
        assert_eq!(
            "1e9223372036854775807".parse::<Real>(),
            Err(NumericError::Overflow)
        );
        assert_eq!(
            "1e-9223372036854775807".parse::<Real>(),
            Err(NumericError::Underflow)
        );
    }

    #[test]
    fn test_round_trip_string() {
        let _guard = ctx();
        let x = Real::one() / Real::from(7);
        let back: Real = x.to_round_trip_string().parse().unwrap();
        assert_eq!(back, x);
    }

    #[test]
    fn test_decimal_conversion() {
        let _guard = ctx();
        let d = rust_decimal::Decimal::new(12345, 2);
        let x = Real::from_decimal(d);
        assert_eq!(x.to_string(), "123.45");
        assert_eq!(x.to_decimal().unwrap(), d);

        let third = Real::one() / Real::from(3);
        let d = third.to_decimal().unwrap();
        assert_eq!(d.scale(), 28);

        assert_eq!(Real::one().ldexp(100).to_decimal(), Err(NumericError::Overflow));
    }

    #[test]
    fn test_real_cast() {
        let _guard = ctx();
        let x = Real::from_f64(2.75).unwrap();
        assert_eq!(real_cast::<f64>(&x), 2.75);
        assert_eq!(real_cast::<f32>(&x), 2.75f32);
        assert_eq!(real_cast::<i32>(&x), 2);
        assert_eq!(real_cast::<i64>(&-x.clone()), -2);
        assert_eq!(real_cast::<Real>(&x), x);

        let big = Real::from(i64::MAX - 1);
        assert_eq!(real_cast::<i64>(&big), i64::MAX - 1);
        assert_eq!(real_cast::<u32>(&Real::from(-5)), 0);
        assert_eq!(real_cast::<i32>(&Real::from(i64::MAX)), i32::MAX);

        // 2^60 + 255.5 rounds up to 2^60 + 256 as a double
        let near = Real::from((1i64 << 60) + 255) + Real::from_f64(0.5).unwrap();
        assert_eq!(real_cast::<i64>(&near), (1i64 << 60) + 255);
        assert_eq!(real_cast::<u64>(&Real::from(u64::MAX)), u64::MAX);
    }

    #[test]
    fn test_precision_change_does_not_alter_existing_values() {
        let high = Context::new(300).enter();
        let x = Real::one() / Real::from(3);
        let bits = x.value().bit_length();
        drop(high);

        let _low = Context::new(60).enter();
        assert_eq!(x.value().bit_length(), bits);
        let y = Real::one() / Real::from(3);
        assert!(y.value().bit_length() <= 60);
        assert_ne!(x, y);
    }

    #[test]
    fn test_frexp_ldexp() {
        let _guard = ctx();
        let (fraction, exponent) = Real::from(10).frexp();
        assert_eq!(exponent, 4);
        assert_eq!(fraction, Real::from_f64(0.625).unwrap());
        assert_eq!(fraction.ldexp(exponent), Real::from(10));
    }

    #[test]
    fn test_tan_matches_quotient() {
        let _guard = ctx();
        let x = Real::from_f64(0.5).unwrap();
        let tan = x.tan().unwrap();
        assert!((tan.to_f64() - 0.5f64.tan()).abs() < 1e-15);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_decimal_string() {
        let _guard = ctx();
        let x = Real::one() / Real::from(3);
        let json = serde_json::to_string(&x).unwrap();
        assert!(json.starts_with("\"0.3333"));
        let back: Real = serde_json::from_str(&json).unwrap();
        assert_eq!(back, x);
        assert!(serde_json::from_str::<Real>("\"abc\"").is_err());
    }
}
