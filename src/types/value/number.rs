//! Exact decimal numbers.
//!
//! Arithmetic never goes through binary floating point: `0.1 + 0.2` is exactly `0.3`.
//! Quotients that do not terminate are rounded to the division precision of [`BigDecimal`].

use std::{
    fmt,
    ops::{Add, Mul, Sub},
    str::FromStr,
};

use bigdecimal::{BigDecimal, ParseBigDecimalError};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(BigDecimal);

impl Number {
    pub fn zero() -> Self {
        Number(BigDecimal::zero())
    }

    pub fn one() -> Self {
        Number(BigDecimal::from(1))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `None` when dividing by zero
    pub fn checked_div(&self, divisor: &Number) -> Option<Number> {
        if divisor.is_zero() {
            None
        } else {
            Some(Number(&self.0 / &divisor.0))
        }
    }

    /// Integer part, truncated toward zero. `None` if it does not fit in an `i64`.
    pub fn integer_part(&self) -> Option<i64> {
        let (digits, _) = self.0.with_scale(0).as_bigint_and_exponent();
        digits.to_i64()
    }

    /// Digits after the decimal point; negative when the value ends in implied zeros
    pub fn scale(&self) -> i64 {
        self.0.as_bigint_and_exponent().1
    }

    /// Quotient truncated toward zero to `scale` decimal places, and the matching remainder,
    /// such that `self == divisor * quotient + remainder`.
    ///
    /// A negative `scale` truncates to tens, hundreds, ...
    pub fn quo_rem(&self, divisor: &Number, scale: i64) -> Result<(Number, Number), QuoRemError> {
        if divisor.is_zero() {
            return Err(QuoRemError::DivisionByZero);
        }
        let (dividend_digits, dividend_scale) = self.0.as_bigint_and_exponent();
        let (divisor_digits, divisor_scale) = divisor.0.as_bigint_and_exponent();
        // self / divisor * 10^scale, as a ratio of integers
        let shift = scale
            .checked_add(divisor_scale)
            .and_then(|shift| shift.checked_sub(dividend_scale))
            .ok_or(QuoRemError::ScaleOutOfRange)?;
        let (numerator, denominator) = if shift >= 0 {
            (dividend_digits * pow10(shift)?, divisor_digits)
        } else {
            let unshift = shift.checked_neg().ok_or(QuoRemError::ScaleOutOfRange)?;
            (dividend_digits, divisor_digits * pow10(unshift)?)
        };
        // BigInt division truncates toward zero
        let quotient = Number(BigDecimal::new(numerator / denominator, scale));
        let remainder = self - &(divisor * &quotient);
        Ok((quotient, remainder))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuoRemError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("scale out of range")]
    ScaleOutOfRange,
}

fn pow10(exponent: i64) -> Result<BigInt, QuoRemError> {
    u32::try_from(exponent)
        .map(|exponent| BigInt::from(10u8).pow(exponent))
        .map_err(|_| QuoRemError::ScaleOutOfRange)
}

impl FromStr for Number {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigDecimal::from_str(s).map(Number)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(BigDecimal::from(value))
    }
}

impl From<BigDecimal> for Number {
    fn from(value: BigDecimal) -> Self {
        Number(value)
    }
}

impl<'a> Add<&'a Number> for &'a Number {
    type Output = Number;

    fn add(self, rhs: &'a Number) -> Number {
        Number(&self.0 + &rhs.0)
    }
}

impl<'a> Sub<&'a Number> for &'a Number {
    type Output = Number;

    fn sub(self, rhs: &'a Number) -> Number {
        Number(&self.0 - &rhs.0)
    }
}

impl<'a> Mul<&'a Number> for &'a Number {
    type Output = Number;

    fn mul(self, rhs: &'a Number) -> Number {
        Number(&self.0 * &rhs.0)
    }
}

/// Zeros written out around the digits before rendering switches to `<digits>e<exponent>`
const MAX_PLAIN_ZEROS: u64 = 100;

/// Plain decimal notation with no trailing fractional zeros. Values that would need more
/// than [`MAX_PLAIN_ZEROS`] padding zeros use an exponent instead, which reads back the same.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (digits, scale) = self.0.normalized().as_bigint_and_exponent();
        if digits.is_zero() {
            return f.write_str("0");
        }
        let sign = if digits.is_negative() { "-" } else { "" };
        let mut text = digits.magnitude().to_string();
        let places = scale.unsigned_abs();
        if scale <= 0 {
            if places > MAX_PLAIN_ZEROS {
                return write!(f, "{sign}{text}e{places}");
            }
            text.push_str(&"0".repeat(places as usize));
            return write!(f, "{sign}{text}");
        }
        let len = text.len() as u64;
        if places >= len {
            let zeros = places - len + 1;
            if zeros > MAX_PLAIN_ZEROS {
                return write!(f, "{sign}{text}e-{places}");
            }
            text.insert_str(0, &"0".repeat(zeros as usize));
        }
        text.insert(text.len() - places as usize, '.');
        write!(f, "{sign}{text}")
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
