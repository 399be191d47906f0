use num::bigint::BigInt;
use num::{Integer, Num, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

/// Number
///
/// Numbers in a flow program are exact integers or floats.
///
/// * Exact integers live in a Fixnum until an operation overflows
///   64 bits, at which point the result is promoted to a BigInt.
///   A BigInt result that fits in 64 bits again is demoted.
/// * Floats are contagious: any operation with a float operand
///   produces a float.
/// * Dividing two exact integers stays exact when the division is
///   even, and produces a float otherwise.
#[derive(Clone, Debug)]
pub enum Number {
    Fixnum(i64),
    BigInt(Rc<BigInt>),
    Float(f64),
}

/// Operands of a binary operation, widened to a common representation.
enum Operands {
    Fixnum(i64, i64),
    BigInt(BigInt, BigInt),
    Float(f64, f64),
}

impl Number {
    pub fn new_bigint<T: Into<BigInt>>(num: T) -> Number {
        Number::from(num.into())
    }

    /// Parse
    ///
    /// Parse decimal text as a fixnum, then a bigint, then a float.
    /// Returns None if the text is none of these.
    pub fn parse(text: &str) -> Option<Number> {
        if let Ok(num) = text.parse::<i64>() {
            Some(Number::Fixnum(num))
        } else if let Ok(num) = BigInt::from_str_radix(text, 10) {
            Some(Number::from(num))
        } else if let Ok(num) = text.parse::<f64>() {
            Some(Number::Float(num))
        } else {
            None
        }
    }

    fn operands(&self, rhs: &Number) -> Operands {
        match (self, rhs) {
            (Number::Fixnum(lhs), Number::Fixnum(rhs)) => Operands::Fixnum(*lhs, *rhs),
            (Number::Float(_), _) | (_, Number::Float(_)) => {
                Operands::Float(self.to_f64(), rhs.to_f64())
            }
            _ => Operands::BigInt(self.to_bigint(), rhs.to_bigint()),
        }
    }

    fn to_bigint(&self) -> BigInt {
        match self {
            Number::Fixnum(num) => BigInt::from(*num),
            Number::BigInt(num) => (**num).clone(),
            Number::Float(num) => BigInt::from(*num as i64),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Fixnum(num) => *num as f64,
            Number::BigInt(num) => num.to_f64().unwrap_or(f64::NAN),
            Number::Float(num) => *num,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Fixnum(num) => Some(*num),
            Number::BigInt(num) => num.to_i64(),
            Number::Float(num) if self.is_integer() => num.to_i64(),
            Number::Float(_) => None,
        }
    }

    pub fn to_usize(&self) -> Option<usize> {
        match self {
            Number::Fixnum(num) => num.to_usize(),
            Number::BigInt(num) => num.to_usize(),
            Number::Float(_) => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        !matches!(self, Number::Float(_))
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Fixnum(_) | Number::BigInt(_) => true,
            Number::Float(num) => num.is_finite() && num.fract() == 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Fixnum(num) => *num == 0,
            Number::BigInt(num) => num.is_zero(),
            Number::Float(num) => *num == 0.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Fixnum(num) => *num < 0,
            Number::BigInt(num) => num.is_negative(),
            Number::Float(num) => *num < 0.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && !self.is_negative()
    }

    /// Is Even
    ///
    /// Returns None for non-integers.
    pub fn is_even(&self) -> Option<bool> {
        match self {
            Number::Fixnum(num) => Some(num.is_even()),
            Number::BigInt(num) => Some(num.is_even()),
            Number::Float(num) if self.is_integer() => Some(num % 2.0 == 0.0),
            Number::Float(_) => None,
        }
    }

    pub fn abs(&self) -> Number {
        match self {
            Number::Fixnum(num) => match num.checked_abs() {
                Some(num) => Number::Fixnum(num),
                None => Number::from(BigInt::from(*num).abs()),
            },
            Number::BigInt(num) => Number::from(num.abs()),
            Number::Float(num) => Number::Float(num.abs()),
        }
    }

    /// Checked Div
    ///
    /// Divide self by rhs, returning None when dividing an exact number
    /// by exact zero.
    pub fn checked_div(&self, rhs: &Number) -> Option<Number> {
        match self.operands(rhs) {
            Operands::Fixnum(_, 0) => None,
            Operands::Fixnum(lhs, rhs) if lhs.checked_rem(rhs).unwrap_or(0) == 0 => {
                match lhs.checked_div(rhs) {
                    Some(num) => Some(Number::Fixnum(num)),
                    None => Some(Number::from(BigInt::from(lhs) / rhs)),
                }
            }
            Operands::Fixnum(lhs, rhs) => Some(Number::Float(lhs as f64 / rhs as f64)),
            Operands::BigInt(_, rhs) if rhs.is_zero() => None,
            Operands::BigInt(lhs, rhs) if (&lhs % &rhs).is_zero() => Some(Number::from(lhs / rhs)),
            Operands::BigInt(lhs, rhs) => Some(Number::Float(
                lhs.to_f64().unwrap_or(f64::NAN) / rhs.to_f64().unwrap_or(f64::NAN),
            )),
            Operands::Float(lhs, rhs) => Some(Number::Float(lhs / rhs)),
        }
    }

    /// Quotient
    ///
    /// Integer division truncating towards zero. Defined for integers
    /// (including integral floats); None otherwise or on a zero divisor.
    pub fn quotient(&self, rhs: &Number) -> Option<Number> {
        if !self.is_integer() || !rhs.is_integer() || rhs.is_zero() {
            return None;
        }
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => match lhs.checked_div(rhs) {
                Some(num) => Some(Number::Fixnum(num)),
                None => Some(Number::from(BigInt::from(lhs) / rhs)),
            },
            Operands::BigInt(lhs, rhs) => Some(Number::from(lhs / rhs)),
            Operands::Float(lhs, rhs) => Some(Number::Float((lhs / rhs).trunc())),
        }
    }

    /// Remainder
    ///
    /// The remainder of truncating division; takes the sign of the
    /// dividend.
    pub fn remainder(&self, rhs: &Number) -> Option<Number> {
        if !self.is_integer() || !rhs.is_integer() || rhs.is_zero() {
            return None;
        }
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => {
                Some(Number::Fixnum(lhs.checked_rem(rhs).unwrap_or(0)))
            }
            Operands::BigInt(lhs, rhs) => Some(Number::from(lhs % rhs)),
            Operands::Float(lhs, rhs) => Some(Number::Float(lhs % rhs)),
        }
    }

    /// Modulo
    ///
    /// The remainder of floored division; takes the sign of the
    /// divisor.
    pub fn modulo(&self, rhs: &Number) -> Option<Number> {
        if !self.is_integer() || !rhs.is_integer() || rhs.is_zero() {
            return None;
        }
        match self.operands(rhs) {
            Operands::Fixnum(_, -1) => Some(Number::Fixnum(0)),
            Operands::Fixnum(lhs, rhs) => Some(Number::Fixnum(lhs.mod_floor(&rhs))),
            Operands::BigInt(lhs, rhs) => Some(Number::from(lhs.mod_floor(&rhs))),
            Operands::Float(lhs, rhs) => Some(Number::Float(lhs - rhs * (lhs / rhs).floor())),
        }
    }
}

impl Add for &Number {
    type Output = Number;

    fn add(self, rhs: Self) -> Number {
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => match lhs.checked_add(rhs) {
                Some(num) => Number::Fixnum(num),
                None => Number::from(BigInt::from(lhs) + rhs),
            },
            Operands::BigInt(lhs, rhs) => Number::from(lhs + rhs),
            Operands::Float(lhs, rhs) => Number::Float(lhs + rhs),
        }
    }
}

impl Sub for &Number {
    type Output = Number;

    fn sub(self, rhs: Self) -> Number {
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => match lhs.checked_sub(rhs) {
                Some(num) => Number::Fixnum(num),
                None => Number::from(BigInt::from(lhs) - rhs),
            },
            Operands::BigInt(lhs, rhs) => Number::from(lhs - rhs),
            Operands::Float(lhs, rhs) => Number::Float(lhs - rhs),
        }
    }
}

impl Mul for &Number {
    type Output = Number;

    fn mul(self, rhs: Self) -> Number {
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => match lhs.checked_mul(rhs) {
                Some(num) => Number::Fixnum(num),
                None => Number::from(BigInt::from(lhs) * rhs),
            },
            Operands::BigInt(lhs, rhs) => Number::from(lhs * rhs),
            Operands::Float(lhs, rhs) => Number::Float(lhs * rhs),
        }
    }
}

impl Add for Number {
    type Output = Number;
    fn add(self, rhs: Self) -> Number {
        &self + &rhs
    }
}

impl Sub for Number {
    type Output = Number;
    fn sub(self, rhs: Self) -> Number {
        &self - &rhs
    }
}

impl Mul for Number {
    type Output = Number;
    fn mul(self, rhs: Self) -> Number {
        &self * &rhs
    }
}

impl Neg for &Number {
    type Output = Number;
    fn neg(self) -> Number {
        &Number::Fixnum(0) - self
    }
}

impl Eq for Number {}
impl PartialEq for Number {
    fn eq(&self, rhs: &Self) -> bool {
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => lhs == rhs,
            Operands::BigInt(lhs, rhs) => lhs == rhs,
            Operands::Float(lhs, rhs) => lhs == rhs,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        match self.operands(rhs) {
            Operands::Fixnum(lhs, rhs) => lhs.partial_cmp(&rhs),
            Operands::BigInt(lhs, rhs) => lhs.partial_cmp(&rhs),
            Operands::Float(lhs, rhs) => lhs.partial_cmp(&rhs),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Fixnum(num) => write!(f, "{}", num),
            Number::BigInt(num) => write!(f, "{}", num),
            Number::Float(num) if num.abs() > 1E16 => write!(f, "{:e}", num),
            Number::Float(num) if self.is_integer() => write!(f, "{:.1}", num),
            Number::Float(num) => write!(f, "{}", num),
        }
    }
}

impl From<i64> for Number {
    fn from(num: i64) -> Self {
        Number::Fixnum(num)
    }
}

impl From<usize> for Number {
    fn from(num: usize) -> Self {
        match i64::try_from(num) {
            Ok(num) => Number::Fixnum(num),
            Err(_) => Number::from(BigInt::from(num)),
        }
    }
}

impl From<f64> for Number {
    fn from(num: f64) -> Self {
        Number::Float(num)
    }
}

impl From<BigInt> for Number {
    fn from(num: BigInt) -> Self {
        match num.to_i64() {
            Some(num) => Number::Fixnum(num),
            None => Number::BigInt(Rc::new(num)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(text: &str) -> Number {
        Number::parse(text).unwrap()
    }

    #[test]
    fn parse() {
        assert_eq!(Number::parse("42"), Some(Number::Fixnum(42)));
        assert_eq!(Number::parse("-42"), Some(Number::Fixnum(-42)));
        assert_eq!(Number::parse("+7"), Some(Number::Fixnum(7)));
        assert_eq!(Number::parse("4.5"), Some(Number::Float(4.5)));
        assert_eq!(Number::parse(".5"), Some(Number::Float(0.5)));
        assert_eq!(Number::parse("1e3"), Some(Number::Float(1000.0)));
        assert!(matches!(
            Number::parse("18446744073709551616"),
            Some(Number::BigInt(_))
        ));
        assert_eq!(Number::parse("42..1"), None);
        assert_eq!(Number::parse("+"), None);
    }

    #[test]
    fn overflow_promotes_to_bigint() {
        let max = Number::Fixnum(i64::MAX);
        let sum = &max + &Number::Fixnum(1);
        assert!(matches!(sum, Number::BigInt(_)));
        assert_eq!(sum.to_string(), "9223372036854775808");

        let product = &max * &Number::Fixnum(2);
        assert_eq!(product.to_string(), "18446744073709551614");

        let min = Number::Fixnum(i64::MIN);
        assert_eq!((&min - &Number::Fixnum(1)).to_string(), "-9223372036854775809");
        assert_eq!(min.abs().to_string(), "9223372036854775808");
    }

    #[test]
    fn bigint_demotes_when_it_fits() {
        let sum = &big("9223372036854775808") - &Number::Fixnum(1);
        assert!(matches!(sum, Number::Fixnum(i64::MAX)));
    }

    #[test]
    fn floats_are_contagious() {
        assert_eq!(
            &Number::Fixnum(1) + &Number::Float(0.5),
            Number::Float(1.5)
        );
        assert!(matches!(
            &Number::Fixnum(2) * &Number::Float(1.0),
            Number::Float(_)
        ));
        assert!(!(&Number::Fixnum(2) * &Number::Float(1.0)).is_exact());
    }

    #[test]
    fn division() {
        let six = Number::Fixnum(6);
        assert_eq!(six.checked_div(&Number::Fixnum(3)), Some(Number::Fixnum(2)));
        assert_eq!(six.checked_div(&Number::Fixnum(4)), Some(Number::Float(1.5)));
        assert_eq!(six.checked_div(&Number::Fixnum(0)), None);
        assert_eq!(
            six.checked_div(&Number::Float(0.0)),
            Some(Number::Float(f64::INFINITY))
        );
        assert!(matches!(
            Number::Fixnum(i64::MIN).checked_div(&Number::Fixnum(-1)),
            Some(Number::BigInt(_))
        ));
    }

    #[test]
    fn integer_division() {
        let seven = Number::Fixnum(7);
        let minus_seven = Number::Fixnum(-7);
        let two = Number::Fixnum(2);
        assert_eq!(seven.quotient(&two), Some(Number::Fixnum(3)));
        assert_eq!(minus_seven.quotient(&two), Some(Number::Fixnum(-3)));
        assert_eq!(minus_seven.remainder(&two), Some(Number::Fixnum(-1)));
        assert_eq!(minus_seven.modulo(&two), Some(Number::Fixnum(1)));
        assert_eq!(seven.modulo(&Number::Fixnum(-2)), Some(Number::Fixnum(-1)));
        assert_eq!(seven.quotient(&Number::Fixnum(0)), None);
        assert_eq!(Number::Float(7.5).quotient(&two), None);
        assert_eq!(
            Number::Float(7.0).quotient(&two),
            Some(Number::Float(3.0))
        );
    }

    #[test]
    fn comparison_across_representations() {
        assert_eq!(Number::Fixnum(2), Number::Float(2.0));
        assert!(Number::Fixnum(1) < Number::Float(1.5));
        assert!(big("100000000000000000000") > Number::Fixnum(i64::MAX));
        assert!(Number::Fixnum(i64::MIN) > big("-100000000000000000000"));
    }

    #[test]
    fn sign_predicates() {
        assert!(Number::Fixnum(-3).is_negative());
        assert!(Number::Fixnum(3).is_positive());
        assert!(!Number::Fixnum(0).is_positive());
        assert!(Number::Float(0.0).is_zero());
        assert_eq!(Number::Fixnum(4).is_even(), Some(true));
        assert_eq!(Number::Float(4.5).is_even(), None);
        assert_eq!(-&Number::Fixnum(-3), Number::Fixnum(3));
    }

    #[test]
    fn display() {
        assert_eq!(Number::Fixnum(-10).to_string(), "-10");
        assert_eq!(Number::Float(2.0).to_string(), "2.0");
        assert_eq!(Number::Float(2.25).to_string(), "2.25");
        assert_eq!(Number::Float(1E20).to_string(), "1e20");
    }
}
