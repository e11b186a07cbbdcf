//! The numeric tower: integers widen to floats, floats widen to complex.

use crate::evaluator::Error;
use crate::types::{GelInt, GelObject, TypeMismatch};
use num::complex::Complex64;
use num::Zero;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(GelInt),
    Float(f64),
    Complex(Complex64),
}

impl Number {
    pub(crate) fn from_object(obj: &GelObject) -> Result<Self, TypeMismatch> {
        match obj {
            GelObject::Integer(x) => Ok(Number::Int(*x)),
            GelObject::Float(x) => Ok(Number::Float(*x)),
            GelObject::Complex(z) => Ok(Number::Complex(*z)),
            _ => Err(TypeMismatch::NotANumber),
        }
    }

    pub(crate) fn into_object(self) -> GelObject {
        match self {
            Number::Int(x) => GelObject::Integer(x),
            Number::Float(x) => GelObject::Float(x),
            Number::Complex(z) => GelObject::Complex(z),
        }
    }

    fn to_f64(self) -> Option<f64> {
        match self {
            Number::Int(x) => Some(x as f64),
            Number::Float(x) => Some(x),
            Number::Complex(_) => None,
        }
    }

    fn to_complex(self) -> Complex64 {
        match self {
            Number::Int(x) => Complex64::new(x as f64, 0.0),
            Number::Float(x) => Complex64::new(x, 0.0),
            Number::Complex(z) => z,
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        match self {
            Number::Int(x) => x == 0,
            Number::Float(x) => x == 0.0,
            Number::Complex(z) => z.is_zero(),
        }
    }
}

/// Both operands brought to the narrowest representation that holds them.
enum Widened {
    Ints(GelInt, GelInt),
    Floats(f64, f64),
    Complexes(Complex64, Complex64),
}

fn widen(x: Number, y: Number) -> Widened {
    match (x, y) {
        (Number::Int(a), Number::Int(b)) => Widened::Ints(a, b),
        (Number::Complex(_), _) | (_, Number::Complex(_)) => {
            Widened::Complexes(x.to_complex(), y.to_complex())
        }
        _ => Widened::Floats(
            x.to_f64().unwrap_or_default(),
            y.to_f64().unwrap_or_default(),
        ),
    }
}

pub(crate) fn add(x: Number, y: Number) -> Result<Number, Error> {
    Ok(match widen(x, y) {
        Widened::Ints(a, b) => Number::Int(a.checked_add(b).ok_or(Error::IntegerOverflow)?),
        Widened::Floats(a, b) => Number::Float(a + b),
        Widened::Complexes(a, b) => Number::Complex(a + b),
    })
}

pub(crate) fn sub(x: Number, y: Number) -> Result<Number, Error> {
    Ok(match widen(x, y) {
        Widened::Ints(a, b) => Number::Int(a.checked_sub(b).ok_or(Error::IntegerOverflow)?),
        Widened::Floats(a, b) => Number::Float(a - b),
        Widened::Complexes(a, b) => Number::Complex(a - b),
    })
}

pub(crate) fn mul(x: Number, y: Number) -> Result<Number, Error> {
    Ok(match widen(x, y) {
        Widened::Ints(a, b) => Number::Int(a.checked_mul(b).ok_or(Error::IntegerOverflow)?),
        Widened::Floats(a, b) => Number::Float(a * b),
        Widened::Complexes(a, b) => Number::Complex(a * b),
    })
}

/// True division. Two integers that divide exactly stay an integer.
pub(crate) fn div(x: Number, y: Number) -> Result<Number, Error> {
    if y.is_zero() {
        return Err(Error::DivideByZero);
    }
    Ok(match widen(x, y) {
        Widened::Ints(a, b) if a.checked_rem(b) == Some(0) => {
            Number::Int(a.checked_div(b).ok_or(Error::IntegerOverflow)?)
        }
        Widened::Ints(a, b) => Number::Float(a as f64 / b as f64),
        Widened::Floats(a, b) => Number::Float(a / b),
        Widened::Complexes(a, b) => Number::Complex(a / b),
    })
}

pub(crate) fn floor_div(x: Number, y: Number) -> Result<Number, Error> {
    if y.is_zero() {
        return Err(Error::DivideByZero);
    }
    match widen(x, y) {
        Widened::Ints(a, b) => {
            let q = a.checked_div(b).ok_or(Error::IntegerOverflow)?;
            let adjust = if (a % b != 0) && ((a < 0) != (b < 0)) { 1 } else { 0 };
            Ok(Number::Int(q - adjust))
        }
        Widened::Floats(a, b) => Ok(Number::Float((a / b).floor())),
        Widened::Complexes(..) => Err(TypeMismatch::NotComparable.into()),
    }
}

/// Remainder taking the sign of the divisor.
pub(crate) fn modulo(x: Number, y: Number) -> Result<Number, Error> {
    if y.is_zero() {
        return Err(Error::DivideByZero);
    }
    match widen(x, y) {
        Widened::Ints(a, b) => {
            let r = a.checked_rem(b).ok_or(Error::IntegerOverflow)?;
            Ok(Number::Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }))
        }
        Widened::Floats(a, b) => {
            let r = a % b;
            Ok(Number::Float(if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }))
        }
        Widened::Complexes(..) => Err(TypeMismatch::NotComparable.into()),
    }
}

pub(crate) fn numbers_equal(x: &GelObject, y: &GelObject) -> bool {
    match (Number::from_object(x), Number::from_object(y)) {
        (Ok(a), Ok(b)) => match widen(a, b) {
            Widened::Ints(a, b) => a == b,
            Widened::Floats(a, b) => a == b,
            Widened::Complexes(a, b) => a == b,
        },
        _ => false,
    }
}

/// Orders two numbers, or two strings. Anything else cannot be ordered.
pub(crate) fn compare(x: &GelObject, y: &GelObject) -> Result<Ordering, TypeMismatch> {
    if let (GelObject::String(a), GelObject::String(b)) = (x, y) {
        return Ok(a.cmp(b));
    }
    let ordering = match widen(Number::from_object(x)?, Number::from_object(y)?) {
        Widened::Ints(a, b) => Some(a.cmp(&b)),
        Widened::Floats(a, b) => a.partial_cmp(&b),
        Widened::Complexes(..) => None,
    };
    ordering.ok_or(TypeMismatch::NotComparable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(x: GelInt) -> Number {
        Number::Int(x)
    }

    #[test]
    fn exact_integer_division_stays_integral() {
        assert_eq!(div(int(10), int(2)).unwrap().into_object(), GelObject::Integer(5));
        match div(int(7), int(2)).unwrap() {
            Number::Float(x) => assert_eq!(x, 3.5),
            other => panic!("expected a float, got {:?}", other),
        }
        assert!(matches!(div(int(1), int(0)), Err(Error::DivideByZero)));
    }

    #[test]
    fn modulo_and_floor_division_follow_the_divisor() {
        assert_eq!(modulo(int(6), int(2)).unwrap().into_object(), GelObject::Integer(0));
        assert_eq!(modulo(int(-7), int(3)).unwrap().into_object(), GelObject::Integer(2));
        assert_eq!(floor_div(int(-7), int(2)).unwrap().into_object(), GelObject::Integer(-4));
    }

    #[test]
    fn mixed_arithmetic_widens() {
        let sum = add(int(1), Number::Float(0.5)).unwrap().into_object();
        assert_eq!(sum, GelObject::Float(1.5));
        let product = mul(Number::Complex(Complex64::new(0.0, 1.0)), int(2)).unwrap();
        assert_eq!(product.into_object(), GelObject::Complex(Complex64::new(0.0, 2.0)));
        assert!(matches!(add(int(GelInt::MAX), int(1)), Err(Error::IntegerOverflow)));
    }

    #[test]
    fn ordering_covers_numbers_and_strings() {
        let s = |x: &str| GelObject::String(x.into());
        assert_eq!(compare(&s("b"), &s("c")).unwrap(), Ordering::Less);
        assert_eq!(
            compare(&GelObject::Integer(2), &GelObject::Float(1.5)).unwrap(),
            Ordering::Greater
        );
        assert!(compare(&GelObject::Integer(2), &s("2")).is_err());
        assert!(numbers_equal(&GelObject::Integer(5), &GelObject::Float(5.0)));
    }
}
