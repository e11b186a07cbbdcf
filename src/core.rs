use crate::evaluator::{self, Error, Flow};
use crate::interpreter::Interpreter;
use crate::numeric::{self, Number};
use crate::types::{callable, truthy, Arity, GelInt, GelObject, PrimitiveFn, TypeMismatch};
use num::complex::Complex64;
use std::cmp::Ordering;
use std::convert::TryFrom;

fn grab_numbers(args: &[GelObject]) -> Result<Vec<Number>, TypeMismatch> {
    args.iter().map(Number::from_object).collect()
}

fn fold_numbers(
    init: Number,
    args: &[GelObject],
    op: fn(Number, Number) -> Result<Number, Error>,
) -> Flow {
    let mut acc = init;
    for x in grab_numbers(args)? {
        acc = op(acc, x)?;
    }
    Ok(acc.into_object())
}

/// The items of a list, or the characters of a string as one-character
/// strings.
fn elements(obj: &GelObject) -> Result<Vec<GelObject>, TypeMismatch> {
    match obj {
        GelObject::List(items) => Ok(items.to_vec()),
        GelObject::String(s) => Ok(s.chars().map(|c| GelObject::String(c.to_string())).collect()),
        _ => Err(TypeMismatch::NotASequence),
    }
}

fn float_to_int(x: f64) -> Result<GelInt, Error> {
    if x.is_finite() && x >= GelInt::MIN as f64 && x < GelInt::MAX as f64 {
        Ok(x as GelInt)
    } else {
        Err(Error::IntegerOverflow)
    }
}

const SUM: PrimitiveFn = PrimitiveFn {
    name: "+",
    fn_ptr: sum_,
    arity: Arity::at_least(0),
};

fn sum_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::Int(0), args, numeric::add)
}

const SUB: PrimitiveFn = PrimitiveFn {
    name: "-",
    fn_ptr: sub_,
    arity: Arity::at_least(1),
};

// The first argument minus all the rest; a single argument is returned as is.
fn sub_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::from_object(&args[0])?, &args[1..], numeric::sub)
}

const MUL: PrimitiveFn = PrimitiveFn {
    name: "*",
    fn_ptr: mul_,
    arity: Arity::at_least(0),
};

fn mul_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::Int(1), args, numeric::mul)
}

const DIV: PrimitiveFn = PrimitiveFn {
    name: "/",
    fn_ptr: div_,
    arity: Arity::at_least(1),
};

fn div_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::from_object(&args[0])?, &args[1..], numeric::div)
}

const FLOOR_DIV: PrimitiveFn = PrimitiveFn {
    name: "//",
    fn_ptr: floor_div_,
    arity: Arity::at_least(1),
};

fn floor_div_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::from_object(&args[0])?, &args[1..], numeric::floor_div)
}

const MOD: PrimitiveFn = PrimitiveFn {
    name: "%",
    fn_ptr: mod_,
    arity: Arity::exactly(2),
};

fn mod_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::from_object(&args[0])?, &args[1..], numeric::modulo)
}

fn shift_(args: &[GelObject], left: bool) -> Flow {
    let value = args[0].as_int()?;
    let shift = u32::try_from(args[1].as_int()?).map_err(|_| Error::IntegerOverflow)?;
    let result = if left {
        value
            .checked_shl(shift)
            .filter(|&shifted| shifted >> shift == value)
    } else {
        Some(value.checked_shr(shift).unwrap_or(if value < 0 { -1 } else { 0 }))
    };
    result
        .map(GelObject::Integer)
        .ok_or_else(|| Error::IntegerOverflow.into())
}

const SHR: PrimitiveFn = PrimitiveFn {
    name: ">>",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| shift_(args, false),
    arity: Arity::exactly(2),
};

const SHL: PrimitiveFn = PrimitiveFn {
    name: "<<",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| shift_(args, true),
    arity: Arity::exactly(2),
};

const ABS: PrimitiveFn = PrimitiveFn {
    name: "abs",
    fn_ptr: abs_,
    arity: Arity::exactly(1),
};

fn abs_(_: &Interpreter, args: &[GelObject]) -> Flow {
    match Number::from_object(&args[0])? {
        Number::Int(x) => Ok(GelObject::Integer(
            x.checked_abs().ok_or(Error::IntegerOverflow)?,
        )),
        Number::Float(x) => Ok(GelObject::Float(x.abs())),
        Number::Complex(z) => Ok(GelObject::Float(z.norm())),
    }
}

/// `(max '(1 2 3))`, `(max "abc")` or `(max 1 2 3)`.
fn extremum_(name: &'static str, args: &[GelObject], wanted: Ordering) -> Flow {
    let candidates = match args {
        [single] => elements(single)?,
        _ => args.to_vec(),
    };
    Arity::at_least(1).validate_for(candidates.len(), name)?;
    let mut best = candidates[0].clone();
    for candidate in &candidates[1..] {
        if numeric::compare(candidate, &best)? == wanted {
            best = candidate.clone();
        }
    }
    Ok(best)
}

const MAX: PrimitiveFn = PrimitiveFn {
    name: "max",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| extremum_("max", args, Ordering::Greater),
    arity: Arity::at_least(1),
};

const MIN: PrimitiveFn = PrimitiveFn {
    name: "min",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| extremum_("min", args, Ordering::Less),
    arity: Arity::at_least(1),
};

const ROUND: PrimitiveFn = PrimitiveFn {
    name: "round",
    fn_ptr: round_,
    arity: Arity::exactly(1),
};

fn round_(_: &Interpreter, args: &[GelObject]) -> Flow {
    match Number::from_object(&args[0])? {
        Number::Int(x) => Ok(GelObject::Integer(x)),
        Number::Float(x) => Ok(GelObject::Float(x.round())),
        Number::Complex(_) => Err(TypeMismatch::NotComparable.into()),
    }
}

const LIST_SUM: PrimitiveFn = PrimitiveFn {
    name: "sum",
    fn_ptr: list_sum_,
    arity: Arity::exactly(1),
};

fn list_sum_(_: &Interpreter, args: &[GelObject]) -> Flow {
    fold_numbers(Number::Int(0), args[0].as_list()?, numeric::add)
}

fn rounding_(args: &[GelObject], op: fn(f64) -> f64) -> Flow {
    match Number::from_object(&args[0])? {
        Number::Int(x) => Ok(GelObject::Integer(x)),
        Number::Float(x) => Ok(GelObject::Integer(float_to_int(op(x))?)),
        Number::Complex(_) => Err(TypeMismatch::NotComparable.into()),
    }
}

const FLOOR: PrimitiveFn = PrimitiveFn {
    name: "floor",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| rounding_(args, f64::floor),
    arity: Arity::exactly(1),
};

const CEIL: PrimitiveFn = PrimitiveFn {
    name: "ceil",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| rounding_(args, f64::ceil),
    arity: Arity::exactly(1),
};

/// Real arguments below `complex_below` are promoted, so `(sqrt -1)` is `i`
/// rather than NaN.
fn transcendental_(
    args: &[GelObject],
    real: fn(f64) -> f64,
    complex: fn(Complex64) -> Complex64,
    complex_below: f64,
) -> Flow {
    let x = match Number::from_object(&args[0])? {
        Number::Int(x) => x as f64,
        Number::Float(x) => x,
        Number::Complex(z) => return Ok(GelObject::Complex(complex(z))),
    };
    if x < complex_below {
        Ok(GelObject::Complex(complex(Complex64::new(x, 0.0))))
    } else {
        Ok(GelObject::Float(real(x)))
    }
}

macro_rules! transcendental_primitive {
    ($NAME:ident, $name:expr, $real:path, $complex:path) => {
        transcendental_primitive!($NAME, $name, $real, $complex, std::f64::NEG_INFINITY);
    };
    ($NAME:ident, $name:expr, $real:path, $complex:path, $below:expr) => {
        const $NAME: PrimitiveFn = PrimitiveFn {
            name: $name,
            fn_ptr: |_: &Interpreter, args: &[GelObject]| {
                transcendental_(args, $real, $complex, $below)
            },
            arity: Arity::exactly(1),
        };
    };
}

transcendental_primitive!(SQRT, "sqrt", f64::sqrt, Complex64::sqrt, 0.0);
transcendental_primitive!(LOG, "log", f64::ln, Complex64::ln, 0.0);
transcendental_primitive!(EXP, "exp", f64::exp, Complex64::exp);
transcendental_primitive!(SIN, "sin", f64::sin, Complex64::sin);
transcendental_primitive!(COS, "cos", f64::cos, Complex64::cos);
transcendental_primitive!(TAN, "tan", f64::tan, Complex64::tan);

const POW: PrimitiveFn = PrimitiveFn {
    name: "pow",
    fn_ptr: pow_,
    arity: Arity::exactly(2),
};

fn pow_(_: &Interpreter, args: &[GelObject]) -> Flow {
    let base = Number::from_object(&args[0])?;
    let exponent = Number::from_object(&args[1])?;
    let result = match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| Error::IntegerOverflow)?;
            GelObject::Integer(b.checked_pow(e).ok_or(Error::IntegerOverflow)?)
        }
        (Number::Complex(_), _) | (_, Number::Complex(_)) => {
            let as_complex = |n: Number| match n {
                Number::Int(x) => Complex64::new(x as f64, 0.0),
                Number::Float(x) => Complex64::new(x, 0.0),
                Number::Complex(z) => z,
            };
            GelObject::Complex(as_complex(base).powc(as_complex(exponent)))
        }
        _ => {
            let as_float = |n: Number| match n {
                Number::Int(x) => x as f64,
                Number::Float(x) => x,
                Number::Complex(z) => z.re,
            };
            GelObject::Float(as_float(base).powf(as_float(exponent)))
        }
    };
    Ok(result)
}

fn comparison_(args: &[GelObject], comp: fn(Ordering) -> bool) -> Flow {
    Ok(GelObject::Bool(comp(numeric::compare(&args[0], &args[1])?)))
}

macro_rules! comparison_primitive {
    ($SYMBOL:tt, $NAME:ident) => {
        paste::item! {
            const $NAME: PrimitiveFn = PrimitiveFn {
                name: stringify!($SYMBOL),
                fn_ptr: |_: &Interpreter, args: &[GelObject]| comparison_(args, Ordering::[<is_ $NAME:lower>]),
                arity: Arity::exactly(2),
            };
        }
    };
}

comparison_primitive!(<, LT);
comparison_primitive!(<=, LE);
comparison_primitive!(>, GT);
comparison_primitive!(>=, GE);

const EQUAL: PrimitiveFn = PrimitiveFn {
    name: "=",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::Bool(args[0] == args[1])),
    arity: Arity::exactly(2),
};

const CAR: PrimitiveFn = PrimitiveFn {
    name: "car",
    fn_ptr: car_,
    arity: Arity::exactly(1),
};

fn car_(_: &Interpreter, args: &[GelObject]) -> Flow {
    elements(&args[0])?
        .into_iter()
        .next()
        .ok_or_else(|| Error::BadIndex(0, 0..0).into())
}

const CDR: PrimitiveFn = PrimitiveFn {
    name: "cdr",
    fn_ptr: cdr_,
    arity: Arity::exactly(1),
};

fn cdr_(_: &Interpreter, args: &[GelObject]) -> Flow {
    match &args[0] {
        GelObject::List(items) => Ok(GelObject::wrap_list(items.iter().skip(1).cloned().collect())),
        GelObject::String(s) => Ok(GelObject::String(s.chars().skip(1).collect())),
        _ => Err(TypeMismatch::NotASequence.into()),
    }
}

const CONS: PrimitiveFn = PrimitiveFn {
    name: "cons",
    fn_ptr: cons_,
    arity: Arity::exactly(2),
};

fn cons_(_: &Interpreter, args: &[GelObject]) -> Flow {
    let tail = args[1].as_list()?;
    let mut list = Vec::with_capacity(tail.len() + 1);
    list.push(args[0].clone());
    list.extend_from_slice(tail);
    Ok(GelObject::wrap_list(list))
}

const LIST: PrimitiveFn = PrimitiveFn {
    name: "list",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::wrap_list(args.to_vec())),
    arity: Arity::at_least(0),
};

const APPEND: PrimitiveFn = PrimitiveFn {
    name: "append",
    fn_ptr: append_,
    arity: Arity::exactly(2),
};

/// Concatenates two lists or two strings. Two numbers are added.
fn append_(_: &Interpreter, args: &[GelObject]) -> Flow {
    match (&args[0], &args[1]) {
        (GelObject::List(xs), GelObject::List(ys)) => {
            Ok(GelObject::wrap_list(xs.iter().chain(ys.iter()).cloned().collect()))
        }
        (GelObject::String(x), GelObject::String(y)) => Ok(GelObject::String(format!("{}{}", x, y))),
        (x, y) if x.is_number() && y.is_number() => {
            let sum = numeric::add(Number::from_object(x)?, Number::from_object(y)?)?;
            Ok(sum.into_object())
        }
        _ => Err(TypeMismatch::NotASequence.into()),
    }
}

const LENGTH: PrimitiveFn = PrimitiveFn {
    name: "length",
    fn_ptr: length_,
    arity: Arity::exactly(1),
};

fn length_(_: &Interpreter, args: &[GelObject]) -> Flow {
    let len = match &args[0] {
        GelObject::List(items) => items.len(),
        GelObject::String(s) => s.chars().count(),
        _ => return Err(TypeMismatch::NotASequence.into()),
    };
    Ok(GelObject::Integer(len as GelInt))
}

const MAP: PrimitiveFn = PrimitiveFn {
    name: "map",
    fn_ptr: map_,
    arity: Arity::exactly(2),
};

fn map_(interp: &Interpreter, args: &[GelObject]) -> Flow {
    let mapped: Flow<Vec<_>> = elements(&args[1])?
        .iter()
        .map(|item| evaluator::apply_fully(interp, &args[0], std::slice::from_ref(item)))
        .collect();
    Ok(GelObject::wrap_list(mapped?))
}

const FILTER: PrimitiveFn = PrimitiveFn {
    name: "filter",
    fn_ptr: filter_,
    arity: Arity::exactly(2),
};

fn filter_(interp: &Interpreter, args: &[GelObject]) -> Flow {
    let mut kept = Vec::new();
    for item in elements(&args[1])? {
        let verdict = evaluator::apply_fully(interp, &args[0], std::slice::from_ref(&item))?;
        if truthy(&verdict) {
            kept.push(item);
        }
    }
    Ok(GelObject::wrap_list(kept))
}

const APPLY: PrimitiveFn = PrimitiveFn {
    name: "apply",
    fn_ptr: |interp: &Interpreter, args: &[GelObject]| evaluator::apply_fully(interp, &args[0], args[1].as_list()?),
    arity: Arity::exactly(2),
};

const RANGE: PrimitiveFn = PrimitiveFn {
    name: "range",
    fn_ptr: range_,
    arity: Arity::Between(1..=2),
};

fn range_(_: &Interpreter, args: &[GelObject]) -> Flow {
    let (start, end) = match args {
        [end] => (0, end.as_int()?),
        [start, end] => (start.as_int()?, end.as_int()?),
        _ => unreachable!("arity is validated before the call"),
    };
    Ok(GelObject::wrap_list((start..end).map(GelObject::Integer).collect()))
}

const LIST_TEST: PrimitiveFn = PrimitiveFn {
    name: "list?",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::Bool(args[0].as_list().is_ok())),
    arity: Arity::exactly(1),
};

const NUMBER_TEST: PrimitiveFn = PrimitiveFn {
    name: "number?",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::Bool(args[0].is_number())),
    arity: Arity::exactly(1),
};

const BOOL_TEST: PrimitiveFn = PrimitiveFn {
    name: "bool?",
    fn_ptr: bool_test_,
    arity: Arity::exactly(1),
};

fn bool_test_(_: &Interpreter, args: &[GelObject]) -> Flow {
    Ok(GelObject::Bool(matches!(args[0], GelObject::Bool(_))))
}

const STRING_TEST: PrimitiveFn = PrimitiveFn {
    name: "str?",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::Bool(args[0].as_string().is_ok())),
    arity: Arity::exactly(1),
};

const PROCEDURE_TEST: PrimitiveFn = PrimitiveFn {
    name: "proc?",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::Bool(callable(&args[0]))),
    arity: Arity::exactly(1),
};

const NOT: PrimitiveFn = PrimitiveFn {
    name: "not",
    fn_ptr: |_: &Interpreter, args: &[GelObject]| Ok(GelObject::Bool(!truthy(&args[0]))),
    arity: Arity::exactly(1),
};

const OR: PrimitiveFn = PrimitiveFn {
    name: "or",
    fn_ptr: or_,
    arity: Arity::exactly(2),
};

/// Logical on booleans, bitwise on integers.
fn or_(_: &Interpreter, args: &[GelObject]) -> Flow {
    match (&args[0], &args[1]) {
        (GelObject::Bool(x), GelObject::Bool(y)) => Ok(GelObject::Bool(*x || *y)),
        (x, y) => Ok(GelObject::Integer(x.as_int()? | y.as_int()?)),
    }
}

pub static CORE: &[PrimitiveFn] = &[
    // Arithmetic
    SUM,
    SUB,
    MUL,
    DIV,
    FLOOR_DIV,
    MOD,
    SHR,
    SHL,
    ABS,
    MAX,
    MIN,
    ROUND,
    LIST_SUM,
    FLOOR,
    CEIL,
    POW,
    // Real and complex functions
    SQRT,
    LOG,
    EXP,
    SIN,
    COS,
    TAN,
    // Comparisons
    GT,
    GE,
    LT,
    LE,
    EQUAL,
    // Working with lists
    CAR,
    CDR,
    CONS,
    LIST,
    APPEND,
    LENGTH,
    MAP,
    FILTER,
    APPLY,
    RANGE,
    // Casting and testing
    LIST_TEST,
    NUMBER_TEST,
    BOOL_TEST,
    STRING_TEST,
    PROCEDURE_TEST,
    NOT,
    OR,
];
