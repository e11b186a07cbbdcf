use crate::environment::Environment;
use crate::escape::EscapePoint;
use crate::evaluator;
use crate::interpreter::Interpreter;
use crate::symbols::GelSymbol;
use derive_more::Deref;
use itertools::Itertools;
use num::complex::Complex64;
use std::fmt;
use std::fmt::Formatter;
use std::ops::{RangeFrom, RangeInclusive};
use std::rc::Rc;

#[derive(Deref, Debug)]
pub struct GelList(pub Vec<GelObject>);

pub type GelInt = i64;

#[derive(Debug, Clone)]
pub enum Arity {
    Between(RangeInclusive<usize>),
    AtLeast(RangeFrom<usize>),
}

#[derive(Debug)]
pub struct BadArgCount {
    name: &'static str,
    expected: Arity,
    got: usize,
}

impl BadArgCount {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn got(&self) -> usize {
        self.got
    }
}

impl fmt::Display for BadArgCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "When evaluating {} expected {} arguments, but received {} arguments",
            self.name, self.expected, self.got
        )
    }
}

impl Arity {
    pub(crate) const fn exactly(n: usize) -> Self {
        Self::Between(n..=n)
    }

    pub(crate) const fn at_least(n: usize) -> Self {
        Self::AtLeast(n..)
    }

    pub(crate) fn contains(&self, n: usize) -> bool {
        match self {
            Self::Between(range) => range.contains(&n),
            Self::AtLeast(range) => range.contains(&n),
        }
    }

    pub(crate) fn validate_for(&self, n: usize, name: &'static str) -> Result<(), BadArgCount> {
        match self.contains(n) {
            true => Ok(()),
            false => Err(BadArgCount {
                name,
                expected: self.clone(),
                got: n,
            }),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Between(r) => {
                if r.start() == r.end() {
                    write!(f, "exactly {}", r.start())
                } else {
                    write!(f, "from {} to {}", r.start(), r.end())
                }
            }
            Arity::AtLeast(r) => write!(f, "at least {}", r.start),
        }
    }
}

pub struct PrimitiveFn {
    pub name: &'static str,
    pub arity: Arity,
    pub fn_ptr: fn(&Interpreter, &[GelObject]) -> evaluator::Flow,
}

impl fmt::Debug for PrimitiveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "primitive function #<{}>", self.name)
    }
}

/// How a closure binds its arguments: positionally, or all of them collected
/// into one list when the parameter form is a bare symbol.
#[derive(Clone, Debug)]
pub enum Params {
    Positional(Vec<GelSymbol>),
    Collected(GelSymbol),
}

impl Params {
    /// Reads a lambda parameter form. `None` unless the form is a symbol or a
    /// list made only of symbols.
    pub(crate) fn from_form(form: &GelObject) -> Option<Self> {
        match form {
            GelObject::Symbol(s) => Some(Params::Collected(s.clone())),
            GelObject::List(list) => list
                .iter()
                .map(|obj| obj.as_symbol().ok().cloned())
                .collect::<Option<Vec<_>>>()
                .map(Params::Positional),
            _ => None,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Params::Positional(symbols) => Arity::exactly(symbols.len()),
            Params::Collected(_) => Arity::at_least(0),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Params::Positional(symbols) => write!(f, "({})", symbols.iter().join(" ")),
            Params::Collected(rest) => write!(f, "{}", rest),
        }
    }
}

#[derive(Clone)]
pub struct Closure {
    pub parameters: Params,
    pub body: GelObject,
    pub parent: Rc<Environment>,
}

impl fmt::Debug for Closure {
    // Not derived because we want to skip the parent: the parent may well contain this Closure!
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Closure{{parameters: {:?}, body: {:?}}}",
            self.parameters, self.body
        )
    }
}

#[derive(Debug, Clone)]
pub enum GelObject {
    Unspecified,
    Bool(bool),
    Integer(GelInt),
    Float(f64),
    Complex(Complex64),
    String(String),
    Symbol(GelSymbol),
    List(Rc<GelList>),
    Primitive(&'static PrimitiveFn),
    Closure(Rc<Closure>),
    CallCc,
    Continuation(EscapePoint),
}

/// Values that count as false: `#f`, no value, zero, and empty strings or lists.
pub(crate) fn truthy(obj: &GelObject) -> bool {
    use GelObject::*;
    match obj {
        Unspecified => false,
        Bool(t) => *t,
        Integer(x) => *x != 0,
        Float(x) => *x != 0.0,
        Complex(z) => z.re != 0.0 || z.im != 0.0,
        String(s) => !s.is_empty(),
        List(list) => !list.is_empty(),
        Symbol(_) | Primitive(_) | Closure(_) | CallCc | Continuation(_) => true,
    }
}

pub(crate) fn callable(obj: &GelObject) -> bool {
    use GelObject::*;
    match obj {
        Primitive(_) | Closure(_) | CallCc | Continuation(_) => true,
        Unspecified => false,
        Bool(_) => false,
        Integer(_) => false,
        Float(_) => false,
        Complex(_) => false,
        String(_) => false,
        Symbol(_) => false,
        List(_) => false,
    }
}

#[derive(Debug)]
pub enum TypeMismatch {
    NotAnInt,
    NotANumber,
    NotAList,
    NotASequence,
    NotASymbol,
    NotAString,
    NotCallable,
    NotComparable,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            TypeMismatch::NotAnInt => "expected an integer",
            TypeMismatch::NotANumber => "expected a number",
            TypeMismatch::NotAList => "expected a list",
            TypeMismatch::NotASequence => "object is not iterable",
            TypeMismatch::NotASymbol => "expected a symbol",
            TypeMismatch::NotAString => "expected a string",
            TypeMismatch::NotCallable => "object is not callable",
            TypeMismatch::NotComparable => "objects cannot be ordered",
        };
        write!(f, "{}", text)
    }
}

impl GelObject {
    pub(crate) fn as_int(&self) -> Result<GelInt, TypeMismatch> {
        match self {
            GelObject::Integer(x) => Ok(*x),
            _ => Err(TypeMismatch::NotAnInt),
        }
    }

    pub(crate) fn as_list(&self) -> Result<&[GelObject], TypeMismatch> {
        match self {
            GelObject::List(x) => Ok(x),
            _ => Err(TypeMismatch::NotAList),
        }
    }

    pub(crate) fn as_symbol(&self) -> Result<&GelSymbol, TypeMismatch> {
        match self {
            GelObject::Symbol(s) => Ok(s),
            _ => Err(TypeMismatch::NotASymbol),
        }
    }

    pub(crate) fn as_string(&self) -> Result<&str, TypeMismatch> {
        match self {
            GelObject::String(s) => Ok(s),
            _ => Err(TypeMismatch::NotAString),
        }
    }

    /// True when this is exactly the symbol `sym`.
    pub(crate) fn is(&self, sym: &GelSymbol) -> bool {
        match self {
            GelObject::Symbol(s) => s == sym,
            _ => false,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        match self {
            GelObject::Unspecified => true,
            _ => false,
        }
    }

    pub(crate) fn is_number(&self) -> bool {
        match self {
            GelObject::Integer(_) | GelObject::Float(_) | GelObject::Complex(_) => true,
            _ => false,
        }
    }
}

impl GelObject {
    pub(crate) fn wrap_list(elements: Vec<GelObject>) -> Self {
        Self::List(Rc::new(GelList(elements)))
    }
}

impl PartialEq for GelObject {
    fn eq(&self, other: &Self) -> bool {
        use GelObject::*;
        if self.is_number() && other.is_number() {
            return crate::numeric::numbers_equal(self, other);
        }
        match [self, other] {
            [List(x), List(y)] => equal_sequences(x, y),
            [Bool(x), Bool(y)] => x == y,
            [String(x), String(y)] => x == y,
            [Symbol(x), Symbol(y)] => x == y,
            [Closure(x), Closure(y)] => Rc::ptr_eq(x, y),
            [Primitive(x), Primitive(y)] => x.name == y.name,
            [CallCc, CallCc] => true,
            [Continuation(x), Continuation(y)] => x == y,
            [Unspecified, Unspecified] => true,
            [_, _] => false,
        }
    }
}

fn equal_sequences(xs: &[GelObject], ys: &[GelObject]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x == y)
}
