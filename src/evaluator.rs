use crate::environment::{Environment, UnknownSymbol};
use crate::escape::{self, Escape, EscapePoint};
use crate::expander::SyntaxError;
use crate::interpreter::Interpreter;
use crate::symbols::SpecialForm;
use crate::types::{BadArgCount, Closure, GelInt, GelObject, PrimitiveFn, TypeMismatch};
use crate::{printer, reader, special_forms};
use itertools::Itertools;

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

pub type Result<T = GelObject> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Syntax(SyntaxError),
    UnknownSymbol(UnknownSymbol),
    BadArgCount(BadArgCount),
    TypeMismatch(TypeMismatch),
    NotCallable(String),
    BadIndex(GelInt, Range<usize>),
    DivideByZero,
    IntegerOverflow,
    ReadError(reader::ReadError),
    IOError(std::io::Error),
    DanglingEscape(EscapePoint),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(e) => write!(f, "{}", e),
            Error::UnknownSymbol(e) => write!(f, "{}", e),
            Error::BadArgCount(e) => write!(f, "{}", e),
            Error::TypeMismatch(e) => write!(f, "type mismatch: {}", e),
            Error::NotCallable(obj) => write!(f, "'{}' object is not callable", obj),
            Error::BadIndex(i, r) => {
                write!(f, "bad index: {} not in range [{}, {})", i, r.start, r.end)
            }
            Error::DivideByZero => write!(f, "cannot divide by zero!"),
            Error::IntegerOverflow => write!(f, "integer overflow"),
            Error::ReadError(e) => write!(f, "read error: {}", e),
            Error::IOError(e) => write!(f, "io error: {}", e),
            Error::DanglingEscape(point) => write!(
                f,
                "continuation #{} was invoked after its call/cc returned",
                point
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl From<UnknownSymbol> for Error {
    fn from(e: UnknownSymbol) -> Self {
        Self::UnknownSymbol(e)
    }
}

impl From<BadArgCount> for Error {
    fn from(e: BadArgCount) -> Self {
        Self::BadArgCount(e)
    }
}

impl From<TypeMismatch> for Error {
    fn from(t: TypeMismatch) -> Self {
        Self::TypeMismatch(t)
    }
}

impl From<reader::ReadError> for Error {
    fn from(e: reader::ReadError) -> Self {
        Self::ReadError(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e)
    }
}

/// Why an evaluation stopped early: a failure, or a `call/cc` escape on its
/// way back to the activation that created it.
#[derive(Debug)]
pub enum Unwind {
    Error(Error),
    Escape(Escape),
}

impl Unwind {
    /// Used where evaluation leaves the interpreter. Any escape still
    /// travelling here has outlived its `call/cc`.
    pub fn into_error(self) -> Error {
        match self {
            Unwind::Error(e) => e,
            Unwind::Escape(escape) => {
                log::debug!("escape {} reached the top level", escape.point);
                Error::DanglingEscape(escape.point)
            }
        }
    }
}

macro_rules! unwind_from {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Unwind {
                fn from(e: $source) -> Self {
                    Unwind::Error(e.into())
                }
            }
        )*
    };
}

unwind_from!(
    Error,
    SyntaxError,
    UnknownSymbol,
    BadArgCount,
    TypeMismatch,
    reader::ReadError,
    std::io::Error
);

pub type Flow<T = GelObject> = std::result::Result<T, Unwind>;

pub(crate) fn eval(
    interp: &Interpreter,
    orig_ast: &GelObject,
    orig_env: &Rc<Environment>,
) -> Flow {
    let mut ast = orig_ast.clone();
    let mut env = orig_env.clone();
    loop {
        let argv = match &ast {
            GelObject::Symbol(s) => return Ok(env.fetch(s)?),
            GelObject::List(list) => list.clone(),
            _ => return Ok(ast.clone()),
        };
        let (head, args) = argv.split_first().ok_or(SyntaxError::EmptyCall)?;
        log::trace!("apply {}", ast);

        let form = head
            .as_symbol()
            .ok()
            .and_then(|s| interp.keywords().special_form(s));
        if let Some(form) = form {
            match form {
                SpecialForm::Quote => return special_forms::apply_quote(args),
                SpecialForm::If => {
                    ast = special_forms::apply_if(interp, args, &env)?;
                    continue;
                }
                SpecialForm::Set => return special_forms::apply_set(interp, args, &env),
                SpecialForm::Def => {
                    let result = special_forms::apply_def(interp, args, &env);
                    if result.is_ok() {
                        log::debug!("define {}", args[0]);
                    }
                    return result;
                }
                SpecialForm::Lambda => return special_forms::apply_lambda(args, &env),
                SpecialForm::Begin => {
                    ast = special_forms::apply_begin(interp, args, &env)?;
                    continue;
                }
                SpecialForm::Return => {
                    ast = special_forms::apply_return(args)?;
                    continue;
                }
                SpecialForm::Display => return special_forms::apply_display(interp, args, &env),
                SpecialForm::Include => return special_forms::apply_include(interp, args, &env),
                SpecialForm::While => return special_forms::apply_while(interp, args, &env),
                SpecialForm::CheckExpect => {
                    return special_forms::apply_check_expect(interp, args, &env)
                }
                SpecialForm::CheckWithin => {
                    return special_forms::apply_check_within(interp, args, &env)
                }
                SpecialForm::Member => return special_forms::apply_member(interp, args, &env),
                SpecialForm::Stdlib => return special_forms::apply_stdlib(interp, args, &env),
                // Only the expander understands these; reaching here means the
                // expression was never expanded. Treat them as applications.
                SpecialForm::Quasiquote | SpecialForm::Macro => (),
            }
        }

        let evaluated = evaluate_sequence_elementwise(interp, &argv, &env)?;
        let (callable, args) = evaluated.split_first().ok_or(SyntaxError::EmptyCall)?;
        match apply(interp, callable, args)? {
            ApplyOutcome::Finished(obj) => return Ok(obj),
            ApplyOutcome::EvaluateFurther(next_ast, next_env) => {
                ast = next_ast;
                env = next_env;
            }
        }
    }
}

// A closure call is not finished by `apply`: it hands back the body and the
// new frame so that `eval` can keep looping instead of recursing.
pub(crate) enum ApplyOutcome {
    Finished(GelObject),
    EvaluateFurther(GelObject, Rc<Environment>),
}

/// Applies a callable and runs any closure body to completion. For callers
/// outside the eval loop (primitives, macro expansion, `call/cc`).
pub(crate) fn apply_fully(interp: &Interpreter, callable: &GelObject, args: &[GelObject]) -> Flow {
    apply(interp, callable, args).and_then(|outcome| match outcome {
        ApplyOutcome::Finished(obj) => Ok(obj),
        ApplyOutcome::EvaluateFurther(ast, env) => eval(interp, &ast, &env),
    })
}

pub(crate) fn apply(
    interp: &Interpreter,
    callable: &GelObject,
    args: &[GelObject],
) -> Flow<ApplyOutcome> {
    use GelObject::{CallCc, Closure, Continuation, Primitive};
    match callable {
        Primitive(f) => call_primitive(interp, f, args).map(ApplyOutcome::Finished),
        Closure(f) => {
            let ast = f.body.clone();
            let env = make_closure_env(f, args)?;
            Ok(ApplyOutcome::EvaluateFurther(ast, env))
        }
        CallCc => escape::call_cc(interp, args).map(ApplyOutcome::Finished),
        Continuation(point) => escape::throw(*point, args).map(ApplyOutcome::Finished),
        _ => Err(Error::NotCallable(printer::pr_str(callable, printer::PrintMode::Readable)).into()),
    }
}

pub(crate) fn evaluate_sequence_elementwise(
    interp: &Interpreter,
    seq: &[GelObject],
    env: &Rc<Environment>,
) -> Flow<Vec<GelObject>> {
    seq.iter().map(|obj| eval(interp, obj, env)).collect()
}

pub(crate) fn pretty_print_args(args: &[GelObject]) -> String {
    match args.len() {
        0 => "no args".into(),
        1 => args[0].to_string(),
        _ => format!("\n\t{}", args.iter().join("\n\t")),
    }
}

pub(crate) fn call_primitive(
    interp: &Interpreter,
    func: &PrimitiveFn,
    args: &[GelObject],
) -> Flow {
    func.arity.validate_for(args.len(), func.name)?;
    log::trace!("Call {} with {}", func.name, pretty_print_args(args));
    let result = (func.fn_ptr)(interp, args);
    match &result {
        Ok(val) => log::trace!("Call to {} resulted in {}", func.name, val),
        Err(Unwind::Error(e)) => log::trace!("Call to {} failed: {}", func.name, e),
        Err(Unwind::Escape(e)) => log::trace!("Call to {} escaped to {}", func.name, e.point),
    }
    result
}

fn make_closure_env(func: &Closure, args: &[GelObject]) -> Flow<Rc<Environment>> {
    log::trace!(
        "Call (lambda {} ...) with {}",
        func.parameters,
        pretty_print_args(args)
    );
    Ok(Environment::bind(&func.parameters, args, &func.parent)?)
}
