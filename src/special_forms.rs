use crate::environment::Environment;
use crate::evaluator::{eval, Flow};
use crate::expander::SyntaxError;
use crate::interpreter::{Interpreter, PRELUDE};
use crate::numeric::compare;
use crate::printer::{pr_str, PrintMode};
use crate::types::{truthy, Arity, Closure, GelObject, Params, TypeMismatch};
use std::rc::Rc;

pub fn apply_quote(args: &[GelObject]) -> Flow {
    Arity::exactly(1).validate_for(args.len(), "quote")?;
    Ok(args[0].clone())
}

/// Evaluates the test and returns the branch to continue with.
pub fn apply_if(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::Between(2..=3).validate_for(args.len(), "if")?;
    let condition = eval(interp, &args[0], env)?;
    if truthy(&condition) {
        Ok(args[1].clone())
    } else {
        Ok(args.get(2).cloned().unwrap_or(GelObject::Unspecified))
    }
}

pub fn apply_set(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(2).validate_for(args.len(), "set!")?;
    let key = args[0]
        .as_symbol()
        .map_err(|_| SyntaxError::SetTargetNotSymbol(pr_str(&args[0], PrintMode::Readable)))?;
    let value = eval(interp, &args[1], env)?;
    env.assign(key, value)?;
    Ok(GelObject::Unspecified)
}

pub fn apply_def(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(2).validate_for(args.len(), "def")?;
    let key = args[0]
        .as_symbol()
        .map_err(|_| SyntaxError::DefTargetNotSymbol(pr_str(&args[0], PrintMode::Readable)))?;
    let value = eval(interp, &args[1], env)?;
    if let GelObject::Closure(_) = value {
        interp.track_closure_frame(env);
    }
    env.set(key.clone(), value);
    Ok(GelObject::Unspecified)
}

pub fn apply_lambda(args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(2).validate_for(args.len(), "lambda")?;
    let parameters = Params::from_form(&args[0]).ok_or_else(|| {
        SyntaxError::IllegalLambdaParameters(pr_str(&args[0], PrintMode::Readable))
    })?;
    let closure = Closure {
        parameters,
        body: args[1].clone(),
        parent: env.clone(),
    };
    Ok(GelObject::Closure(Rc::new(closure)))
}

/// Evaluates all but the last form for effect; the last one is returned for
/// the caller to evaluate in tail position.
pub fn apply_begin(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    match args.split_last() {
        None => Ok(GelObject::Unspecified),
        Some((last, init)) => {
            for obj in init {
                eval(interp, obj, env)?;
            }
            Ok(last.clone())
        }
    }
}

pub fn apply_return(args: &[GelObject]) -> Flow {
    Arity::exactly(1).validate_for(args.len(), "return")?;
    Ok(args[0].clone())
}

pub fn apply_display(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(1).validate_for(args.len(), "display")?;
    let value = eval(interp, &args[0], env)?;
    interp.emit(&pr_str(&value, PrintMode::Directly))?;
    Ok(GelObject::Unspecified)
}

pub fn apply_include(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(1).validate_for(args.len(), "include")?;
    let path = eval(interp, &args[0], env)?;
    let path = path.as_string()?;
    log::debug!("include {}", path);
    let source = std::fs::read_to_string(path)?;
    interp.run_in(&source, env)
}

/// Loads the prelude's definitions into the current frame.
pub fn apply_stdlib(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(0).validate_for(args.len(), "stdlib")?;
    interp.run_in(PRELUDE, env)?;
    Ok(GelObject::Unspecified)
}

pub fn apply_while(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(2).validate_for(args.len(), "while")?;
    while truthy(&eval(interp, &args[0], env)?) {
        eval(interp, &args[1], env)?;
    }
    Ok(GelObject::Unspecified)
}

pub fn apply_check_expect(
    interp: &Interpreter,
    args: &[GelObject],
    env: &Rc<Environment>,
) -> Flow {
    Arity::exactly(2).validate_for(args.len(), "check-expect")?;
    let actual = eval(interp, &args[0], env)?;
    let expected = eval(interp, &args[1], env)?;
    Ok(GelObject::Bool(actual == expected))
}

pub fn apply_check_within(
    interp: &Interpreter,
    args: &[GelObject],
    env: &Rc<Environment>,
) -> Flow {
    Arity::exactly(3).validate_for(args.len(), "check-within")?;
    let value = eval(interp, &args[0], env)?;
    let lower = eval(interp, &args[1], env)?;
    let upper = eval(interp, &args[2], env)?;
    let within = compare(&value, &upper)?.is_le() && compare(&value, &lower)?.is_ge();
    Ok(GelObject::Bool(within))
}

pub fn apply_member(interp: &Interpreter, args: &[GelObject], env: &Rc<Environment>) -> Flow {
    Arity::exactly(2).validate_for(args.len(), "member?")?;
    let needle = eval(interp, &args[0], env)?;
    let haystack = eval(interp, &args[1], env)?;
    let found = match (&needle, &haystack) {
        (_, GelObject::List(items)) => items.iter().any(|item| *item == needle),
        (GelObject::String(part), GelObject::String(whole)) => whole.contains(part.as_str()),
        (_, GelObject::String(_)) => return Err(TypeMismatch::NotAString.into()),
        _ => return Err(TypeMismatch::NotASequence.into()),
    };
    Ok(GelObject::Bool(found))
}
