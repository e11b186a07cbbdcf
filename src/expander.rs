//! Turns read forms into canonical expressions for the evaluator.
//!
//! Expansion checks the shape of every special form, rewrites definition and
//! lambda sugar, runs macros and expands quasiquote templates. It is the
//! expand-time half of a two-phase protocol: a top-level `macro` form is the
//! one place where expansion calls into the evaluator, to build the macro's
//! procedure before any later form is expanded.

use crate::evaluator::{self, Flow};
use crate::interpreter::Interpreter;
use crate::printer::{pr_str, PrintMode};
use crate::symbols::SpecialForm;
use crate::types::{callable, Arity, BadArgCount, GelObject, Params};
use std::fmt;

#[derive(Debug)]
pub enum SyntaxError {
    EmptyCall,
    WrongArgCount(BadArgCount),
    SetTargetNotSymbol(String),
    DefTargetNotSymbol(String),
    MacroNotAtTopLevel(String),
    MacroNotCallable(String),
    IllegalLambdaParameters(String),
    SpliceOutsideList(String),
    IllegalLetBindings(String),
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::EmptyCall => write!(f, "expression is empty"),
            SyntaxError::WrongArgCount(e) => write!(f, "{}", e),
            SyntaxError::SetTargetNotSymbol(target) => {
                write!(f, "set! expects a symbol, not {}", target)
            }
            SyntaxError::DefTargetNotSymbol(target) => {
                write!(f, "definition expects to bind to a symbol, not {}", target)
            }
            SyntaxError::MacroNotAtTopLevel(name) => {
                write!(f, "macro {} can only be defined at the top level", name)
            }
            SyntaxError::MacroNotCallable(name) => write!(
                f,
                "macro {} must be a procedure, not an atom or list",
                name
            ),
            SyntaxError::IllegalLambdaParameters(params) => {
                write!(f, "illegal lambda argument list {}", params)
            }
            SyntaxError::SpliceOutsideList(form) => write!(f, "{}: can't splice here", form),
            SyntaxError::IllegalLetBindings(form) => {
                write!(f, "{}: let was given an illegal binding list", form)
            }
        }
    }
}

impl From<BadArgCount> for SyntaxError {
    fn from(e: BadArgCount) -> Self {
        SyntaxError::WrongArgCount(e)
    }
}

fn check_arity(arity: Arity, args: &[GelObject], name: &'static str) -> Result<(), SyntaxError> {
    arity.validate_for(args.len(), name).map_err(SyntaxError::from)
}

pub(crate) fn expand(interp: &Interpreter, expr: &GelObject, top_level: bool) -> Flow {
    let list = match expr {
        GelObject::List(list) => list,
        _ => return Ok(expr.clone()),
    };
    let (head, args) = list.split_first().ok_or(SyntaxError::EmptyCall)?;
    let keywords = interp.keywords();
    let form = head.as_symbol().ok().and_then(|s| keywords.special_form(s));

    match form {
        Some(SpecialForm::Quote) => {
            check_arity(Arity::exactly(1), args, "quote")?;
            Ok(expr.clone())
        }
        Some(SpecialForm::If) => {
            check_arity(Arity::Between(2..=3), args, "if")?;
            let mut expanded = vec![head.clone()];
            for arg in args {
                expanded.push(expand(interp, arg, false)?);
            }
            if args.len() == 2 {
                expanded.push(GelObject::Unspecified);
            }
            Ok(GelObject::wrap_list(expanded))
        }
        Some(SpecialForm::Set) => {
            check_arity(Arity::exactly(2), args, "set!")?;
            if args[0].as_symbol().is_err() {
                let target = pr_str(&args[0], PrintMode::Readable);
                return Err(SyntaxError::SetTargetNotSymbol(target).into());
            }
            Ok(GelObject::wrap_list(vec![
                head.clone(),
                args[0].clone(),
                expand(interp, &args[1], false)?,
            ]))
        }
        Some(SpecialForm::Def) => expand_definition(interp, head, args, top_level, false),
        Some(SpecialForm::Macro) => expand_definition(interp, head, args, top_level, true),
        Some(SpecialForm::Begin) => {
            if args.is_empty() {
                return Ok(GelObject::Unspecified);
            }
            let mut expanded = vec![head.clone()];
            for arg in args {
                expanded.push(expand(interp, arg, top_level)?);
            }
            Ok(GelObject::wrap_list(expanded))
        }
        Some(SpecialForm::Lambda) => {
            check_arity(Arity::at_least(2), args, "lambda")?;
            let (params, body) = args.split_first().ok_or(SyntaxError::EmptyCall)?;
            if Params::from_form(params).is_none() {
                let params = pr_str(params, PrintMode::Readable);
                return Err(SyntaxError::IllegalLambdaParameters(params).into());
            }
            let body = match body {
                [single] => single.clone(),
                _ => {
                    let mut wrapped = vec![GelObject::Symbol(keywords.begin.clone())];
                    wrapped.extend_from_slice(body);
                    GelObject::wrap_list(wrapped)
                }
            };
            Ok(GelObject::wrap_list(vec![
                GelObject::Symbol(keywords.lambda.clone()),
                params.clone(),
                expand(interp, &body, false)?,
            ]))
        }
        Some(SpecialForm::Quasiquote) => {
            check_arity(Arity::exactly(1), args, "quasiquote")?;
            expand_quasiquote(interp, &args[0])
        }
        _ => {
            let macro_fn = head.as_symbol().ok().and_then(|s| interp.lookup_macro(s));
            if let Some(macro_fn) = macro_fn {
                let expansion = evaluator::apply_fully(interp, &macro_fn, args)?;
                log::trace!("macro {} expanded to {}", head, expansion);
                return expand(interp, &expansion, top_level);
            }
            let expanded: Flow<Vec<_>> = list
                .iter()
                .map(|obj| expand(interp, obj, false))
                .collect();
            Ok(GelObject::wrap_list(expanded?))
        }
    }
}

/// `(def target value)` and `(macro target value)`, including the
/// `(def (name arg…) body…)` sugar.
fn expand_definition(
    interp: &Interpreter,
    head: &GelObject,
    args: &[GelObject],
    top_level: bool,
    is_macro: bool,
) -> Flow {
    let name = if is_macro { "macro" } else { "def" };
    check_arity(Arity::at_least(2), args, name)?;
    let (target, body) = args.split_first().ok_or(SyntaxError::EmptyCall)?;

    if let GelObject::List(signature) = target {
        // (def (f a b) body…) => (def f (lambda (a b) body…)). The name may
        // itself be a signature, giving curried definitions.
        let (fname, params) = signature.split_first().ok_or_else(|| {
            SyntaxError::DefTargetNotSymbol(pr_str(target, PrintMode::Readable))
        })?;
        let mut lambda = vec![
            GelObject::Symbol(interp.keywords().lambda.clone()),
            GelObject::wrap_list(params.to_vec()),
        ];
        lambda.extend_from_slice(body);
        let rewritten = GelObject::wrap_list(vec![
            head.clone(),
            fname.clone(),
            GelObject::wrap_list(lambda),
        ]);
        return expand(interp, &rewritten, top_level);
    }

    check_arity(Arity::exactly(2), args, name)?;
    let symbol = target
        .as_symbol()
        .map_err(|_| SyntaxError::DefTargetNotSymbol(pr_str(target, PrintMode::Readable)))?;
    let value = expand(interp, &body[0], false)?;

    if !is_macro {
        return Ok(GelObject::wrap_list(vec![
            head.clone(),
            target.clone(),
            value,
        ]));
    }

    if !top_level {
        return Err(SyntaxError::MacroNotAtTopLevel(symbol.to_string()).into());
    }
    let procedure = evaluator::eval(interp, &value, interp.global())?;
    if !callable(&procedure) {
        return Err(SyntaxError::MacroNotCallable(symbol.to_string()).into());
    }
    log::debug!("install macro {}", symbol);
    interp.define_macro(symbol.clone(), procedure);
    Ok(GelObject::Unspecified)
}

/// Rewrites a quasiquote template into `cons`/`append`/`quote` calls that
/// rebuild it at run time.
fn expand_quasiquote(interp: &Interpreter, expr: &GelObject) -> Flow {
    let keywords = interp.keywords();
    let items = match expr {
        GelObject::List(items) if !items.is_empty() => items,
        _ => {
            return Ok(GelObject::wrap_list(vec![
                GelObject::Symbol(keywords.quote.clone()),
                expr.clone(),
            ]))
        }
    };

    if items[0].is(&keywords.unquote_splicing) {
        return Err(SyntaxError::SpliceOutsideList(pr_str(expr, PrintMode::Readable)).into());
    }
    if items[0].is(&keywords.unquote) {
        check_arity(Arity::exactly(1), &items[1..], "unquote")?;
        return expand(interp, &items[1], false);
    }

    let rest = GelObject::wrap_list(items[1..].to_vec());
    if let GelObject::List(first) = &items[0] {
        if first.first().map_or(false, |h| h.is(&keywords.unquote_splicing)) {
            check_arity(Arity::exactly(1), &first[1..], "unquote-splicing")?;
            return Ok(GelObject::wrap_list(vec![
                GelObject::Symbol(keywords.append.clone()),
                expand(interp, &first[1], false)?,
                expand_quasiquote(interp, &rest)?,
            ]));
        }
    }

    Ok(GelObject::wrap_list(vec![
        GelObject::Symbol(keywords.cons.clone()),
        expand_quasiquote(interp, &items[0])?,
        expand_quasiquote(interp, &rest)?,
    ]))
}
