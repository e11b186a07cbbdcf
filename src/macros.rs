use crate::evaluator::Flow;
use crate::expander::SyntaxError;
use crate::interpreter::Interpreter;
use crate::printer::{pr_str, PrintMode};
use crate::symbols::GelSymbol;
use crate::types::{Arity, GelObject, PrimitiveFn};
use std::collections::HashMap;

/// Procedures the expander runs on unevaluated arguments. Entries are only
/// ever added or replaced.
#[derive(Default)]
pub struct MacroTable {
    macros: HashMap<GelSymbol, GelObject>,
}

impl MacroTable {
    pub fn define(&mut self, name: GelSymbol, procedure: GelObject) -> Option<GelObject> {
        self.macros.insert(name, procedure)
    }

    pub fn get(&self, name: &GelSymbol) -> Option<GelObject> {
        self.macros.get(name).cloned()
    }
}

/// `(let ((v e) …) body…)` becomes `((lambda (v …) body…) e …)`.
pub static LET: PrimitiveFn = PrimitiveFn {
    name: "let",
    arity: Arity::at_least(0),
    fn_ptr: expand_let,
};

fn expand_let(interp: &Interpreter, args: &[GelObject]) -> Flow {
    let keywords = interp.keywords();
    let illegal = || {
        let mut form = vec![GelObject::Symbol(keywords.let_.clone())];
        form.extend_from_slice(args);
        SyntaxError::IllegalLetBindings(pr_str(&GelObject::wrap_list(form), PrintMode::Readable))
    };

    if args.len() <= 1 {
        return Err(illegal().into());
    }
    let (bindings, body) = args.split_first().ok_or_else(illegal)?;
    let bindings = bindings.as_list().map_err(|_| illegal())?;

    let mut vars = Vec::with_capacity(bindings.len());
    let mut vals = Vec::with_capacity(bindings.len());
    for binding in bindings {
        match binding.as_list() {
            Ok([var @ GelObject::Symbol(_), val]) => {
                vars.push(var.clone());
                vals.push(val.clone());
            }
            _ => return Err(illegal().into()),
        }
    }

    let mut lambda = vec![
        GelObject::Symbol(keywords.lambda.clone()),
        GelObject::wrap_list(vars),
    ];
    lambda.extend_from_slice(body);
    let mut application = vec![GelObject::wrap_list(lambda)];
    application.extend(vals);
    Ok(GelObject::wrap_list(application))
}
