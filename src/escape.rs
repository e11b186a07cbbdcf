//! Escape-only continuations.
//!
//! `(call/cc f)` calls `f` with a one-argument throw procedure. Calling the
//! throw procedure abandons everything between it and the `call/cc` that made
//! it, and that `call/cc` returns the thrown value. The unwinding travels as
//! `Unwind::Escape` through the evaluator's result type, so only the matching
//! `call/cc` activation can stop it; failures never see it.

use crate::evaluator::{self, Flow, Unwind};
use crate::interpreter::Interpreter;
use crate::types::{Arity, GelObject};
use std::fmt;

/// Identifies one `call/cc` activation. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapePoint(pub(crate) u64);

impl fmt::Display for EscapePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct Escape {
    pub point: EscapePoint,
    pub payload: GelObject,
}

pub(crate) fn call_cc(interp: &Interpreter, args: &[GelObject]) -> Flow {
    Arity::exactly(1).validate_for(args.len(), "call/cc")?;
    let point = interp.fresh_escape_point();
    log::trace!("call/cc opened escape point {}", point);
    let throw = GelObject::Continuation(point);
    match evaluator::apply_fully(interp, &args[0], &[throw]) {
        Err(Unwind::Escape(escape)) if escape.point == point => {
            log::trace!("escape point {} caught {}", point, escape.payload);
            Ok(escape.payload)
        }
        other => other,
    }
}

pub(crate) fn throw(point: EscapePoint, args: &[GelObject]) -> Flow {
    Arity::exactly(1).validate_for(args.len(), "continuation")?;
    Err(Unwind::Escape(Escape {
        point,
        payload: args[0].clone(),
    }))
}
