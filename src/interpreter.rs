use crate::environment::Environment;
use crate::escape::EscapePoint;
use crate::evaluator::{self, Error, Flow, Result, Unwind};
use crate::macros::{self, MacroTable};
use crate::reader::{self, ReadError};
use crate::symbols::{GelSymbol, Keywords, SymbolTable};
use crate::types::GelObject;
use crate::{core, expander};
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::path::Path;
use std::rc::{Rc, Weak};

pub(crate) const PRELUDE: &str = include_str!("prelude.gel");

/// One interpreter session: its symbols, macros, global frame and output.
///
/// Sessions are independent. Nothing is shared between two `Interpreter`s,
/// so a symbol interned by one is never equal to a symbol from another.
pub struct Interpreter {
    symbols: RefCell<SymbolTable>,
    keywords: Keywords,
    macros: RefCell<MacroTable>,
    global: Rc<Environment>,
    closure_frames: RefCell<Vec<Weak<Environment>>>,
    escape_points: Cell<u64>,
    output: RefCell<Box<dyn Write>>,
}

impl Interpreter {
    /// A session writing `display` output to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        let mut symbols = SymbolTable::default();
        let keywords = Keywords::new(&mut symbols);
        let global = Environment::root();

        for func in core::CORE {
            global.set(symbols.intern(func.name), GelObject::Primitive(func));
        }
        global.set(symbols.intern("call/cc"), GelObject::CallCc);
        global.set(symbols.intern("pi"), GelObject::Float(std::f64::consts::PI));
        global.set(symbols.intern("e"), GelObject::Float(std::f64::consts::E));

        let mut macro_table = MacroTable::default();
        macro_table.define(keywords.let_.clone(), GelObject::Primitive(&macros::LET));

        Interpreter {
            symbols: RefCell::new(symbols),
            keywords,
            macros: RefCell::new(macro_table),
            global,
            closure_frames: RefCell::new(Vec::new()),
            escape_points: Cell::new(0),
            output: RefCell::new(output),
        }
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    pub fn global(&self) -> &Rc<Environment> {
        &self.global
    }

    pub fn intern(&self, name: &str) -> GelSymbol {
        self.symbols.borrow_mut().intern(name)
    }

    pub fn lookup_macro(&self, name: &GelSymbol) -> Option<GelObject> {
        self.macros.borrow().get(name)
    }

    pub fn define_macro(&self, name: GelSymbol, procedure: GelObject) {
        self.macros.borrow_mut().define(name, procedure);
    }

    /// Remembers a procedure frame that a closure was defined into. The
    /// closure holds the frame as its parent, so the two form a cycle that
    /// only clearing the frame can break.
    pub(crate) fn track_closure_frame(&self, frame: &Rc<Environment>) {
        if Rc::ptr_eq(frame, &self.global) {
            return;
        }
        let mut frames = self.closure_frames.borrow_mut();
        if frames.len() == frames.capacity() {
            frames.retain(|weak| weak.strong_count() > 0);
        }
        frames.push(Rc::downgrade(frame));
    }

    pub(crate) fn fresh_escape_point(&self) -> EscapePoint {
        let id = self.escape_points.get() + 1;
        self.escape_points.set(id);
        EscapePoint(id)
    }

    /// Writes one line of `display` output.
    pub(crate) fn emit(&self, text: &str) -> io::Result<()> {
        let mut output = self.output.borrow_mut();
        writeln!(output, "{}", text)?;
        output.flush()
    }

    pub fn read(&self, source: &str) -> std::result::Result<Vec<GelObject>, ReadError> {
        reader::read_all(source, &mut self.symbols.borrow_mut())
    }

    /// Expands one top-level form.
    pub fn expand(&self, form: &GelObject) -> Result {
        expander::expand(self, form, true).map_err(Unwind::into_error)
    }

    /// Evaluates an already expanded form in the global frame.
    pub fn eval(&self, expr: &GelObject) -> Result {
        evaluator::eval(self, expr, &self.global).map_err(Unwind::into_error)
    }

    /// Expands and evaluates one top-level form.
    pub fn eval_form(&self, form: &GelObject) -> Result {
        let expr = self.expand(form)?;
        self.eval(&expr)
    }

    /// Reads, expands and evaluates every form in `source`, returning the
    /// value of the last one.
    pub fn run(&self, source: &str) -> Result {
        self.run_in(source, &self.global).map_err(Unwind::into_error)
    }

    pub(crate) fn run_in(&self, source: &str, env: &Rc<Environment>) -> Flow {
        let mut last = GelObject::Unspecified;
        for form in self.read(source)? {
            let expr = expander::expand(self, &form, true)?;
            last = evaluator::eval(self, &expr, env)?;
        }
        Ok(last)
    }

    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result {
        let path = path.as_ref();
        log::debug!("run file {}", path.display());
        let source = std::fs::read_to_string(path).map_err(Error::IOError)?;
        self.run(&source)
    }

    /// Defines the procedures and macros written in Gazelle itself.
    pub fn load_prelude(&self) -> Result<()> {
        self.run(PRELUDE).map(|_| ())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    // Closures hold the frame they were defined in, which holds them.
    // Emptying those frames breaks the cycles.
    fn drop(&mut self) {
        for frame in self.closure_frames.borrow_mut().drain(..) {
            if let Some(frame) = frame.upgrade() {
                frame.clear();
            }
        }
        self.global.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_do_not_share_symbols() {
        let a = Interpreter::new();
        let b = Interpreter::new();
        assert_ne!(a.intern("x"), b.intern("x"));
        assert_eq!(a.intern("x"), a.intern("x"));
    }

    #[test]
    fn escape_points_are_never_reused() {
        let interp = Interpreter::new();
        let first = interp.fresh_escape_point();
        let second = interp.fresh_escape_point();
        assert_ne!(first, second);
    }

    #[test]
    fn definitions_persist_between_runs() {
        let interp = Interpreter::new();
        interp.run("(def x 41)").unwrap();
        assert_eq!(interp.run("(+ x 1)").unwrap(), GelObject::Integer(42));
    }

    #[test]
    fn inner_closure_frames_are_freed_with_the_session() {
        let interp = Interpreter::new();
        interp
            .run("(def (outer) (def (inner) 1) inner) (def kept (outer)) (outer)")
            .unwrap();
        let frame = match interp.run("kept").unwrap() {
            GelObject::Closure(closure) => Rc::downgrade(&closure.parent),
            other => panic!("expected a closure, got {}", other),
        };
        assert!(frame.upgrade().is_some());
        drop(interp);
        assert!(frame.upgrade().is_none());
    }

    #[test]
    fn prelude_loads() {
        let interp = Interpreter::new();
        interp.load_prelude().unwrap();
        assert_eq!(interp.run("(reverse '(1 2 3))").unwrap().to_string(), "(3 2 1)");
    }
}
