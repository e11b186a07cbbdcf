#![allow(dead_code)]

use gazelle::{Error, GelObject, Interpreter};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// A writer whose contents can still be read after it has been handed to an
/// interpreter.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Session {
    pub interp: Interpreter,
    output: SharedBuffer,
}

/// A fresh interpreter with the prelude loaded and `display` captured.
pub fn session() -> Session {
    let output = SharedBuffer::default();
    let interp = Interpreter::with_output(Box::new(output.clone()));
    interp.load_prelude().expect("prelude failed to load");
    Session { interp, output }
}

impl Session {
    pub fn eval(&self, src: &str) -> GelObject {
        match self.interp.run(src) {
            Ok(value) => value,
            Err(e) => panic!("{} failed: {}", src, e),
        }
    }

    /// The result printed the way the REPL shows it.
    pub fn show(&self, src: &str) -> String {
        self.eval(src).to_string()
    }

    pub fn error(&self, src: &str) -> Error {
        match self.interp.run(src) {
            Ok(value) => panic!("{} should have failed, but gave {}", src, value),
            Err(e) => e,
        }
    }

    pub fn output(&self) -> String {
        self.output.contents()
    }
}

pub fn int(x: i64) -> GelObject {
    GelObject::Integer(x)
}

pub fn boolean(b: bool) -> GelObject {
    GelObject::Bool(b)
}
