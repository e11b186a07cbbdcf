pub mod cmdline;
pub mod environment;
pub mod escape;
pub mod evaluator;
pub mod expander;
pub mod interpreter;
pub mod macros;
pub mod printer;
pub mod reader;
pub mod symbols;

#[macro_use]
extern crate lazy_static;

mod core;
mod numeric;
mod special_forms;
mod strings;
mod tokens;
mod types;

pub use evaluator::{Error, Result};
pub use interpreter::Interpreter;
pub use types::{Arity, GelObject};
