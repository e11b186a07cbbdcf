use crate::strings::string_repr;
use crate::types::GelObject;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// Strings are quoted and escaped, so the text reads back as the same value.
    Readable,
    /// Strings are written as their contents. Used by `display` and the REPL.
    Directly,
}

pub fn pr_str(object: &GelObject, mode: PrintMode) -> String {
    match object {
        GelObject::Unspecified => String::from("#<none>"),
        GelObject::Bool(true) => String::from("#t"),
        GelObject::Bool(false) => String::from("#f"),
        GelObject::Integer(value) => value.to_string(),
        GelObject::Float(value) => format!("{:?}", value),
        GelObject::Complex(value) => value.to_string(),
        GelObject::String(s) => match mode {
            PrintMode::Readable => string_repr(s),
            PrintMode::Directly => s.clone(),
        },
        GelObject::Symbol(name) => name.to_string(),
        GelObject::List(elements) => {
            format!("({})", elements.iter().map(|e| pr_str(e, mode)).join(" "))
        }
        GelObject::Closure(c) => format!("(lambda {} {})", c.parameters, pr_str(&c.body, mode)),
        GelObject::Primitive(f) => format!("#<primitive {}>", f.name),
        GelObject::CallCc => String::from("#<primitive call/cc>"),
        GelObject::Continuation(point) => format!("#<continuation {}>", point),
    }
}

impl fmt::Display for GelObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", pr_str(self, PrintMode::Directly))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::complex::Complex64;

    #[test]
    fn atoms_render_in_source_syntax() {
        assert_eq!(pr_str(&GelObject::Bool(true), PrintMode::Directly), "#t");
        assert_eq!(pr_str(&GelObject::Float(5.0), PrintMode::Directly), "5.0");
        assert_eq!(
            pr_str(&GelObject::Complex(Complex64::new(1.0, 2.0)), PrintMode::Directly),
            "1+2i"
        );
    }

    #[test]
    fn strings_depend_on_mode() {
        let list = GelObject::wrap_list(vec![
            GelObject::String("say \"hi\"".into()),
            GelObject::Integer(3),
        ]);
        assert_eq!(pr_str(&list, PrintMode::Directly), "(say \"hi\" 3)");
        assert_eq!(pr_str(&list, PrintMode::Readable), r#"("say \"hi\"" 3)"#);
    }
}
