use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// An interned identifier. Two symbols are equal only if they are the same
/// interned instance, so comparing them never looks at the text.
#[derive(Clone)]
pub struct GelSymbol(Rc<str>);

impl GelSymbol {
    /// A symbol that no table knows about. It is never equal to any symbol
    /// produced by `SymbolTable::intern`, even one with the same text.
    pub fn uninterned(name: &str) -> Self {
        GelSymbol(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GelSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq for GelSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for GelSymbol {}

impl Hash for GelSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0.as_ptr() as usize).hash(state)
    }
}

impl fmt::Display for GelSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for GelSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GelSymbol({})", self.0)
    }
}

#[derive(Default)]
pub struct SymbolTable {
    interned: HashMap<String, GelSymbol>,
}

impl SymbolTable {
    pub fn intern(&mut self, name: &str) -> GelSymbol {
        if let Some(existing) = self.interned.get(name) {
            return existing.clone();
        }
        let symbol = GelSymbol::uninterned(name);
        self.interned.insert(name.to_owned(), symbol.clone());
        symbol
    }

    pub fn len(&self) -> usize {
        self.interned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }
}

/// Forms recognized by the identity of their head symbol, before any macro or
/// variable lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Quote,
    Quasiquote,
    If,
    Set,
    Def,
    Macro,
    Begin,
    Lambda,
    Display,
    Include,
    While,
    CheckExpect,
    CheckWithin,
    Member,
    Return,
    Stdlib,
}

/// Symbols the expander and evaluator compare against, interned once per session.
pub struct Keywords {
    pub quote: GelSymbol,
    pub quasiquote: GelSymbol,
    pub unquote: GelSymbol,
    pub unquote_splicing: GelSymbol,
    pub lambda: GelSymbol,
    pub begin: GelSymbol,
    pub def: GelSymbol,
    pub append: GelSymbol,
    pub cons: GelSymbol,
    pub let_: GelSymbol,
    special_forms: HashMap<GelSymbol, SpecialForm>,
}

impl Keywords {
    pub fn new(table: &mut SymbolTable) -> Self {
        let mut special_forms = HashMap::new();
        for &(name, form) in &[
            ("quote", SpecialForm::Quote),
            ("quasiquote", SpecialForm::Quasiquote),
            ("if", SpecialForm::If),
            ("set!", SpecialForm::Set),
            ("def", SpecialForm::Def),
            ("macro", SpecialForm::Macro),
            ("begin", SpecialForm::Begin),
            ("lambda", SpecialForm::Lambda),
            ("\\", SpecialForm::Lambda),
            ("display", SpecialForm::Display),
            ("include", SpecialForm::Include),
            ("while", SpecialForm::While),
            ("check-expect", SpecialForm::CheckExpect),
            ("check-within", SpecialForm::CheckWithin),
            ("member?", SpecialForm::Member),
            ("return", SpecialForm::Return),
            ("stdlib", SpecialForm::Stdlib),
        ] {
            special_forms.insert(table.intern(name), form);
        }

        Keywords {
            quote: table.intern("quote"),
            quasiquote: table.intern("quasiquote"),
            unquote: table.intern("unquote"),
            unquote_splicing: table.intern("unquote-splicing"),
            lambda: table.intern("lambda"),
            begin: table.intern("begin"),
            def: table.intern("def"),
            append: table.intern("append"),
            cons: table.intern("cons"),
            let_: table.intern("let"),
            special_forms,
        }
    }

    pub fn special_form(&self, symbol: &GelSymbol) -> Option<SpecialForm> {
        self.special_forms.get(symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_the_same_instance() {
        let mut table = SymbolTable::default();
        let a = table.intern("lambda");
        let b = table.intern("lambda");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_ne!(a, table.intern("lambda!"));
    }

    #[test]
    fn uninterned_symbols_never_match() {
        let mut table = SymbolTable::default();
        let interned = table.intern("#<eof>");
        let eof = GelSymbol::uninterned("#<eof>");
        assert_ne!(interned, eof);
        assert_eq!(interned.as_str(), eof.as_str());
    }

    #[test]
    fn lambda_shorthand_is_a_special_form() {
        let mut table = SymbolTable::default();
        let keywords = Keywords::new(&mut table);
        let shorthand = table.intern("\\");
        assert_eq!(keywords.special_form(&shorthand), Some(SpecialForm::Lambda));
        assert_eq!(keywords.special_form(&table.intern("let")), None);
    }
}
