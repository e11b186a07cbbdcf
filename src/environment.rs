use crate::symbols::GelSymbol;
use crate::types::{BadArgCount, GelObject, Params};
use itertools::Itertools;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
pub struct UnknownSymbol(pub GelSymbol);

impl fmt::Display for UnknownSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' not found", self.0)
    }
}

/// One scope level. Frames are shared: a closure keeps its defining frame
/// alive for as long as the closure itself lives.
#[derive(Default)]
pub struct Environment {
    bindings: RefCell<HashMap<GelSymbol, GelObject>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn spawn_from(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
        })
    }

    /// A fresh frame under `parent` with `params` bound to `args`.
    pub fn bind(
        params: &Params,
        args: &[GelObject],
        parent: &Rc<Self>,
    ) -> Result<Rc<Self>, BadArgCount> {
        params.arity().validate_for(args.len(), "lambda")?;
        let env = Self::spawn_from(parent);
        match params {
            Params::Collected(rest) => {
                env.set(rest.clone(), GelObject::wrap_list(args.to_vec()));
            }
            Params::Positional(symbols) => {
                for (key, value) in symbols.iter().zip(args) {
                    env.set(key.clone(), value.clone());
                }
            }
        }
        Ok(env)
    }

    /// Binds `key` in this frame, shadowing any outer binding.
    pub fn set(&self, key: GelSymbol, value: GelObject) -> Option<GelObject> {
        self.bindings.borrow_mut().insert(key, value)
    }

    pub fn get(&self, key: &GelSymbol) -> Option<GelObject> {
        self.find(key)
            .and_then(|frame| frame.bindings.borrow().get(key).cloned())
    }

    pub fn fetch(&self, key: &GelSymbol) -> Result<GelObject, UnknownSymbol> {
        self.get(key).ok_or_else(|| UnknownSymbol(key.clone()))
    }

    /// Overwrites the nearest existing binding of `key`.
    pub fn assign(&self, key: &GelSymbol, value: GelObject) -> Result<(), UnknownSymbol> {
        let frame = self.find(key).ok_or_else(|| UnknownSymbol(key.clone()))?;
        frame.bindings.borrow_mut().insert(key.clone(), value);
        Ok(())
    }

    fn find(&self, key: &GelSymbol) -> Option<&Environment> {
        let mut frame = self;
        loop {
            if frame.bindings.borrow().contains_key(key) {
                return Some(frame);
            }
            match &frame.parent {
                Some(parent) => frame = &**parent,
                None => return None,
            }
        }
    }

    /// Drops every binding in this frame. Used on session teardown to break
    /// the cycles between a frame and the closures defined in it.
    pub(crate) fn clear(&self) {
        let drained: Vec<_> = self.bindings.borrow_mut().drain().collect();
        drop(drained);
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.borrow();
        let names = bindings.keys().map(GelSymbol::as_str).sorted().join(" ");
        write!(f, "{{{}}}", names)?;
        if let Some(parent) = &self.parent {
            write!(f, " -> {}", parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let mut symbols = SymbolTable::default();
        let x = symbols.intern("x");
        let root = Environment::root();
        root.set(x.clone(), GelObject::Integer(1));
        let child = Environment::spawn_from(&root);
        child.set(x.clone(), GelObject::Integer(2));

        assert_eq!(child.fetch(&x).unwrap(), GelObject::Integer(2));
        assert_eq!(root.fetch(&x).unwrap(), GelObject::Integer(1));
    }

    #[test]
    fn unbound_lookup_names_the_symbol() {
        let mut symbols = SymbolTable::default();
        let missing = symbols.intern("no-such-thing");
        let root = Environment::root();
        let err = root.fetch(&missing).unwrap_err();
        assert_eq!(err.0, missing);
        assert_eq!(err.to_string(), "'no-such-thing' not found");
    }

    #[test]
    fn assign_updates_the_defining_frame() {
        let mut symbols = SymbolTable::default();
        let bal = symbols.intern("bal");
        let root = Environment::root();
        root.set(bal.clone(), GelObject::Integer(100));
        let child = Environment::spawn_from(&root);

        child.assign(&bal, GelObject::Integer(110)).unwrap();
        assert_eq!(root.fetch(&bal).unwrap(), GelObject::Integer(110));
        assert!(child.assign(&symbols.intern("other"), GelObject::Unspecified).is_err());
    }

    #[test]
    fn bind_checks_arity_unless_collected() {
        let mut symbols = SymbolTable::default();
        let root = Environment::root();
        let a = symbols.intern("a");
        let b = symbols.intern("b");
        let pair = Params::Positional(vec![a.clone(), b.clone()]);
        let args = [GelObject::Integer(1), GelObject::Integer(2)];

        let env = Environment::bind(&pair, &args, &root).unwrap();
        assert_eq!(env.fetch(&b).unwrap(), GelObject::Integer(2));
        assert!(Environment::bind(&pair, &args[..1], &root).is_err());

        let collected = Params::Collected(a.clone());
        let env = Environment::bind(&collected, &args, &root).unwrap();
        assert_eq!(
            env.fetch(&a).unwrap(),
            GelObject::wrap_list(args.to_vec())
        );
    }
}
