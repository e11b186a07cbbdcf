mod common;

use common::{boolean, int, session};
use gazelle::{Error, Interpreter};

#[test]
fn and_returns_the_last_value_or_false() {
    let s = session();
    assert_eq!(s.eval("(and 1 2 3)"), int(3));
    assert_eq!(s.eval("(and (> 2 1) 2 3)"), int(3));
    assert_eq!(s.eval("(and)"), boolean(true));
    assert_eq!(s.eval("(and (> 2 1) (> 2 3))"), boolean(false));
}

#[test]
fn and_stops_at_the_first_false_value() {
    let s = session();
    assert_eq!(s.eval("(and #f (car 5))"), boolean(false));
}

#[test]
fn nil_is_the_empty_list() {
    let s = session();
    assert_eq!(s.eval("(nil? nil)"), boolean(true));
    assert_eq!(s.eval("(nil? '())"), boolean(true));
    assert_eq!(s.eval("(null? '(1))"), boolean(false));
    assert_eq!(s.eval("(= nil '())"), boolean(true));
}

#[test]
fn equality_helpers() {
    let s = session();
    assert_eq!(s.eval("(eq? 'a 'a)"), boolean(true));
    assert_eq!(s.eval("(equal? '(1 (2)) '(1 (2)))"), boolean(true));
    assert_eq!(s.eval("(equal? '(1 (2)) '(1 (3)))"), boolean(false));
}

#[test]
fn logical_helpers() {
    let s = session();
    assert_eq!(s.eval("(land 1 2)"), int(2));
    assert_eq!(s.eval("(land 0 2)"), boolean(false));
    assert_eq!(s.eval("(lor 0 2)"), int(2));
    assert_eq!(s.eval("(lor 1 2)"), int(1));
}

#[test]
fn list_helpers() {
    let s = session();
    assert_eq!(s.show("(reverse '(1 2 3))"), "(3 2 1)");
    assert_eq!(s.show("(reverse '())"), "()");
    assert_eq!(s.eval("(foldl + 0 '(1 2 3 4))"), int(10));
    assert_eq!(s.eval("(foldl - 10 '(1 2))"), int(7));
}

#[test]
fn stdlib_form_loads_the_prelude_on_demand() {
    let interp = Interpreter::new();
    assert!(matches!(
        interp.run("(reverse '(1 2 3))"),
        Err(Error::UnknownSymbol(_))
    ));
    assert!(interp.run("(stdlib)").unwrap().is_unspecified());
    assert_eq!(interp.run("(reverse '(1 2 3))").unwrap().to_string(), "(3 2 1)");
    assert_eq!(interp.run("(and 1 2)").unwrap(), int(2));
}

#[test]
fn stdlib_form_takes_no_arguments() {
    let s = session();
    assert!(matches!(s.error("(stdlib 1)"), Error::BadArgCount(_)));
}
