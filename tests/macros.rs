mod common;

use common::{int, session};
use gazelle::expander::SyntaxError;
use gazelle::Error;

#[test]
fn let_binds_in_a_new_scope() {
    let s = session();
    assert_eq!(s.eval("(let ((a 1) (b 2)) (+ a b))"), int(3));
    assert_eq!(s.eval("(let ((a 1)) (def b 2) (+ a b))"), int(3));
    assert_eq!(s.eval("(let ((a 1)) (let ((a 2) (b a)) (+ a b)))"), int(3));
    assert!(matches!(s.error("a"), Error::UnknownSymbol(_)));
}

#[test]
fn let_rejects_malformed_bindings() {
    let s = session();
    for src in &[
        "(let ((a 1) (b 2 3)) (+ a b))",
        "(let ((1 2)) 3)",
        "(let x 3)",
        "(let ((a 1)))",
    ] {
        match s.error(src) {
            Error::Syntax(SyntaxError::IllegalLetBindings(_)) => (),
            other => panic!("{} gave {}", src, other),
        }
    }
}

#[test]
fn unless_macro() {
    let s = session();
    let definition = r"(macro unless (\ args
    `(if (not ,(car args)) (begin ,@(cdr args))))) ; test `";
    assert!(s.eval(definition).is_unspecified());
    assert!(s.eval("(unless (= 2 (+ 1 1)) (display 2) 3 4)").is_unspecified());
    assert_eq!(s.output(), "");
    assert_eq!(
        s.eval(r#"(unless (= 4 (+ 1 1)) (display 2) (display "\n") 3 4)"#),
        int(4)
    );
    assert!(s.output().starts_with("2\n"));
}

#[test]
fn macros_receive_unevaluated_arguments() {
    let s = session();
    s.eval(r"(macro swap (\ (a b) `(set! ,a ,b)))");
    s.eval("(def x 1)");
    s.eval("(swap x (+ x 10))");
    assert_eq!(s.eval("x"), int(11));
    assert_eq!(s.show(r"(macro quoted (\ (form) `',form))"), "#<none>");
    assert_eq!(s.show("(quoted (this is not evaluated))"), "(this is not evaluated)");
}

#[test]
fn macros_can_be_redefined() {
    let s = session();
    s.eval(r"(macro m (\ () 1))");
    assert_eq!(s.eval("(m)"), int(1));
    s.eval(r"(macro m (\ () 2))");
    assert_eq!(s.eval("(m)"), int(2));
}

#[test]
fn macros_inside_begin_at_top_level() {
    let s = session();
    s.eval(r"(begin (macro one (\ () 1)) (def two 2))");
    assert_eq!(s.eval("(+ (one) two)"), int(3));
}

#[test]
fn macro_must_be_defined_at_top_level() {
    let s = session();
    assert!(matches!(
        s.error("(if (= 1 2) (macro a 'a) (macro a 'b))"),
        Error::Syntax(SyntaxError::MacroNotAtTopLevel(_))
    ));
    assert!(matches!(
        s.error(r"(def (f) (macro a (\ () 1)))"),
        Error::Syntax(SyntaxError::MacroNotAtTopLevel(_))
    ));
    assert!(matches!(
        s.error("(macro a 5)"),
        Error::Syntax(SyntaxError::MacroNotCallable(_))
    ));
}
