mod common;

use common::{int, session};
use gazelle::expander::SyntaxError;
use gazelle::reader::ReadError;
use gazelle::Error;

#[test]
fn malformed_special_forms_are_rejected_before_evaluation() {
    let s = session();
    for src in &[
        "()",
        "(set! x)",
        "(set! 1 2)",
        "(def 3 4)",
        "(quote 1 2)",
        "(if 1)",
        "(if 1 2 3 4)",
        r"(\ 3 3)",
        r"(\ (x))",
        r"(\ (x 1) x)",
        "(if (= 1 2) (macro a 'a) (macro a 'b))",
    ] {
        assert!(matches!(s.error(src), Error::Syntax(_)), "{}", src);
    }
}

#[test]
fn shape_errors_say_what_was_wrong() {
    let s = session();
    assert!(matches!(s.error("()"), Error::Syntax(SyntaxError::EmptyCall)));
    assert!(matches!(
        s.error("(set! x)"),
        Error::Syntax(SyntaxError::WrongArgCount(_))
    ));
    assert!(matches!(
        s.error("(def 3 4)"),
        Error::Syntax(SyntaxError::DefTargetNotSymbol(_))
    ));
    assert!(matches!(
        s.error(r"(\ 3 3)"),
        Error::Syntax(SyntaxError::IllegalLambdaParameters(_))
    ));
}

#[test]
fn nothing_runs_when_expansion_fails() {
    let s = session();
    s.eval("(def x 1)");
    assert!(matches!(s.error("(begin (set! x 2) (quote))"), Error::Syntax(_)));
    assert_eq!(s.eval("x"), common::int(1));
}

#[test]
fn reader_errors() {
    let s = session();
    assert!(matches!(
        s.error("(1 2"),
        Error::ReadError(ReadError::UnexpectedEndOfInput)
    ));
    assert!(matches!(
        s.error(")"),
        Error::ReadError(ReadError::UnexpectedCloseBracket)
    ));
    assert!(matches!(s.error("\"open"), Error::ReadError(_)));
    assert!(matches!(s.error(r#""\q""#), Error::ReadError(_)));
}

#[test]
fn expansion_of_canonical_forms_is_stable() {
    let s = session();
    for src in &[
        "(if a b c)",
        "(lambda (x) (begin (f x) (g x)))",
        "(def y (quote (1 2)))",
        "(f 1 2.5 \"str\")",
    ] {
        let form = &s.interp.read(src).unwrap()[0];
        let once = s.interp.expand(form).unwrap();
        let twice = s.interp.expand(&once).unwrap();
        assert_eq!(once, twice, "{}", src);
        assert_eq!(&once, form, "{}", src);
    }
}

#[test]
fn special_form_names_keep_their_meaning_in_operator_position() {
    let s = session();
    s.eval("(def (f display) (display 5))");
    assert!(s.eval("(f 1)").is_unspecified());
    assert_eq!(s.output(), "5\n");

    s.eval("(def if 3)");
    assert_eq!(s.eval("if"), int(3));
    assert_eq!(s.eval("(if 1 2)"), int(2));
}
