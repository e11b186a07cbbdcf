use crate::strings::{self, BuildError};
use crate::symbols::SymbolTable;
use crate::tokens::{tokenize, SpecialChar, Token, TokenizerError};
use crate::types::GelObject;
use num::complex::Complex64;
use std::fmt;
use std::iter::Peekable;
use std::slice;

type Reader<'a> = Peekable<slice::Iter<'a, Token<'a>>>;

#[derive(Debug)]
pub enum ReadError {
    TokenizerError(TokenizerError),
    UnexpectedCloseBracket,
    UnexpectedEndOfInput,
    BadString(BuildError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::TokenizerError(e) => write!(f, "{}", e),
            ReadError::UnexpectedCloseBracket => write!(f, "unexpected )"),
            ReadError::UnexpectedEndOfInput => write!(f, "unexpected EOF in list"),
            ReadError::BadString(e) => write!(f, "bad string literal: {}", e),
        }
    }
}

/// Reads every top-level form in `input`.
pub fn read_all(input: &str, symbols: &mut SymbolTable) -> Result<Vec<GelObject>, ReadError> {
    let tokens = tokenize(input).map_err(ReadError::TokenizerError)?;
    let mut reader = tokens.iter().peekable();
    let mut forms = Vec::new();
    while let Some(form) = read_form(&mut reader, symbols)? {
        forms.push(form);
    }
    Ok(forms)
}

/// The next form, or `None` once the tokens run out.
fn read_form(reader: &mut Reader, symbols: &mut SymbolTable) -> Result<Option<GelObject>, ReadError> {
    loop {
        let token = match reader.next() {
            Some(token) => token,
            None => return Ok(None),
        };
        let form = match token {
            Token::Comment(_) => continue,
            Token::SpecialChar(SpecialChar::OpenRoundBracket) => read_list(reader, symbols)?,
            Token::SpecialChar(SpecialChar::CloseRoundBracket) => {
                return Err(ReadError::UnexpectedCloseBracket)
            }
            Token::SpecialChar(SpecialChar::Quote) => read_quoted("quote", reader, symbols)?,
            Token::SpecialChar(SpecialChar::Backtick) => read_quoted("quasiquote", reader, symbols)?,
            Token::SpecialChar(SpecialChar::Comma) => read_quoted("unquote", reader, symbols)?,
            Token::UnquoteSplicing => read_quoted("unquote-splicing", reader, symbols)?,
            Token::StringLiteral(payload) => strings::build_string(payload)
                .map(GelObject::String)
                .map_err(ReadError::BadString)?,
            Token::PlainChars(chars) => read_atom(chars, symbols),
        };
        return Ok(Some(form));
    }
}

fn read_list(reader: &mut Reader, symbols: &mut SymbolTable) -> Result<GelObject, ReadError> {
    let mut elements = Vec::new();
    loop {
        match reader.peek() {
            Some(Token::SpecialChar(SpecialChar::CloseRoundBracket)) => {
                reader.next();
                break;
            }
            Some(Token::Comment(_)) => {
                reader.next();
            }
            Some(_) => match read_form(reader, symbols)? {
                Some(form) => elements.push(form),
                None => return Err(ReadError::UnexpectedEndOfInput),
            },
            None => return Err(ReadError::UnexpectedEndOfInput),
        }
    }
    Ok(GelObject::wrap_list(elements))
}

fn read_quoted(
    name: &str,
    reader: &mut Reader,
    symbols: &mut SymbolTable,
) -> Result<GelObject, ReadError> {
    let quoted = read_form(reader, symbols)?.ok_or(ReadError::UnexpectedEndOfInput)?;
    Ok(GelObject::wrap_list(vec![
        GelObject::Symbol(symbols.intern(name)),
        quoted,
    ]))
}

/// Any token holding a digit is tried as an integer, a float and a complex
/// number, in that order; if all fail it is a symbol, so `123foobar` reads
/// as a symbol rather than an error.
fn read_atom(chars: &str, symbols: &mut SymbolTable) -> GelObject {
    match chars {
        "#t" => return GelObject::Bool(true),
        "#f" => return GelObject::Bool(false),
        _ => (),
    }
    if chars.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(x) = chars.parse::<i64>() {
            return GelObject::Integer(x);
        }
        if let Ok(x) = chars.parse::<f64>() {
            return GelObject::Float(x);
        }
        if let Ok(z) = chars.parse::<Complex64>() {
            return GelObject::Complex(z);
        }
    }
    GelObject::Symbol(symbols.intern(chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(src: &str) -> Vec<GelObject> {
        read_all(src, &mut SymbolTable::default()).unwrap()
    }

    #[test]
    fn numeric_fallback_order() {
        let forms = read("12 -3 12.5 200. 1e-8 2+3i 4j 123foobar foo");
        assert!(matches!(forms[0], GelObject::Integer(12)));
        assert!(matches!(forms[1], GelObject::Integer(-3)));
        assert_eq!(forms[2], GelObject::Float(12.5));
        assert_eq!(forms[3], GelObject::Float(200.0));
        assert_eq!(forms[4], GelObject::Float(1e-8));
        assert_eq!(forms[5], GelObject::Complex(Complex64::new(2.0, 3.0)));
        assert_eq!(forms[6], GelObject::Complex(Complex64::new(0.0, 4.0)));
        assert_eq!(forms[7].as_symbol().unwrap().as_str(), "123foobar");
        assert_eq!(forms[8].as_symbol().unwrap().as_str(), "foo");
    }

    #[test]
    fn quote_characters_wrap_the_next_form() {
        let mut symbols = SymbolTable::default();
        let forms = read_all("'(1 2) `(a ,b ,@c)", &mut symbols).unwrap();
        assert_eq!(forms.len(), 2);
        let quoted = forms[0].as_list().unwrap();
        assert!(quoted[0].is(&symbols.intern("quote")));
        assert_eq!(quoted[1].to_string(), "(1 2)");
        assert_eq!(
            forms[1].to_string(),
            "(quasiquote (a (unquote b) (unquote-splicing c)))"
        );
    }

    #[test]
    fn comments_are_skipped_inside_lists() {
        let forms = read("'(1 ;test comments '\n ;skip this line\n 2 ; more ; comments ; ) )\n 3) ; final comment");
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].to_string(), "(quote (1 2 3))");
        assert_eq!(read("(a ; trailing\n)")[0].to_string(), "(a)");
    }

    #[test]
    fn symbols_are_interned_across_forms() {
        let forms = read("(x x)");
        let list = forms[0].as_list().unwrap();
        assert_eq!(list[0], list[1]);
    }

    #[test]
    fn malformed_input() {
        let mut symbols = SymbolTable::default();
        assert!(matches!(
            read_all("(1 2", &mut symbols),
            Err(ReadError::UnexpectedEndOfInput)
        ));
        assert!(matches!(
            read_all(")", &mut symbols),
            Err(ReadError::UnexpectedCloseBracket)
        ));
        assert!(matches!(
            read_all("'", &mut symbols),
            Err(ReadError::UnexpectedEndOfInput)
        ));
        assert!(read("#t #f ")[1] == GelObject::Bool(false));
    }
}
