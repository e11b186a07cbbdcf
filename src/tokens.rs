use regex::Regex;
use std::fmt;

#[derive(Debug, Eq, PartialEq)]
pub enum SpecialChar {
    OpenRoundBracket,
    CloseRoundBracket,
    Quote,
    Backtick,
    Comma,
}

#[derive(Debug, PartialEq)]
pub enum Token<'a> {
    UnquoteSplicing,
    SpecialChar(SpecialChar),
    StringLiteral(&'a str),
    Comment(&'a str),
    PlainChars(&'a str),
}

#[derive(Debug)]
pub enum TokenizerError {
    UnbalancedString,
    NoCapture(String),
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tokenizer failed: {}",
            match self {
                TokenizerError::UnbalancedString => "unbalanced string literal",
                TokenizerError::NoCapture(_) => "token regex did not capture a token",
            }
        )
    }
}

fn create_token(captured: &str) -> Result<Token, TokenizerError> {
    use SpecialChar::*;
    let bytes = captured.as_bytes();
    match bytes[0] {
        b',' => match bytes.get(1) {
            Some(b'@') => Ok(Token::UnquoteSplicing),
            _ => Ok(Token::SpecialChar(Comma)),
        },
        b'(' => Ok(Token::SpecialChar(OpenRoundBracket)),
        b')' => Ok(Token::SpecialChar(CloseRoundBracket)),
        b'\'' => Ok(Token::SpecialChar(Quote)),
        b'`' => Ok(Token::SpecialChar(Backtick)),
        // String literal
        b'"' => tokenize_string_literal(captured),
        // Comment. Note that ; is ASCII so safe to slice on bytes even if the rest of the string is
        // non ASCII.
        b';' => Ok(Token::Comment(&captured[1..])),
        _ => Ok(Token::PlainChars(captured)),
    }
}

fn tokenize_string_literal(captured: &str) -> Result<Token, TokenizerError> {
    let bytes = captured.as_bytes();
    if bytes.len() == 1 || bytes[bytes.len() - 1] != b'"' {
        return Err(TokenizerError::UnbalancedString);
    }

    let trailing_backslashes = bytes
        .iter()
        .rev()
        .skip(1)
        .take_while(|&&byte| byte == b'\\')
        .count();
    if trailing_backslashes % 2 == 1 {
        return Err(TokenizerError::UnbalancedString);
    }

    Ok(Token::StringLiteral(&captured[1..captured.len() - 1]))
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizerError> {
    lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(
            r#"(?x)                          # ignore whitespace in this patern & allow comments
                \s*                          # whitespace, ignored
                (                            # token capture group
                    ,@                       # literal unquote-splicing
                    |[()'`,]                 # single special characters
                    |"(?:                    # string literal. its contents, not captured, include:
                        \\.                  #    escapes
                        |[^\\"]              #    anything which isn't a backslash or a quote
                      )*
                      "?                     #    possibly missing a closing quote
                    |;.*                     # comments
                    |[^\s('"`,;)]*           # zero or more plain characters
                )
            "#
        )
        .unwrap();
    }
    let mut input = input;
    let mut tokens = Vec::new();
    while !input.is_empty() {
        let caps = TOKEN_RE
            .captures(input)
            .ok_or_else(|| TokenizerError::NoCapture(String::from(input)))?;
        let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let token = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if whole == 0 {
            return Err(TokenizerError::NoCapture(String::from(input)));
        }
        // Trailing whitespace produces an empty capture.
        if !token.is_empty() {
            tokens.push(create_token(token)?);
        }
        input = &input[whole..];
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_characters_are_their_own_tokens() {
        let tokens = tokenize("`(a ,b ,@c 'd)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::SpecialChar(SpecialChar::Backtick),
                Token::SpecialChar(SpecialChar::OpenRoundBracket),
                Token::PlainChars("a"),
                Token::SpecialChar(SpecialChar::Comma),
                Token::PlainChars("b"),
                Token::UnquoteSplicing,
                Token::PlainChars("c"),
                Token::SpecialChar(SpecialChar::Quote),
                Token::PlainChars("d"),
                Token::SpecialChar(SpecialChar::CloseRoundBracket),
            ]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let tokens = tokenize("1 ; skip ( this\n  2   ").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::PlainChars("1"),
                Token::Comment(" skip ( this"),
                Token::PlainChars("2"),
            ]
        );
    }

    #[test]
    fn strings_and_lambda_shorthand() {
        let tokens = tokenize(r#"(\ (x) "a \"q\" b")"#).unwrap();
        assert_eq!(tokens[1], Token::PlainChars("\\"));
        assert_eq!(tokens[5], Token::StringLiteral(r#"a \"q\" b"#));
        assert!(matches!(
            tokenize("\"open"),
            Err(TokenizerError::UnbalancedString)
        ));
    }
}
