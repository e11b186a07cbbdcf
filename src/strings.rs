// Gazelle string literals understand the escapes \n, \t, \" and \\ only.
// Let's implement exactly that rather than inheriting rust's string literal
// behaviour.

use bimap::BiMap;
use std::fmt;
use std::str::Chars;

lazy_static! {
    static ref ESCAPES: BiMap<char, char> = {
        let mut m = BiMap::new();
        m.insert('\\', '\\');
        m.insert('"', '"');
        m.insert('n', '\n');
        m.insert('t', '\t');
        m
    };
}
struct StringBuilder<'a> {
    chars: Chars<'a>,
}

impl<'a> StringBuilder<'a> {
    fn new(src: &'a str) -> Self {
        Self { chars: src.chars() }
    }
}

#[derive(Debug)]
pub enum BuildError {
    UnknownEscape(char),
    UnexpectedSingleBackslash,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnknownEscape(c) => write!(f, "unknown escape \\{}", c),
            BuildError::UnexpectedSingleBackslash => write!(f, "string ends with a lone backslash"),
        }
    }
}

impl Iterator for StringBuilder<'_> {
    type Item = std::result::Result<char, BuildError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match self.chars.next()? {
            '\\' => match self.chars.next() {
                None => Err(BuildError::UnexpectedSingleBackslash),
                Some(c) => ESCAPES
                    .get_by_left(&c)
                    .copied()
                    .ok_or(BuildError::UnknownEscape(c)),
            },
            c => Ok(c),
        };
        Some(result)
    }
}

/// Decodes the body of a string literal (without its quotes).
pub(crate) fn build_string(src: &str) -> Result<String, BuildError> {
    StringBuilder::new(src).collect()
}

struct StringPrinter<'a> {
    chars: Chars<'a>,
}

impl<'a> StringPrinter<'a> {
    fn new(src: &'a str) -> Self {
        Self { chars: src.chars() }
    }
}

impl Iterator for StringPrinter<'_> {
    type Item = (char, Option<char>);

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.chars.next()?;
        let charseq = match ESCAPES.get_by_right(&next) {
            Some(&l) => ('\\', Some(l)),
            None => (next, None),
        };
        Some(charseq)
    }
}

pub(crate) fn string_repr(src: &str) -> String {
    let mut output = String::new();
    output.push('"');
    for (char1, char2) in StringPrinter::new(src) {
        output.push(char1);
        if let Some(char2) = char2 {
            output.push(char2)
        };
    }
    output.push('"');
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_decode_and_encode() {
        let built = build_string(r#"line\none \"quoted\" \\ tab\t"#).unwrap();
        assert_eq!(built, "line\none \"quoted\" \\ tab\t");
        assert_eq!(string_repr("a\"b\n"), r#""a\"b\n""#);
    }

    #[test]
    fn unknown_escapes_are_rejected() {
        assert!(matches!(build_string(r"\q"), Err(BuildError::UnknownEscape('q'))));
        assert!(matches!(
            build_string("trailing\\"),
            Err(BuildError::UnexpectedSingleBackslash)
        ));
    }
}
