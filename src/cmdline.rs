use crate::evaluator;
use crate::interpreter::Interpreter;
use crate::printer::{pr_str, PrintMode};
use crate::reader::ReadError;
use crate::types::GelObject;
use ansi_term::Colour::Red;
use linefeed::{DefaultTerminal, Interface, ReadResult, Terminal};
use std::fmt;
use std::io;
use std::path::PathBuf;

const PROMPT: &str = "gel> ";
const SUBPROMPT: &str = "> ";

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    FilesFailed(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "terminal error: {}", e),
            Error::FilesFailed(n) => write!(f, "{} file(s) failed to run", n),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

pub fn setup() -> io::Result<Interface<DefaultTerminal>> {
    let interface = linefeed::Interface::new("gazelle")?;
    interface.set_prompt(PROMPT)?;
    if let Some(path) = history_path() {
        interface.load_history(path).ok();
    };
    Ok(interface)
}

fn history_path() -> Option<PathBuf> {
    match dirs::data_dir() {
        Some(mut path) => {
            path.push(".gazelle_history");
            Some(path)
        }
        None => None,
    }
}

pub fn save_history<T: Terminal>(interface: &Interface<T>) -> io::Result<()> {
    match history_path() {
        Some(path) => interface.save_history(path),
        None => Ok(()),
    }
}

/// Short name for the family an error belongs to, shown before its message.
pub fn error_kind(e: &evaluator::Error) -> &'static str {
    use evaluator::Error::*;
    match e {
        Syntax(_) => "SyntaxError",
        UnknownSymbol(_) => "UnboundError",
        BadArgCount(_) => "ArityError",
        TypeMismatch(_) | NotCallable(_) => "TypeError",
        BadIndex(..) => "IndexError",
        DivideByZero => "ZeroDivisionError",
        IntegerOverflow => "OverflowError",
        ReadError(_) => "ReadError",
        IOError(_) => "IOError",
        DanglingEscape(_) => "ContinuationError",
    }
}

/// Lines of advice for the common mistakes behind some errors.
pub fn error_hints(e: &evaluator::Error) -> Vec<String> {
    use evaluator::Error::*;
    match e {
        NotCallable(_) => vec![
            String::from("[#] The lefthand term of an expression isn't a procedure."),
            String::from("[:] Make sure to use `quote` (') on lists of atoms."),
        ],
        TypeMismatch(crate::types::TypeMismatch::NotASequence) => vec![
            String::from("[#] You cannot iterate over an atom or procedure."),
            String::from("[:] In addition, some procedures only take lists as inputs."),
        ],
        UnknownSymbol(unknown) => vec![
            format!("[#] {} cannot be found in the current scope.", unknown.0),
            String::from("[:] This might be a typo, or this symbol is not defined."),
        ],
        BadArgCount(bad) => vec![format!(
            "[#] {} was given {} arguments, which it cannot handle.",
            bad.name(),
            bad.got()
        )],
        _ => Vec::new(),
    }
}

pub fn render_error(e: &evaluator::Error) -> Vec<String> {
    let mut lines = vec![format!("[!] {}: {}", error_kind(e), e)];
    lines.extend(error_hints(e));
    lines
}

/// `render_error`, painted red when `colour` is set.
fn styled_error(e: &evaluator::Error, colour: bool) -> Vec<String> {
    let lines = render_error(e);
    if !colour {
        return lines;
    }
    lines.into_iter().map(|line| Red.paint(line).to_string()).collect()
}

fn is_incomplete(result: &Result<Vec<GelObject>, ReadError>) -> bool {
    match result {
        Err(ReadError::UnexpectedEndOfInput) => true,
        _ => false,
    }
}

pub fn repl<T: Terminal>(interface: &Interface<T>, interp: &Interpreter) -> io::Result<()> {
    let colour = atty::is(atty::Stream::Stdout);
    let continuation = format!("{}{}", " ".repeat(PROMPT.len() - SUBPROMPT.len()), SUBPROMPT);
    loop {
        interface.set_prompt(PROMPT)?;
        let mut input = match interface.read_line() {
            Ok(ReadResult::Eof) => break,
            Ok(ReadResult::Signal(sig)) => {
                writeln!(interface, "Received signal {:?}", sig)?;
                continue;
            }
            Ok(ReadResult::Input(line)) => line,
            Err(e) => {
                writeln!(interface, "Error: {}", e)?;
                break;
            }
        };
        if input.trim() == "quit" {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        // An unfinished form continues on the next line.
        let mut forms = interp.read(&input);
        interface.set_prompt(&continuation)?;
        while is_incomplete(&forms) {
            match interface.read_line()? {
                ReadResult::Input(line) => {
                    input.push(' ');
                    input.push_str(&line);
                    forms = interp.read(&input);
                }
                _ => break,
            }
        }
        interface.add_history_unique(input.clone());

        let forms = match forms {
            Ok(forms) => forms,
            Err(e) => {
                for line in styled_error(&e.into(), colour) {
                    writeln!(interface, "{}", line)?;
                }
                continue;
            }
        };
        for form in forms {
            match interp.eval_form(&form) {
                Ok(value) if value.is_unspecified() => (),
                Ok(value) => writeln!(interface, "{}", pr_str(&value, PrintMode::Directly))?,
                Err(e) => {
                    log::debug!("{:?}", e);
                    for line in styled_error(&e, colour) {
                        writeln!(interface, "{}", line)?;
                    }
                    break;
                }
            }
        }
    }
    Ok(())
}

/// With no arguments, starts the REPL. Otherwise runs each named file in
/// order, reporting errors as they occur.
pub fn launch(args: Vec<String>, interp: &Interpreter) -> Result<(), Error> {
    if args.len() <= 1 {
        let interface = setup()?;
        repl(&interface, interp)?;
        return Ok(save_history(&interface)?);
    }

    let colour = atty::is(atty::Stream::Stderr);
    let mut failures = 0;
    for path in &args[1..] {
        if let Err(e) = interp.run_file(path) {
            failures += 1;
            eprintln!("{}:", path);
            for line in styled_error(&e, colour) {
                eprintln!("{}", line);
            }
        }
    }
    match failures {
        0 => Ok(()),
        n => Err(Error::FilesFailed(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_from(src: &str) -> evaluator::Error {
        Interpreter::new().run(src).unwrap_err()
    }

    #[test]
    fn errors_render_with_kind_and_hint() {
        let lines = render_error(&error_from("(1 2 3)"));
        assert_eq!(lines[0], "[!] TypeError: '1' object is not callable");
        assert!(lines[1].starts_with("[#]"));

        let lines = render_error(&error_from("undefined-thing"));
        assert_eq!(lines[0], "[!] UnboundError: 'undefined-thing' not found");
        assert!(lines[1].contains("undefined-thing"));
    }

    #[test]
    fn arity_errors_name_the_procedure() {
        let lines = render_error(&error_from("(car '(1) '(2))"));
        assert!(lines[0].starts_with("[!] ArityError"));
        assert!(lines[1].contains("car"));
    }

    #[test]
    fn colour_only_changes_the_styling() {
        let e = error_from("(1 2 3)");
        assert_eq!(styled_error(&e, false), render_error(&e));
        let painted = styled_error(&e, true);
        assert_eq!(painted.len(), render_error(&e).len());
        assert!(painted[0].starts_with("\u{1b}["));
        assert!(painted[0].contains("[!] TypeError"));
    }

    #[test]
    fn unfinished_input_is_detected() {
        let interp = Interpreter::new();
        assert!(is_incomplete(&interp.read("(def (f x)")));
        assert!(!is_incomplete(&interp.read("(def (f x) x)")));
        assert!(!is_incomplete(&interp.read(")")));
    }
}
