use log::debug;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Editor, Result};
use rustyline_derive::{Completer, Helper, Hinter};
use sluice::cell::Cell;
use sluice::eval::Evaluator;
use sluice::syntax::ReplHighlighter;
use sluice::{lex, parse};
use std::borrow::Cow;

#[derive(Completer, Helper, Hinter)]
struct InputValidator {
    highlighter: ReplHighlighter,
}

impl Validator for InputValidator {
    /// Keep reading lines while the input is an unterminated string or
    /// list. Anything else is accepted and left for eval to report.
    fn validate(&self, ctx: &mut ValidationContext) -> Result<ValidationResult> {
        let input = ctx.input();
        let incomplete = match lex::scan(input) {
            Ok(tokens) => matches!(
                parse::parse(input, &mut tokens.iter().peekable()),
                Err(parse::Error::Eof)
            ),
            Err(lex::Error::Incomplete) => true,
            Err(_) => false,
        };
        match incomplete {
            true => Ok(ValidationResult::Incomplete),
            false => Ok(ValidationResult::Valid(None)),
        }
    }
}

impl Highlighter for InputValidator {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, _forced: bool) -> bool {
        self.highlighter.highlight_check(line, pos + 1)
    }
}

fn main() {
    pretty_env_logger::init();
    let mut rl: Editor<InputValidator, DefaultHistory> = match Editor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("error: {}", err);
            return;
        }
    };
    rl.set_helper(Some(InputValidator {
        highlighter: ReplHighlighter::new(),
    }));

    let evaluator = Evaluator::new();
    debug!("{} globals bound", evaluator.global_symbols().len());

    let mut remaining = String::new();
    loop {
        match rl.readline_with_initial("> ", (&remaining, "")) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                remaining = eval(&evaluator, &line).trim().to_string();
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {:#?}", err);
                break;
            }
        }
    }
}

/// Evaluate one expression from the input text and return any text
/// that was not evaluated.
fn eval<'a>(evaluator: &Evaluator, text: &'a str) -> &'a str {
    if text.trim().is_empty() {
        return "";
    }
    match evaluator.eval_text(text) {
        Ok((Cell::Void, remaining)) => {
            println!();
            remaining.unwrap_or("")
        }
        Ok((cell, remaining)) => {
            println!("{:#}", cell);
            remaining.unwrap_or("")
        }
        Err(e) => {
            println!("error: {}", e);
            ""
        }
    }
}
