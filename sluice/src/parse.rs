use crate::cell::Cell;
use crate::lex::{Token, TokenType};
use crate::list;
use crate::number::Number;
use std::iter::Peekable;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("unexpected EOF")]
    Eof,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("expected one token after .")]
    ExpectedOneTokenAfterDot,
    #[error("expected at least one token before .")]
    ExpectedTokenBeforeDot,
    #[error("expected list terminator {0}, but encountered {1}")]
    ExpectedListTerminator(char, char),
    #[error("invalid escape sequence \\{0} in string")]
    InvalidEscape(char),
}

/// Parse one expression from the token stream.
///
/// # Arguments
/// *`text` - the text backed by the token spans.
/// *`cur` - an iterator over the token stream. The parser will only
///          advance the iterator enough to satisfy one expression.
pub fn parse<'a, T: Iterator<Item = &'a Token>>(
    text: &str,
    cur: &mut Peekable<T>,
) -> Result<Cell, Error> {
    let token = cur.next().ok_or(Error::Eof)?;
    match token.token_type {
        TokenType::SingleQuote => Ok(list!["quote", parse(text, cur)?]),
        TokenType::LeftParen => parse_list(text, cur, token),
        TokenType::True => Ok(Cell::Bool(true)),
        TokenType::False => Ok(Cell::Bool(false)),
        TokenType::Symbol => Ok(Cell::new_symbol(token.span(text))),
        TokenType::Number => Ok(parse_number(token.span(text))),
        TokenType::String => parse_string(token.span(text)),
        TokenType::RightParen | TokenType::Dot => {
            Err(Error::UnexpectedToken(token.span(text).into()))
        }
    }
}

/// Parse List
///
/// Called after a '(' (or '[' / '{'). Parses every expression up to
/// the matching terminator, handing off to
/// [`parse_improper_list_tail`] if a '.' is found.
fn parse_list<'a, T: Iterator<Item = &'a Token>>(
    text: &str,
    cur: &mut Peekable<T>,
    start_token: &Token,
) -> Result<Cell, Error> {
    let mut list = vec![];
    loop {
        match cur.peek().ok_or(Error::Eof)?.token_type {
            TokenType::RightParen => {
                let end_token = cur.next().ok_or(Error::Eof)?;
                expect_terminator(text, start_token, end_token)?;
                return Ok(Cell::new_list(list));
            }
            TokenType::Dot => {
                cur.next();
                return parse_improper_list_tail(list, text, cur, start_token);
            }
            _ => {
                list.push(parse(text, cur)?);
            }
        }
    }
}

fn expect_terminator(text: &str, start_token: &Token, end_token: &Token) -> Result<(), Error> {
    let open = start_token.span(text).chars().next().unwrap_or('(');
    let close = end_token.span(text).chars().next().unwrap_or(')');
    let expected = match open {
        '[' => ']',
        '{' => '}',
        _ => ')',
    };
    if close == expected {
        Ok(())
    } else {
        Err(Error::ExpectedListTerminator(expected, close))
    }
}

/// Parse Improper List Tail
///
/// Called after a '.' inside a list: exactly one expression must
/// follow the dot, and then the list terminator.
fn parse_improper_list_tail<'a, T: Iterator<Item = &'a Token>>(
    list: Vec<Cell>,
    text: &str,
    cur: &mut Peekable<T>,
    start_token: &Token,
) -> Result<Cell, Error> {
    if list.is_empty() {
        return Err(Error::ExpectedTokenBeforeDot);
    }

    let last_cdr = match cur.peek().ok_or(Error::Eof)?.token_type {
        TokenType::Dot | TokenType::RightParen => return Err(Error::ExpectedOneTokenAfterDot),
        _ => parse(text, cur)?,
    };

    let end_token = cur.next().ok_or(Error::Eof)?;
    match end_token.token_type {
        TokenType::RightParen => {
            expect_terminator(text, start_token, end_token)?;
            Ok(Cell::new_improper_list(list, last_cdr))
        }
        _ => Err(Error::ExpectedOneTokenAfterDot),
    }
}

/// Parse Number
///
/// A number token that does not parse as a number (e.g. `+` or
/// `10..5`) is a symbol.
fn parse_number(span: &str) -> Cell {
    match Number::parse(span) {
        Some(num) => Cell::Number(num),
        None => Cell::new_symbol(span),
    }
}

/// Parse String
///
/// Strip the surrounding quotes and interpret escape sequences.
fn parse_string(span: &str) -> Result<Cell, Error> {
    let body = &span[1..span.len() - 1];
    let mut output = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        output.push(match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some(c @ ('"' | '\\')) => c,
            Some(c) => return Err(Error::InvalidEscape(c)),
            None => return Err(Error::Eof),
        });
    }
    Ok(Cell::String(output))
}

/// Parse Macro
///
/// Given a single expression, tokenize and parse the
/// expression into a Cell.
///
/// This macro assumes the input is a single valid expression and
/// will panic!() if it encounters lex or parse errors.
///
/// # Arguments
/// `lhs` - The expression to parse
#[macro_export]
macro_rules! parse {
    ($lhs:expr) => {{
        let tokens = $crate::lex::scan($lhs).expect("lex failed");
        let mut cur = tokens.iter().peekable();
        $crate::parse::parse($lhs, &mut cur).expect("parse failed")
    }};
}
