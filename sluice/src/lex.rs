use std::iter::Peekable;
use std::str::CharIndices;

/// Token Type
///
/// [`TokenType`] represents the type of a span as recognized
/// by the scanner.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenType {
    Dot,
    False,
    LeftParen,
    Number,
    RightParen,
    SingleQuote,
    String,
    Symbol,
    True,
}

/// Token
///
/// A span of the scanned text paired with its type. The span is a
/// (start, end) byte range into the original text, so
/// `text[token.span.0..token.span.1]` recovers the token's text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// (start, end) index of original span in the source &str
    pub span: (usize, usize),
    pub token_type: TokenType,
}

impl Token {
    pub fn new(span: (usize, usize), token_type: TokenType) -> Token {
        Token { span, token_type }
    }

    /// Extract this token's text from the text it was scanned from.
    ///
    /// # Panics
    /// May panic if `text` is not the originally scanned text.
    pub fn span<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span.0..self.span.1]
    }

    /// Any text that came before this token.
    pub fn span_prefix<'a>(&self, text: &'a str) -> &'a str {
        &text[0..self.span.0]
    }

    /// Any text that came after this token.
    pub fn span_suffix<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span.1..]
    }

    pub fn is_symbol(&self) -> bool {
        self.token_type == TokenType::Symbol
    }
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("incomplete")]
    Incomplete,
    #[error("unexpected character '{0}'")]
    UnexpectedToken(char),
    #[error("unexpected character following '{0}': '{1}'")]
    UnexpectedCharacterFollowing(String, String),
}

/// Scan
///
/// Scan the provided text into a vector of [`Token`]s.
///
/// Partial input does not necessarily fail: `(quot` scans as a left
/// paren and a symbol. Only a string missing its closing quote is
/// reported as [`Error::Incomplete`]; an unbalanced list is left for
/// the parser to notice.
///
/// # Examples
///
/// ```
/// use sluice::lex;
/// use sluice::lex::TokenType;
///
/// let tokens = lex::scan("'(1 2)").unwrap();
/// assert_eq!(tokens[0].token_type, TokenType::SingleQuote);
/// assert_eq!(tokens.len(), 5);
/// ```
pub fn scan(text: &str) -> Result<Vec<Token>, Error> {
    Scanner::new(text).collect()
}

struct Scanner<'a> {
    cur: Peekable<CharIndices<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Scanner<'a> {
        Scanner {
            cur: text.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.cur.peek().map(|&(_, c)| c)
    }

    /// Skip whitespace and comments, returning the next significant
    /// character without consuming it.
    fn skip_atmosphere(&mut self) -> Option<char> {
        while let Some(c) = self.peek() {
            if c == ';' {
                self.cur.by_ref().find(|&(_, c)| c == '\n');
            } else if c.is_whitespace() {
                self.cur.next();
            } else {
                return Some(c);
            }
        }
        None
    }

    /// Consume characters while `accept` holds, returning the offset
    /// one past the last consumed character.
    fn take_while<F: Fn(char) -> bool>(&mut self, mut end: usize, accept: F) -> usize {
        while let Some(&(offset, c)) = self.cur.peek() {
            if !accept(c) {
                break;
            }
            end = offset + c.len_utf8();
            self.cur.next();
        }
        end
    }

    fn scan_token(&mut self, c: char) -> Result<Token, Error> {
        match c {
            '(' | '[' | '{' => Ok(self.scan_single(TokenType::LeftParen)),
            ')' | ']' | '}' => Ok(self.scan_single(TokenType::RightParen)),
            '\'' => Ok(self.scan_single(TokenType::SingleQuote)),
            '#' => self.scan_hash(),
            '"' => self.scan_string(),
            '.' => Ok(self.scan_dot()),
            _ if is_initial_identifier(c) => Ok(self.scan_symbol()),
            _ if is_initial_number(c) => Ok(self.scan_number()),
            _ => Err(Error::UnexpectedToken(c)),
        }
    }

    fn scan_single(&mut self, token_type: TokenType) -> Token {
        match self.cur.next() {
            Some((start, c)) => Token::new((start, start + c.len_utf8()), token_type),
            None => unreachable!("scan_single called at end of input"),
        }
    }

    fn scan_hash(&mut self) -> Result<Token, Error> {
        let start = self.cur.next().map(|(offset, _)| offset).unwrap_or_default();
        match self.cur.next() {
            Some((_, 't')) => Ok(Token::new((start, start + 2), TokenType::True)),
            Some((_, 'f')) => Ok(Token::new((start, start + 2), TokenType::False)),
            Some((_, c)) => Err(Error::UnexpectedCharacterFollowing(
                '#'.into(),
                c.into(),
            )),
            None => Err(Error::UnexpectedCharacterFollowing(
                '#'.into(),
                "\\n".into(),
            )),
        }
    }

    /// Scan String
    ///
    /// Scan up to and including the closing quote, skipping over any
    /// escaped character. Escapes are interpreted by the parser.
    fn scan_string(&mut self) -> Result<Token, Error> {
        let start = self.cur.next().map(|(offset, _)| offset).unwrap_or_default();
        let mut escaping = false;
        for (offset, c) in self.cur.by_ref() {
            match c {
                '"' if !escaping => return Ok(Token::new((start, offset + 1), TokenType::String)),
                '\\' if !escaping => escaping = true,
                _ => escaping = false,
            }
        }
        Err(Error::Incomplete)
    }

    /// Scan Dot
    ///
    /// * A dot not followed by a number or identifier character is a
    ///   lone dot, as in `(a . b)`.
    /// * A dot followed by a digit starts a number, e.g. `.5`.
    /// * A number containing a second dot is downgraded to a symbol.
    /// * Anything else is a symbol, e.g. `...`.
    fn scan_dot(&mut self) -> Token {
        let start = self.cur.next().map(|(offset, _)| offset).unwrap_or_default();
        let end = start + '.'.len_utf8();
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                let end = self.take_while(end, is_subsequent_number);
                Token::new((start, end), TokenType::Number)
            }
            Some(c) if is_subsequent_identifier(c) => {
                let end = self.take_while(end, is_subsequent_identifier);
                Token::new((start, end), TokenType::Symbol)
            }
            _ => Token::new((start, end), TokenType::Dot),
        }
    }

    fn scan_symbol(&mut self) -> Token {
        let start = self.cur.peek().map(|&(offset, _)| offset).unwrap_or_default();
        let end = self.take_while(start, is_subsequent_identifier);
        Token::new((start, end), TokenType::Symbol)
    }

    /// Scan Number
    ///
    /// Numbers that run into identifier characters (e.g. `1+`, `-x`)
    /// are symbols. Whether a number token really is a number is
    /// decided by the parser, which falls back to a symbol.
    fn scan_number(&mut self) -> Token {
        let start = self.cur.peek().map(|&(offset, _)| offset).unwrap_or_default();
        let mut token_type = TokenType::Number;
        let mut end = start;
        while let Some(&(offset, c)) = self.cur.peek() {
            if end != start && !is_subsequent_number(c) {
                if is_subsequent_identifier(c) {
                    token_type = TokenType::Symbol;
                } else {
                    break;
                }
            }
            end = offset + c.len_utf8();
            self.cur.next();
        }
        Token::new((start, end), token_type)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.skip_atmosphere()?;
        Some(self.scan_token(c))
    }
}

pub fn is_initial_number(c: char) -> bool {
    c.is_ascii_digit() || c == '+' || c == '-'
}

pub fn is_subsequent_number(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E'
}

pub fn is_initial_identifier(c: char) -> bool {
    c.is_alphabetic() || c as u32 > 0xFF || "!$%&*/:<=>?^_~".contains(c)
}

pub fn is_subsequent_identifier(c: char) -> bool {
    is_initial_identifier(c) || c.is_ascii_digit() || "+-.@".contains(c)
}
