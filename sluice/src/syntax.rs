use crate::lex;
use crate::lex::{Token, TokenType};
use std::borrow::Cow;

/// Repl Highlighter
///
/// Underlines the bracket matching the one under the cursor, so
/// the extent of the surrounding form is visible while typing.
#[derive(Debug, Default)]
pub struct ReplHighlighter {}

impl ReplHighlighter {
    pub fn new() -> ReplHighlighter {
        ReplHighlighter {}
    }

    /// Highlight
    ///
    /// Return `text` with the bracket matching the one at `cursor`
    /// wrapped in an ANSI underline. Text that does not scan, or a
    /// cursor that is not on a bracket, is returned unchanged.
    pub fn highlight<'a>(&self, text: &'a str, cursor: usize) -> Cow<'a, str> {
        let Ok(tokens) = lex::scan(text) else {
            return Cow::Borrowed(text);
        };
        let matching = token_at_cursor(&tokens, cursor)
            .and_then(|(idx, _)| matching_bracket(&tokens, idx));
        match matching {
            Some(Token { span: (start, end), .. }) => Cow::Owned(format!(
                "{}\x1b[4m{}\x1b[0m{}",
                &text[..*start],
                &text[*start..*end],
                &text[*end..]
            )),
            None => Cow::Borrowed(text),
        }
    }

    /// Highlight Check
    ///
    /// True if the character just before `cursor` is a bracket, i.e.
    /// moving the cursor there may change the highlight.
    pub fn highlight_check(&self, text: &str, cursor: usize) -> bool {
        let Ok(tokens) = lex::scan(text) else {
            return false;
        };
        matches!(
            token_at_cursor(&tokens, cursor.saturating_sub(1)),
            Some((_, token)) if is_bracket(token)
        )
    }
}

fn is_bracket(token: &Token) -> bool {
    matches!(
        token.token_type,
        TokenType::LeftParen | TokenType::RightParen
    )
}

/// Matching Bracket
///
/// Scan forward from an opening bracket, or backward from a closing
/// one, counting nesting depth until the partner is found.
fn matching_bracket(tokens: &[Token], idx: usize) -> Option<&Token> {
    let (open, candidates): (TokenType, Box<dyn Iterator<Item = &Token>>) =
        match tokens[idx].token_type {
            TokenType::LeftParen => (TokenType::LeftParen, Box::new(tokens[idx + 1..].iter())),
            TokenType::RightParen => (TokenType::RightParen, Box::new(tokens[..idx].iter().rev())),
            _ => return None,
        };

    let mut depth = 0usize;
    for token in candidates.filter(|it| is_bracket(it)) {
        if token.token_type == open {
            depth += 1;
        } else if depth == 0 {
            return Some(token);
        } else {
            depth -= 1;
        }
    }
    None
}

/// The token under the cursor, or failing that the one just before it,
/// since the cursor usually sits after the character just typed.
fn token_at_cursor(tokens: &[Token], cursor: usize) -> Option<(usize, &Token)> {
    token_at(tokens, cursor).or_else(|| match cursor {
        0 => None,
        _ => token_at(tokens, cursor - 1),
    })
}

fn token_at(tokens: &[Token], index: usize) -> Option<(usize, &Token)> {
    tokens
        .iter()
        .enumerate()
        .find(|(_, it)| (it.span.0..it.span.1).contains(&index))
}
