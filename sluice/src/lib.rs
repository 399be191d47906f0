pub mod cell;
pub mod eval;
pub mod lex;
pub mod number;
pub mod parse;
pub mod switch;
pub mod syntax;
