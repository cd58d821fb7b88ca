//! Selector tokenizer module.

/// Lexer implementation.
pub mod lexer;
/// Token types.
pub mod token;

pub use lexer::{SelectorTokenizer, tokenize};
pub use token::{Token, TokenKind, is_mark};
