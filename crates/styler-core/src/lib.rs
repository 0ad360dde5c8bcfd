//! styler-core: PHP token stream model for styler fixers
//!
//! This crate provides the token-sequence abstraction the fixers operate on:
//! a flat, index-addressable list of typed tokens with the mutation surface
//! needed for in-place style rewrites (indexed replace, insertion, clearing
//! with stable indices, whitespace handling, balanced-delimiter matching).
//!
//! There is deliberately no AST here. Fixers work on the flat sequence with
//! paired-delimiter matching, and regenerating the source is a plain
//! concatenation of token contents.
//!
//! # Example
//!
//! ```
//! use styler_core::Tokens;
//!
//! let mut tokens = Tokens::from_source("<?php\n$a = 1;\n").unwrap();
//! assert_eq!(tokens.generate_code(), "<?php\n$a = 1;\n");
//! ```

mod error;
mod lexer;
mod token;
mod tokens;

pub use error::{LexError, TokensError};
pub use lexer::tokenize;
pub use token::{Token, TokenKind};
pub use tokens::{BlockKind, SeqSpec, Tokens};
