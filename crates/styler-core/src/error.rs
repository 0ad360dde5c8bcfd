//! Error types for tokenization and token-sequence operations

use thiserror::Error;

/// Errors raised while tokenizing PHP source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),

    #[error("unterminated comment starting at byte {0}")]
    UnterminatedComment(usize),

    #[error("unterminated heredoc starting at byte {0}")]
    UnterminatedHeredoc(usize),
}

/// Contract violations on the token sequence
///
/// These indicate malformed or unexpected token structure. Fixers abort the
/// current mutation when they occur; they are not caught or retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokensError {
    #[error("no matching closing delimiter for `{delimiter}` at index {index}")]
    UnmatchedBlock { delimiter: String, index: usize },

    #[error("token at index {0} is not a block delimiter")]
    NotABlockDelimiter(usize),

    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
