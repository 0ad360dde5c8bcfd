//! Mutable token collection
//!
//! Clearing a token leaves an empty placeholder behind so that every other
//! index stays valid; callers run [`Tokens::clear_empty_tokens`] once their
//! edits are done. Code generation is plain content concatenation, so a
//! collection that was never mutated reproduces its source byte for byte.

use std::ops::Index;

use crate::error::{LexError, TokensError};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Delimiter family for block scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Parenthesis,
    CurlyBrace,
    SquareBrace,
}

impl BlockKind {
    fn is_start(self, content: &str) -> bool {
        match self {
            BlockKind::Parenthesis => content == "(",
            BlockKind::CurlyBrace => content == "{",
            BlockKind::SquareBrace => content == "[" || content == "#[",
        }
    }

    fn is_end(self, content: &str) -> bool {
        match self {
            BlockKind::Parenthesis => content == ")",
            BlockKind::CurlyBrace => content == "}",
            BlockKind::SquareBrace => content == "]",
        }
    }
}

/// One element of a token sequence pattern for [`Tokens::find_sequence`].
#[derive(Debug, Clone, Copy)]
pub struct SeqSpec<'a> {
    pub kind: Option<TokenKind>,
    pub content: Option<&'a str>,
}

impl<'a> SeqSpec<'a> {
    pub fn kind(kind: TokenKind) -> Self {
        Self {
            kind: Some(kind),
            content: None,
        }
    }

    pub fn content(content: &'a str) -> Self {
        Self {
            kind: None,
            content: Some(content),
        }
    }

    pub fn token(kind: TokenKind, content: &'a str) -> Self {
        Self {
            kind: Some(kind),
            content: Some(content),
        }
    }

    fn matches(&self, token: &Token) -> bool {
        if let Some(kind) = self.kind {
            if !token.is_kind(kind) {
                return false;
            }
        }
        if let Some(content) = self.content {
            if token.content() != content {
                return false;
            }
        }
        true
    }
}

/// Flat token sequence with index-stable edits.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    tokens: Vec<Token>,
}

impl Tokens {
    pub fn from_source(source: &str) -> Result<Self, LexError> {
        Ok(Self {
            tokens: tokenize(source)?,
        })
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn set(&mut self, index: usize, token: Token) -> Result<(), TokensError> {
        let len = self.tokens.len();
        let slot = self
            .tokens
            .get_mut(index)
            .ok_or(TokensError::IndexOutOfBounds { index, len })?;
        *slot = token;
        Ok(())
    }

    /// Insert tokens before `index`; `index == len` appends.
    pub fn insert_at(&mut self, index: usize, tokens: Vec<Token>) {
        self.tokens.splice(index..index, tokens);
    }

    /// Replace the token at `index` with an empty placeholder.
    pub fn clear_at(&mut self, index: usize) {
        self.tokens[index] = Token::cleared();
    }

    /// Clear every index in the inclusive range.
    pub fn clear_range(&mut self, start: usize, end: usize) {
        for index in start..=end {
            self.clear_at(index);
        }
    }

    /// Drop all empty placeholder tokens, compacting indices.
    pub fn clear_empty_tokens(&mut self) {
        self.tokens.retain(|token| !token.is_empty());
    }

    /// Clear the token at `index` and fold the whitespace that surrounded it
    /// so the gap does not leave two whitespace runs side by side.
    pub fn clear_and_merge_surrounding_whitespace(&mut self, index: usize) {
        let count = self.tokens.len();
        self.clear_at(index);

        if index == count - 1 {
            return;
        }
        let Some(next) = self.non_empty_sibling(index, 1) else {
            return;
        };
        if !self.tokens[next].is_whitespace() {
            return;
        }
        let Some(prev) = self.non_empty_sibling(index, -1) else {
            return;
        };

        if self.tokens[prev].is_whitespace() {
            let merged = format!(
                "{}{}",
                self.tokens[prev].content(),
                self.tokens[next].content()
            );
            self.tokens[prev] = Token::whitespace(merged);
        } else if self.tokens[prev + 1].is_empty() {
            let content = self.tokens[next].content().to_string();
            self.tokens[prev + 1] = Token::whitespace(content);
        }
        self.clear_at(next);
    }

    /// Nearest non-empty token from `index`, stepping by `direction`
    /// (+1 or -1).
    pub fn non_empty_sibling(&self, index: usize, direction: isize) -> Option<usize> {
        let mut current = index as isize;
        loop {
            current += direction;
            if current < 0 || current as usize >= self.tokens.len() {
                return None;
            }
            if !self.tokens[current as usize].is_empty() {
                return Some(current as usize);
            }
        }
    }

    pub fn next_meaningful(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| self.tokens[i].is_meaningful())
    }

    pub fn prev_meaningful(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| self.tokens[i].is_meaningful())
    }

    /// Nearest earlier token that is neither empty nor whitespace; comments
    /// count.
    pub fn prev_non_whitespace(&self, index: usize) -> Option<usize> {
        (0..index)
            .rev()
            .find(|&i| !self.tokens[i].is_empty() && !self.tokens[i].is_whitespace())
    }

    /// First index at or after `start` whose token satisfies `predicate`.
    pub fn next_index_of(
        &self,
        start: usize,
        predicate: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        (start..self.tokens.len()).find(|&i| !self.tokens[i].is_empty() && predicate(&self.tokens[i]))
    }

    /// Last index at or before `start` whose token satisfies `predicate`.
    pub fn prev_index_of(
        &self,
        start: usize,
        predicate: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        (0..=start)
            .rev()
            .find(|&i| !self.tokens[i].is_empty() && predicate(&self.tokens[i]))
    }

    /// Classify the delimiter at `index`; the flag is true for a block start.
    pub fn detect_block(&self, index: usize) -> Result<(BlockKind, bool), TokensError> {
        let token = self
            .get(index)
            .ok_or(TokensError::IndexOutOfBounds {
                index,
                len: self.tokens.len(),
            })?;
        let result = match token.content() {
            "(" => (BlockKind::Parenthesis, true),
            ")" => (BlockKind::Parenthesis, false),
            "{" => (BlockKind::CurlyBrace, true),
            "}" => (BlockKind::CurlyBrace, false),
            "[" | "#[" => (BlockKind::SquareBrace, true),
            "]" => (BlockKind::SquareBrace, false),
            _ => return Err(TokensError::NotABlockDelimiter(index)),
        };
        Ok(result)
    }

    /// Index of the delimiter closing the block opened at `index`.
    pub fn find_block_end(&self, index: usize) -> Result<usize, TokensError> {
        let (kind, is_start) = self.detect_block(index)?;
        if !is_start {
            return Err(TokensError::NotABlockDelimiter(index));
        }

        let mut depth = 0usize;
        for i in index..self.tokens.len() {
            let content = self.tokens[i].content();
            if kind.is_start(content) {
                depth += 1;
            } else if kind.is_end(content) {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }
        Err(TokensError::UnmatchedBlock {
            delimiter: self.tokens[index].content().to_string(),
            index,
        })
    }

    /// Index of the delimiter opening the block closed at `index`.
    pub fn find_block_start(&self, index: usize) -> Result<usize, TokensError> {
        let (kind, is_start) = self.detect_block(index)?;
        if is_start {
            return Err(TokensError::NotABlockDelimiter(index));
        }

        let mut depth = 0usize;
        for i in (0..=index).rev() {
            let content = self.tokens[i].content();
            if kind.is_end(content) {
                depth += 1;
            } else if kind.is_start(content) {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }
        Err(TokensError::UnmatchedBlock {
            delimiter: self.tokens[index].content().to_string(),
            index,
        })
    }

    /// Find the first run of meaningful tokens at or after `start` matching
    /// `specs` in order; returns the index of the run's first token.
    pub fn find_sequence(&self, start: usize, specs: &[SeqSpec<'_>]) -> Option<usize> {
        if specs.is_empty() {
            return None;
        }

        let mut candidate = if self
            .tokens
            .get(start)
            .is_some_and(|token| token.is_meaningful())
        {
            Some(start)
        } else {
            self.next_meaningful(start.saturating_sub(1))
        };

        while let Some(first) = candidate {
            let mut current = first;
            let mut matched = true;
            for (offset, spec) in specs.iter().enumerate() {
                if offset > 0 {
                    match self.next_meaningful(current) {
                        Some(next) => current = next,
                        None => return None,
                    }
                }
                if !spec.matches(&self.tokens[current]) {
                    matched = false;
                    break;
                }
            }
            if matched {
                return Some(first);
            }
            candidate = self.next_meaningful(first);
        }
        None
    }

    pub fn find_kind(&self, kind: TokenKind, start: usize) -> Option<usize> {
        (start..self.tokens.len()).find(|&i| self.tokens[i].is_kind(kind))
    }

    pub fn is_kind_found(&self, kind: TokenKind) -> bool {
        self.tokens.iter().any(|token| token.is_kind(kind))
    }

    pub fn is_any_kind_found(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|&kind| self.is_kind_found(kind))
    }

    pub fn are_all_kinds_found(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().all(|&kind| self.is_kind_found(kind))
    }

    /// Clear the whitespace token immediately before `index`, if any.
    pub fn remove_leading_whitespace(&mut self, index: usize) {
        if let Some(sibling) = self.non_empty_sibling(index, -1) {
            if self.tokens[sibling].is_whitespace() {
                self.clear_at(sibling);
            }
        }
    }

    /// Clear the whitespace token immediately after `index`, if any.
    pub fn remove_trailing_whitespace(&mut self, index: usize) {
        if let Some(sibling) = self.non_empty_sibling(index, 1) {
            if self.tokens[sibling].is_whitespace() {
                self.clear_at(sibling);
            }
        }
    }

    /// Make sure the token next to `index` (before for `offset <= 0`, after
    /// for `offset > 0`) is exactly the given whitespace. Returns true when
    /// a token had to be inserted, shifting later indices by one.
    pub fn ensure_whitespace_at(&mut self, index: usize, offset: isize, whitespace: &str) -> bool {
        let around = (index as isize + offset) as usize;
        if self
            .tokens
            .get(around)
            .is_some_and(|token| token.is_whitespace())
        {
            if whitespace.is_empty() {
                self.clear_at(around);
            } else {
                self.tokens[around] = Token::whitespace(whitespace);
            }
            return false;
        }

        let insert_index = if offset > 0 { index + 1 } else { index };
        self.insert_at(insert_index, vec![Token::whitespace(whitespace)]);
        true
    }

    /// Concatenate every token's content.
    pub fn generate_code(&self) -> String {
        self.tokens.iter().map(Token::content).collect()
    }

    /// Concatenate contents over the inclusive index range.
    pub fn generate_partial_code(&self, start: usize, end: usize) -> String {
        self.tokens[start..=end].iter().map(Token::content).collect()
    }
}

impl Index<usize> for Tokens {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
