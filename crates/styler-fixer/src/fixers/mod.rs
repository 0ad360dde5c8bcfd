//! Fixer implementations
//!
//! Each fixer rewrites a PHP token collection in place. The free functions
//! in this module are the shared editing helpers: removing a token together
//! with its now-empty line, matching `use`/`extends` sequences, and telling
//! global function calls apart from method calls and definitions.

pub mod registry;

pub mod declare_after_opening_tag;
pub mod doctrine_migrations;
pub mod line_break_between_method_arguments;
pub mod line_break_between_statements;
pub mod no_useless_dirname_call;
pub mod no_useless_strlen;
pub mod promoted_constructor_property;

use std::sync::LazyLock;

use regex::Regex;
use styler_core::{SeqSpec, TokenKind, Tokens, TokensError};
use thiserror::Error;

use crate::analyzer::AnalyzerError;
use crate::config::FixerConfig;

#[derive(Debug, Error)]
pub enum FixerError {
    #[error("expected {0}")]
    ExpectedToken(&'static str),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Tokens(#[from] TokensError),
}

/// A token-level source transformation.
pub trait Fixer {
    /// Short snake_case name; the registry prefixes it with `styler/`.
    fn name(&self) -> &'static str;

    /// Human-readable description of what the fixer enforces.
    fn documentation(&self) -> &'static str;

    /// Before-state sample the fixer would rewrite.
    fn sample_code(&self) -> &'static str;

    /// Execution priority (higher = runs first).
    fn priority(&self) -> i32 {
        30
    }

    /// Whether the transformation can change runtime behavior.
    fn is_risky(&self) -> bool {
        false
    }

    /// Cheap pre-filter; `apply_fix` is only invoked when this holds.
    fn is_candidate(&self, _tokens: &Tokens) -> bool {
        true
    }

    fn apply_fix(&self, tokens: &mut Tokens, config: &FixerConfig) -> Result<(), FixerError>;

    /// Candidate check, mutation, then placeholder cleanup.
    fn fix(&self, tokens: &mut Tokens, config: &FixerConfig) -> Result<(), FixerError> {
        if !tokens.is_empty() && self.is_candidate(tokens) {
            self.apply_fix(tokens, config)?;
            tokens.clear_empty_tokens();
        }
        Ok(())
    }
}

static TRAILING_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+$").unwrap());
static TRAILING_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\r\n|\r|\n)$").unwrap());
static LEADING_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]+").unwrap());
static LEADING_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(\r\n|\r|\n)").unwrap());
static ANY_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

/// Clear the token at `index`; when it was the only meaningful token on its
/// line, also collapse the line itself so no blank line is left behind.
pub fn remove_with_lines_if_possible(tokens: &mut Tokens, index: usize) {
    if is_token_only_meaningful_in_line(tokens, index) {
        if let Some(prev) = tokens.non_empty_sibling(index, -1) {
            let was_newline_removed = handle_whitespace_before(tokens, prev);

            if let Some(next) = tokens.non_empty_sibling(index, 1) {
                handle_whitespace_after(tokens, next, was_newline_removed);
            }
        }
    }

    tokens.clear_and_merge_surrounding_whitespace(index);
}

/// Strip trailing horizontal whitespace and at most one trailing line break
/// from the whitespace token at `index`. Returns whether a line break was
/// removed.
pub fn handle_whitespace_before(tokens: &mut Tokens, index: usize) -> bool {
    if !tokens[index].is_whitespace() {
        return false;
    }

    let content = tokens[index].content();
    let without_trailing_blanks = TRAILING_BLANKS.replace(content, "").into_owned();
    let without_newline = TRAILING_LINE_BREAK
        .replace(&without_trailing_blanks, "")
        .into_owned();
    let was_newline_removed = without_trailing_blanks != without_newline;
    tokens.ensure_whitespace_at(index, 0, &without_newline);

    was_newline_removed
}

/// Strip the leading whitespace of the token at `index`: the indentation
/// when a line break was removed before it, otherwise the first line break
/// together with the blanks preceding it.
pub fn handle_whitespace_after(tokens: &mut Tokens, index: usize, was_newline_removed: bool) {
    let pattern: &Regex = if was_newline_removed {
        &LEADING_BLANKS
    } else {
        &LEADING_LINE_BREAK
    };
    let new_content = pattern.replace(tokens[index].content(), "").into_owned();
    tokens.ensure_whitespace_at(index, 0, &new_content);
}

pub fn has_meaning_token_in_line_after(tokens: &Tokens, index: usize) -> bool {
    let Some(next) = tokens.non_empty_sibling(index, 1) else {
        return false;
    };
    !tokens[next].is_whitespace() || !ANY_LINE_BREAK.is_match(tokens[next].content())
}

pub fn has_meaning_token_in_line_before(tokens: &Tokens, index: usize) -> bool {
    let Some(prev) = tokens.non_empty_sibling(index, -1) else {
        return true;
    };

    if !tokens[prev].is_any_kind(&[TokenKind::OpenTag, TokenKind::Whitespace]) {
        return true;
    }

    if tokens[prev].is_kind(TokenKind::OpenTag)
        && !TRAILING_LINE_BREAK.is_match(tokens[prev].content())
    {
        return true;
    }

    if !ANY_LINE_BREAK.is_match(tokens[prev].content()) {
        let Some(prev_prev) = tokens.non_empty_sibling(prev, -1) else {
            return true;
        };
        if !tokens[prev_prev].is_kind(TokenKind::OpenTag)
            || !TRAILING_LINE_BREAK.is_match(tokens[prev_prev].content())
        {
            return true;
        }
    }

    false
}

pub fn is_token_only_meaningful_in_line(tokens: &Tokens, index: usize) -> bool {
    !has_meaning_token_in_line_before(tokens, index) && !has_meaning_token_in_line_after(tokens, index)
}

/// Whether the file imports the given fully qualified name with a `use`
/// statement, e.g. `use Doctrine\Migrations\AbstractMigration;`.
pub fn has_use_statement(tokens: &Tokens, fqcn: &[&str]) -> bool {
    let mut specs = vec![SeqSpec::kind(TokenKind::Use)];
    for (position, component) in fqcn.iter().enumerate() {
        specs.push(SeqSpec::token(TokenKind::Identifier, component));
        if position + 1 < fqcn.len() {
            specs.push(SeqSpec::kind(TokenKind::NsSeparator));
        } else {
            specs.push(SeqSpec::content(";"));
        }
    }
    tokens.find_sequence(0, &specs).is_some()
}

/// Whether a class in the file extends the given imported class.
pub fn extends_class(tokens: &Tokens, fqcn: &[&str]) -> bool {
    let Some(class_name) = fqcn.last() else {
        return false;
    };
    has_use_statement(tokens, fqcn)
        && tokens
            .find_sequence(
                0,
                &[
                    SeqSpec::kind(TokenKind::Class),
                    SeqSpec::kind(TokenKind::Identifier),
                    SeqSpec::kind(TokenKind::Extends),
                    SeqSpec::token(TokenKind::Identifier, class_name),
                ],
            )
            .is_some()
}

/// Indices of every comment token, in source order.
pub fn comment_indices(tokens: &Tokens) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.is_comment())
        .map(|(index, _)| index)
        .collect()
}

/// Whether the identifier at `index` is called as a global function: not a
/// method or static call, not a definition, and not qualified by anything
/// beyond a single leading backslash.
pub fn is_global_function_call(tokens: &Tokens, index: usize) -> bool {
    let Some(prev) = tokens.prev_meaningful(index) else {
        return true;
    };

    match tokens[prev].content() {
        "->" | "?->" | "::" => false,
        "\\" => match tokens.prev_meaningful(prev) {
            Some(before) => !tokens[before].is_any_kind(&[
                TokenKind::Identifier,
                TokenKind::NsSeparator,
                TokenKind::New,
            ]),
            None => true,
        },
        _ => !tokens[prev].is_any_kind(&[TokenKind::Function, TokenKind::Fn, TokenKind::New]),
    }
}

/// Argument count of a call with parentheses at `open`/`close`: zero for an
/// empty list, otherwise one more than the number of top-level commas.
pub fn count_call_arguments(
    tokens: &Tokens,
    open: usize,
    close: usize,
) -> Result<usize, TokensError> {
    let first = tokens
        .next_meaningful(open)
        .ok_or(TokensError::IndexOutOfBounds {
            index: open,
            len: tokens.len(),
        })?;
    if first == close {
        return Ok(0);
    }

    let analyzer = crate::analyzer::Analyzer::new(tokens);
    let mut count = 1;
    let mut index = open;
    while let Some(comma) = analyzer.next_comma(index) {
        if comma >= close {
            break;
        }
        count += 1;
        index = comma;
    }
    Ok(count)
}

#[cfg(test)]
pub(crate) fn apply(fixer: &dyn Fixer, source: &str) -> String {
    let mut tokens = Tokens::from_source(source).unwrap();
    fixer.fix(&mut tokens, &FixerConfig::default()).unwrap();
    tokens.generate_code()
}
