//! Collapses `dirname(__DIR__, N)` concatenations into plain `__DIR__`.

use styler_core::{Token, TokenKind, Tokens};

use super::{is_global_function_call, Fixer, FixerError};
use crate::config::FixerConfig;

pub struct NoUselessDirnameCallFixer;

impl Fixer for NoUselessDirnameCallFixer {
    fn name(&self) -> &'static str {
        "no_useless_dirname_call"
    }

    fn documentation(&self) -> &'static str {
        "There must be no useless `dirname` calls."
    }

    fn sample_code(&self) -> &'static str {
        "<?php\nrequire dirname(__DIR__) . \"/vendor/autoload.php\";\n"
    }

    fn is_candidate(&self, tokens: &Tokens) -> bool {
        tokens.is_kind_found(TokenKind::DirConstant)
    }

    fn apply_fix(&self, tokens: &mut Tokens, _config: &FixerConfig) -> Result<(), FixerError> {
        for index in (1..tokens.len()).rev() {
            if !tokens[index].is_kind(TokenKind::DirConstant) {
                continue;
            }

            let Some(prev_updates) = prev_token_updates(tokens, index) else {
                continue;
            };
            let Some(next_updates) = next_token_updates(tokens, index) else {
                continue;
            };

            for (i, content) in prev_updates.into_iter().chain(next_updates) {
                if content.is_empty() {
                    tokens.clear_and_merge_surrounding_whitespace(i);
                } else {
                    tokens.set(i, Token::new(TokenKind::StringLiteral, content))?;
                }
            }
        }
        Ok(())
    }
}

/// The call tokens before `__DIR__`: its `(`, the `dirname` name and an
/// optional leading backslash. None when this is not a plain global
/// `dirname(` call.
fn prev_token_updates(tokens: &Tokens, index: usize) -> Option<Vec<(usize, String)>> {
    let mut updates = Vec::new();

    let open_parenthesis = tokens.prev_meaningful(index)?;
    if tokens[open_parenthesis].content() != "(" {
        return None;
    }
    updates.push((open_parenthesis, String::new()));

    let dirname_call = tokens.prev_meaningful(open_parenthesis)?;
    if !tokens[dirname_call].equals_ignore_case(TokenKind::Identifier, "dirname") {
        return None;
    }
    if !is_global_function_call(tokens, dirname_call) {
        return None;
    }
    updates.push((dirname_call, String::new()));

    let namespace_separator = tokens.prev_meaningful(dirname_call)?;
    if tokens[namespace_separator].is_kind(TokenKind::NsSeparator) {
        updates.push((namespace_separator, String::new()));
    }

    Some(updates)
}

/// The tokens after `__DIR__` up to and including the concatenated string,
/// which is rewritten to prepend one `/..` per directory level. None when
/// the call shape does not match.
fn next_token_updates(tokens: &Tokens, index: usize) -> Option<Vec<(usize, String)>> {
    let mut depth_level = 1usize;
    let mut updates = Vec::new();

    let mut comma_or_close = tokens.next_meaningful(index)?;

    if tokens[comma_or_close].content() == "," {
        updates.push((comma_or_close, String::new()));
        let after_comma = tokens.next_meaningful(comma_or_close)?;

        if tokens[after_comma].is_kind(TokenKind::IntLiteral) {
            depth_level = tokens[after_comma].content().parse().unwrap_or(0);
            updates.push((after_comma, String::new()));
            comma_or_close = tokens.next_meaningful(after_comma)?;
        } else {
            comma_or_close = after_comma;
        }
    }

    // trailing comma
    if tokens[comma_or_close].content() == "," {
        updates.push((comma_or_close, String::new()));
        comma_or_close = tokens.next_meaningful(comma_or_close)?;
    }

    let close_parenthesis = comma_or_close;
    if tokens[close_parenthesis].content() != ")" {
        return None;
    }
    updates.push((close_parenthesis, String::new()));

    let concatenation = tokens.next_meaningful(close_parenthesis)?;
    if tokens[concatenation].content() != "." {
        return None;
    }

    let string_index = tokens.next_meaningful(concatenation)?;
    if !tokens[string_index].is_kind(TokenKind::StringLiteral) {
        return None;
    }

    let content = tokens[string_index].content();
    let mut chars = content.chars();
    let quote = chars.next()?;
    updates.push((
        string_index,
        format!("{}{}{}", quote, "/..".repeat(depth_level), chars.as_str()),
    ));

    Some(updates)
}
