//! Replaces `strlen($x) === 0` style comparisons with `$x === ''`.

use styler_core::{Token, TokenKind, Tokens};

use super::{count_call_arguments, is_global_function_call, Fixer, FixerError};
use crate::config::FixerConfig;

const COMPARISONS: [&str; 6] = [">", "<", "===", "!==", "==", "!="];

pub struct NoUselessStrlenFixer;

impl Fixer for NoUselessStrlenFixer {
    fn name(&self) -> &'static str {
        "no_useless_strlen"
    }

    fn documentation(&self) -> &'static str {
        "Functions `strlen` and `mb_strlen` must not be compared to 0."
    }

    fn sample_code(&self) -> &'static str {
        "<?php\n$isEmpty = strlen($string) === 0;\n$isNotEmpty = strlen($string) > 0;\n"
    }

    fn is_risky(&self) -> bool {
        true
    }

    fn is_candidate(&self, tokens: &Tokens) -> bool {
        tokens.is_kind_found(TokenKind::IntLiteral)
            && tokens
                .iter()
                .any(|token| COMPARISONS.contains(&token.content()))
    }

    fn apply_fix(&self, tokens: &mut Tokens, _config: &FixerConfig) -> Result<(), FixerError> {
        for index in (1..tokens.len()).rev() {
            let is_strlen = tokens[index].equals_ignore_case(TokenKind::Identifier, "strlen")
                || tokens[index].equals_ignore_case(TokenKind::Identifier, "mb_strlen");
            if !is_strlen {
                continue;
            }
            if !is_global_function_call(tokens, index) {
                continue;
            }

            let Some(open_parenthesis) = tokens.next_meaningful(index) else {
                continue;
            };
            if tokens[open_parenthesis].content() != "(" {
                continue;
            }
            let close_parenthesis = tokens.find_block_end(open_parenthesis)?;
            if count_call_arguments(tokens, open_parenthesis, close_parenthesis)? != 1 {
                continue;
            }

            let mut tokens_to_remove: Vec<(usize, isize)> =
                vec![(index, 1), (open_parenthesis, 1), (close_parenthesis, -1)];

            let mut start_index = index;
            if let Some(prev) = tokens.prev_meaningful(index) {
                if tokens[prev].is_kind(TokenKind::NsSeparator) {
                    start_index = prev;
                    tokens_to_remove.push((prev, 1));
                }
            }

            if !transform_condition(tokens, start_index, close_parenthesis)? {
                continue;
            }

            for (i, direction) in tokens_to_remove {
                tokens.clear_at(i);
                let neighbour = (i as isize + direction) as usize;
                if neighbour < tokens.len() && tokens[neighbour].is_whitespace() {
                    tokens.clear_at(neighbour);
                }
            }
        }
        Ok(())
    }
}

/// Rewrites the comparison against literal 0 on either side of the call.
/// Returns false when the call is not part of such a comparison.
fn transform_condition(
    tokens: &mut Tokens,
    start_index: usize,
    end_index: usize,
) -> Result<bool, FixerError> {
    if transform_condition_left(tokens, start_index)? {
        return Ok(true);
    }
    transform_condition_right(tokens, end_index)
}

fn transform_condition_left(tokens: &mut Tokens, index: usize) -> Result<bool, FixerError> {
    let Some(comparison) = tokens.prev_meaningful(index) else {
        return Ok(false);
    };

    let mut change_condition = false;
    if tokens[comparison].content() == "<" {
        change_condition = true;
    } else if !["===", "!==", "==", "!="].contains(&tokens[comparison].content()) {
        return Ok(false);
    }

    let Some(zero) = tokens.prev_meaningful(comparison) else {
        return Ok(false);
    };
    if !tokens[zero].equals(TokenKind::IntLiteral, "0") {
        return Ok(false);
    }

    if change_condition {
        tokens.set(comparison, Token::new(TokenKind::Op, "!=="))?;
    }
    tokens.set(zero, Token::new(TokenKind::StringLiteral, "''"))?;

    Ok(true)
}

fn transform_condition_right(tokens: &mut Tokens, index: usize) -> Result<bool, FixerError> {
    let Some(comparison) = tokens.next_meaningful(index) else {
        return Ok(false);
    };

    let mut change_condition = false;
    if tokens[comparison].content() == ">" {
        change_condition = true;
    } else if !["===", "!==", "==", "!="].contains(&tokens[comparison].content()) {
        return Ok(false);
    }

    let Some(zero) = tokens.next_meaningful(comparison) else {
        return Ok(false);
    };
    if !tokens[zero].equals(TokenKind::IntLiteral, "0") {
        return Ok(false);
    }

    if change_condition {
        tokens.set(comparison, Token::new(TokenKind::Op, "!=="))?;
    }
    tokens.set(zero, Token::new(TokenKind::StringLiteral, "''"))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixers::apply;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rewrites_strict_equality() {
        let input = "<?php\n$isEmpty = strlen($value) === 0;\n";
        let expected = "<?php\n$isEmpty = $value === '';\n";
        assert_eq!(apply(&NoUselessStrlenFixer, input), expected);
    }

    #[test]
    fn test_rewrites_greater_than_zero() {
        let input = "<?php\n$isNotEmpty = mb_strlen($value) > 0;\n";
        let expected = "<?php\n$isNotEmpty = $value !== '';\n";
        assert_eq!(apply(&NoUselessStrlenFixer, input), expected);
    }

    #[test]
    fn test_rewrites_yoda_comparison() {
        let input = "<?php\nif (0 < strlen($value)) { return true; }\n";
        let expected = "<?php\nif ('' !== $value) { return true; }\n";
        assert_eq!(apply(&NoUselessStrlenFixer, input), expected);
    }

    #[test]
    fn test_rewrites_qualified_call() {
        let input = "<?php\n$isEmpty = \\strlen($value) == 0;\n";
        let expected = "<?php\n$isEmpty = $value == '';\n";
        assert_eq!(apply(&NoUselessStrlenFixer, input), expected);
    }

    #[test]
    fn test_skips_comparison_to_other_number() {
        let code = "<?php\n$isLong = strlen($value) > 40;\n";
        assert_eq!(apply(&NoUselessStrlenFixer, code), code);
    }

    #[test]
    fn test_skips_call_with_two_arguments() {
        let code = "<?php\n$isEmpty = mb_strlen($value, 'UTF-8') === 0;\n";
        assert_eq!(apply(&NoUselessStrlenFixer, code), code);
    }

    #[test]
    fn test_skips_method_call() {
        let code = "<?php\n$isEmpty = $helper->strlen($value) === 0;\n";
        assert_eq!(apply(&NoUselessStrlenFixer, code), code);
    }
}
