//! Puts every argument of a method signature on its own line, or none.

use styler_core::{Token, TokenKind, Tokens};

use crate::analyzer::Analyzer;
use crate::config::FixerConfig;

use super::{Fixer, FixerError};

pub struct LineBreakBetweenMethodArgumentsFixer;

impl Fixer for LineBreakBetweenMethodArgumentsFixer {
    fn name(&self) -> &'static str {
        "line_break_between_method_arguments"
    }

    fn documentation(&self) -> &'static str {
        "If a method signature does not fit on a single line, each argument must be on its own line."
    }

    fn sample_code(&self) -> &'static str {
        "<?php\nclass Example\n{\n    public function fun1($arg1, array $arg2 = [], \\ArrayAccess $arg3 = null, bool $bool = true)\n    {\n    }\n}\n"
    }

    fn apply_fix(&self, tokens: &mut Tokens, config: &FixerConfig) -> Result<(), FixerError> {
        for index in (1..tokens.len()).rev() {
            if !tokens[index].is_kind(TokenKind::Function) {
                continue;
            }
            let Some(name) = tokens.next_meaningful(index) else {
                continue;
            };
            if !tokens[name].is_kind(TokenKind::Identifier) {
                continue;
            }
            let Some(open_parenthesis) = tokens.next_meaningful(name) else {
                continue;
            };
            if tokens[open_parenthesis].content() != "(" {
                continue;
            }

            if Analyzer::new(tokens).count_arguments(index)? == 0 {
                merge_args(tokens, index, config)?;
            } else if Analyzer::new(tokens).line_width(index) > 1 {
                split_args(tokens, index, config)?;
            } else {
                let mut merged = tokens.clone();
                merge_args(&mut merged, index, config)?;
                if Analyzer::new(&merged).line_width(index) > 1 {
                    split_args(tokens, index, config)?;
                } else {
                    merge_args(tokens, index, config)?;
                }
            }
        }
        Ok(())
    }
}

/// Collapse the signature onto the line of the `function` keyword and move
/// the opening curly brace onto its own line.
fn merge_args(tokens: &mut Tokens, index: usize, config: &FixerConfig) -> Result<(), FixerError> {
    let Some(open_parenthesis) = tokens.next_index_of(index, |token| token.content() == "(") else {
        return Ok(());
    };
    let close_parenthesis = tokens.find_block_end(open_parenthesis)?;

    for i in open_parenthesis + 1..close_parenthesis {
        if tokens[i].is_whitespace() {
            tokens.set(i, Token::whitespace(" "))?;
        }
    }

    tokens.remove_trailing_whitespace(open_parenthesis);
    tokens.remove_leading_whitespace(close_parenthesis);

    let Some(end) = tokens.next_index_of(close_parenthesis, |token| {
        token.content() == ";" || token.content() == "{"
    }) else {
        return Ok(());
    };
    if tokens[end].content() == "{" {
        tokens.remove_leading_whitespace(end);
        let indentation = Analyzer::new(tokens).line_indentation(index);
        let whitespace = format!("{}{}", config.line_ending.as_str(), indentation);
        tokens.ensure_whitespace_at(end, -1, &whitespace);
    }
    Ok(())
}

/// Put every top level argument on its own line, one indentation level
/// deeper than the `function` keyword.
fn split_args(tokens: &mut Tokens, index: usize, config: &FixerConfig) -> Result<(), FixerError> {
    merge_args(tokens, index, config)?;

    let Some(open_parenthesis) = tokens.next_index_of(index, |token| token.content() == "(") else {
        return Ok(());
    };
    let close_parenthesis = tokens.find_block_end(open_parenthesis)?;

    if let Some(after_close) = tokens.next_meaningful(close_parenthesis) {
        if tokens[after_close].content() == "{" {
            tokens.remove_trailing_whitespace(close_parenthesis);
            tokens.ensure_whitespace_at(close_parenthesis, 1, " ");
        } else if tokens[after_close].is_kind(TokenKind::TypeColon) {
            if let Some(end) = tokens.next_index_of(close_parenthesis, |token| {
                token.content() == ";" || token.content() == "{"
            }) {
                tokens.remove_leading_whitespace(end);
                if tokens[end].content() != ";" {
                    tokens.ensure_whitespace_at(end, 0, " ");
                }
            }
        }
    }

    let mut linebreaks = vec![open_parenthesis, close_parenthesis - 1];
    let mut i = open_parenthesis + 1;
    while i < close_parenthesis {
        match tokens[i].content() {
            "(" | "[" | "#[" => i = tokens.find_block_end(i)?,
            "," => linebreaks.push(i),
            _ => {}
        }
        i += 1;
    }
    linebreaks.sort_unstable();

    for (iteration, &linebreak) in linebreaks.iter().rev().enumerate() {
        let indentation = Analyzer::new(tokens).line_indentation(index);
        let whitespace = if iteration == 0 {
            format!("{}{}", config.line_ending.as_str(), indentation)
        } else {
            format!(
                "{}{}{}",
                config.line_ending.as_str(),
                indentation,
                config.indent.as_string()
            )
        };
        tokens.remove_trailing_whitespace(linebreak);
        tokens.ensure_whitespace_at(linebreak, 1, &whitespace);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixers::apply;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_splits_arguments_onto_their_own_lines() {
        let input =
            "<?php\nfinal class Example\n{\n    public function run($foo, $bar, $baz)\n    {\n    }\n}\n";
        let expected = "<?php\nfinal class Example\n{\n    public function run(\n        $foo,\n        $bar,\n        $baz\n    ) {\n    }\n}\n";
        assert_eq!(apply(&LineBreakBetweenMethodArgumentsFixer, input), expected);
    }

    #[test]
    fn test_merges_empty_argument_list() {
        let input = "<?php\nfinal class Example\n{\n    public function run(\n    ) {\n    }\n}\n";
        let expected = "<?php\nfinal class Example\n{\n    public function run()\n    {\n    }\n}\n";
        assert_eq!(apply(&LineBreakBetweenMethodArgumentsFixer, input), expected);
    }

    #[test]
    fn test_keeps_return_type_next_to_closing_parenthesis() {
        let input =
            "<?php\nfinal class Example\n{\n    public function run($foo, $bar): void\n    {\n    }\n}\n";
        let expected = "<?php\nfinal class Example\n{\n    public function run(\n        $foo,\n        $bar\n    ): void {\n    }\n}\n";
        assert_eq!(apply(&LineBreakBetweenMethodArgumentsFixer, input), expected);
    }

    #[test]
    fn test_does_not_split_commas_inside_default_values() {
        let input =
            "<?php\nclass Config\n{\n    public function load($path, array $defaults = [1, 2])\n    {\n    }\n}\n";
        let expected = "<?php\nclass Config\n{\n    public function load(\n        $path,\n        array $defaults = [1, 2]\n    ) {\n    }\n}\n";
        assert_eq!(apply(&LineBreakBetweenMethodArgumentsFixer, input), expected);
    }

    #[test]
    fn test_is_idempotent() {
        let code = "<?php\nfinal class Example\n{\n    public function run(\n        $foo,\n        $bar,\n        $baz\n    ) {\n    }\n}\n";
        assert_eq!(apply(&LineBreakBetweenMethodArgumentsFixer, code), code);
    }

    #[test]
    fn test_ignores_closures() {
        let code = "<?php\n$sum = function ($a, $b) {\n    return $a + $b;\n};\n";
        assert_eq!(apply(&LineBreakBetweenMethodArgumentsFixer, code), code);
    }
}
