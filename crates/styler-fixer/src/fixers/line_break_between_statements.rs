//! Forces exactly one blank line between consecutive control structures.

use styler_core::{SeqSpec, Token, TokenKind, Tokens};

use crate::analyzer::Analyzer;
use crate::config::FixerConfig;

use super::{Fixer, FixerError};

const HANDLED_KINDS: [TokenKind; 6] = [
    TokenKind::Do,
    TokenKind::For,
    TokenKind::Foreach,
    TokenKind::If,
    TokenKind::Switch,
    TokenKind::While,
];

pub struct LineBreakBetweenStatementsFixer;

impl Fixer for LineBreakBetweenStatementsFixer {
    fn name(&self) -> &'static str {
        "line_break_between_statements"
    }

    fn documentation(&self) -> &'static str {
        "Each statement must be preceded by a line break (or be the first statement of a block)."
    }

    fn sample_code(&self) -> &'static str {
        "<?php\ndo {\n    // ...\n} while (true);\nforeach (['foo', 'bar'] as $str) {\n    // ...\n}\n"
    }

    fn apply_fix(&self, tokens: &mut Tokens, _config: &FixerConfig) -> Result<(), FixerError> {
        for index in (1..tokens.len()).rev() {
            let kind = tokens[index].kind();
            if !HANDLED_KINDS.contains(&kind) {
                continue;
            }

            let end = if kind == TokenKind::Do {
                // the closing `while (...);` of a do-while
                Analyzer::new(tokens).next_semicolon(index)
            } else {
                let Some(open_curly) = tokens.find_sequence(index, &[SeqSpec::content("{")]) else {
                    continue;
                };
                Some(tokens.find_block_end(open_curly)?)
            };

            if let Some(end) = end {
                fix_spaces_after(tokens, end)?;
            }
        }
        Ok(())
    }
}

fn fix_spaces_after(tokens: &mut Tokens, index: usize) -> Result<(), FixerError> {
    let space_index = index + 1;
    if space_index >= tokens.len() || !tokens[space_index].is_whitespace() {
        return Ok(());
    }
    let Some(next_meaningful) = tokens.next_meaningful(index) else {
        return Ok(());
    };
    if !HANDLED_KINDS.contains(&tokens[next_meaningful].kind()) {
        return Ok(());
    }

    let content = ensure_number_of_breaks(tokens[space_index].content());
    tokens.set(space_index, Token::whitespace(content))?;
    Ok(())
}

/// Normalizes a whitespace run to contain exactly two line breaks while
/// keeping the indentation of its last line.
fn ensure_number_of_breaks(whitespace: &str) -> String {
    let mut parts: Vec<&str> = whitespace.split('\n').collect();
    while parts.len() > 3 {
        parts.remove(0);
    }
    while parts.len() < 3 {
        parts.insert(0, "");
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixers::apply;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inserts_blank_line_between_statements() {
        let input = "<?php\nif ($foo) {\n    bar();\n}\nif ($bar) {\n    baz();\n}\n";
        let expected = "<?php\nif ($foo) {\n    bar();\n}\n\nif ($bar) {\n    baz();\n}\n";
        assert_eq!(apply(&LineBreakBetweenStatementsFixer, input), expected);
    }

    #[test]
    fn test_removes_extra_blank_lines() {
        let input = "<?php\nforeach ($items as $item) {\n    use_it($item);\n}\n\n\n\nwhile ($run) {\n    tick();\n}\n";
        let expected =
            "<?php\nforeach ($items as $item) {\n    use_it($item);\n}\n\nwhile ($run) {\n    tick();\n}\n";
        assert_eq!(apply(&LineBreakBetweenStatementsFixer, input), expected);
    }

    #[test]
    fn test_handles_do_while() {
        let input = "<?php\ndo {\n    tick();\n} while ($run);\nfor ($i = 0; $i < 3; $i++) {\n    step($i);\n}\n";
        let expected = "<?php\ndo {\n    tick();\n} while ($run);\n\nfor ($i = 0; $i < 3; $i++) {\n    step($i);\n}\n";
        assert_eq!(apply(&LineBreakBetweenStatementsFixer, input), expected);
    }

    #[test]
    fn test_keeps_indentation_of_nested_statements() {
        let input = "<?php\nfunction run()\n{\n    if ($a) {\n        one();\n    }\n    if ($b) {\n        two();\n    }\n}\n";
        let expected = "<?php\nfunction run()\n{\n    if ($a) {\n        one();\n    }\n\n    if ($b) {\n        two();\n    }\n}\n";
        assert_eq!(apply(&LineBreakBetweenStatementsFixer, input), expected);
    }

    #[test]
    fn test_leaves_single_statement_untouched() {
        let code = "<?php\nif ($foo) {\n    bar();\n}\n";
        assert_eq!(apply(&LineBreakBetweenStatementsFixer, code), code);
    }
}
