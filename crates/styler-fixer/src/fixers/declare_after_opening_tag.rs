//! Moves the strict types declare statement onto the opening tag line.

use styler_core::{Token, TokenKind, Tokens};

use super::{remove_with_lines_if_possible, Fixer, FixerError};
use crate::config::FixerConfig;

pub struct DeclareAfterOpeningTagFixer;

impl Fixer for DeclareAfterOpeningTagFixer {
    fn name(&self) -> &'static str {
        "declare_after_opening_tag"
    }

    fn documentation(&self) -> &'static str {
        "Declare statement for strict types must be placed on the same line, after the opening tag."
    }

    fn sample_code(&self) -> &'static str {
        "<?php\n$foo;\ndeclare(strict_types=1);\n$bar;\n"
    }

    fn is_candidate(&self, tokens: &Tokens) -> bool {
        tokens.is_kind_found(TokenKind::Declare)
    }

    fn apply_fix(&self, tokens: &mut Tokens, _config: &FixerConfig) -> Result<(), FixerError> {
        if !tokens[0].is_kind(TokenKind::OpenTag) {
            return Ok(());
        }

        let opening_tag_content = tokens[0].content().to_string();

        let declare_index = tokens
            .find_kind(TokenKind::Declare, 1)
            .ok_or(FixerError::ExpectedToken("declare"))?;
        let open_parenthesis = tokens
            .next_meaningful(declare_index)
            .ok_or(FixerError::ExpectedToken("("))?;
        let close_parenthesis = tokens.find_block_end(open_parenthesis)?;

        let directive = tokens.generate_partial_code(open_parenthesis, close_parenthesis);
        if !directive.to_ascii_lowercase().contains("strict_types") {
            return Ok(());
        }

        tokens.set(
            0,
            Token::new(TokenKind::OpenTag, format!("{} ", &opening_tag_content[..5])),
        )?;

        if declare_index <= 2 {
            if declare_index > 1 {
                tokens.clear_range(1, declare_index - 1);
            }
            return Ok(());
        }

        let semicolon_index = tokens
            .next_meaningful(close_parenthesis)
            .ok_or(FixerError::ExpectedToken(";"))?;

        let mut tokens_to_insert: Vec<Token> =
            (declare_index..=semicolon_index).map(|i| tokens[i].clone()).collect();

        let trailer = &opening_tag_content[5..];
        if tokens[1].is_whitespace() {
            let merged = format!("{}{}", trailer, tokens[1].content());
            tokens.set(1, Token::whitespace(merged))?;
        } else if !trailer.is_empty() {
            tokens_to_insert.push(Token::whitespace(trailer));
        }

        if semicolon_index + 1 < tokens.len() && tokens[semicolon_index + 1].is_whitespace() {
            let content =
                strip_first_of_doubled_line_break(tokens[semicolon_index + 1].content());
            tokens.ensure_whitespace_at(semicolon_index + 1, 0, &content);
        }

        tokens.clear_range(declare_index + 1, semicolon_index);
        remove_with_lines_if_possible(tokens, declare_index);

        tokens.insert_at(1, tokens_to_insert);
        Ok(())
    }
}

/// Drop the first of two consecutive leading line breaks, so relocating the
/// statement does not leave an extra blank line behind.
fn strip_first_of_doubled_line_break(content: &str) -> String {
    let rest = if let Some(rest) = content.strip_prefix("\r\n") {
        rest
    } else if let Some(rest) = content.strip_prefix('\n') {
        rest
    } else if let Some(rest) = content.strip_prefix('\r') {
        rest
    } else {
        return content.to_string();
    };

    if rest.starts_with('\n') || rest.starts_with('\r') {
        rest.to_string()
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixers::apply;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_moves_declare_to_opening_tag_line() {
        let input = "<?php\n\ndeclare(strict_types=1);\n\n$value = 1;\n";
        let expected = "<?php declare(strict_types=1);\n\n$value = 1;\n";
        assert_eq!(apply(&DeclareAfterOpeningTagFixer, input), expected);
    }

    #[test]
    fn test_relocates_declare_found_later_in_the_file() {
        let input = "<?php\n$foo;\ndeclare(strict_types=1);\n$bar;\n";
        let expected = "<?php declare(strict_types=1);\n$foo;\n$bar;\n";
        assert_eq!(apply(&DeclareAfterOpeningTagFixer, input), expected);
    }

    #[test]
    fn test_skips_when_declare_already_inline() {
        let code = "<?php declare(strict_types=1);\n\n$value = 1;\n";
        assert_eq!(apply(&DeclareAfterOpeningTagFixer, code), code);
    }

    #[test]
    fn test_skips_when_declare_is_not_strict_types() {
        let code = "<?php\ndeclare(ticks=1);\n";
        assert_eq!(apply(&DeclareAfterOpeningTagFixer, code), code);
    }

    #[test]
    fn test_skips_file_without_declare() {
        let code = "<?php\n$value = 1;\n";
        assert_eq!(apply(&DeclareAfterOpeningTagFixer, code), code);
    }

    #[test]
    fn test_spacing_inside_declare_is_kept() {
        let input = "<?php\ndeclare( strict_types = 1 );\n$value;\n";
        let expected = "<?php declare( strict_types = 1 );\n$value;\n";
        assert_eq!(apply(&DeclareAfterOpeningTagFixer, input), expected);
    }
}
