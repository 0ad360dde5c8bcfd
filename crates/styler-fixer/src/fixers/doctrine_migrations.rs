//! Strips auto-generated boilerplate comments from Doctrine migrations.

use styler_core::{Token, TokenKind, Tokens};

use super::{comment_indices, extends_class, Fixer, FixerError};
use crate::config::FixerConfig;

const BASE_CLASS: [&str; 3] = ["Doctrine", "Migrations", "AbstractMigration"];

const BOILERPLATE: [&str; 3] = [
    "Auto-generated Migration: Please modify to your needs!",
    "this up() migration is auto-generated, please modify it to your needs",
    "this down() migration is auto-generated, please modify it to your needs",
];

pub struct DoctrineMigrationsFixer;

impl Fixer for DoctrineMigrationsFixer {
    fn name(&self) -> &'static str {
        "doctrine_migrations"
    }

    fn documentation(&self) -> &'static str {
        "Unnecessary comments MUST BE removed from Doctrine migrations"
    }

    fn sample_code(&self) -> &'static str {
        "<?php declare(strict_types=1);\n\nnamespace Doctrine\\Migrations;\n\nuse Doctrine\\DBAL\\Schema\\Schema;\nuse Doctrine\\Migrations\\AbstractMigration;\n\n/**\n * Auto-generated Migration: Please modify to your needs!\n */\nfinal class VersionTest extends AbstractMigration\n{\n    public function up(Schema $schema)\n    {\n        // this up() migration is auto-generated, please modify it to your needs\n    }\n}\n"
    }

    fn is_candidate(&self, tokens: &Tokens) -> bool {
        extends_class(tokens, &BASE_CLASS)
    }

    fn apply_fix(&self, tokens: &mut Tokens, _config: &FixerConfig) -> Result<(), FixerError> {
        for position in comment_indices(tokens) {
            let lines: Vec<&str> = tokens[position].content().split('\n').collect();
            let kept: Vec<&str> = lines
                .iter()
                .copied()
                .filter(|line| {
                    let trimmed = line.trim_matches(|c| matches!(c, '/' | '*' | ' '));
                    !BOILERPLATE.contains(&trimmed)
                })
                .collect();

            if kept.len() == lines.len() {
                continue;
            }

            let remaining = kept.join("\n");
            if remaining
                .trim_matches(|c| matches!(c, ' ' | '/' | '*' | '\n'))
                .is_empty()
            {
                tokens.clear_at(position);
                tokens.remove_trailing_whitespace(position);
                continue;
            }

            tokens.set(position, Token::new(TokenKind::Comment, remaining))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixers::apply;
    use pretty_assertions::assert_eq;

    const PREAMBLE: &str = "<?php\n\nuse Doctrine\\Migrations\\AbstractMigration;\n\n";

    #[test]
    fn test_removes_boilerplate_comments() {
        let input = format!(
            "{PREAMBLE}/**\n * Auto-generated Migration: Please modify to your needs!\n */\nfinal class Version1 extends AbstractMigration\n{{\n    public function up($schema)\n    {{\n        // this up() migration is auto-generated, please modify it to your needs\n        $schema->drop();\n    }}\n}}\n"
        );
        let expected = format!(
            "{PREAMBLE}final class Version1 extends AbstractMigration\n{{\n    public function up($schema)\n    {{\n        $schema->drop();\n    }}\n}}\n"
        );
        assert_eq!(apply(&DoctrineMigrationsFixer, &input), expected);
    }

    #[test]
    fn test_keeps_comment_with_extra_content() {
        let input = format!(
            "{PREAMBLE}/**\n * Auto-generated Migration: Please modify to your needs!\n * Adds the users table.\n */\nfinal class Version1 extends AbstractMigration\n{{\n}}\n"
        );
        let expected = format!(
            "{PREAMBLE}/**\n * Adds the users table.\n */\nfinal class Version1 extends AbstractMigration\n{{\n}}\n"
        );
        assert_eq!(apply(&DoctrineMigrationsFixer, &input), expected);
    }

    #[test]
    fn test_ignores_classes_not_extending_the_migration_base() {
        let code = "<?php\n/**\n * Auto-generated Migration: Please modify to your needs!\n */\nfinal class Version1 extends SomethingElse\n{\n}\n";
        assert_eq!(apply(&DoctrineMigrationsFixer, code), code);
    }

    #[test]
    fn test_ignores_unrelated_comments() {
        let code = format!(
            "{PREAMBLE}// schema changes reviewed manually\nfinal class Version1 extends AbstractMigration\n{{\n}}\n"
        );
        assert_eq!(apply(&DoctrineMigrationsFixer, &code), code);
    }
}
