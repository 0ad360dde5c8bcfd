//! Structural queries over a token collection
//!
//! The analyzer is a read-only view; it never mutates the tokens it was
//! built over. Fixers run its queries up front, then apply their edits.

mod constructor;
mod switch_analysis;

pub use constructor::ConstructorAnalysis;
pub use switch_analysis::{CaseAnalysis, SwitchAnalysis};

use std::collections::BTreeMap;

use styler_core::{TokenKind, Tokens, TokensError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("index {0} is not a class")]
    NotAClass(usize),
    #[error("index {0} is not a switch")]
    NotASwitch(usize),
    #[error("unexpected token structure near index {0}")]
    UnexpectedStructure(usize),
    #[error(transparent)]
    Tokens(#[from] TokensError),
}

/// One declared argument of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentAnalysis {
    /// Declared type, with any nullability marker, or None when untyped.
    pub type_hint: Option<String>,
    /// Variable name including the `$` sigil.
    pub name: String,
    /// Whether the default value is literally `null`.
    pub nullable: bool,
    /// Whether a default value is present.
    pub has_default: bool,
}

pub struct Analyzer<'a> {
    tokens: &'a Tokens,
}

impl<'a> Analyzer<'a> {
    pub fn new(tokens: &'a Tokens) -> Self {
        Self { tokens }
    }

    /// Index of the token carrying the line break that starts the line
    /// containing `index`, or None on the first line.
    pub fn line_start(&self, index: usize) -> Option<usize> {
        (0..=index)
            .rev()
            .find(|&i| self.tokens[i].content().contains('\n'))
    }

    /// Index of the token carrying the line break that ends the line
    /// containing `index`, or None on the last line.
    pub fn line_end(&self, index: usize) -> Option<usize> {
        (index..self.tokens.len()).find(|&i| self.tokens[i].content().contains('\n'))
    }

    /// Whitespace run after the last line break of the line-start token.
    pub fn line_indentation(&self, index: usize) -> String {
        let start = self.line_start(index).unwrap_or(0);
        let content = self.tokens[start].content();
        content
            .rsplit('\n')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Character count of the line containing `index`. Tokens spanning the
    /// line boundaries contribute only their on-line portion.
    pub fn line_width(&self, index: usize) -> usize {
        let start = self.line_start(index).unwrap_or(0);
        // A final line without a terminating break leaves `end` at 0, so the
        // first token counts twice. Deliberate; callers only threshold the
        // width, they never print it.
        let end = self.line_end(index).unwrap_or(0);
        let mut size = 0;

        let start_content = self.tokens[start].content();
        size += start_content
            .rsplit('\n')
            .next()
            .unwrap_or_default()
            .chars()
            .count();
        let end_content = self.tokens[end].content();
        size += end_content
            .split('\n')
            .next()
            .unwrap_or_default()
            .chars()
            .count();

        for i in start + 1..end {
            size += self.tokens[i].content().chars().count();
        }
        size
    }

    /// Matching `)` for the `(` at `index`.
    pub fn closing_parenthesis(&self, index: usize) -> Result<usize, TokensError> {
        self.tokens.find_block_end(index)
    }

    /// Matching `}` for the `{` at `index`.
    pub fn closing_curly_bracket(&self, index: usize) -> Result<usize, TokensError> {
        self.tokens.find_block_end(index)
    }

    /// Next `,` after `index` at the same nesting level, stepping over
    /// parenthesis, bracket and brace blocks as opaque units.
    pub fn next_comma(&self, index: usize) -> Option<usize> {
        self.next_content_skipping_blocks(index, ",")
    }

    /// Next `;` after `index` at the same nesting level.
    pub fn next_semicolon(&self, index: usize) -> Option<usize> {
        self.next_content_skipping_blocks(index, ";")
    }

    fn next_content_skipping_blocks(&self, mut index: usize, target: &str) -> Option<usize> {
        loop {
            index = self.tokens.next_meaningful(index)?;
            match self.tokens[index].content() {
                content if content == target => return Some(index),
                "(" | "[" | "{" => index = self.tokens.find_block_end(index).ok()?,
                _ => {}
            }
        }
    }

    /// Arguments of the function declared at `index` (the `function` token),
    /// keyed by each argument's first token index.
    pub fn method_arguments(
        &self,
        index: usize,
    ) -> Result<BTreeMap<usize, ArgumentAnalysis>, AnalyzerError> {
        let name_index = self
            .tokens
            .next_meaningful(index)
            .ok_or(AnalyzerError::UnexpectedStructure(index))?;
        let open_parenthesis = self
            .tokens
            .next_meaningful(name_index)
            .ok_or(AnalyzerError::UnexpectedStructure(name_index))?;
        let close_parenthesis = self.closing_parenthesis(open_parenthesis)?;

        let mut arguments = BTreeMap::new();
        let mut position = open_parenthesis + 1;

        while position < close_parenthesis {
            if self.tokens[position].is_whitespace() {
                position += 1;
                continue;
            }

            let mut type_hint: Option<String> = None;
            let mut name_index = position;

            if !is_variable_content(self.tokens[name_index].content()) {
                loop {
                    if !self.tokens[name_index].is_whitespace() {
                        type_hint
                            .get_or_insert_with(String::new)
                            .push_str(self.tokens[name_index].content());
                    }
                    name_index += 1;
                    if name_index >= self.tokens.len() {
                        return Err(AnalyzerError::UnexpectedStructure(position));
                    }
                    if is_variable_content(self.tokens[name_index].content()) {
                        break;
                    }
                }
            }

            let next = self
                .tokens
                .next_meaningful(name_index)
                .ok_or(AnalyzerError::UnexpectedStructure(name_index))?;
            let mut has_default = false;
            let mut nullable = false;
            if self.tokens[next].content() == "=" {
                has_default = true;
                let value = self
                    .tokens
                    .next_meaningful(next)
                    .ok_or(AnalyzerError::UnexpectedStructure(next))?;
                nullable = self.tokens[value].content() == "null";
            }

            arguments.insert(
                position,
                ArgumentAnalysis {
                    type_hint,
                    name: self.tokens[name_index].content().to_string(),
                    nullable,
                    has_default,
                },
            );

            match self.next_comma(position) {
                None => return Ok(arguments),
                Some(comma) => position = comma + 1,
            }
        }

        Ok(arguments)
    }

    pub fn count_arguments(&self, index: usize) -> Result<usize, AnalyzerError> {
        Ok(self.method_arguments(index)?.len())
    }

    /// Case layout of the switch whose `switch` token sits at `index`.
    pub fn switch_analysis(&self, index: usize) -> Result<SwitchAnalysis, AnalyzerError> {
        if !self.tokens[index].is_kind(TokenKind::Switch) {
            return Err(AnalyzerError::NotASwitch(index));
        }

        let cases_start = self.cases_start(index)?;
        let cases_end = self.cases_end(cases_start)?;

        let mut cases = Vec::new();
        let mut current = cases_start;
        while current < cases_end {
            current = self.next_same_level_token(current)?;
            if !self.tokens[current].is_any_kind(&[TokenKind::Case, TokenKind::Default]) {
                continue;
            }
            cases.push(self.case_analysis(current)?);
        }

        Ok(SwitchAnalysis::new(cases_start, cases_end, cases))
    }

    /// Next meaningful token after `index`, treating blocks and whole
    /// nested switch constructs as single steps.
    pub fn next_same_level_token(&self, index: usize) -> Result<usize, AnalyzerError> {
        let next = self
            .tokens
            .next_meaningful(index)
            .ok_or(AnalyzerError::UnexpectedStructure(index))?;

        if self.tokens[next].is_kind(TokenKind::Switch) {
            return Ok(self.switch_analysis(next)?.cases_end());
        }

        if let Ok((_, true)) = self.tokens.detect_block(next) {
            return Ok(self.tokens.find_block_end(next)? + 1);
        }

        Ok(next)
    }

    fn case_analysis(&self, index: usize) -> Result<CaseAnalysis, AnalyzerError> {
        let mut current = index;
        while current < self.tokens.len() {
            current = self.next_same_level_token(current)?;
            if matches!(self.tokens[current].content(), ":" | ";") {
                break;
            }
        }
        Ok(CaseAnalysis::new(current))
    }

    fn cases_start(&self, switch_index: usize) -> Result<usize, AnalyzerError> {
        let parenthesis_start = self
            .tokens
            .next_meaningful(switch_index)
            .ok_or(AnalyzerError::UnexpectedStructure(switch_index))?;
        let parenthesis_end = self.tokens.find_block_end(parenthesis_start)?;
        self.tokens
            .next_meaningful(parenthesis_end)
            .ok_or(AnalyzerError::UnexpectedStructure(parenthesis_end))
    }

    fn cases_end(&self, cases_start: usize) -> Result<usize, AnalyzerError> {
        if self.tokens[cases_start].content() == "{" {
            return Ok(self.tokens.find_block_end(cases_start)?);
        }

        // alternate syntax: scan at the same level for `endswitch`
        let mut index = cases_start;
        while index < self.tokens.len() {
            index = self.next_same_level_token(index)?;
            if self.tokens[index].is_kind(TokenKind::EndSwitch) {
                break;
            }
        }

        let after = self
            .tokens
            .next_meaningful(index)
            .ok_or(AnalyzerError::UnexpectedStructure(index))?;
        Ok(if self.tokens[after].content() == ";" {
            after
        } else {
            index
        })
    }

    /// Find the class's `__construct` method; None when there is none or
    /// it is abstract.
    pub fn find_non_abstract_constructor(
        &self,
        class_index: usize,
    ) -> Result<Option<ConstructorAnalysis>, AnalyzerError> {
        if !self.tokens[class_index].is_kind(TokenKind::Class) {
            return Err(AnalyzerError::NotAClass(class_index));
        }

        let body_open = self
            .tokens
            .next_index_of(class_index, |t| t.content() == "{")
            .ok_or(AnalyzerError::UnexpectedStructure(class_index))?;
        let body_close = self.tokens.find_block_end(body_open)?;

        let mut index = body_open;
        while index < body_close {
            index = self.next_same_level_token(index)?;
            if !self.tokens[index].is_kind(TokenKind::Function) {
                continue;
            }
            let Some(name_index) = self.tokens.next_meaningful(index) else {
                break;
            };
            if !self.tokens[name_index].equals_ignore_case(TokenKind::Identifier, "__construct") {
                continue;
            }

            if self.is_abstract_method(index) {
                return Ok(None);
            }
            return Ok(Some(ConstructorAnalysis::analyze(self.tokens, index)?));
        }

        Ok(None)
    }

    fn is_abstract_method(&self, function_index: usize) -> bool {
        let mut index = function_index;
        while let Some(prev) = self.tokens.prev_meaningful(index) {
            match self.tokens[prev].kind() {
                TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Final => index = prev,
                TokenKind::Abstract => return true,
                _ => return false,
            }
        }
        false
    }

    pub fn tokens(&self) -> &Tokens {
        self.tokens
    }
}

fn is_variable_content(content: &str) -> bool {
    content.starts_with('$') && content.len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Tokens {
        Tokens::from_source(source).unwrap()
    }

    fn find(tokens: &Tokens, kind: TokenKind) -> usize {
        tokens.find_kind(kind, 0).unwrap()
    }

    #[test]
    fn test_line_indentation() {
        let tokens = tokens("<?php\nclass Foo\n{\n    public function bar() {}\n}\n");
        let analyzer = Analyzer::new(&tokens);
        let function = find(&tokens, TokenKind::Function);
        assert_eq!(analyzer.line_indentation(function), "    ");
        let class = find(&tokens, TokenKind::Class);
        assert_eq!(analyzer.line_indentation(class), "");
    }

    #[test]
    fn test_line_width_counts_partial_boundary_tokens() {
        let tokens = tokens("<?php\n$total = $price + $tax;\n");
        let analyzer = Analyzer::new(&tokens);
        let variable = find(&tokens, TokenKind::Variable);
        assert_eq!(analyzer.line_width(variable), "$total = $price + $tax;".len());
    }

    #[test]
    fn test_next_comma_skips_nested_blocks() {
        let tokens = tokens("<?php f($a, g($b, $c), $d);");
        let analyzer = Analyzer::new(&tokens);
        let first_variable = find(&tokens, TokenKind::Variable);
        let comma = analyzer.next_comma(first_variable).unwrap();
        assert_eq!(tokens[comma].content(), ",");
        let second = analyzer.next_comma(comma).unwrap();
        // the commas inside g(...) are stepped over
        assert_eq!(tokens.next_meaningful(second).map(|i| tokens[i].content()), Some("$d"));
    }

    #[test]
    fn test_method_arguments_collects_type_name_default() {
        let tokens = tokens("<?php function f(int $a, ?string $b = null, $c = 1) {}");
        let analyzer = Analyzer::new(&tokens);
        let function = find(&tokens, TokenKind::Function);
        let arguments = analyzer.method_arguments(function).unwrap();
        assert_eq!(arguments.len(), 3);

        let mut values = arguments.values();
        let first = values.next().unwrap();
        assert_eq!(first.type_hint.as_deref(), Some("int"));
        assert_eq!(first.name, "$a");
        assert!(!first.has_default);
        assert!(!first.nullable);

        let second = values.next().unwrap();
        assert_eq!(second.type_hint.as_deref(), Some("?string"));
        assert_eq!(second.name, "$b");
        assert!(second.has_default);
        assert!(second.nullable);

        let third = values.next().unwrap();
        assert_eq!(third.type_hint, None);
        assert_eq!(third.name, "$c");
        assert!(third.has_default);
        assert!(!third.nullable);
    }

    #[test]
    fn test_count_arguments_of_empty_list() {
        let tokens = tokens("<?php function f() {}");
        let analyzer = Analyzer::new(&tokens);
        let function = find(&tokens, TokenKind::Function);
        assert_eq!(analyzer.count_arguments(function).unwrap(), 0);
    }

    #[test]
    fn test_switch_analysis_brace_syntax() {
        let source = "<?php switch ($a) { case 1: return 1; case 2: return 2; default: return 0; }";
        let tokens = tokens(source);
        let analyzer = Analyzer::new(&tokens);
        let switch = find(&tokens, TokenKind::Switch);
        let analysis = analyzer.switch_analysis(switch).unwrap();
        assert_eq!(tokens[analysis.cases_start()].content(), "{");
        assert_eq!(tokens[analysis.cases_end()].content(), "}");
        assert_eq!(analysis.cases().len(), 3);
        for case in analysis.cases() {
            assert_eq!(tokens[case.index()].content(), ":");
        }
    }

    #[test]
    fn test_switch_analysis_skips_nested_switch() {
        let source = "<?php switch ($a) { case 1: switch ($b) { case 9: break; } break; default: break; }";
        let tokens = tokens(source);
        let analyzer = Analyzer::new(&tokens);
        let switch = find(&tokens, TokenKind::Switch);
        let analysis = analyzer.switch_analysis(switch).unwrap();
        assert_eq!(analysis.cases().len(), 2);
    }

    #[test]
    fn test_switch_analysis_alternate_syntax() {
        let source = "<?php switch ($a): case 1: break; default: break; endswitch;";
        let tokens = tokens(source);
        let analyzer = Analyzer::new(&tokens);
        let switch = find(&tokens, TokenKind::Switch);
        let analysis = analyzer.switch_analysis(switch).unwrap();
        assert_eq!(tokens[analysis.cases_end()].content(), ";");
        assert_eq!(analysis.cases().len(), 2);
    }

    #[test]
    fn test_switch_analysis_rejects_non_switch() {
        let tokens = tokens("<?php $a = 1;");
        let analyzer = Analyzer::new(&tokens);
        assert!(matches!(
            analyzer.switch_analysis(1),
            Err(AnalyzerError::NotASwitch(1))
        ));
    }

    #[test]
    fn test_find_non_abstract_constructor() {
        let source = "<?php class Foo { private string $bar; public function __construct(string $bar) { $this->bar = $bar; } }";
        let tokens = tokens(source);
        let analyzer = Analyzer::new(&tokens);
        let class = find(&tokens, TokenKind::Class);
        let constructor = analyzer.find_non_abstract_constructor(class).unwrap();
        assert!(constructor.is_some());
    }

    #[test]
    fn test_abstract_constructor_is_not_found() {
        let source = "<?php abstract class Foo { abstract public function __construct(); }";
        let tokens = tokens(source);
        let analyzer = Analyzer::new(&tokens);
        let class = find(&tokens, TokenKind::Class);
        assert!(analyzer.find_non_abstract_constructor(class).unwrap().is_none());
    }

    #[test]
    fn test_class_without_constructor() {
        let source = "<?php class Foo { public function bar(): void {} }";
        let tokens = tokens(source);
        let analyzer = Analyzer::new(&tokens);
        let class = find(&tokens, TokenKind::Class);
        assert!(analyzer.find_non_abstract_constructor(class).unwrap().is_none());
    }

    #[test]
    fn test_find_non_abstract_constructor_rejects_non_class() {
        let tokens = tokens("<?php $a = 1;");
        let analyzer = Analyzer::new(&tokens);
        assert!(matches!(
            analyzer.find_non_abstract_constructor(1),
            Err(AnalyzerError::NotAClass(1))
        ));
    }
}
