//! Constructor descriptor
//!
//! Computed eagerly so callers can keep the result while mutating the
//! token collection it was derived from.

use std::collections::{BTreeMap, HashMap};

use styler_core::{TokenKind, Tokens};

use super::AnalyzerError;

/// Read-only view over one class constructor: its parameters and the
/// `$this->x = $x;` assignments in its body.
#[derive(Debug, Clone)]
pub struct ConstructorAnalysis {
    constructor_index: usize,
    parameter_names: Vec<String>,
    promotable_parameters: BTreeMap<usize, String>,
    promotable_assignments: HashMap<String, usize>,
}

impl ConstructorAnalysis {
    pub(crate) fn analyze(
        tokens: &Tokens,
        constructor_index: usize,
    ) -> Result<Self, AnalyzerError> {
        let open_parenthesis = tokens
            .next_index_of(constructor_index, |t| t.content() == "(")
            .ok_or(AnalyzerError::UnexpectedStructure(constructor_index))?;
        let close_parenthesis = tokens.find_block_end(open_parenthesis)?;

        let mut parameter_names = Vec::new();
        let mut promotable_parameters = BTreeMap::new();
        for index in open_parenthesis + 1..close_parenthesis {
            if !tokens[index].is_kind(TokenKind::Variable) {
                continue;
            }
            parameter_names.push(tokens[index].content().to_string());

            if Self::is_promotable(tokens, index) {
                promotable_parameters.insert(index, tokens[index].content().to_string());
            }
        }

        let promotable_assignments =
            Self::collect_assignments(tokens, close_parenthesis);

        Ok(Self {
            constructor_index,
            parameter_names,
            promotable_parameters,
            promotable_assignments,
        })
    }

    /// A parameter is promotable when it is a plain value parameter: not
    /// variadic, not by-reference, not callable-typed, not already promoted
    /// and without a default value.
    fn is_promotable(tokens: &Tokens, variable_index: usize) -> bool {
        if let Some(prev) = tokens.prev_meaningful(variable_index) {
            if matches!(tokens[prev].content(), "..." | "&") {
                return false;
            }
            if tokens[prev].equals_ignore_case(TokenKind::Identifier, "callable") {
                return false;
            }
        }

        let boundary = tokens.prev_index_of(variable_index, |t| {
            matches!(t.content(), "(" | ",")
                || t.is_any_kind(&[
                    TokenKind::PromotedPublic,
                    TokenKind::PromotedProtected,
                    TokenKind::PromotedPrivate,
                ])
        });
        if boundary.is_some_and(|i| {
            tokens[i].is_any_kind(&[
                TokenKind::PromotedPublic,
                TokenKind::PromotedProtected,
                TokenKind::PromotedPrivate,
            ])
        }) {
            return false;
        }

        !tokens
            .next_meaningful(variable_index)
            .is_some_and(|i| tokens[i].content() == "=")
    }

    /// Map from parameter name to the token index of the `$x` on the right
    /// side of a direct `$this->prop = $x;` statement. Names and properties
    /// assigned more than once are dropped, so at most one index survives
    /// per name.
    fn collect_assignments(tokens: &Tokens, close_parenthesis: usize) -> HashMap<String, usize> {
        let mut variables: HashMap<String, usize> = HashMap::new();
        let mut properties: HashMap<String, String> = HashMap::new();

        let Some(after_signature) = tokens.next_index_of(close_parenthesis, |t| {
            matches!(t.content(), "{" | ";")
        }) else {
            return variables;
        };
        if tokens[after_signature].content() == ";" {
            return variables;
        }
        let Ok(body_close) = tokens.find_block_end(after_signature) else {
            return variables;
        };

        for index in after_signature + 1..body_close {
            if !tokens[index].equals(TokenKind::Variable, "$this") {
                continue;
            }
            let Some(operator) = tokens.next_meaningful(index) else {
                continue;
            };
            if tokens[operator].content() != "->" {
                continue;
            }
            let Some(property) = tokens.next_meaningful(operator) else {
                continue;
            };
            let Some(assignment) = tokens.next_meaningful(property) else {
                continue;
            };
            if tokens[assignment].content() != "=" {
                continue;
            }
            let Some(variable) = tokens.next_meaningful(assignment) else {
                continue;
            };
            if !tokens[variable].is_kind(TokenKind::Variable) {
                continue;
            }
            let Some(semicolon) = tokens.next_meaningful(variable) else {
                continue;
            };
            if tokens[semicolon].content() != ";" {
                continue;
            }

            let property_name = tokens[property].content().to_string();
            if let Some(assigned_variable) = properties.remove(&property_name) {
                variables.remove(&assigned_variable);
                continue;
            }
            let variable_name = tokens[variable].content().to_string();
            if variables.contains_key(&variable_name) {
                variables.remove(&variable_name);
                continue;
            }

            variables.insert(variable_name.clone(), variable);
            properties.insert(property_name, variable_name);
        }

        variables
    }

    pub fn constructor_index(&self) -> usize {
        self.constructor_index
    }

    /// Every declared parameter name, in signature order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Promotable parameters keyed by their variable token index.
    pub fn promotable_parameters(&self) -> &BTreeMap<usize, String> {
        &self.promotable_parameters
    }

    /// Eligible body assignments keyed by parameter name.
    pub fn promotable_assignments(&self) -> &HashMap<String, usize> {
        &self.promotable_assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use pretty_assertions::assert_eq;

    fn constructor(source: &str) -> (Tokens, ConstructorAnalysis) {
        let tokens = Tokens::from_source(source).unwrap();
        let class = tokens.find_kind(TokenKind::Class, 0).unwrap();
        let analysis = Analyzer::new(&tokens)
            .find_non_abstract_constructor(class)
            .unwrap()
            .unwrap();
        (tokens, analysis)
    }

    #[test]
    fn test_parameters_and_assignments() {
        let (tokens, analysis) = constructor(
            "<?php class Foo { private string $bar; public function __construct(string $bar, int $baz = 0) { $this->bar = $bar; } }",
        );

        assert_eq!(analysis.parameter_names(), &["$bar", "$baz"]);
        let promotable: Vec<_> = analysis.promotable_parameters().values().collect();
        assert_eq!(promotable, ["$bar"]);

        let assignment = analysis.promotable_assignments()["$bar"];
        assert_eq!(tokens[assignment].content(), "$bar");
    }

    #[test]
    fn test_by_reference_and_variadic_are_not_promotable() {
        let (_, analysis) = constructor(
            "<?php class Foo { public function __construct(string &$bar, int ...$baz) {} }",
        );
        assert!(analysis.promotable_parameters().is_empty());
        assert_eq!(analysis.parameter_names().len(), 2);
    }

    #[test]
    fn test_already_promoted_parameter_is_skipped() {
        let (_, analysis) = constructor(
            "<?php class Foo { public function __construct(private string $bar, string $baz) {} }",
        );
        let promotable: Vec<_> = analysis.promotable_parameters().values().collect();
        assert_eq!(promotable, ["$baz"]);
    }

    #[test]
    fn test_duplicate_assignment_is_dropped() {
        let (_, analysis) = constructor(
            "<?php class Foo { public function __construct(string $bar) { $this->bar = $bar; $this->bar = $bar; } }",
        );
        assert!(analysis.promotable_assignments().is_empty());
    }

    #[test]
    fn test_indirect_assignment_is_ignored() {
        let (_, analysis) = constructor(
            "<?php class Foo { public function __construct(string $bar) { $this->bar = trim($bar); } }",
        );
        assert!(analysis.promotable_assignments().is_empty());
    }
}
