//! Fixer registry
//!
//! Collects the available fixers, exposes them under their qualified
//! `styler/<name>` names and runs them in priority order.

use std::collections::HashMap;
use std::sync::Arc;

use styler_core::Tokens;

use super::declare_after_opening_tag::DeclareAfterOpeningTagFixer;
use super::doctrine_migrations::DoctrineMigrationsFixer;
use super::line_break_between_method_arguments::LineBreakBetweenMethodArgumentsFixer;
use super::line_break_between_statements::LineBreakBetweenStatementsFixer;
use super::no_useless_dirname_call::NoUselessDirnameCallFixer;
use super::no_useless_strlen::NoUselessStrlenFixer;
use super::promoted_constructor_property::PromotedConstructorPropertyFixer;
use super::{Fixer, FixerError};
use crate::config::FixerConfig;

/// Name prefix shared by every registered fixer.
pub const PREFIX: &str = "styler";

/// Information about a registered fixer
#[derive(Clone)]
pub struct FixerInfo {
    pub name: &'static str,
    pub qualified_name: String,
    pub description: &'static str,
    pub sample: &'static str,
    pub priority: i32,
    pub is_risky: bool,
}

/// Registry of all available fixers
pub struct FixerRegistry {
    fixers: Vec<Arc<dyn Fixer>>,
    by_name: HashMap<String, usize>,
}

impl FixerRegistry {
    /// Create a registry with all built-in fixers, sorted by priority.
    pub fn new() -> Self {
        let mut registry = Self {
            fixers: Vec::new(),
            by_name: HashMap::new(),
        };

        registry.register(Arc::new(DeclareAfterOpeningTagFixer));
        registry.register(Arc::new(DoctrineMigrationsFixer));
        registry.register(Arc::new(LineBreakBetweenMethodArgumentsFixer));
        registry.register(Arc::new(LineBreakBetweenStatementsFixer));
        registry.register(Arc::new(NoUselessDirnameCallFixer));
        registry.register(Arc::new(NoUselessStrlenFixer));
        registry.register(Arc::new(PromotedConstructorPropertyFixer));

        // higher priority runs first
        registry
            .fixers
            .sort_by(|a, b| b.priority().cmp(&a.priority()));

        registry.by_name.clear();
        for (idx, fixer) in registry.fixers.iter().enumerate() {
            registry
                .by_name
                .insert(Self::qualified_name(fixer.name()), idx);
        }

        registry
    }

    /// Qualified registry name for a fixer: `styler/<name>`.
    pub fn qualified_name(name: &str) -> String {
        format!("{PREFIX}/{name}")
    }

    fn register(&mut self, fixer: Arc<dyn Fixer>) {
        let idx = self.fixers.len();
        self.by_name.insert(Self::qualified_name(fixer.name()), idx);
        self.fixers.push(fixer);
    }

    /// Look up a fixer by qualified (`styler/foo`) or bare (`foo`) name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Fixer>> {
        let idx = self
            .by_name
            .get(name)
            .or_else(|| self.by_name.get(&Self::qualified_name(name)))?;
        Some(&self.fixers[*idx])
    }

    /// All fixers in priority order.
    pub fn all(&self) -> &[Arc<dyn Fixer>] {
        &self.fixers
    }

    /// Information about all fixers, in priority order.
    pub fn list(&self) -> Vec<FixerInfo> {
        self.fixers
            .iter()
            .map(|f| FixerInfo {
                name: f.name(),
                qualified_name: Self::qualified_name(f.name()),
                description: f.documentation(),
                sample: f.sample_code(),
                priority: f.priority(),
                is_risky: f.is_risky(),
            })
            .collect()
    }

    /// Run every registered fixer over the tokens, in priority order.
    /// Risky fixers are skipped unless `include_risky` is set.
    pub fn fix_all(
        &self,
        tokens: &mut Tokens,
        config: &FixerConfig,
        include_risky: bool,
    ) -> Result<(), FixerError> {
        for fixer in &self.fixers {
            if fixer.is_risky() && !include_risky {
                continue;
            }
            fixer.fix(tokens, config)?;
        }
        Ok(())
    }
}

impl Default for FixerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fixers_are_registered() {
        let registry = FixerRegistry::new();
        assert_eq!(registry.all().len(), 7);
    }

    #[test]
    fn test_lookup_by_qualified_and_bare_name() {
        let registry = FixerRegistry::new();
        assert!(registry.get("styler/no_useless_strlen").is_some());
        assert!(registry.get("no_useless_strlen").is_some());
        assert!(registry.get("styler/unknown").is_none());
    }

    #[test]
    fn test_fixers_are_sorted_by_priority() {
        let registry = FixerRegistry::new();
        let priorities: Vec<i32> = registry.all().iter().map(|f| f.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_only_strlen_fixer_is_risky() {
        let registry = FixerRegistry::new();
        let risky: Vec<&str> = registry
            .list()
            .iter()
            .filter(|info| info.is_risky)
            .map(|info| info.name)
            .collect::<Vec<_>>();
        assert_eq!(risky, ["no_useless_strlen"]);
    }

    #[test]
    fn test_every_sample_is_rewritten_by_its_fixer() {
        let registry = FixerRegistry::new();
        let config = crate::config::FixerConfig::default();
        for fixer in registry.all() {
            let sample = fixer.sample_code();
            let mut tokens = Tokens::from_source(sample).unwrap();
            fixer.fix(&mut tokens, &config).unwrap();
            assert_ne!(
                tokens.generate_code(),
                sample,
                "sample of {} was left untouched",
                fixer.name()
            );
        }
    }

    #[test]
    fn test_list_carries_documentation_and_sample() {
        let registry = FixerRegistry::new();
        for info in registry.list() {
            assert!(!info.description.is_empty(), "{}", info.name);
            assert!(info.sample.starts_with("<?php"), "{}", info.name);
        }
    }

    #[test]
    fn test_fix_all_skips_risky_by_default() {
        let registry = FixerRegistry::new();
        let source = "<?php\n$isEmpty = strlen($value) === 0;\n";
        let mut tokens = Tokens::from_source(source).unwrap();
        registry
            .fix_all(&mut tokens, &crate::config::FixerConfig::default(), false)
            .unwrap();
        assert_eq!(tokens.generate_code(), source);

        let mut tokens = Tokens::from_source(source).unwrap();
        registry
            .fix_all(&mut tokens, &crate::config::FixerConfig::default(), true)
            .unwrap();
        assert_eq!(tokens.generate_code(), "<?php\n$isEmpty = $value === '';\n");
    }
}
