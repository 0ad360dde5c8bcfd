//! Fixer configuration

mod whitespace;

pub use whitespace::{IndentStyle, LineEnding, WhitespaceConfig};

/// Configuration passed to fixers
#[derive(Debug, Clone)]
pub struct FixerConfig {
    /// Indentation style
    pub indent: IndentStyle,
    /// Line ending style
    pub line_ending: LineEnding,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            indent: IndentStyle::default(),
            line_ending: LineEnding::default(),
        }
    }
}

impl From<&WhitespaceConfig> for FixerConfig {
    fn from(ws: &WhitespaceConfig) -> Self {
        Self {
            indent: ws.indent,
            line_ending: ws.line_ending,
        }
    }
}
