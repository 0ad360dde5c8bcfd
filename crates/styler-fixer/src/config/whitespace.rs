//! Whitespace configuration types

use serde::{Deserialize, Serialize};

/// Indentation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    /// Use spaces for indentation
    Spaces(usize),
    /// Use tabs for indentation
    Tabs,
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(4)
    }
}

impl IndentStyle {
    /// Get the indentation string for one level
    pub fn as_string(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }

    /// Parse from a literal indent string, e.g. "    " or "\t"
    pub fn from_literal(s: &str) -> Self {
        if s.contains('\t') {
            IndentStyle::Tabs
        } else {
            let spaces = s.chars().filter(|c| *c == ' ').count();
            IndentStyle::Spaces(if spaces > 0 { spaces } else { 4 })
        }
    }
}

/// Line ending style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnding {
    /// Unix-style line endings (LF)
    Lf,
    /// Windows-style line endings (CRLF)
    CrLf,
}

impl Default for LineEnding {
    fn default() -> Self {
        LineEnding::Lf
    }
}

impl LineEnding {
    /// Get the line ending string
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Combined whitespace configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhitespaceConfig {
    pub indent: IndentStyle,
    pub line_ending: LineEnding,
}

impl WhitespaceConfig {
    pub fn new(indent: IndentStyle, line_ending: LineEnding) -> Self {
        Self { indent, line_ending }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_style_from_literal() {
        assert_eq!(IndentStyle::from_literal("    "), IndentStyle::Spaces(4));
        assert_eq!(IndentStyle::from_literal("  "), IndentStyle::Spaces(2));
        assert_eq!(IndentStyle::from_literal("\t"), IndentStyle::Tabs);
    }

    #[test]
    fn test_indent_as_string() {
        assert_eq!(IndentStyle::Spaces(4).as_string(), "    ");
        assert_eq!(IndentStyle::Spaces(2).as_string(), "  ");
        assert_eq!(IndentStyle::Tabs.as_string(), "\t");
    }
}
