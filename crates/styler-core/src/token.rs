//! Token and token-kind definitions

/// Lexical category of a token
///
/// A fixed, closed set covering exactly what the fixers inspect. Operators
/// and punctuation share the [`TokenKind::Op`] kind; their content carries
/// the distinguishing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<?php` plus at most one trailing space or line break.
    OpenTag,
    /// `?>`.
    CloseTag,
    /// Text outside PHP tags.
    InlineHtml,
    /// A whitespace run; may contain embedded line breaks.
    Whitespace,
    /// `//`, `#` or `/* ... */` comment.
    Comment,
    /// `/** ... */` documentation comment.
    DocComment,
    /// `$name`, including `$this`.
    Variable,
    /// Unqualified name: function, class, constant, type.
    Identifier,
    /// Single- or double-quoted string, heredoc or nowdoc.
    StringLiteral,
    IntLiteral,
    FloatLiteral,
    /// `\` between name parts.
    NsSeparator,

    Abstract,
    Case,
    Class,
    Const,
    Declare,
    Default,
    Do,
    Else,
    ElseIf,
    EndSwitch,
    Extends,
    Final,
    Fn,
    For,
    Foreach,
    Function,
    If,
    Implements,
    Interface,
    Namespace,
    New,
    Private,
    Protected,
    Public,
    Readonly,
    Return,
    Static,
    Switch,
    Trait,
    Use,
    Var,
    While,

    /// The `__DIR__` magic constant.
    DirConstant,
    /// `?` in type position (parameter, property or return type).
    NullableType,
    /// The `:` introducing a return type.
    TypeColon,
    /// Visibility modifiers declaring a promoted constructor property.
    PromotedPublic,
    PromotedProtected,
    PromotedPrivate,
    /// Any other operator or punctuation; content carries the text.
    Op,
    /// A cleared slot. Keeps subsequent indices stable until
    /// [`Tokens::clear_empty_tokens`](crate::Tokens::clear_empty_tokens).
    Cleared,
}

impl TokenKind {
    /// Whether this kind is whitespace or a comment.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }
}

/// Smallest lexical unit: a kind plus the literal source text it represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    content: String,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// A whitespace token with the given content.
    pub fn whitespace(content: impl Into<String>) -> Self {
        Self::new(TokenKind::Whitespace, content)
    }

    /// The empty placeholder left behind by clearing.
    pub fn cleared() -> Self {
        Self::new(TokenKind::Cleared, "")
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_any_kind(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Kind and content match exactly.
    pub fn equals(&self, kind: TokenKind, content: &str) -> bool {
        self.kind == kind && self.content == content
    }

    /// Kind matches and content matches ASCII case-insensitively.
    pub fn equals_ignore_case(&self, kind: TokenKind, content: &str) -> bool {
        self.kind == kind && self.content.eq_ignore_ascii_case(content)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace && !self.content.is_empty()
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::DocComment)
    }

    /// Not whitespace, not a comment, not a cleared slot.
    pub fn is_meaningful(&self) -> bool {
        !self.is_empty() && !self.kind.is_trivia()
    }

    pub fn contains_line_break(&self) -> bool {
        self.content.contains('\n') || self.content.contains('\r')
    }
}
