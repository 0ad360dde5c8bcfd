//! PHP lexer - tokenizes PHP source into a flat token sequence
//!
//! This is not a full PHP tokenizer; it covers what the fixers inspect.
//! Double-quoted strings and heredocs are lexed as single opaque string
//! tokens (interpolation is never examined), and `#[` attributes are lexed
//! as a single operator token.

use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Tokenize PHP source, including the transform pass that marks
/// return-type `:` and type-position `?` tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Lexer::new(source).run()?;
    transform(&mut tokens);
    Ok(tokens)
}

const OPERATORS_3: &[&str] = &[
    "===", "!==", "<=>", "**=", "...", "<<=", ">>=", "??=", "?->",
];

const OPERATORS_2: &[&str] = &[
    "==", "!=", "<>", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", ".=", "%=",
    "->", "=>", "::", "<<", ">>", "??", "**", "|=", "&=", "^=", "?:",
];

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    byte_pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            byte_pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        self.read_inline_html_and_open_tag();

        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => self.read_whitespace(),
                '/' if self.peek_at(1) == Some('/') => self.read_line_comment("//"),
                '/' if self.peek_at(1) == Some('*') => self.read_block_comment()?,
                '#' if self.peek_at(1) == Some('[') => {
                    self.advance();
                    self.advance();
                    self.push(TokenKind::Op, "#[");
                }
                '#' => self.read_line_comment("#"),
                '\'' | '"' | '`' => self.read_quoted_string(c)?,
                '$' => self.read_variable(),
                '\\' => {
                    self.advance();
                    self.push(TokenKind::NsSeparator, "\\");
                }
                '<' if self.matches("<<<") => self.read_heredoc()?,
                '?' if self.matches("?>") => {
                    self.advance();
                    self.advance();
                    self.push(TokenKind::CloseTag, "?>");
                    self.read_inline_html_and_open_tag();
                }
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.read_number(),
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(),
                _ => self.read_operator(),
            }
        }

        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if let Some(c) = c {
            self.pos += 1;
            self.byte_pos += c.len_utf8();
        }
        c
    }

    fn matches(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn push(&mut self, kind: TokenKind, content: impl Into<String>) {
        self.tokens.push(Token::new(kind, content));
    }

    /// Consume inline HTML up to the next `<?php`, then the opening tag
    /// itself. The tag absorbs at most one following space, tab or line
    /// break; any further whitespace becomes a whitespace token.
    fn read_inline_html_and_open_tag(&mut self) {
        let mut html = String::new();
        while self.peek().is_some() && !self.matches("<?php") {
            html.push(self.advance().unwrap_or_default());
        }
        if !html.is_empty() {
            self.push(TokenKind::InlineHtml, html);
        }
        if self.peek().is_none() {
            return;
        }

        let mut tag = String::new();
        for _ in 0.."<?php".len() {
            if let Some(c) = self.advance() {
                tag.push(c);
            }
        }
        match self.peek() {
            Some('\r') if self.peek_at(1) == Some('\n') => {
                tag.push(self.advance().unwrap_or_default());
                tag.push(self.advance().unwrap_or_default());
            }
            Some(c @ ('\n' | ' ' | '\t')) => {
                tag.push(c);
                self.advance();
            }
            _ => {}
        }
        self.push(TokenKind::OpenTag, tag);
    }

    fn read_whitespace(&mut self) {
        let mut content = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                content.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Whitespace, content);
    }

    /// Line comment, not including the trailing line break.
    fn read_line_comment(&mut self, opener: &str) {
        let mut content = String::new();
        for _ in 0..opener.len() {
            if let Some(c) = self.advance() {
                content.push(c);
            }
        }
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            if c == '?' && self.peek_at(1) == Some('>') {
                break;
            }
            content.push(c);
            self.advance();
        }
        self.push(TokenKind::Comment, content);
    }

    fn read_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.byte_pos;
        let mut content = String::new();
        self.advance();
        self.advance();
        content.push_str("/*");

        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedComment(start)),
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    content.push_str("*/");
                    break;
                }
                Some(c) => {
                    content.push(c);
                    self.advance();
                }
            }
        }

        let kind = if content.starts_with("/**") && content.len() > 4 {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.push(kind, content);
        Ok(())
    }

    fn read_quoted_string(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.byte_pos;
        let mut content = String::new();
        content.push(self.advance().unwrap_or_default());

        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString(start)),
                Some('\\') => {
                    content.push(self.advance().unwrap_or_default());
                    if let Some(escaped) = self.advance() {
                        content.push(escaped);
                    }
                }
                Some(c) => {
                    content.push(c);
                    self.advance();
                    if c == quote {
                        break;
                    }
                }
            }
        }

        self.push(TokenKind::StringLiteral, content);
        Ok(())
    }

    fn read_variable(&mut self) {
        if !self
            .peek_at(1)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
            self.push(TokenKind::Op, "$");
            return;
        }

        let mut content = String::new();
        content.push(self.advance().unwrap_or_default());
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                content.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Variable, content);
    }

    fn read_identifier(&mut self) {
        let mut content = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                content.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword_kind(&content).unwrap_or(TokenKind::Identifier);
        self.push(kind, content);
    }

    fn read_number(&mut self) {
        let mut content = String::new();
        let mut is_float = false;

        if self.peek() == Some('0')
            && self
                .peek_at(1)
                .is_some_and(|c| matches!(c, 'x' | 'X' | 'b' | 'B' | 'o' | 'O'))
        {
            content.push(self.advance().unwrap_or_default());
            content.push(self.advance().unwrap_or_default());
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    content.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            self.push(TokenKind::IntLiteral, content);
            return;
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                content.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            content.push(self.advance().unwrap_or_default());
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() || c == '_' {
                    content.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if self.peek().is_some_and(|c| matches!(c, 'e' | 'E')) {
            let sign_offset = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self
                .peek_at(1 + sign_offset)
                .is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                for _ in 0..=sign_offset {
                    content.push(self.advance().unwrap_or_default());
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() || c == '_' {
                        content.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        self.push(kind, content);
    }

    /// Heredoc or nowdoc, lexed to one opaque string token including the
    /// terminating label.
    fn read_heredoc(&mut self) -> Result<(), LexError> {
        let start = self.byte_pos;
        let mut content = String::new();
        for _ in 0..3 {
            content.push(self.advance().unwrap_or_default());
        }

        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => {
                content.push(q);
                self.advance();
                Some(q)
            }
            _ => None,
        };
        let mut label = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                label.push(c);
                content.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if let Some(q) = quote {
            if self.peek() == Some(q) {
                content.push(q);
                self.advance();
            }
        }

        loop {
            // consume to end of line
            loop {
                match self.peek() {
                    None => return Err(LexError::UnterminatedHeredoc(start)),
                    Some('\n') => {
                        content.push(self.advance().unwrap_or_default());
                        break;
                    }
                    Some(c) => {
                        content.push(c);
                        self.advance();
                    }
                }
            }

            // a line whose first non-whitespace run is the label ends the body
            let mut offset = 0;
            while self.peek_at(offset).is_some_and(|c| c == ' ' || c == '\t') {
                offset += 1;
            }
            let terminates = label
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_at(offset + i) == Some(c))
                && !self
                    .peek_at(offset + label.chars().count())
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
            if terminates {
                for _ in 0..offset + label.chars().count() {
                    content.push(self.advance().unwrap_or_default());
                }
                break;
            }
        }

        self.push(TokenKind::StringLiteral, content);
        Ok(())
    }

    fn read_operator(&mut self) {
        for op in OPERATORS_3 {
            if self.matches(op) {
                for _ in 0..3 {
                    self.advance();
                }
                self.push(TokenKind::Op, *op);
                return;
            }
        }
        for op in OPERATORS_2 {
            if self.matches(op) {
                for _ in 0..2 {
                    self.advance();
                }
                self.push(TokenKind::Op, *op);
                return;
            }
        }
        if let Some(c) = self.advance() {
            self.push(TokenKind::Op, c.to_string());
        }
    }
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word.to_ascii_lowercase().as_str() {
        "abstract" => TokenKind::Abstract,
        "case" => TokenKind::Case,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "declare" => TokenKind::Declare,
        "default" => TokenKind::Default,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "elseif" => TokenKind::ElseIf,
        "endswitch" => TokenKind::EndSwitch,
        "extends" => TokenKind::Extends,
        "final" => TokenKind::Final,
        "fn" => TokenKind::Fn,
        "for" => TokenKind::For,
        "foreach" => TokenKind::Foreach,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "implements" => TokenKind::Implements,
        "interface" => TokenKind::Interface,
        "namespace" => TokenKind::Namespace,
        "new" => TokenKind::New,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "public" => TokenKind::Public,
        "readonly" => TokenKind::Readonly,
        "return" => TokenKind::Return,
        "static" => TokenKind::Static,
        "switch" => TokenKind::Switch,
        "trait" => TokenKind::Trait,
        "use" => TokenKind::Use,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        "__dir__" => TokenKind::DirConstant,
        _ => return None,
    };
    Some(kind)
}

/// Reclassify context-dependent tokens: visibility keywords inside a
/// function signature become promoted-property modifiers, `:` introducing
/// a return type becomes a type colon, and `?` in type position becomes a
/// nullability marker.
fn transform(tokens: &mut [Token]) {
    promote_signature_visibility(tokens);
    for index in 0..tokens.len() {
        if tokens[index].equals(TokenKind::Op, ":") && is_return_type_colon(tokens, index) {
            tokens[index] = Token::new(TokenKind::TypeColon, ":");
        } else if tokens[index].equals(TokenKind::Op, "?") && is_nullable_type(tokens, index) {
            tokens[index] = Token::new(TokenKind::NullableType, "?");
        }
    }
}

fn promote_signature_visibility(tokens: &mut [Token]) {
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is_kind(TokenKind::Function) {
            i += 1;
            continue;
        }

        let open = (i + 1..tokens.len()).find(|&j| {
            matches!(tokens[j].content(), "(" | "{" | ";")
        });
        let Some(open) = open.filter(|&j| tokens[j].content() == "(") else {
            i += 1;
            continue;
        };

        let mut depth = 0;
        let mut close = open;
        while close < tokens.len() {
            match tokens[close].content() {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            close += 1;
        }

        for j in open..close {
            let mapped = match tokens[j].kind() {
                TokenKind::Public => Some(TokenKind::PromotedPublic),
                TokenKind::Protected => Some(TokenKind::PromotedProtected),
                TokenKind::Private => Some(TokenKind::PromotedPrivate),
                _ => None,
            };
            if let Some(kind) = mapped {
                let content = tokens[j].content().to_string();
                tokens[j] = Token::new(kind, content);
            }
        }
        i = open + 1;
    }
}

fn prev_meaningful(tokens: &[Token], index: usize) -> Option<usize> {
    (0..index).rev().find(|&i| tokens[i].is_meaningful())
}

fn next_meaningful(tokens: &[Token], index: usize) -> Option<usize> {
    (index + 1..tokens.len()).find(|&i| tokens[i].is_meaningful())
}

/// Backward scan to the `(` matching the `)` at `index`.
fn matching_open_paren(tokens: &[Token], index: usize) -> Option<usize> {
    let mut depth = 0;
    for i in (0..=index).rev() {
        match tokens[i].content() {
            ")" => depth += 1,
            "(" => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_return_type_colon(tokens: &[Token], index: usize) -> bool {
    let Some(close) = prev_meaningful(tokens, index) else {
        return false;
    };
    if tokens[close].content() != ")" {
        return false;
    }
    let Some(open) = matching_open_paren(tokens, close) else {
        return false;
    };
    let Some(mut before) = prev_meaningful(tokens, open) else {
        return false;
    };

    // `function (...) use (...) : type`
    if tokens[before].is_kind(TokenKind::Use) {
        let Some(use_close) = prev_meaningful(tokens, before) else {
            return false;
        };
        if tokens[use_close].content() != ")" {
            return false;
        }
        let Some(fn_open) = matching_open_paren(tokens, use_close) else {
            return false;
        };
        let Some(fn_before) = prev_meaningful(tokens, fn_open) else {
            return false;
        };
        before = fn_before;
    }

    match tokens[before].kind() {
        TokenKind::Function | TokenKind::Fn => true,
        TokenKind::Identifier => prev_meaningful(tokens, before)
            .is_some_and(|i| tokens[i].is_kind(TokenKind::Function)),
        _ => false,
    }
}

fn is_nullable_type(tokens: &[Token], index: usize) -> bool {
    let followed_by_type = next_meaningful(tokens, index).is_some_and(|i| {
        matches!(
            tokens[i].kind(),
            TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Static
        )
    });
    if !followed_by_type {
        return false;
    }

    let Some(prev) = prev_meaningful(tokens, index) else {
        return false;
    };
    match tokens[prev].kind() {
        TokenKind::TypeColon
        | TokenKind::Private
        | TokenKind::Protected
        | TokenKind::Public
        | TokenKind::PromotedPrivate
        | TokenKind::PromotedProtected
        | TokenKind::PromotedPublic
        | TokenKind::Var
        | TokenKind::Static
        | TokenKind::Readonly => true,
        TokenKind::Op => matches!(tokens[prev].content(), "(" | ","),
        _ => false,
    }
}
