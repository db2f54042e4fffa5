//! Lexer adapter
//!
//! Turns raw source text into the token stream the similarity models consume:
//! only names, keywords and operators survive, each rendered as
//! `<Category>:<lexeme>` and joined with single spaces in source order.
//!
//! ```text
//! public int x;   ->   Keyword:public Keyword:int Name:x
//! ```

mod java;

pub use java::{JavaLexer, Lexemes};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse token categories kept in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    Name,
    Keyword,
    Operator,
}

impl TokenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Name => "Name",
            TokenCategory::Keyword => "Keyword",
            TokenCategory::Operator => "Operator",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained token type produced by the lexer.
///
/// Subtypes collapse into their top-level [`TokenCategory`]; a class name is
/// still a `Name`, a primitive type is still a `Keyword`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordNamespace,
    KeywordType,
    Name,
    NameAttribute,
    NameClass,
    NameDecorator,
    NameFunction,
    NameLabel,
    NameNamespace,
    Operator,
    Punctuation,
    StringLiteral,
    CharLiteral,
    NumberBin,
    NumberFloat,
    NumberHex,
    NumberInteger,
    NumberOct,
    CommentSingle,
    CommentMultiline,
    Whitespace,
    Text,
    Error,
}

impl TokenKind {
    /// Top-level category, or `None` for token types that are filtered out
    pub fn category(self) -> Option<TokenCategory> {
        use TokenKind::*;
        match self {
            Keyword | KeywordConstant | KeywordDeclaration | KeywordNamespace | KeywordType => {
                Some(TokenCategory::Keyword)
            }
            Name | NameAttribute | NameClass | NameDecorator | NameFunction | NameLabel
            | NameNamespace => Some(TokenCategory::Name),
            Operator => Some(TokenCategory::Operator),
            _ => None,
        }
    }
}

/// How the category prefix of each stream token is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// `Name:foo`, `Keyword:class`, `Operator:=`
    #[default]
    Category,
    /// `_TokenType:foo` for every token. Older vectorizers were fitted on
    /// streams labelled this way.
    Legacy,
}

impl LabelStyle {
    fn label(self, category: TokenCategory) -> &'static str {
        match self {
            LabelStyle::Category => category.as_str(),
            LabelStyle::Legacy => "_TokenType",
        }
    }
}

impl FromStr for LabelStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" => Ok(LabelStyle::Category),
            "legacy" => Ok(LabelStyle::Legacy),
            _ => anyhow::bail!("Unknown label style '{}'. Valid styles: category, legacy", s),
        }
    }
}

/// One surviving token: coarse category plus trimmed lexeme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub category: TokenCategory,
    pub text: String,
}

/// Rendered token stream for one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    text: String,
    count: usize,
}

impl TokenStream {
    pub fn render(tokens: &[TokenDescriptor], style: LabelStyle) -> Self {
        let rendered: Vec<String> = tokens
            .iter()
            .map(|t| format!("{}:{}", style.label(t.category), t.text))
            .collect();
        Self {
            text: rendered.join(" "),
            count: tokens.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of tokens in the stream. A lexeme may hold inner whitespace
    /// (`import   static`), so this is not the number of spaces plus one.
    pub fn len(&self) -> usize {
        self.count
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Maps source text to a token stream
pub trait Tokenizer {
    /// Filtered, trimmed tokens in source order
    fn descriptors(&self, source: &str) -> Vec<TokenDescriptor>;

    fn label_style(&self) -> LabelStyle {
        LabelStyle::Category
    }

    fn extract(&self, source: &str) -> TokenStream {
        TokenStream::render(&self.descriptors(source), self.label_style())
    }
}

/// Normalize line endings and guarantee a trailing newline.
///
/// Leading and trailing blank lines are dropped first, so `\n\nfoo` and
/// `foo` lex identically.
pub fn normalize_source(source: &str) -> String {
    let mut text = source.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = text.trim_matches('\n');
    if trimmed.len() != text.len() {
        text = trimmed.to_string();
    }
    text.push('\n');
    text
}

/// [`Tokenizer`] for Java sources
#[derive(Debug, Clone, Default)]
pub struct JavaTokenizer {
    lexer: JavaLexer,
    labels: LabelStyle,
}

impl JavaTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label_style(mut self, labels: LabelStyle) -> Self {
        self.labels = labels;
        self
    }
}

impl Tokenizer for JavaTokenizer {
    fn descriptors(&self, source: &str) -> Vec<TokenDescriptor> {
        let text = normalize_source(source);
        self.lexer
            .tokens(&text)
            .filter_map(|(kind, lexeme)| {
                let category = kind.category()?;
                let trimmed = lexeme.trim();
                if trimmed.is_empty() {
                    return None;
                }
                Some(TokenDescriptor {
                    category,
                    text: trimmed.to_string(),
                })
            })
            .collect()
    }

    fn label_style(&self) -> LabelStyle {
        self.labels
    }
}
