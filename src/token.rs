use std::{fmt, sync::Arc};

/// The normalized text of a compilation unit, together with its advisory path.
#[derive(PartialEq, Eq)]
pub struct Source {
    pub text: Box<str>,
    pub path: Box<str>,
}

impl Source {
    /// Creates a new source, normalizing `\r\n` and `\r` line breaks to `\n`.
    pub fn new(text: &str, path: &str) -> Arc<Source> {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        Arc::new(Source {
            text: text.into_boxed_str(),
            path: Box::from(path),
        })
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({:?}, len: {})", self.path, self.text.len())
    }
}

/// A location in the source text.
///
/// `line` and `column` are zero-based; `index` is the byte offset into the
/// normalized text.
#[derive(Clone, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
    pub index: usize,
    pub source: Arc<Source>,
}

impl Pos {
    /// The first position of the given source.
    pub fn new(source: Arc<Source>) -> Pos {
        Pos {
            line: 0,
            column: 0,
            index: 0,
            source,
        }
    }

    pub fn path(&self) -> &str {
        &self.source.path
    }

    /// Returns a span that starts and ends at this position.
    pub fn to_empty_span(&self) -> Span {
        Span {
            start: self.clone(),
            end: self.clone(),
        }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{} @ {})", self.line, self.column, self.index)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        let line = self.line + 1;
        let column = self.column + 1;
        write!(f, "{path}:{line}:{column}")
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Span {
        debug_assert!(end.index >= start.index);
        Span { start, end }
    }

    /// Returns a new span from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }

    /// Returns the text covered by this span.
    pub fn substr(&self) -> &str {
        &self.start.source.text[self.start.index..self.end.index]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self})")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.start.index;
        let hi = self.end.index;
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span.start, self.inner)
    }
}

impl<T: std::error::Error> std::error::Error for Spanned<T> {}

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<TokenValue>,
    pub start: Pos,
    pub end: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, value: Option<TokenValue>, span: Span) -> Token {
        Token {
            kind,
            value,
            start: span.start,
            end: span.end,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start.clone(), self.end.clone())
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.value == Some(TokenValue::Keyword(keyword))
    }

    pub fn is_eof(&self) -> bool {
        self.is(TokenKind::Eof)
    }

    /// Compares two tokens by kind. Values are only compared if both tokens
    /// carry one.
    pub fn matches(&self, other: &Token) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => self.kind == other.kind && a == b,
            _ => self.kind == other.kind,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "Token({:?}, {value}, {})", self.kind, self.span()),
            None => write!(f, "Token({:?}, {})", self.kind, self.span()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Plus,
    Star,
    Int,
    Keyword,
    Identifier,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Equals,
}

impl TokenKind {
    /// Returns the source spelling of single character tokens.
    pub const fn symbol(self) -> Option<char> {
        let c = match self {
            TokenKind::Plus => '+',
            TokenKind::Star => '*',
            TokenKind::LParen => '(',
            TokenKind::RParen => ')',
            TokenKind::LBracket => '[',
            TokenKind::RBracket => ']',
            TokenKind::LBrace => '{',
            TokenKind::RBrace => '}',
            TokenKind::Semicolon => ';',
            TokenKind::Equals => '=',
            _ => return None,
        };
        Some(c)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(c) => write!(f, "'{c}'"),
            None => match self {
                TokenKind::Eof => f.write_str("end of input"),
                TokenKind::Int => f.write_str("an integer"),
                TokenKind::Keyword => f.write_str("a keyword"),
                TokenKind::Identifier => f.write_str("an identifier"),
                _ => unreachable!("symbol token"),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenValue {
    Int(i64),
    Keyword(Keyword),
    Ident(Box<str>),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Int(value) => write!(f, "{value}"),
            TokenValue::Keyword(keyword) => f.write_str(keyword.as_str()),
            TokenValue::Ident(name) => f.write_str(name),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    I32,
    Fn,
    Var,
}

impl Keyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::I32 => "i32",
            Keyword::Fn => "fn",
            Keyword::Var => "var",
        }
    }
}

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
    "i32" => Keyword::I32,
    "fn" => Keyword::Fn,
    "var" => Keyword::Var,
};

pub static SYMBOLS: phf::Map<char, TokenKind> = phf::phf_map! {
    '+' => TokenKind::Plus,
    '*' => TokenKind::Star,
    '(' => TokenKind::LParen,
    ')' => TokenKind::RParen,
    '[' => TokenKind::LBracket,
    ']' => TokenKind::RBracket,
    '{' => TokenKind::LBrace,
    '}' => TokenKind::RBrace,
    ';' => TokenKind::Semicolon,
    '=' => TokenKind::Equals,
};
