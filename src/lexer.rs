use std::{iter::Peekable, sync::Arc};

use tracing::trace;

use crate::token::{
    Keyword, Pos, Source, Span, Spanned, Token, TokenKind, TokenValue, KEYWORDS, SYMBOLS,
};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Lexes the provided text, returning every token up to (and including) the
/// end-of-input token.
///
/// `path` is only used in diagnostics.
pub fn lex(src: &str, path: &str) -> Result<Vec<Token>> {
    lex_source(&Source::new(src, path))
}

/// Lexes an already normalized [`Source`].
pub fn lex_source(source: &Arc<Source>) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    Lexer::new(source, &mut tokens).lex()?;
    trace!(path = %source.path, count = tokens.len(), "lexed");
    Ok(tokens)
}

/// The nc lexer
struct Lexer<'src, 'tok> {
    source: &'src Arc<Source>,
    iter: Peekable<std::str::Chars<'src>>,
    line: u32,
    column: u32,
    cursor: usize,
    mark: Pos,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    ///
    /// Tokens are written into the provided tokens buffer.
    fn lex(mut self) -> Result<()> {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            let (kind, value) = self.scan_token()?;
            self.produce(kind, value);
            if kind == TokenKind::Eof {
                return Ok(());
            }
        }
    }

    /// Skips any whitespace and scans the next token.
    fn scan_token(&mut self) -> Result<(TokenKind, Option<TokenValue>)> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
        self.mark();
        let Some(c) = self.peek() else {
            return Ok((TokenKind::Eof, None));
        };
        match c {
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() => Ok(self.identifier_or_keyword()),
            c => {
                self.advance();
                match SYMBOLS.get(&c) {
                    Some(&kind) => Ok((kind, None)),
                    None => Err(self.span().wrap(Error::UnexpectedChar(c))),
                }
            }
        }
    }

    fn number(&mut self) -> Result<(TokenKind, Option<TokenValue>)> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        match self.substr().parse() {
            Ok(value) => Ok((TokenKind::Int, Some(TokenValue::Int(value)))),
            Err(_) => Err(self.span().wrap(Error::IntOutOfRange)),
        }
    }

    fn identifier_or_keyword(&mut self) -> (TokenKind, Option<TokenValue>) {
        let valid_identifier_suffix = |c: char| c.is_alphanumeric() || c == '_';

        while self.peek().is_some_and(valid_identifier_suffix) {
            self.advance();
        }
        let substr = self.substr();
        match KEYWORDS.get(substr).copied() {
            Some(keyword) => keyword_token(keyword),
            None => (
                TokenKind::Identifier,
                Some(TokenValue::Ident(Box::from(substr))),
            ),
        }
    }
}

fn keyword_token(keyword: Keyword) -> (TokenKind, Option<TokenValue>) {
    (TokenKind::Keyword, Some(TokenValue::Keyword(keyword)))
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(
        source: &'src Arc<Source>,
        tokens: &'tok mut Vec<Token>,
    ) -> Lexer<'src, 'tok> {
        Lexer {
            source,
            iter: source.text.chars().peekable(),
            line: 0,
            column: 0,
            cursor: 0,
            mark: Pos::new(Arc::clone(source)),
            tokens,
        }
    }

    /// Returns the current position.
    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
            index: self.cursor,
            source: Arc::clone(self.source),
        }
    }

    /// Starts a new token "mark" at the current position.
    fn mark(&mut self) {
        self.mark = self.pos();
    }

    /// Returns the next character and advances the iterator, keeping track of
    /// lines and columns.
    fn advance(&mut self) -> Option<char> {
        let c = self.iter.next()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> Option<char> {
        self.iter.peek().copied()
    }

    /// Returns the span from the mark to the current position.
    fn span(&self) -> Span {
        Span::new(self.mark.clone(), self.pos())
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        &self.source.text[self.mark.index..self.cursor]
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind, value: Option<TokenValue>) {
        let token = Token::new(kind, value, self.span());
        self.tokens.push(token);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("integer literal out of range")]
    IntOutOfRange,
}
