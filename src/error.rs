use std::{fmt, io};

use crate::{
    lexer, parser,
    token::{Span, Spanned},
    transpiler::InternalError,
    types::TypeError,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("syntax error at {0}")]
    Lex(Spanned<lexer::Error>),

    #[error("syntax error at {0}")]
    Parse(Spanned<parser::Error>),

    #[error("type error{}: {source}", OptSpan(.span))]
    Type {
        source: TypeError,
        span: Option<Span>,
    },

    /// A front-end bug rather than a problem in the user's program.
    #[error("internal compiler error at {0}")]
    Internal(Spanned<InternalError>),

    #[error("failed to write output")]
    Write(#[from] fmt::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }

    /// The source location this error refers to, if any.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Error::Lex(Spanned { span, .. })
            | Error::Parse(Spanned { span, .. })
            | Error::Internal(Spanned { span, .. }) => Some(span),
            Error::Type { span, .. } => span.as_ref(),
            Error::Write(_) | Error::Io(_) => None,
        }
    }
}

impl From<Spanned<lexer::Error>> for Error {
    fn from(error: Spanned<lexer::Error>) -> Self {
        Error::Lex(error)
    }
}

impl From<Spanned<parser::Error>> for Error {
    fn from(error: Spanned<parser::Error>) -> Self {
        Error::Parse(error)
    }
}

impl From<TypeError> for Error {
    fn from(source: TypeError) -> Self {
        Error::Type { source, span: None }
    }
}

struct OptSpan<'a>(&'a Option<Span>);

impl fmt::Display for OptSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(span) => write!(f, " at {}", span.start),
            None => Ok(()),
        }
    }
}
