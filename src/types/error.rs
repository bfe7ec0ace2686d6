//! These are types that are used to represent errors at different stages of the program

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type OryxResult<T> = Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
/// Union of all the errors the reader and evaluator can produce.
///
/// Errors are cloned when a cached result (memoized binding, awaited future) is handed out again,
/// so every variant only holds owned, rendered text.
pub enum Error {
    /// Source text could not be read into a value
    #[error("syntax error: {message}")]
    #[diagnostic(code(oryx::syntax))]
    Syntax {
        message: String,
        #[source_code]
        input: String,
        #[label("here")]
        span: SourceSpan,
    },

    /// Symbol is not bound in the scope or any of its ancestors
    #[error("{symbol}: not found")]
    #[diagnostic(code(oryx::not_found), help("bind it first with (def! name value)"))]
    NotFound { symbol: String },

    /// Form called with the wrong number of arguments
    #[error("{form}: wanted {wanted} arg(s), got {got}")]
    #[diagnostic(code(oryx::arity))]
    Arity {
        form: String,
        wanted: usize,
        got: usize,
    },

    /// Form called with fewer arguments than it needs
    #[error("{form}: wanted at least {wanted} arg(s), got {got}")]
    #[diagnostic(code(oryx::arity))]
    MinArity {
        form: String,
        wanted: usize,
        got: usize,
    },

    /// Argument of the wrong kind
    #[error("{form}: {reason}")]
    #[diagnostic(code(oryx::type_mismatch))]
    Type { form: String, reason: String },

    #[error("{form}: division by zero")]
    #[diagnostic(code(oryx::division_by_zero))]
    DivisionByZero { form: String },

    /// Asked for the last value of a program that produced none
    #[error("empty sequence")]
    #[diagnostic(code(oryx::empty_sequence))]
    EmptySequence,

    /// Deferred binding forced again while it was being forced
    #[error("{symbol}: defined in terms of itself")]
    #[diagnostic(code(oryx::cycle))]
    Cycle { symbol: String },

    /// Definition forced after the scope it was made in was dropped
    #[error("{symbol}: defining scope no longer exists")]
    #[diagnostic(code(oryx::scope_dropped))]
    ScopeDropped { symbol: String },

    /// Spawned computation could not start or never delivered a result
    #[error("spawned computation failed: {reason}")]
    #[diagnostic(code(oryx::spawn))]
    Spawn { reason: String },

    #[error("{path}: {reason}")]
    #[diagnostic(code(oryx::io))]
    Io { path: String, reason: String },

    /// Error annotated with the head of the form that was being forced
    #[error("{form}: {inner}")]
    #[diagnostic(code(oryx::trace))]
    Traced { form: String, inner: Box<Error> },
}

impl Error {
    /// Build a syntax error pointing at `len` bytes from `offset` in `input`
    pub fn syntax(message: impl Into<String>, input: &str, offset: usize, len: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            input: input.to_owned(),
            span: (offset, len).into(),
        }
    }

    /// The innermost error, looking through any trace annotations
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Traced { inner, .. } = err {
            err = inner;
        }
        err
    }
}
