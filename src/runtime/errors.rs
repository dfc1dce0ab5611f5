use std::fmt;
use std::error::Error;

use crate::utils;
use crate::debug::traceback::{TraceSite, Traceback};

mod errorkinds;


pub type ExecResult<T> = Result<T, Box<RuntimeError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUnaryOperand,
    InvalidBinaryOperands,
    OverflowError,
    DivideByZero,
    NameNotDefined,
    UndefinedProperty,
    InvalidPropertyAccess,
    NotCallable,
    ArityMismatch,
    StackOverflow,
    ExternalDispatch,
    VMBusy,
    InvalidValue,
    Unspecified,
}

#[derive(Debug)]
pub struct RuntimeError {
    kind: ErrorKind,
    message: String,
    traceback: Vec<TraceSite>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            kind,
            message: message.into(),
            traceback: Vec::new(),
        })
    }

    pub fn kind(&self) -> ErrorKind { self.kind }

    pub fn message(&self) -> &str { &self.message }

    /// Source line of the innermost frame, if the error was raised while running bytecode.
    pub fn line(&self) -> Option<usize> {
        self.traceback.first().map(|site| site.line())
    }

    // sites are pushed innermost first as the error unwinds
    pub fn push_trace(mut self: Box<Self>, site: TraceSite) -> Box<Self> {
        self.traceback.push(site); self
    }

    pub fn traceback(&self) -> Traceback<'_> {
        Traceback::new(&self.traceback)
    }
}

impl Error for RuntimeError { }

impl fmt::Display for RuntimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::format_error(fmt, "runtime error", Some(&self.message), None)
    }
}
