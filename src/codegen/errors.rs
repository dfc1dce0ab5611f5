use std::fmt;
use std::error::Error;

use crate::utils;
use crate::diagnostics::Diagnostic;


pub type ErrorKind = CompileErrorKind;
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CompileErrorKind {
    LexerError(String),  // message carried by an error token
    Expected(&'static str),
    ExpectedExpression,
    InvalidAssignmentTarget,
    InvalidNumber,

    LocalRedeclared,
    LocalOwnInitializer,

    TooManyParams,
    TooManyArgs,
    TooManyLocals,
    ConstPoolLimit,
    JumpTooLarge,
    LoopTooLarge,

    ThisOutsideClass,
    SuperWithoutSuperclass,
    ReturnFromTopLevel,
    ReturnValueFromInit,
}

/// Where in the token stream an error was found
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    At(String),
    End,
    Unknown,  // error tokens, whose lexeme is the message
}

#[derive(Debug, Clone)]
pub struct CompileError {
    kind: ErrorKind,
    line: usize,
    location: Location,
}

impl CompileError {
    pub fn new(kind: ErrorKind, line: usize, location: Location) -> Self {
        Self { kind, line, location }
    }

    pub fn kind(&self) -> &ErrorKind { &self.kind }
    pub fn line(&self) -> usize { self.line }
    pub fn location(&self) -> &Location { &self.location }

    pub fn message(&self) -> String {
        let message = match self.kind() {
            ErrorKind::LexerError(message) => return message.clone(),
            ErrorKind::Expected(message) => message,
            ErrorKind::ExpectedExpression => "Expect expression.",
            ErrorKind::InvalidAssignmentTarget => "Invalid assignment target.",
            ErrorKind::InvalidNumber => "Invalid number literal.",

            ErrorKind::LocalRedeclared => "Already a variable with this name in this scope.",
            ErrorKind::LocalOwnInitializer => "Can't read local variable in its own initializer.",

            ErrorKind::TooManyParams => "Can't have more than 255 parameters.",
            ErrorKind::TooManyArgs => "Can't have more than 255 arguments.",
            ErrorKind::TooManyLocals => "Too many local variables in function.",
            ErrorKind::ConstPoolLimit => "Too many constants in one chunk.",
            ErrorKind::JumpTooLarge => "Too much code to jump over.",
            ErrorKind::LoopTooLarge => "Loop body too large.",

            ErrorKind::ThisOutsideClass => "Can't use 'this' outside of a class.",
            ErrorKind::SuperWithoutSuperclass => "Can't use 'super' in a class with no superclass.",
            ErrorKind::ReturnFromTopLevel => "Can't return from top-level code.",
            ErrorKind::ReturnValueFromInit => "Can't return a value from an initializer.",
        };
        message.to_string()
    }
}

impl Error for CompileError { }

// "at 'x': Expect expression."
impl fmt::Display for CompileError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        match &self.location {
            Location::At(lexeme) => utils::format_error(fmt, &format!("at '{}'", lexeme), Some(&message), None),
            Location::End => utils::format_error(fmt, "at end", Some(&message), None),
            Location::Unknown => fmt.write_str(&message),
        }
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(error: &CompileError) -> Self {
        Diagnostic::error(error.line(), error.to_string())
    }
}
