use std::{fmt, rc::Rc};

use crate::{token::Token, value::Value};

/// A runtime fault carrying the offending token's position and a message.
///
/// Runtime errors unwind to the top of the current evaluation; they are never
/// caught by user code.
#[derive(Debug, Clone)]
pub(crate) struct RuntimeError {
    pub line: u32,
    pub lexeme: Rc<str>,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        Self {
            line: token.line,
            lexeme: Rc::clone(&token.lexeme),
            message: message.into(),
        }
    }

    /// An error with no source position; used when an unwind escapes its
    /// intended catcher, which indicates an interpreter bug rather than a
    /// fault in user code.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            line: 0,
            lexeme: Rc::from(""),
            message: message.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("[line {}] Error at '{}' : {}", self.line, self.lexeme, self.message)
    }
}

/// Non-local control transfer during evaluation.
///
/// The three channels are distinct by construction: `Break` is caught by the
/// nearest enclosing `while`, `Return` by the invoked function, and `Error`
/// unwinds to the top level. `Break`/`Return` must never reach the top level;
/// if one does it is converted to an internal `RuntimeError`.
#[derive(Debug)]
pub(crate) enum Unwind {
    Break,
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Self::Error(error)
    }
}

/// Result type alias threaded through statement execution and expression
/// evaluation.
pub(crate) type RunResult<T> = Result<T, Unwind>;

/// Recovery token thrown by the parser on a syntax error.
///
/// Carries no payload; the error itself has already been reported to the
/// diagnostics sink. The declaration loop catches it and synchronizes to the
/// next statement boundary.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParseError;

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Error returned from a failed run, with diagnostics already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoxError {
    /// One or more lexical, syntactic, or semantic errors; evaluation was
    /// skipped.
    Static(Vec<String>),
    /// A runtime error stopped the evaluation.
    Runtime(String),
}

impl LoxError {
    /// The conventional process exit code for this failure class.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Static(_) => 65,
            Self::Runtime(_) => 70,
        }
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(messages) => {
                let mut first = true;
                for message in messages {
                    if !first {
                        writeln!(f)?;
                    }
                    first = false;
                    write!(f, "{message}")?;
                }
                Ok(())
            }
            Self::Runtime(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for LoxError {}
