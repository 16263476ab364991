//! Runtime error types for the calculator
//!
//! This module defines [`RuntimeError`], which covers tokenizing, evaluation
//! and execution failures plus the fatal integer-engine errors that pass
//! through them.
//!
//! Parse, eval and exec errors are recoverable at statement granularity: the
//! REPL reports them and keeps going. [`RuntimeError::Number`] wraps a fatal
//! [`BigIntError`] and ends the process. [`RuntimeError::InteractiveQuit`] is
//! a control signal, not a failure.

use crate::bigint::BigIntError;
use crate::memory::value::OperandKind;
use std::fmt;

/// What kind of name failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Variable,
    Function,
    Loop,
    Operation,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Variable => "variable",
            ReferenceKind::Function => "function",
            ReferenceKind::Loop => "loop",
            ReferenceKind::Operation => "operation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Token that is neither an operator, a sigil form nor a numeral
    Parse { token: String, message: String },

    /// Variable, function or loop name with no binding in relevant scopes
    UnresolvedReference { kind: ReferenceKind, name: String },

    /// Fewer elements on the value stack than an operator or function needs
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Operand of the wrong kind at a signature position
    TypeMismatch {
        name: String,
        index: usize,
        expected: OperandKind,
        got: &'static str,
    },

    /// Operand of the right kind with an unusable value
    InvalidArgument { name: String, message: String },

    /// Structural keyword out of place (`end` with no open function, ...)
    MisplacedKeyword { keyword: String, message: String },

    /// Input ended while a `defun` or `times` body was still being captured
    UnterminatedDefinition { keyword: &'static str, name: String },

    /// Fatal integer-engine failure
    Number(BigIntError),

    /// Request to end the interactive session (control signal)
    InteractiveQuit,
}

impl RuntimeError {
    /// Whether an interactive surface may report this error and continue
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RuntimeError::Number(_) | RuntimeError::InteractiveQuit)
    }

    /// Stage the error belongs to, used as the report prefix
    pub fn category(&self) -> &'static str {
        match self {
            RuntimeError::Parse { .. } => "parse",
            RuntimeError::UnresolvedReference { .. }
            | RuntimeError::MisplacedKeyword { .. }
            | RuntimeError::UnterminatedDefinition { .. } => "eval",
            RuntimeError::ArityMismatch { .. }
            | RuntimeError::TypeMismatch { .. }
            | RuntimeError::InvalidArgument { .. } => "exec",
            RuntimeError::Number(_) => "fatal",
            RuntimeError::InteractiveQuit => "quit",
        }
    }
}

impl From<BigIntError> for RuntimeError {
    fn from(err: BigIntError) -> Self {
        match err {
            BigIntError::Parse { input, message } => RuntimeError::Parse {
                token: input,
                message,
            },
            BigIntError::Unsupported { feature } => RuntimeError::Parse {
                token: String::new(),
                message: format!("{} is unimplemented", feature),
            },
            other => RuntimeError::Number(other),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Parse { token, message } => {
                if token.is_empty() {
                    write!(f, "{}", message)
                } else {
                    write!(f, "Garbage sub-expression '{}': {}", token, message)
                }
            }
            RuntimeError::UnresolvedReference { kind, name } => {
                write!(f, "No such {} '{}' exists in relevant scopes", kind, name)
            }
            RuntimeError::ArityMismatch {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "'{}' requires {} element{} but only {} {} left",
                    name,
                    expected,
                    if *expected == 1 { "" } else { "s" },
                    got,
                    if *got == 1 { "is" } else { "are" }
                )
            }
            RuntimeError::TypeMismatch {
                name,
                index,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Expected an operand of type {} at index {} for '{}', got {}",
                    expected, index, name, got
                )
            }
            RuntimeError::InvalidArgument { name, message } => {
                write!(f, "Invalid argument for '{}': {}", name, message)
            }
            RuntimeError::MisplacedKeyword { keyword, message } => {
                write!(f, "Misplaced '{}': {}", keyword, message)
            }
            RuntimeError::UnterminatedDefinition { keyword, name } => {
                write!(f, "'{}' body for '{}' was never closed", keyword, name)
            }
            RuntimeError::Number(err) => write!(f, "{}", err),
            RuntimeError::InteractiveQuit => write!(f, "Quit requested"),
        }
    }
}

impl std::error::Error for RuntimeError {}
