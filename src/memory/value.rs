//! Stack element representation
//!
//! This module defines [`Element`], the tagged value that flows through both
//! the pending queue and the value stack.
//!
//! # Element Kinds
//!
//! - [`Element::Number`]: an integer value
//! - [`Element::String`]: a `:`-prefixed literal (sigil stripped)
//! - [`Element::Variable`]: a `$name` reference, resolved before use
//! - [`Element::Function`]: an `@name` call, expanded before use
//! - [`Element::Times`]: a loop reference inserted after `end-times`
//! - [`Element::Operation`]: a registered operator
//!
//! Only numbers, strings and operators ever reach the value stack outside of
//! a definition capture.

use crate::bigint::{BigInt, BigIntError};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use std::fmt;

/// Operator handler; pops its own operands and pushes its results
pub type Handler = fn(&mut Interpreter) -> Result<(), RuntimeError>;

/// Operand kind expected at one position of an operator signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Number,
    String,
    Any,
}

impl OperandKind {
    pub fn accepts(self, element: &Element) -> bool {
        match self {
            OperandKind::Number => matches!(element, Element::Number(_)),
            OperandKind::String => matches!(element, Element::String(_)),
            OperandKind::Any => matches!(element, Element::Number(_) | Element::String(_)),
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::Number => "number",
            OperandKind::String => "string",
            OperandKind::Any => "number or string",
        };
        f.write_str(name)
    }
}

/// A registered operator: name, operand signature (bottom to top) and handler
#[derive(Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub operands: &'static [OperandKind],
    pub handler: Handler,
}

impl Operation {
    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("operands", &self.operands)
            .finish()
    }
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A value on the pending queue or the value stack
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Number(BigInt),
    String(String),
    Variable(String),
    Function(String),
    Times(usize),
    Operation(Operation),
}

impl Element {
    /// Short kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Number(_) => "number",
            Element::String(_) => "string",
            Element::Variable(_) => "variable reference",
            Element::Function(_) => "function reference",
            Element::Times(_) => "loop reference",
            Element::Operation(_) => "operation",
        }
    }

    /// Deep copy that reports allocation failure for numbers
    pub fn try_clone(&self) -> Result<Element, BigIntError> {
        Ok(match self {
            Element::Number(n) => Element::Number(n.try_clone()?),
            other => other.clone(),
        })
    }

    pub fn as_number(&self) -> Option<&BigInt> {
        match self {
            Element::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Name of the operator, if this is one
    pub fn operation_name(&self) -> Option<&'static str> {
        match self {
            Element::Operation(op) => Some(op.name),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Number(n) => write!(f, "{}", n),
            Element::String(s) => write!(f, ":{}", s),
            Element::Variable(name) => write!(f, "${}", name),
            Element::Function(name) => write!(f, "@{}", name),
            Element::Times(index) => write!(f, "*times:{}", index),
            Element::Operation(op) => f.write_str(op.name),
        }
    }
}
