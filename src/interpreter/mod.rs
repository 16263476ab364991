//! Stack-machine evaluator
//!
//! This module provides the calculator's execution logic:
//! - [`engine`]: the [`engine::Interpreter`] with its pending queue, value
//!   stack, definition tables and capture state machine
//! - [`ops`]: the operator registry and the standard operators
//! - [`errors`]: runtime error types
//! - [`terminal`]: output buffer written by printing operators
//! - [`constants`]: reserved operator names and tokens
//!
//! # Execution Model
//!
//! Source text becomes a flat queue of elements. The evaluator drains the
//! queue front to back: numbers and strings are pushed, operators run as soon
//! as they land on the value stack. Function calls and loops never recurse
//! on the native stack; their bodies are spliced onto the front of the queue,
//! wrapped in scope-frame operators:
//!
//! ```text
//! @f   →   0 :f _push_locals  BODY…  :f _pop_locals
//! ```
//!
//! # Captures
//!
//! Between `defun` and `end` (or `times` and `end-times`) elements are stored
//! in the definition body instead of being evaluated. Only the structural
//! keywords still execute, which is what lets loops nest inside functions and
//! other loops.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod ops;
pub mod terminal;
