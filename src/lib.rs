//! # Introduction
//!
//! arbcalc is a postfix calculator over arbitrary-width two's-complement
//! integers. Every integer lives in heap storage that is allocated through an
//! accounting table, so a session can report exactly how much memory its
//! numbers hold at any moment. A terminal inspector built with
//! [ratatui](https://docs.rs/ratatui) shows the value stack, definitions and
//! heap table after a run.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Elements → Evaluator → Value stack → CLI / inspector
//! ```
//!
//! 1. [`parser`]: strips comments, splits words and classifies them into
//!    [`memory::value::Element`]s.
//! 2. [`interpreter`]: drains the element queue, runs operators, captures
//!    and splices function and loop bodies.
//! 3. [`bigint`]: integer engine covering growth, canonicalization, addition,
//!    shift-and-add multiplication, decimal parsing and rendering.
//! 4. [`memory`]: the accounting heap, scope frames and the element type.
//! 5. [`ui`]: ratatui-based inspector; not part of the stable library API.
//!
//! ## Language
//!
//! ```text
//! 3 4 + print                     ; 7
//! :square 1 defun dup * end       ; define a one-argument function
//! 12 @square                      ; 144
//! 0 :acc set 5 times $acc 2 + :acc set end-times $acc
//! ```

pub mod bigint;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod ui;
