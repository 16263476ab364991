//! Source text handling
//!
//! - [`lexer`]: comment stripping, word splitting and classification into
//!   [`crate::memory::value::Element`]s
//!
//! # Grammar
//!
//! The calculator has no nesting syntax beyond keywords, so there is no
//! separate parse tree: the element sequence produced by the lexer is what the
//! evaluator runs. Bodies are delimited at evaluation time by `defun … end`
//! and `times … end-times`.

pub mod lexer;
