//! Lexer (tokenizer) for calculator source text
//!
//! Converts raw source text into the flat [`Element`] sequence the evaluator
//! drains. Everything after a `;` on a line is a comment. Words are split on
//! whitespace and classified by shape:
//!
//! | word | element |
//! |---|---|
//! | registered operator name | [`Element::Operation`] |
//! | `:text` | [`Element::String`] |
//! | `$name` | [`Element::Variable`] |
//! | `@name` | [`Element::Function`] |
//! | `*_use_times` | [`Element::Times`] with the next loop index |
//! | anything else | numeral, or a parse error |
//!
//! The lexer inserts `*_use_times` after every `end-times`, so each loop
//! definition is followed by the reference that runs it.

use crate::bigint::{BigInt, BigIntError, Limb};
use crate::interpreter::constants::{END_TIMES, USE_TIMES};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::Registry;
use crate::memory::heap::Heap;
use crate::memory::value::Element;

/// A whitespace-separated word and the line it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub line: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &'a str) -> Self {
        Lexer { source }
    }

    /// Split into words, dropping comments and inserting loop references
    pub fn words(&self) -> Vec<Word<'a>> {
        let mut words = Vec::new();
        for (i, line) in self.source.lines().enumerate() {
            let code = match line.find(';') {
                Some(at) => &line[..at],
                None => line,
            };
            for text in code.split_whitespace() {
                words.push(Word { text, line: i + 1 });
                if text == END_TIMES {
                    words.push(Word {
                        text: USE_TIMES,
                        line: i + 1,
                    });
                }
            }
        }
        words
    }

    /// Tokenize the entire input.
    ///
    /// Numerals are allocated through `heap`; loop references take their
    /// indices from `next_loop_index`, which persists across calls so that
    /// every loop in a session gets a distinct index.
    pub fn tokenize(
        &self,
        registry: &Registry,
        heap: &Heap,
        precision: Limb,
        next_loop_index: &mut usize,
    ) -> Result<Vec<Element>, RuntimeError> {
        self.words()
            .into_iter()
            .map(|word| classify(word, registry, heap, precision, next_loop_index))
            .collect()
    }
}

fn classify(
    word: Word<'_>,
    registry: &Registry,
    heap: &Heap,
    precision: Limb,
    next_loop_index: &mut usize,
) -> Result<Element, RuntimeError> {
    if let Some(op) = registry.get(word.text) {
        return Ok(Element::Operation(op));
    }

    let garbage = |message: &str| RuntimeError::Parse {
        token: word.text.to_string(),
        message: format!("{} (line {})", message, word.line),
    };

    let mut chars = word.text.chars();
    let sigil = chars.next();
    let rest = chars.as_str();
    match sigil {
        Some(':') if rest.is_empty() => Err(garbage("empty string literal")),
        Some(':') => Ok(Element::String(rest.to_string())),
        Some('$') if !rest.is_empty() => Ok(Element::Variable(rest.to_string())),
        Some('@') if !rest.is_empty() => Ok(Element::Function(rest.to_string())),
        Some('*') if word.text == USE_TIMES => {
            let index = *next_loop_index;
            *next_loop_index += 1;
            Ok(Element::Times(index))
        }
        Some('*') => Err(garbage("'*' prefix is reserved for loop references")),
        Some('$') | Some('@') => Err(garbage("reference without a name")),
        _ => match BigInt::parse(heap, word.text, precision) {
            Ok(n) => Ok(Element::Number(n)),
            Err(BigIntError::Parse { .. }) => {
                Err(garbage("not an operator, reference or numeral"))
            }
            Err(BigIntError::Unsupported { feature }) => {
                Err(garbage(&format!("{} is unimplemented", feature)))
            }
            Err(err) => Err(RuntimeError::Number(err)),
        },
    }
}
