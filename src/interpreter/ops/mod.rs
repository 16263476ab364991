//! Operator registry and the standard operator set
//!
//! Every operator is a name, an operand signature listed bottom to top, and a
//! handler. The evaluator checks the signature against the top of the value
//! stack before calling the handler, so handlers can pop their operands
//! without re-validating kinds.
//!
//! - [`arith`]: `+ - * neg <<`
//! - [`stack`]: stack manipulation and printing
//! - [`variables`]: `let set global`
//! - [`definitions`]: `defun end times end-times` and the scope-frame operators

pub mod arith;
pub mod definitions;
pub mod stack;
pub mod variables;

use crate::memory::value::{Handler, OperandKind, Operation};
use rustc_hash::FxHashMap;

/// Name -> operator table consulted by the lexer and the evaluator
#[derive(Debug, Clone, Default)]
pub struct Registry {
    operations: FxHashMap<&'static str, Operation>,
}

impl Registry {
    /// A registry with no operators at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every built-in operator
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        arith::register(&mut registry);
        stack::register(&mut registry);
        variables::register(&mut registry);
        definitions::register(&mut registry);
        registry
    }

    /// Add or replace an operator
    pub fn register(
        &mut self,
        name: &'static str,
        operands: &'static [OperandKind],
        handler: Handler,
    ) {
        self.operations.insert(
            name,
            Operation {
                name,
                operands,
                handler,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<Operation> {
        self.operations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Operator names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::constants::{POP_LOCALS, PUSH_LOCALS, STRUCTURAL_KEYWORDS};

    #[test]
    fn standard_registry_has_reserved_operators() {
        let registry = Registry::standard();
        for name in STRUCTURAL_KEYWORDS.iter().chain(&[PUSH_LOCALS, POP_LOCALS]) {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert_eq!(registry.get("+").map(|op| op.arity()), Some(2));
        assert_eq!(
            registry.get("defun").map(|op| op.operands),
            Some(&[OperandKind::String, OperandKind::Number][..])
        );
    }

    #[test]
    fn names_are_sorted() {
        let names = Registry::standard().names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
