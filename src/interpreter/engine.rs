// Evaluation engine for the calculator

use crate::bigint::{BigInt, Limb, DEFAULT_PRECISION};
use crate::interpreter::constants::{
    DEFUN, LOOP_FRAME_NAME, MAX_PENDING_ELEMENTS, POP_LOCALS, PUSH_LOCALS, STRUCTURAL_KEYWORDS,
    TIMES,
};
use crate::interpreter::errors::{ReferenceKind, RuntimeError};
use crate::interpreter::ops::Registry;
use crate::interpreter::terminal::Terminal;
use crate::memory::heap::Heap;
use crate::memory::stack::{ScopeKind, ScopeStack};
use crate::memory::value::{Element, OperandKind, Operation};
use crate::parser::lexer::Lexer;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// A named function created by `defun … end`
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub arity: usize,
    pub body: Vec<Element>,
}

/// A loop created by `N times … end-times`; the count is fixed at definition
#[derive(Debug, Clone)]
pub struct LoopDef {
    pub count: usize,
    pub body: Vec<Element>,
}

/// A body being captured between a structural keyword and its closer
#[derive(Debug)]
pub(crate) enum Capture {
    Function {
        name: String,
        arity: usize,
        body: Vec<Element>,
    },
    Loop {
        count: usize,
        body: Vec<Element>,
    },
}

impl Capture {
    fn body_mut(&mut self) -> &mut Vec<Element> {
        match self {
            Capture::Function { body, .. } | Capture::Loop { body, .. } => body,
        }
    }

    fn unterminated(&self) -> RuntimeError {
        match self {
            Capture::Function { name, .. } => RuntimeError::UnterminatedDefinition {
                keyword: DEFUN,
                name: name.clone(),
            },
            Capture::Loop { count, .. } => RuntimeError::UnterminatedDefinition {
                keyword: TIMES,
                name: format!("{} iterations", count),
            },
        }
    }
}

/// What the evaluator does with non-structural elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    CapturingFunctionBody,
    CapturingLoopBody,
}

/// The calculator: pending queue, value stack, scopes and definition tables
pub struct Interpreter {
    /// Accounting context every number is allocated through
    pub(crate) heap: Heap,

    /// Operator name -> signature and handler
    pub(crate) registry: Registry,

    /// Value stack
    pub(crate) stack: Vec<Element>,

    /// Elements still to evaluate; bodies are spliced onto the front
    pub(crate) pending: VecDeque<Element>,

    /// Globals and open scope frames
    pub(crate) scopes: ScopeStack,

    pub(crate) functions: FxHashMap<String, FunctionDef>,

    /// Loop index -> definition, keyed by the index the lexer assigned
    pub(crate) loops: FxHashMap<usize, LoopDef>,

    /// Open captures, innermost last
    pub(crate) captures: Vec<Capture>,

    /// Next index handed to a `*_use_times` token
    next_loop_index: usize,

    /// Output produced by printing operators
    pub(crate) terminal: Terminal,

    /// Precision recorded on parsed numerals
    precision: Limb,
}

impl Interpreter {
    /// Create an interpreter with the standard operator set
    pub fn new(heap: Heap) -> Self {
        Self::with_registry(heap, Registry::standard())
    }

    pub fn with_registry(heap: Heap, registry: Registry) -> Self {
        Interpreter {
            heap,
            registry,
            stack: Vec::new(),
            pending: VecDeque::new(),
            scopes: ScopeStack::new(),
            functions: FxHashMap::default(),
            loops: FxHashMap::default(),
            captures: Vec::new(),
            next_loop_index: 0,
            terminal: Terminal::new(),
            precision: DEFAULT_PRECISION,
        }
    }

    /// Tokenize and evaluate one statement batch.
    ///
    /// Fails with [`RuntimeError::UnterminatedDefinition`] when the input ends
    /// inside a `defun` or `times` body.
    pub fn run(&mut self, source: &str) -> Result<(), RuntimeError> {
        let elements = Lexer::new(source).tokenize(
            &self.registry,
            &self.heap,
            self.precision,
            &mut self.next_loop_index,
        )?;

        self.pending.clear();
        self.pending.extend(elements);
        self.evaluate()?;

        if let Some(capture) = self.captures.last() {
            let err = capture.unterminated();
            self.unwind();
            return Err(err);
        }
        Ok(())
    }

    /// Drain the pending queue front to back
    pub fn evaluate(&mut self) -> Result<(), RuntimeError> {
        while let Some(element) = self.pending.pop_front() {
            if let Err(err) = self.step(element) {
                self.unwind();
                return Err(err);
            }
        }
        Ok(())
    }

    fn step(&mut self, element: Element) -> Result<(), RuntimeError> {
        let element = if self.captures.is_empty() {
            match element {
                Element::Variable(name) => Element::Number(self.resolve_variable(&name)?),
                Element::Function(name) => return self.expand_function(&name),
                Element::Times(index) => return self.expand_loop(index),
                other => other,
            }
        } else {
            element
        };

        let keyword = element
            .operation_name()
            .filter(|name| STRUCTURAL_KEYWORDS.contains(name));

        if keyword.is_none() {
            if let Some(capture) = self.captures.last_mut() {
                capture.body_mut().push(element);
                return Ok(());
            }
        }

        match keyword {
            Some(DEFUN) if !self.captures.is_empty() => {
                return Err(RuntimeError::MisplacedKeyword {
                    keyword: DEFUN.to_string(),
                    message: "definitions cannot be nested".to_string(),
                });
            }
            Some(TIMES) => {
                let count = self.take_loop_count()?;
                self.stack.push(count);
            }
            _ => {}
        }

        let is_operation = matches!(element, Element::Operation(_));
        self.stack.push(element);
        if is_operation {
            self.execute()?;
        }
        Ok(())
    }

    /// Move the count preceding `times` from the innermost capture body (or
    /// the value stack when idle) onto the value stack
    fn take_loop_count(&mut self) -> Result<Element, RuntimeError> {
        let source = match self.captures.last_mut() {
            Some(capture) => capture.body_mut(),
            None => &mut self.stack,
        };

        match source.pop() {
            Some(Element::Number(count)) => Ok(Element::Number(count)),
            Some(other) => {
                let got = other.kind_name();
                source.push(other);
                Err(RuntimeError::MisplacedKeyword {
                    keyword: TIMES.to_string(),
                    message: format!("expected an iteration count, found a {}", got),
                })
            }
            None => Err(RuntimeError::ArityMismatch {
                name: TIMES.to_string(),
                expected: 1,
                got: 0,
            }),
        }
    }

    /// Pop operators off the top of the value stack and run them
    pub(crate) fn execute(&mut self) -> Result<(), RuntimeError> {
        while let Some(Element::Operation(op)) = self.stack.last() {
            let op = *op;
            self.stack.pop();
            self.check_operands(op.name, op.operands)?;
            (op.handler)(self)?;
        }
        Ok(())
    }

    /// Verify the top of the value stack against a signature, top downward
    fn check_operands(&self, name: &str, operands: &[OperandKind]) -> Result<(), RuntimeError> {
        if self.stack.len() < operands.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: operands.len(),
                got: self.stack.len(),
            });
        }

        for (i, element) in self.stack.iter().rev().take(operands.len()).enumerate() {
            let index = operands.len() - i - 1;
            let expected = operands[index];
            if !expected.accepts(element) {
                return Err(RuntimeError::TypeMismatch {
                    name: name.to_string(),
                    index,
                    expected,
                    got: element.kind_name(),
                });
            }
        }
        Ok(())
    }

    fn resolve_variable(&self, name: &str) -> Result<BigInt, RuntimeError> {
        self.scopes
            .lookup(name)
            .ok_or_else(|| RuntimeError::UnresolvedReference {
                kind: ReferenceKind::Variable,
                name: name.to_string(),
            })?
            .try_clone()
            .map_err(RuntimeError::from)
    }

    /// Splice `open(Function) body close` onto the front of the pending queue
    fn expand_function(&mut self, name: &str) -> Result<(), RuntimeError> {
        let def = self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::UnresolvedReference {
                kind: ReferenceKind::Function,
                name: name.to_string(),
            })?;

        self.check_operands(name, &vec![OperandKind::Number; def.arity])?;
        let call = self.scope_frame(ScopeKind::Function, name, &def.body)?;

        tracing::debug!(function = name, elements = call.len(), "expanding call");
        self.splice_front(call);
        Ok(())
    }

    /// Splice `count` independently scoped copies of a loop body
    fn expand_loop(&mut self, index: usize) -> Result<(), RuntimeError> {
        let def = self
            .loops
            .get(&index)
            .ok_or_else(|| RuntimeError::UnresolvedReference {
                kind: ReferenceKind::Loop,
                name: index.to_string(),
            })?;

        let iteration = self.scope_frame(ScopeKind::Loop, LOOP_FRAME_NAME, &def.body)?;
        let count = def.count;

        let total = iteration
            .len()
            .checked_mul(count)
            .filter(|&total| total <= MAX_PENDING_ELEMENTS.saturating_sub(self.pending.len()))
            .ok_or_else(|| RuntimeError::InvalidArgument {
                name: TIMES.to_string(),
                message: format!(
                    "{} iterations of {} elements exceed the pending limit of {}",
                    count,
                    iteration.len(),
                    MAX_PENDING_ELEMENTS
                ),
            })?;

        let mut expanded = Vec::with_capacity(total);
        for _ in 0..count {
            for element in &iteration {
                expanded.push(element.try_clone()?);
            }
        }

        tracing::debug!(loop_index = index, count, "expanding loop");
        self.splice_front(expanded);
        Ok(())
    }

    fn scope_frame(
        &self,
        kind: ScopeKind,
        name: &str,
        body: &[Element],
    ) -> Result<Vec<Element>, RuntimeError> {
        let push = self.reserved(PUSH_LOCALS)?;
        let pop = self.reserved(POP_LOCALS)?;

        let mut frame = Vec::with_capacity(body.len() + 5);
        frame.push(Element::Number(BigInt::from_i64(&self.heap, kind.code())?));
        frame.push(Element::String(name.to_string()));
        frame.push(Element::Operation(push));
        for element in body {
            frame.push(element.try_clone()?);
        }
        frame.push(Element::String(name.to_string()));
        frame.push(Element::Operation(pop));
        Ok(frame)
    }

    fn reserved(&self, name: &str) -> Result<Operation, RuntimeError> {
        self.registry
            .get(name)
            .ok_or_else(|| RuntimeError::UnresolvedReference {
                kind: ReferenceKind::Operation,
                name: name.to_string(),
            })
    }

    fn splice_front(&mut self, elements: Vec<Element>) {
        for element in elements.into_iter().rev() {
            self.pending.push_front(element);
        }
    }

    /// Abandon the current evaluation: drain scope frames, drop pending work
    /// and discard unfinished definitions. The value stack is kept.
    fn unwind(&mut self) {
        let frames = self.scopes.drain_frames();
        let pending = self.pending.len();
        self.pending.clear();
        self.captures.clear();
        tracing::debug!(frames, pending, "unwound evaluation");
    }

    /// Cancel an abandoned evaluation (end of interactive input)
    pub fn cancel(&mut self) {
        self.unwind();
    }

    // Operand helpers for handlers

    pub(crate) fn push(&mut self, element: Element) {
        self.stack.push(element);
    }

    pub(crate) fn pop(&mut self, op: &str) -> Result<Element, RuntimeError> {
        self.stack.pop().ok_or_else(|| RuntimeError::ArityMismatch {
            name: op.to_string(),
            expected: 1,
            got: 0,
        })
    }

    pub(crate) fn pop_number(&mut self, op: &str) -> Result<BigInt, RuntimeError> {
        match self.pop(op)? {
            Element::Number(n) => Ok(n),
            other => Err(self.mismatch(op, OperandKind::Number, other)),
        }
    }

    pub(crate) fn pop_string(&mut self, op: &str) -> Result<String, RuntimeError> {
        match self.pop(op)? {
            Element::String(s) => Ok(s),
            other => Err(self.mismatch(op, OperandKind::String, other)),
        }
    }

    /// Read the top number as a count without popping it
    pub(crate) fn peek_count(&self, op: &str) -> Result<usize, RuntimeError> {
        match self.stack.last() {
            Some(Element::Number(n)) => to_count(op, n),
            Some(other) => Err(RuntimeError::TypeMismatch {
                name: op.to_string(),
                index: self.stack.len() - 1,
                expected: OperandKind::Number,
                got: other.kind_name(),
            }),
            None => Err(RuntimeError::ArityMismatch {
                name: op.to_string(),
                expected: 1,
                got: 0,
            }),
        }
    }

    fn mismatch(&mut self, op: &str, expected: OperandKind, got: Element) -> RuntimeError {
        let err = RuntimeError::TypeMismatch {
            name: op.to_string(),
            index: self.stack.len(),
            expected,
            got: got.kind_name(),
        };
        self.stack.push(got);
        err
    }

    /// Build a number in this interpreter's accounting context
    pub(crate) fn number(&self, n: i64) -> Result<BigInt, RuntimeError> {
        Ok(BigInt::from_i64(&self.heap, n)?)
    }

    // Read-only views for the binary, the inspector and tests

    pub fn stack(&self) -> &[Element] {
        &self.stack
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn functions(&self) -> &FxHashMap<String, FunctionDef> {
        &self.functions
    }

    pub fn loops(&self) -> &FxHashMap<usize, LoopDef> {
        &self.loops
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn capture_state(&self) -> CaptureState {
        match self.captures.last() {
            None => CaptureState::Idle,
            Some(Capture::Function { .. }) => CaptureState::CapturingFunctionBody,
            Some(Capture::Loop { .. }) => CaptureState::CapturingLoopBody,
        }
    }

    /// Top of the value stack, if it is a number
    pub fn top_number(&self) -> Option<&BigInt> {
        self.stack.last().and_then(Element::as_number)
    }
}

/// Convert a count or amount operand to `usize`
fn to_count(op: &str, n: &BigInt) -> Result<usize, RuntimeError> {
    let invalid = |message: &str| RuntimeError::InvalidArgument {
        name: op.to_string(),
        message: format!("{} ({})", message, n),
    };
    let value = n.to_i64().ok_or_else(|| invalid("value is too large"))?;
    usize::try_from(value).map_err(|_| invalid("value must not be negative"))
}
