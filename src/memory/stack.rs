//! Scope store
//!
//! This module provides the variable storage used by the evaluator:
//! - [`ScopeStack`]: global bindings plus a stack of local frames
//! - [`ScopeFrame`]: one function call's or one loop iteration's locals
//! - [`ScopeKind`]: whether a frame is a function or a loop
//!
//! # Resolution
//!
//! Lookups walk frames innermost to outermost. A loop frame is transparent,
//! so the walk continues into whatever encloses it; a function frame is an
//! opaque boundary. Globals are consulted last.

use crate::bigint::BigInt;
use rustc_hash::FxHashMap;

/// What pushed a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Function,
    Loop,
}

impl ScopeKind {
    /// Numeric tag carried on the value stack ahead of `_push_locals`
    pub fn code(self) -> i64 {
        match self {
            ScopeKind::Function => 0,
            ScopeKind::Loop => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ScopeKind::Function),
            1 => Some(ScopeKind::Loop),
            _ => None,
        }
    }
}

/// Local bindings for one call or iteration
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    pub kind: ScopeKind,
    pub name: String,
    locals: FxHashMap<String, BigInt>,
    insertion_order: Vec<String>,
}

impl ScopeFrame {
    pub fn new(kind: ScopeKind, name: String) -> Self {
        ScopeFrame {
            kind,
            name,
            locals: FxHashMap::default(),
            insertion_order: Vec::new(),
        }
    }

    /// Bind or rebind a local
    pub fn declare(&mut self, name: String, value: BigInt) {
        if !self.locals.contains_key(&name) {
            self.insertion_order.push(name.clone());
        }
        self.locals.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&BigInt> {
        self.locals.get(name)
    }

    /// Locals in declaration order (for UI display)
    pub fn locals(&self) -> impl Iterator<Item = (&str, &BigInt)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.locals.get(name).map(|value| (name.as_str(), value)))
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }
}

/// Globals plus the stack of open frames
#[derive(Debug, Default)]
pub struct ScopeStack {
    globals: FxHashMap<String, BigInt>,
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, kind: ScopeKind, name: String) {
        self.frames.push(ScopeFrame::new(kind, name));
    }

    pub fn pop_frame(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    /// Drop every open frame, returning how many were open
    pub fn drain_frames(&mut self) -> usize {
        let open = self.frames.len();
        self.frames.clear();
        open
    }

    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn globals(&self) -> &FxHashMap<String, BigInt> {
        &self.globals
    }

    /// Number of frames visible from the innermost one: every trailing loop
    /// frame plus the function frame that closes the chain, if any
    fn visible_frames(&self) -> usize {
        self.frames
            .iter()
            .rev()
            .position(|frame| frame.kind == ScopeKind::Function)
            .map_or(self.frames.len(), |i| i + 1)
    }

    /// Resolve a variable through the scope chain, then globals
    pub fn lookup(&self, name: &str) -> Option<&BigInt> {
        let visible = self.visible_frames();
        self.frames
            .iter()
            .rev()
            .take(visible)
            .find_map(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Bind in the innermost frame, or globally when no frame is open
    pub fn declare_local(&mut self, name: String, value: BigInt) {
        match self.frames.last_mut() {
            Some(frame) => frame.declare(name, value),
            None => {
                self.globals.insert(name, value);
            }
        }
    }

    pub fn declare_global(&mut self, name: String, value: BigInt) {
        self.globals.insert(name, value);
    }

    /// Update the binding visible through the scope chain.
    ///
    /// A name with no visible binding is created in the nearest enclosing
    /// function frame, or globally when the chain holds only loop frames.
    pub fn assign(&mut self, name: String, value: BigInt) {
        let visible = self.visible_frames();
        let start = self.frames.len() - visible;

        let chain = &mut self.frames[start..];
        if let Some(frame) = chain.iter_mut().rev().find(|frame| frame.locals.contains_key(&name)) {
            frame.declare(name, value);
            return;
        }
        if self.globals.contains_key(&name) {
            self.globals.insert(name, value);
            return;
        }

        match self.frames[start..].first_mut() {
            Some(frame) if frame.kind == ScopeKind::Function => frame.declare(name, value),
            _ => {
                self.globals.insert(name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::heap::Heap;

    fn n(heap: &Heap, value: i64) -> BigInt {
        BigInt::from_i64(heap, value).unwrap()
    }

    #[test]
    fn loop_frames_are_transparent() {
        let heap = Heap::new();
        let mut scopes = ScopeStack::new();
        scopes.push_frame(ScopeKind::Function, "f".to_string());
        scopes.declare_local("x".to_string(), n(&heap, 1));
        scopes.push_frame(ScopeKind::Loop, "times".to_string());
        scopes.push_frame(ScopeKind::Loop, "times".to_string());

        assert_eq!(scopes.lookup("x").and_then(BigInt::to_i64), Some(1));
    }

    #[test]
    fn function_frames_are_opaque() {
        let heap = Heap::new();
        let mut scopes = ScopeStack::new();
        scopes.declare_global("g".to_string(), n(&heap, 9));
        scopes.push_frame(ScopeKind::Function, "outer".to_string());
        scopes.declare_local("x".to_string(), n(&heap, 1));
        scopes.push_frame(ScopeKind::Function, "inner".to_string());

        assert!(scopes.lookup("x").is_none());
        assert_eq!(scopes.lookup("g").and_then(BigInt::to_i64), Some(9));
    }

    #[test]
    fn assign_lands_in_enclosing_function() {
        let heap = Heap::new();
        let mut scopes = ScopeStack::new();
        scopes.push_frame(ScopeKind::Function, "f".to_string());
        scopes.push_frame(ScopeKind::Loop, "times".to_string());
        scopes.assign("acc".to_string(), n(&heap, 3));
        scopes.pop_frame();

        assert_eq!(scopes.frames()[0].get("acc").and_then(BigInt::to_i64), Some(3));
        assert!(scopes.globals().is_empty());
    }

    #[test]
    fn assign_in_top_level_loop_is_global() {
        let heap = Heap::new();
        let mut scopes = ScopeStack::new();
        scopes.push_frame(ScopeKind::Loop, "times".to_string());
        scopes.assign("acc".to_string(), n(&heap, 3));
        assert_eq!(scopes.drain_frames(), 1);
        assert_eq!(scopes.lookup("acc").and_then(BigInt::to_i64), Some(3));
    }
}
