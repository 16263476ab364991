//! Structural keywords and scope-frame operators
//!
//! `defun` and `times` open a capture; `end` and `end-times` close it and
//! store the captured body. `_push_locals` and `_pop_locals` bracket every
//! spliced function call and loop iteration.

use crate::interpreter::constants::{DEFUN, END, END_TIMES, POP_LOCALS, PUSH_LOCALS, TIMES};
use crate::interpreter::engine::{Capture, FunctionDef, Interpreter, LoopDef};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::Registry;
use crate::memory::stack::ScopeKind;
use crate::memory::value::{Element, OperandKind};

pub(super) fn register(registry: &mut Registry) {
    registry.register(DEFUN, &[OperandKind::String, OperandKind::Number], defun);
    registry.register(END, &[], end);
    registry.register(TIMES, &[OperandKind::Number], times);
    registry.register(END_TIMES, &[], end_times);
    registry.register(PUSH_LOCALS, &[OperandKind::Number, OperandKind::String], push_locals);
    registry.register(POP_LOCALS, &[OperandKind::String], pop_locals);
}

/// `:name arity defun` starts capturing a function body
fn defun(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let arity = interp.peek_count(DEFUN)?;
    interp.pop_number(DEFUN)?;
    let name = interp.pop_string(DEFUN)?;

    tracing::debug!(function = %name, arity, "capturing function body");
    interp.captures.push(Capture::Function {
        name,
        arity,
        body: Vec::new(),
    });
    Ok(())
}

fn end(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    match interp.captures.pop() {
        Some(Capture::Function { name, arity, body }) => {
            tracing::debug!(function = %name, arity, elements = body.len(), "defined function");
            let def = FunctionDef {
                name: name.clone(),
                arity,
                body,
            };
            if interp.functions.insert(name.clone(), def).is_some() {
                tracing::warn!(function = %name, "function redefined");
            }
            Ok(())
        }
        Some(capture) => {
            interp.captures.push(capture);
            Err(RuntimeError::MisplacedKeyword {
                keyword: END.to_string(),
                message: format!("a loop body is open; close it with '{}'", END_TIMES),
            })
        }
        None => Err(RuntimeError::MisplacedKeyword {
            keyword: END.to_string(),
            message: format!("no '{}' is open", DEFUN),
        }),
    }
}

/// `N times` starts capturing a loop body; the count is fixed here
fn times(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let count = interp.peek_count(TIMES)?;
    interp.pop_number(TIMES)?;

    tracing::debug!(count, "capturing loop body");
    interp.captures.push(Capture::Loop {
        count,
        body: Vec::new(),
    });
    Ok(())
}

/// Close a loop capture and store it under the index of the loop reference
/// that follows `end-times` in the pending queue
fn end_times(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let index = match interp.pending.front() {
        Some(Element::Times(index)) => *index,
        _ => {
            return Err(RuntimeError::MisplacedKeyword {
                keyword: END_TIMES.to_string(),
                message: "not followed by a loop reference".to_string(),
            })
        }
    };

    match interp.captures.pop() {
        Some(Capture::Loop { count, body }) => {
            tracing::debug!(loop_index = index, count, elements = body.len(), "defined loop");
            interp.loops.insert(index, LoopDef { count, body });
            Ok(())
        }
        Some(capture) => {
            interp.captures.push(capture);
            Err(RuntimeError::MisplacedKeyword {
                keyword: END_TIMES.to_string(),
                message: format!("a function body is open; close it with '{}'", END),
            })
        }
        None => Err(RuntimeError::MisplacedKeyword {
            keyword: END_TIMES.to_string(),
            message: format!("no '{}' is open", TIMES),
        }),
    }
}

fn push_locals(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let name = interp.pop_string(PUSH_LOCALS)?;
    let code = interp.pop_number(PUSH_LOCALS)?;
    let kind = code
        .to_i64()
        .and_then(ScopeKind::from_code)
        .ok_or_else(|| RuntimeError::InvalidArgument {
            name: PUSH_LOCALS.to_string(),
            message: format!("unknown scope kind {}", code),
        })?;

    interp.scopes.push_frame(kind, name);
    tracing::trace!(?kind, depth = interp.scopes.depth(), "pushed scope frame");
    Ok(())
}

fn pop_locals(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let name = interp.pop_string(POP_LOCALS)?;
    let frame = interp
        .scopes
        .pop_frame()
        .ok_or_else(|| RuntimeError::InvalidArgument {
            name: POP_LOCALS.to_string(),
            message: "no scope frame is open".to_string(),
        })?;

    if frame.name != name {
        return Err(RuntimeError::InvalidArgument {
            name: POP_LOCALS.to_string(),
            message: format!("expected to close '{}' but '{}' is innermost", name, frame.name),
        });
    }

    tracing::trace!(frame = %frame.name, locals = frame.len(), "popped scope frame");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{CaptureState, Interpreter};
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::heap::Heap;

    fn values(interp: &Interpreter) -> Vec<i64> {
        interp
            .stack()
            .iter()
            .filter_map(|e| e.as_number().and_then(|n| n.to_i64()))
            .collect()
    }

    #[test]
    fn function_definition_and_call() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run(":square 1 defun dup * end").unwrap();
        assert!(interp.functions().contains_key("square"));
        assert!(interp.stack().is_empty());

        interp.run("9 @square").unwrap();
        assert_eq!(values(&interp), [81]);
        assert_eq!(interp.scopes().depth(), 0);
    }

    #[test]
    fn loop_repeats_body() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run("0 3 times 2 + end-times").unwrap();
        assert_eq!(values(&interp), [6]);
        assert_eq!(interp.loops().len(), 1);
    }

    #[test]
    fn zero_iterations_runs_nothing() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run("5 0 times 1 + end-times").unwrap();
        assert_eq!(values(&interp), [5]);
    }

    #[test]
    fn loop_nested_in_function() {
        let mut interp = Interpreter::new(Heap::new());
        interp
            .run(":scale 1 defun 4 times 2 * end-times end 3 @scale")
            .unwrap();
        assert_eq!(values(&interp), [48]);
        assert_eq!(interp.scopes().depth(), 0);
    }

    #[test]
    fn loop_count_in_body_must_be_literal() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run(":f 1 defun $n times end-times end").unwrap_err();
        assert!(matches!(err, RuntimeError::MisplacedKeyword { .. }));
    }

    #[test]
    fn nested_loops() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run("0 3 times 4 times 1 + end-times end-times").unwrap();
        assert_eq!(values(&interp), [12]);
    }

    #[test]
    fn misplaced_closers() {
        let mut interp = Interpreter::new(Heap::new());
        assert!(matches!(
            interp.run("end").unwrap_err(),
            RuntimeError::MisplacedKeyword { .. }
        ));
        assert!(matches!(
            interp.run("2 times end").unwrap_err(),
            RuntimeError::MisplacedKeyword { .. }
        ));
        assert_eq!(interp.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn nested_defun_is_rejected() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run(":f 0 defun :g 0 defun end end").unwrap_err();
        assert!(matches!(err, RuntimeError::MisplacedKeyword { .. }));
        assert!(interp.functions().is_empty());
    }

    #[test]
    fn negative_loop_count_is_invalid() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run("-2 times 1 end-times").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
        assert_eq!(values(&interp), [-2]);
    }

    #[test]
    fn invalid_arity_keeps_operands() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run(":f -1 defun").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
        assert_eq!(interp.stack().len(), 2);
        assert_eq!(interp.stack()[0].to_string(), ":f");
        assert_eq!(values(&interp), [-1]);
        assert_eq!(interp.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn huge_loop_count_is_rejected() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp
            .run("9223372036854775807 times 1 end-times")
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
        assert!(err.is_recoverable());
        assert_eq!(interp.pending_len(), 0);
        assert_eq!(interp.scopes().depth(), 0);

        let err = interp.run("1000000000000 times 1 end-times").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));

        interp.run("clear 0 3 times 1 + end-times").unwrap();
        assert_eq!(values(&interp), [3]);
    }

    #[test]
    fn redefinition_replaces() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run(":f 0 defun 1 end :f 0 defun 2 end @f").unwrap();
        assert_eq!(values(&interp), [2]);
    }
}
