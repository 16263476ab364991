use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::Registry;
use crate::memory::value::OperandKind;

/// `value :name let|set|global`
const BINDING: &[OperandKind] = &[OperandKind::Number, OperandKind::String];

pub(super) fn register(registry: &mut Registry) {
    registry.register("let", BINDING, let_local);
    registry.register("set", BINDING, set);
    registry.register("global", BINDING, global);
}

/// Bind in the innermost frame, or globally at top level
fn let_local(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let name = interp.pop_string("let")?;
    let value = interp.pop_number("let")?;
    tracing::trace!(name = %name, depth = interp.scopes.depth(), "let");
    interp.scopes.declare_local(name, value);
    Ok(())
}

/// Update the visible binding, creating it in the enclosing function if absent
fn set(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let name = interp.pop_string("set")?;
    let value = interp.pop_number("set")?;
    tracing::trace!(name = %name, depth = interp.scopes.depth(), "set");
    interp.scopes.assign(name, value);
    Ok(())
}

fn global(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let name = interp.pop_string("global")?;
    let value = interp.pop_number("global")?;
    interp.scopes.declare_global(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::{ReferenceKind, RuntimeError};
    use crate::memory::heap::Heap;

    #[test]
    fn top_level_let_is_global() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run("42 :answer let $answer 1 +").unwrap();
        assert_eq!(interp.top_number().and_then(|n| n.to_i64()), Some(43));
        assert!(interp.scopes().globals().contains_key("answer"));
    }

    #[test]
    fn function_locals_do_not_leak() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run(":f 0 defun 7 :local let end @f").unwrap();
        let err = interp.run("$local").unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnresolvedReference {
                kind: ReferenceKind::Variable,
                name: "local".to_string()
            }
        );
    }

    #[test]
    fn global_escapes_function_scope() {
        let mut interp = Interpreter::new(Heap::new());
        interp.run(":f 0 defun 7 :g global end @f $g").unwrap();
        assert_eq!(interp.top_number().and_then(|n| n.to_i64()), Some(7));
    }

    #[test]
    fn binding_operands_are_type_checked() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run(":x 5 let").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { index: 1, .. }));
    }
}
