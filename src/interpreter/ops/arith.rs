use crate::bigint::LIMB_BITS;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::Registry;
use crate::memory::value::{Element, OperandKind};

const UNARY: &[OperandKind] = &[OperandKind::Number];
const BINARY: &[OperandKind] = &[OperandKind::Number, OperandKind::Number];

pub(super) fn register(registry: &mut Registry) {
    registry.register("+", BINARY, add);
    registry.register("-", BINARY, subtract);
    registry.register("*", BINARY, multiply);
    registry.register("neg", UNARY, negate);
    registry.register("<<", BINARY, shift_left);
}

/// `a b +` → `a+b`
fn add(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let rhs = interp.pop_number("+")?;
    let mut lhs = interp.pop_number("+")?;
    lhs.add_assign(&rhs)?;
    lhs.shrink_if_can()?;
    interp.push(Element::Number(lhs));
    Ok(())
}

/// `a b -` → `a-b`
fn subtract(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let rhs = interp.pop_number("-")?;
    let mut lhs = interp.pop_number("-")?;
    lhs.sub_assign(&rhs)?;
    lhs.shrink_if_can()?;
    interp.push(Element::Number(lhs));
    Ok(())
}

/// `a b *` → `a·b`
fn multiply(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let rhs = interp.pop_number("*")?;
    let lhs = interp.pop_number("*")?;
    let product = lhs.mul(&rhs)?;
    interp.push(Element::Number(product));
    Ok(())
}

fn negate(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let mut value = interp.pop_number("neg")?;
    value.negate()?;
    value.shrink_if_can()?;
    interp.push(Element::Number(value));
    Ok(())
}

/// `a n <<` → `a·2ⁿ`. The value is widened first so no bits are lost.
fn shift_left(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let by = interp.peek_count("<<")?;
    let extra = by / LIMB_BITS + 1;
    if interp
        .stack
        .iter()
        .rev()
        .nth(1)
        .and_then(Element::as_number)
        .is_some_and(|value| !value.can_grow(extra))
    {
        return Err(RuntimeError::InvalidArgument {
            name: "<<".to_string(),
            message: format!("shifting by {} bits exceeds the integer size limit", by),
        });
    }

    interp.pop_number("<<")?;
    let mut value = interp.pop_number("<<")?;
    value.grow(extra)?;
    value.shift_left(by);
    value.shrink_if_can()?;
    interp.push(Element::Number(value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::heap::Heap;

    fn eval(source: &str) -> Interpreter {
        let mut interp = Interpreter::new(Heap::new());
        interp.run(source).unwrap();
        interp
    }

    fn top(interp: &Interpreter) -> i64 {
        interp.top_number().and_then(|n| n.to_i64()).unwrap()
    }

    #[test]
    fn basic_operators() {
        assert_eq!(top(&eval("3 4 +")), 7);
        assert_eq!(top(&eval("3 4 -")), -1);
        assert_eq!(top(&eval("-6 7 *")), -42);
        assert_eq!(top(&eval("5 neg")), -5);
        assert_eq!(top(&eval("3 40 <<")), 3 << 40);
    }

    fn rendered(interp: &Interpreter) -> Vec<String> {
        interp.stack().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn shift_rejects_negative_amount() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run("1 -1 <<").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
        assert_eq!(rendered(&interp), ["1", "-1"]);
    }

    #[test]
    fn shift_at_size_limit_is_recoverable() {
        let mut interp = Interpreter::new(Heap::new());
        let err = interp.run("1 31936 <<").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
        assert!(err.is_recoverable());
        assert_eq!(rendered(&interp), ["1", "31936"]);

        interp.run("clear 1 31000 <<").unwrap();
        let n = interp.top_number().unwrap();
        assert!(n.bit(31000));
        assert!(!n.is_negative());
    }

    #[test]
    fn results_are_canonical() {
        let interp = eval("4294967296 -4294967295 +");
        let n = interp.top_number().unwrap();
        assert_eq!(n.to_i64(), Some(1));
        assert_eq!(n.len(), 1);
    }
}
