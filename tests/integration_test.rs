// Integration tests for the calculator

use arbcalc::interpreter::engine::{CaptureState, Interpreter};
use arbcalc::interpreter::errors::{ReferenceKind, RuntimeError};
use arbcalc::memory::heap::Heap;
use std::fs;
use std::path::Path;

fn interpreter() -> Interpreter {
    Interpreter::new(Heap::new())
}

fn rendered(interp: &Interpreter) -> Vec<String> {
    interp.stack().iter().map(ToString::to_string).collect()
}

#[test]
fn test_simple_arithmetic() {
    let mut interp = interpreter();
    interp.run("3 4 +").unwrap();
    assert_eq!(rendered(&interp), ["7"]);
}

#[test]
fn test_negative_literal() {
    let mut interp = interpreter();
    interp.run("-5").unwrap();
    assert_eq!(rendered(&interp), ["-5"]);
    assert!(interp.top_number().unwrap().is_negative());
}

#[test]
fn test_big_product() {
    let mut interp = interpreter();
    interp
        .run("123456789012345678901234567890 987654321098765432109876543210 *")
        .unwrap();
    assert_eq!(
        rendered(&interp),
        ["121932631137021795226185032733622923332237463801111263526900"]
    );
}

#[test]
fn test_mixed_sign_wide_values() {
    let mut interp = interpreter();
    interp.run("1 200 << -3 *").unwrap();
    assert_eq!(
        rendered(&interp),
        ["-4820814132776970826625886277023487807566608981348378505904128"]
    );
}

#[test]
fn test_arity_mismatch_on_empty_stack() {
    let mut interp = interpreter();
    let err = interp.run("+").unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ArityMismatch {
            name: "+".to_string(),
            expected: 2,
            got: 0
        }
    );
    assert_eq!(err.category(), "exec");
}

#[test]
fn test_arity_mismatch_with_one_operand() {
    let mut interp = interpreter();
    let err = interp.run("1 +").unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ArityMismatch { expected: 2, got: 1, .. }
    ));
    assert_eq!(rendered(&interp), ["1"]);
}

#[test]
fn test_type_mismatch_reports_position() {
    let mut interp = interpreter();
    let err = interp.run("1 :two +").unwrap_err();
    match err {
        RuntimeError::TypeMismatch {
            index, expected, got, ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(expected.to_string(), "number");
            assert_eq!(got, "string");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // Operands stay where they were
    assert_eq!(rendered(&interp), ["1", ":two"]);
}

#[test]
fn test_function_arity_is_checked_before_splicing() {
    let mut interp = interpreter();
    interp.run(":add3 3 defun + + end").unwrap();
    let err = interp.run("1 2 @add3").unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ArityMismatch {
            name: "add3".to_string(),
            expected: 3,
            got: 2
        }
    );
    assert_eq!(interp.scopes().depth(), 0);

    interp.run("3 @add3").unwrap();
    assert_eq!(rendered(&interp), ["6"]);
}

#[test]
fn test_unknown_function() {
    let mut interp = interpreter();
    let err = interp.run("@missing").unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnresolvedReference {
            kind: ReferenceKind::Function,
            name: "missing".to_string()
        }
    );
}

#[test]
fn test_unterminated_definitions() {
    let mut interp = interpreter();
    let err = interp.run(":f 0 defun 1 2 +").unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::UnterminatedDefinition { keyword: "defun", ref name } if name == "f"
    ));
    assert_eq!(interp.capture_state(), CaptureState::Idle);
    assert!(interp.functions().is_empty());

    let err = interp.run("3 times 1").unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::UnterminatedDefinition { keyword: "times", .. }
    ));
    assert_eq!(interp.capture_state(), CaptureState::Idle);
}

#[test]
fn test_loop_variables_persist_across_iterations() {
    let mut interp = interpreter();
    interp
        .run("0 :acc set 5 times $acc 2 + :acc set end-times $acc")
        .unwrap();
    assert_eq!(rendered(&interp), ["10"]);
}

#[test]
fn test_loop_variables_stay_in_their_function() {
    let mut interp = interpreter();
    interp
        .run(":count 0 defun 0 :n set 4 times $n 1 + :n set end-times $n end @count")
        .unwrap();
    assert_eq!(rendered(&interp), ["4"]);
    assert!(interp.scopes().globals().is_empty());
}

#[test]
fn test_unrelated_function_cannot_see_locals() {
    let mut interp = interpreter();
    interp.run(":peek 0 defun $secret end").unwrap();
    let err = interp
        .run(":outer 0 defun 1 :secret let 2 times @peek end-times end @outer")
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnresolvedReference {
            kind: ReferenceKind::Variable,
            name: "secret".to_string()
        }
    );
    assert_eq!(interp.scopes().depth(), 0);
}

#[test]
fn test_loop_set_is_hidden_from_called_function() {
    let mut interp = interpreter();
    interp.run(":reader 0 defun $v end").unwrap();
    let err = interp
        .run(":outer 0 defun 2 times 5 :v set @reader end-times end @outer")
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnresolvedReference {
            kind: ReferenceKind::Variable,
            name: "v".to_string()
        }
    );
    assert_eq!(interp.scopes().depth(), 0);
    assert!(interp.scopes().globals().is_empty());

    // The loop body itself still sees the binding
    interp
        .run(":inner 0 defun 2 times 5 :v set $v end-times end @inner")
        .unwrap();
    assert_eq!(rendered(&interp), ["5", "5"]);
}

#[test]
fn test_error_unwinds_frames_but_keeps_stack() {
    let mut interp = interpreter();
    interp.run(":f 1 defun 1 :x let $nope end").unwrap();
    assert!(interp.run("5 @f").is_err());

    assert_eq!(interp.scopes().depth(), 0);
    assert_eq!(interp.pending_len(), 0);
    assert_eq!(rendered(&interp), ["5"]);

    // The interpreter keeps working after the failure
    interp.run("1 +").unwrap();
    assert_eq!(rendered(&interp), ["6"]);
}

#[test]
fn test_loop_count_from_variable_at_top_level() {
    let mut interp = interpreter();
    interp.run("3 :n let 0 $n times 1 + end-times").unwrap();
    assert_eq!(rendered(&interp), ["3"]);
}

#[test]
fn test_loops_defined_on_separate_lines() {
    let mut interp = interpreter();
    interp.run("0 2 times 1 + end-times").unwrap();
    interp.run("3 times 10 + end-times").unwrap();
    assert_eq!(rendered(&interp), ["32"]);
    assert_eq!(interp.loops().len(), 2);
}

#[test]
fn test_heap_returns_to_zero() {
    let heap = Heap::new();
    {
        let mut interp = Interpreter::new(heap.clone());
        interp
            .run("1 100 << dup * 3 times dup + end-times 7 :x global :sq 1 defun dup * end 9 @sq")
            .unwrap();
        assert!(heap.stats().current_bytes > 0);

        interp.run("clear").unwrap();
        // Only the global remains live
        assert_eq!(heap.stats().live_entries, 1);
    }
    let stats = heap.stats();
    assert_eq!(stats.current_bytes, 0);
    assert_eq!(stats.live_entries, 0);
    assert!(stats.peak_bytes > 0);
}

#[test]
fn test_demo_script() {
    let path = Path::new("demos/factorial.calc");
    let source = fs::read_to_string(path).expect("Failed to read demo file");

    let mut interp = interpreter();
    interp.run(&source).expect("Execution failed");

    assert_eq!(
        interp.terminal().lines(),
        [
            "15511210043330985984000000",
            "1728",
            "1267650600228229401496703205376"
        ]
    );
}
