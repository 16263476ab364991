use crate::bigint::Radix;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::Registry;
use crate::memory::format_bytes;
use crate::memory::value::{Element, OperandKind};

const NONE: &[OperandKind] = &[];
const ONE: &[OperandKind] = &[OperandKind::Any];
const TWO: &[OperandKind] = &[OperandKind::Any, OperandKind::Any];

pub(super) fn register(registry: &mut Registry) {
    registry.register("dup", ONE, dup);
    registry.register("drop", ONE, drop_top);
    registry.register("swap", TWO, swap);
    registry.register("clear", NONE, clear);
    registry.register("top", ONE, top);
    registry.register("print", ONE, print);
    registry.register("stack", NONE, stack);
    registry.register("debug", &[OperandKind::Number], debug);
    registry.register("heap", NONE, heap);
    registry.register("quit", NONE, quit);
}

fn dup(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let top = interp.pop("dup")?;
    let copy = top.try_clone();
    interp.push(top);
    interp.push(copy?);
    Ok(())
}

fn drop_top(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    interp.pop("drop")?;
    Ok(())
}

fn swap(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let b = interp.pop("swap")?;
    let a = interp.pop("swap")?;
    interp.push(b);
    interp.push(a);
    Ok(())
}

fn clear(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let dropped = interp.stack.len();
    interp.stack.clear();
    tracing::debug!(dropped, "cleared value stack");
    Ok(())
}

/// Print the top element without consuming it
fn top(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    if let Some(top) = interp.stack.last() {
        let line = top.to_string();
        interp.terminal.print(line);
    }
    Ok(())
}

/// Pop and print; strings print without their sigil
fn print(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let line = match interp.pop("print")? {
        Element::String(s) => s,
        other => other.to_string(),
    };
    interp.terminal.print(line);
    Ok(())
}

/// Print the whole value stack, bottom to top
fn stack(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let line = interp
        .stack
        .iter()
        .map(Element::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    interp.terminal.print(format!("[{}]", line));
    Ok(())
}

/// Print the raw limbs of the top number without consuming it
fn debug(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let lines = match interp.top_number() {
        Some(n) => [Radix::Hex, Radix::Signed].map(|radix| {
            format!("{:>8}: {}", radix.label(), n.raw_view(radix))
        }),
        None => return Ok(()),
    };
    for line in lines {
        interp.terminal.print(line);
    }
    Ok(())
}

fn heap(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    let stats = interp.heap.stats();
    interp.terminal.print(format!(
        "heap: {} live in {} entries (peak {} in {} entries); {} allocations, {} reallocations, {} releases",
        format_bytes(stats.current_bytes),
        stats.live_entries,
        format_bytes(stats.peak_bytes),
        stats.peak_entries,
        stats.allocations,
        stats.reallocations,
        stats.releases,
    ));
    Ok(())
}

fn quit(_interp: &mut Interpreter) -> Result<(), RuntimeError> {
    Err(RuntimeError::InteractiveQuit)
}
