//! Memory model for the calculator
//!
//! This module provides the core storage abstractions:
//! - [`heap`]: limb block allocation with an accounting table
//! - [`stack`]: global variables and the stack of scope frames
//! - [`value`]: the [`value::Element`] tagged union carried on both stacks
//!
//! # Accounting
//!
//! Every integer grows and shrinks through one [`heap::Heap`] context, so the
//! statistics it keeps (live bytes, peak bytes, live entries) describe the
//! whole calculator session:
//!
//! ```text
//! allocate / reallocate / release  →  table[address] = bytes  →  HeapStats
//! ```

pub mod heap;
pub mod stack;
pub mod value;

/// Human-readable byte count for status displays
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["B", "KiB", "MiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
