//! Raw limb view for diagnostics
//!
//! Renders `(capacity,len)` followed by every limb, least significant first,
//! with a leading `!` on negative values:
//!
//! ```text
//! (3,2) !0xfffffffb 0xffffffff
//! ```

use super::{BigInt, SignedLimb};
use std::fmt::Write;

/// How each limb is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    Binary,
    #[default]
    Hex,
    Unsigned,
    Signed,
}

impl Radix {
    /// Cycle to the next radix (inspector key binding)
    pub fn next(self) -> Self {
        match self {
            Radix::Binary => Radix::Hex,
            Radix::Hex => Radix::Unsigned,
            Radix::Unsigned => Radix::Signed,
            Radix::Signed => Radix::Binary,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Radix::Binary => "bin",
            Radix::Hex => "hex",
            Radix::Unsigned => "dec",
            Radix::Signed => "signed",
        }
    }
}

impl BigInt {
    pub fn raw_view(&self, radix: Radix) -> String {
        let mut out = format!("({},{})", self.capacity(), self.len());
        if self.is_empty() {
            return out;
        }

        out.push(' ');
        if self.is_negative() {
            out.push('!');
        }
        for (i, limb) in self.limbs().iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = match radix {
                Radix::Binary => write!(out, "{:#b}", limb),
                Radix::Hex => write!(out, "{:#x}", limb),
                Radix::Unsigned => write!(out, "{}", limb),
                Radix::Signed => write!(out, "{}", *limb as SignedLimb),
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::heap::Heap;

    #[test]
    fn raw_view_formats() {
        let heap = Heap::new();
        let value = BigInt::from_i64(&heap, -5).unwrap();
        let capacity = value.capacity();
        assert_eq!(
            value.raw_view(Radix::Hex),
            format!("({},1) !0xfffffffb", capacity)
        );
        assert_eq!(
            value.raw_view(Radix::Signed),
            format!("({},1) !-5", capacity)
        );
        assert_eq!(
            BigInt::from_i64(&heap, 5).unwrap().raw_view(Radix::Binary),
            format!("({},1) 0b101", capacity)
        );
        assert_eq!(BigInt::empty(&heap).raw_view(Radix::Hex), "(0,0)");
    }
}
