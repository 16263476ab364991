//! Variable-length two's-complement integers
//!
//! This module provides [`BigInt`], the value type of the calculator:
//! - [`arith`]: addition, negation, both multiplication forms, left shift
//! - [`parse`]: decimal parsing (integral part only) and rendering
//! - [`view`]: the raw limb view used by `debug` and the inspector
//! - [`errors`]: [`BigIntError`]
//!
//! # Representation
//!
//! A value is a little-endian run of [`Limb`]s read as one two's-complement
//! integer; the sign is the top bit of the most significant limb. Storage
//! comes from a [`Heap`] and carries growth slack, so the logical length
//! (`fixed_len`) is at most the block length (the capacity).
//!
//! ```text
//! limbs:   [0x00000005, 0xffffffff]   len 2, capacity 3
//! value:   -(2^32) + 5
//! ```
//!
//! A decimal part is kept structurally (`decimal_len`) but is always empty;
//! every fractional path reports [`BigIntError::Unsupported`].

pub mod arith;
pub mod errors;
pub mod parse;
pub mod view;

pub use errors::BigIntError;
pub use view::Radix;

use crate::memory::heap::{Heap, HeapBlock};
use std::fmt;

/// One storage unit of a [`BigInt`]
pub type Limb = u32;
/// Accumulator wide enough to hold a limb sum plus carry
pub type DoubleLimb = u64;
/// A limb read as a signed value
pub type SignedLimb = i32;

pub const LIMB_BITS: usize = Limb::BITS as usize;

/// Extra limbs reserved on every reallocating grow
pub const GROWTH_SLACK: usize = 1;

/// Hard upper bound on the capacity of a single value
pub const MAX_LIMBS: usize = 1000;

/// Precision recorded on values that do not specify one
pub const DEFAULT_PRECISION: Limb = 10;

#[inline]
fn limb_is_negative(limb: Limb) -> bool {
    limb >> (LIMB_BITS - 1) != 0
}

#[inline]
fn sign_fill(negative: bool) -> Limb {
    if negative {
        Limb::MAX
    } else {
        0
    }
}

/// Growable two's-complement integer whose storage is accounted by a [`Heap`]
pub struct BigInt {
    heap: Heap,
    fixed: Option<HeapBlock>,
    fixed_len: usize,
    decimal_len: usize,
    precision: Limb,
}

impl BigInt {
    /// An empty value (no limbs) with default precision
    pub fn empty(heap: &Heap) -> Self {
        BigInt {
            heap: heap.clone(),
            fixed: None,
            fixed_len: 0,
            decimal_len: 0,
            precision: DEFAULT_PRECISION,
        }
    }

    /// A single-limb zero
    pub fn zero(heap: &Heap) -> Result<Self, BigIntError> {
        let mut value = Self::empty(heap);
        value.grow(1)?;
        Ok(value)
    }

    pub fn from_i64(heap: &Heap, n: i64) -> Result<Self, BigIntError> {
        let bits = n as u64;
        Self::from_parts(
            heap,
            &[bits as Limb, (bits >> LIMB_BITS) as Limb],
            &[],
            DEFAULT_PRECISION,
        )
    }

    /// Build a value from explicit fixed limbs (little-endian, two's complement)
    pub fn from_parts(
        heap: &Heap,
        fixed: &[Limb],
        decimal: &[Limb],
        precision: Limb,
    ) -> Result<Self, BigIntError> {
        if !decimal.is_empty() {
            return Err(BigIntError::Unsupported {
                feature: "Decimal storage",
            });
        }

        let mut value = Self::empty(heap);
        value.precision = precision;
        if fixed.is_empty() {
            value.grow(1)?;
        } else {
            value.grow(fixed.len())?;
            value.limbs_mut().copy_from_slice(fixed);
            value.shrink_if_can()?;
        }
        Ok(value)
    }

    /// The accounting context this value allocates through
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn precision(&self) -> Limb {
        self.precision
    }

    /// Logical limb count
    pub fn len(&self) -> usize {
        self.fixed_len
    }

    pub fn is_empty(&self) -> bool {
        self.fixed_len == 0
    }

    /// Allocated limb count
    pub fn capacity(&self) -> usize {
        self.fixed.as_ref().map_or(0, HeapBlock::len)
    }

    pub fn decimal_len(&self) -> usize {
        self.decimal_len
    }

    pub fn limbs(&self) -> &[Limb] {
        match &self.fixed {
            Some(block) => &block.limbs()[..self.fixed_len],
            None => &[],
        }
    }

    pub(crate) fn limbs_mut(&mut self) -> &mut [Limb] {
        let len = self.fixed_len;
        match &mut self.fixed {
            Some(block) => &mut block.limbs_mut()[..len],
            None => &mut [],
        }
    }

    /// Size of the logical limbs in bytes
    pub fn bytes(&self) -> usize {
        self.fixed_len * std::mem::size_of::<Limb>()
    }

    pub fn bit_width(&self) -> usize {
        self.fixed_len * LIMB_BITS
    }

    pub fn is_negative(&self) -> bool {
        self.limbs().last().is_some_and(|&top| limb_is_negative(top))
    }

    pub fn is_zero(&self) -> bool {
        self.limbs().iter().all(|&limb| limb == 0)
    }

    /// Limb `index`, sign-extended past the logical length
    pub fn limb_at(&self, index: usize) -> Limb {
        self.limbs()
            .get(index)
            .copied()
            .unwrap_or_else(|| sign_fill(self.is_negative()))
    }

    pub fn bit(&self, at: usize) -> bool {
        let (unit, unit_at) = (at / LIMB_BITS, at % LIMB_BITS);
        self.limbs()
            .get(unit)
            .is_some_and(|limb| limb & (1 << unit_at) != 0)
    }

    pub fn set_bit(&mut self, at: usize) {
        let (unit, unit_at) = (at / LIMB_BITS, at % LIMB_BITS);
        if let Some(limb) = self.limbs_mut().get_mut(unit) {
            *limb |= 1 << unit_at;
        }
    }

    pub fn clear_bit(&mut self, at: usize) {
        let (unit, unit_at) = (at / LIMB_BITS, at % LIMB_BITS);
        if let Some(limb) = self.limbs_mut().get_mut(unit) {
            *limb &= !(1 << unit_at);
        }
    }

    pub fn flip_bit(&mut self, at: usize) {
        let (unit, unit_at) = (at / LIMB_BITS, at % LIMB_BITS);
        if let Some(limb) = self.limbs_mut().get_mut(unit) {
            *limb ^= 1 << unit_at;
        }
    }

    /// Capacity after growing by `by` limbs; unchanged while spare room lasts
    fn capacity_after_growth(&self, by: usize) -> usize {
        let spare = self.capacity() - self.fixed_len;
        if by > spare {
            self.capacity().saturating_add(by).saturating_add(GROWTH_SLACK)
        } else {
            self.capacity()
        }
    }

    /// Whether growing by `by` limbs stays within [`MAX_LIMBS`]
    pub fn can_grow(&self, by: usize) -> bool {
        self.capacity_after_growth(by) <= MAX_LIMBS
    }

    /// Grow by `by` limbs, extending the current sign
    pub fn grow(&mut self, by: usize) -> Result<(), BigIntError> {
        let negative = self.is_negative();
        self.grow_signed(by, negative)
    }

    /// Grow by `by` limbs filled with the sign given by `negative`.
    ///
    /// Spare capacity is used first; otherwise the block is reallocated to
    /// `capacity + by + GROWTH_SLACK` limbs.
    pub fn grow_signed(&mut self, by: usize, negative: bool) -> Result<(), BigIntError> {
        let new_capacity = self.capacity_after_growth(by);
        if new_capacity != self.capacity() {
            if new_capacity > MAX_LIMBS {
                return Err(BigIntError::CapacityExceeded {
                    requested: new_capacity,
                    limit: MAX_LIMBS,
                });
            }

            match self.heap.reallocate(self.fixed.take(), new_capacity) {
                Ok(block) => self.fixed = Some(block),
                Err(err) => {
                    self.fixed_len = 0;
                    return Err(err);
                }
            }
        }

        let start = self.fixed_len;
        self.fixed_len += by;
        self.limbs_mut()[start..].fill(sign_fill(negative));
        Ok(())
    }

    /// Drop the `by` most significant limbs and release as much capacity
    pub fn shrink(&mut self, by: usize) -> Result<(), BigIntError> {
        if by >= self.fixed_len {
            return Err(BigIntError::ShrinkUnderflow {
                by,
                len: self.fixed_len,
            });
        }

        let new_capacity = self.capacity() - by;
        match self.heap.reallocate(self.fixed.take(), new_capacity) {
            Ok(block) => self.fixed = Some(block),
            Err(err) => {
                self.fixed_len = 0;
                return Err(err);
            }
        }
        self.fixed_len -= by;
        Ok(())
    }

    /// Grow or shrink to exactly `len` logical limbs
    pub fn resize(&mut self, len: usize) -> Result<(), BigIntError> {
        if len > self.fixed_len {
            self.grow(len - self.fixed_len)
        } else if len < self.fixed_len {
            self.shrink(self.fixed_len - len)
        } else {
            Ok(())
        }
    }

    /// Drop redundant sign-extension limbs without changing the value
    pub fn shrink_if_can(&mut self) -> Result<(), BigIntError> {
        let negative = self.is_negative();
        let fill = sign_fill(negative);
        let limbs = self.limbs();

        let mut i = limbs.len().saturating_sub(1);
        while i >= 1 && limbs[i] == fill && limb_is_negative(limbs[i - 1]) == negative {
            i -= 1;
        }

        let by = limbs.len().saturating_sub(1) - i;
        if by > 0 {
            self.shrink(by)?;
        }
        Ok(())
    }

    /// Set the value to a single-limb zero
    pub fn set_zero(&mut self) -> Result<(), BigIntError> {
        if self.fixed_len > 1 {
            self.shrink(self.fixed_len - 1)?;
        } else if self.fixed_len == 0 {
            self.grow(1)?;
        }
        self.limbs_mut()[0] = 0;
        Ok(())
    }

    /// Release storage and return to the empty, default-precision state
    pub fn reset(&mut self) {
        if let Some(block) = self.fixed.take() {
            if let Err(err) = self.heap.release(block) {
                tracing::error!("releasing integer storage failed: {}", err);
            }
        }
        self.fixed_len = 0;
        self.decimal_len = 0;
        self.precision = DEFAULT_PRECISION;
    }

    /// Move the value out, leaving `self` empty with default precision
    pub fn take(&mut self) -> BigInt {
        let empty = BigInt::empty(&self.heap);
        std::mem::replace(self, empty)
    }

    /// Convert to `i64` when the value fits
    pub fn to_i64(&self) -> Option<i64> {
        let negative = self.is_negative();
        if self.limbs().iter().skip(2).any(|&limb| limb != sign_fill(negative)) {
            return None;
        }
        let low = self.limb_at(0) as u64;
        let high = self.limb_at(1) as u64;
        let n = ((high << LIMB_BITS) | low) as i64;
        (n.is_negative() == negative).then_some(n)
    }
}

impl BigInt {
    /// Deep copy through [`Heap::allocate`], reporting allocation failure
    pub fn try_clone(&self) -> Result<BigInt, BigIntError> {
        let fixed = if self.fixed_len > 0 {
            let mut block = self.heap.allocate(self.fixed_len + GROWTH_SLACK)?;
            block.limbs_mut()[..self.fixed_len].copy_from_slice(self.limbs());
            Some(block)
        } else {
            None
        };

        Ok(BigInt {
            heap: self.heap.clone(),
            fixed,
            fixed_len: self.fixed_len,
            decimal_len: self.decimal_len,
            precision: self.precision,
        })
    }
}

impl Clone for BigInt {
    fn clone(&self) -> Self {
        let mut limbs = Vec::with_capacity(self.fixed_len + GROWTH_SLACK);
        limbs.extend_from_slice(self.limbs());
        limbs.resize(self.fixed_len + GROWTH_SLACK, 0);

        BigInt {
            heap: self.heap.clone(),
            fixed: (self.fixed_len > 0).then(|| self.heap.adopt(limbs)),
            fixed_len: self.fixed_len,
            decimal_len: self.decimal_len,
            precision: self.precision,
        }
    }
}

impl Drop for BigInt {
    fn drop(&mut self) {
        self.reset();
    }
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        let len = self.fixed_len.max(other.fixed_len);
        (0..len).all(|i| self.limb_at(i) == other.limb_at(i))
    }
}

impl Eq for BigInt {}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({} ", self)?;
        write!(f, "{})", self.raw_view(Radix::Hex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_i64_is_canonical() {
        let heap = Heap::new();
        assert_eq!(BigInt::from_i64(&heap, 5).unwrap().limbs(), &[5]);
        assert_eq!(BigInt::from_i64(&heap, -1).unwrap().limbs(), &[Limb::MAX]);
        assert_eq!(
            BigInt::from_i64(&heap, 1 << 40).unwrap().limbs(),
            &[0, 1 << 8]
        );
        // 2^31 needs a zero limb to stay positive
        assert_eq!(
            BigInt::from_i64(&heap, 1 << 31).unwrap().limbs(),
            &[0x8000_0000, 0]
        );
    }

    #[test]
    fn grow_sign_extends() {
        let heap = Heap::new();
        let mut n = BigInt::from_i64(&heap, -7).unwrap();
        n.grow(3).unwrap();
        assert_eq!(n.len(), 4);
        assert!(n.capacity() >= 4);
        assert_eq!(n.to_i64(), Some(-7));
    }

    #[test]
    fn grow_past_limit_fails() {
        let heap = Heap::new();
        let mut n = BigInt::zero(&heap).unwrap();
        let err = n.grow(MAX_LIMBS).unwrap_err();
        assert!(matches!(err, BigIntError::CapacityExceeded { .. }));
    }

    #[test]
    fn can_grow_matches_grow() {
        let heap = Heap::new();
        let mut n = BigInt::from_i64(&heap, 1).unwrap();
        let spare = n.capacity() - n.len();
        let largest = MAX_LIMBS - n.capacity() - GROWTH_SLACK;

        assert!(n.can_grow(spare));
        assert!(!n.can_grow(largest + 1));
        assert!(n.clone().grow(largest + 1).is_err());
        assert!(n.can_grow(largest));
        n.grow(largest).unwrap();
        assert_eq!(n.capacity(), MAX_LIMBS);
    }

    #[test]
    fn try_clone_is_deep_and_accounted() {
        let heap = Heap::new();
        let n = BigInt::from_i64(&heap, -(1 << 40)).unwrap();
        let copy = n.try_clone().unwrap();
        assert_eq!(copy, n);
        assert_ne!(copy.limbs().as_ptr(), n.limbs().as_ptr());
        assert_eq!(heap.stats().live_entries, 2);
    }

    #[test]
    fn shrink_requires_remaining_limb() {
        let heap = Heap::new();
        let mut n = BigInt::from_i64(&heap, 3).unwrap();
        n.grow(2).unwrap();
        assert_eq!(
            n.shrink(3),
            Err(BigIntError::ShrinkUnderflow { by: 3, len: 3 })
        );
        n.shrink(2).unwrap();
        assert_eq!(n.limbs(), &[3]);
    }

    #[test]
    fn shrink_if_can_keeps_sign_limb() {
        let heap = Heap::new();
        let mut n = BigInt::from_parts(&heap, &[0x8000_0000, 0, 0, 0], &[], 10).unwrap();
        assert_eq!(n.limbs(), &[0x8000_0000, 0]);
        n.shrink_if_can().unwrap();
        assert_eq!(n.limbs(), &[0x8000_0000, 0]);
    }

    #[test]
    fn equality_ignores_width() {
        let heap = Heap::new();
        let mut wide = BigInt::from_i64(&heap, -42).unwrap();
        wide.grow(5).unwrap();
        assert_eq!(wide, BigInt::from_i64(&heap, -42).unwrap());
        assert_ne!(wide, BigInt::from_i64(&heap, 42).unwrap());
    }

    #[test]
    fn take_resets_source() {
        let heap = Heap::new();
        let mut n = BigInt::from_i64(&heap, 99).unwrap();
        let moved = n.take();
        assert_eq!(moved.to_i64(), Some(99));
        assert!(n.is_empty());
        assert_eq!(n.capacity(), 0);
        assert_eq!(n.precision(), DEFAULT_PRECISION);
    }

    #[test]
    fn clone_is_deep_and_accounted() {
        let heap = Heap::new();
        let n = BigInt::from_i64(&heap, 1 << 40).unwrap();
        let before = heap.stats().live_entries;
        let copy = n.clone();
        assert_eq!(heap.stats().live_entries, before + 1);
        assert_eq!(copy, n);
        drop(copy);
        drop(n);
        assert_eq!(heap.stats().current_bytes, 0);
    }

    #[test]
    fn decimal_parts_are_unsupported() {
        let heap = Heap::new();
        assert!(matches!(
            BigInt::from_parts(&heap, &[1], &[5], 10),
            Err(BigIntError::Unsupported { .. })
        ));
    }

    #[test]
    fn to_i64_bounds() {
        let heap = Heap::new();
        let max = BigInt::from_i64(&heap, i64::MAX).unwrap();
        assert_eq!(max.to_i64(), Some(i64::MAX));
        let min = BigInt::from_i64(&heap, i64::MIN).unwrap();
        assert_eq!(min.to_i64(), Some(i64::MIN));
        let too_big = BigInt::from_parts(&heap, &[0, 0, 1], &[], 10).unwrap();
        assert_eq!(too_big.to_i64(), None);
    }
}
