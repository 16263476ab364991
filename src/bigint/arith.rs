//! Arithmetic on [`BigInt`]
//!
//! Addition works limb by limb through a [`DoubleLimb`] accumulator and
//! widens the result by one sign limb when two same-signed operands produce
//! a result of the other sign. Multiplication comes in two forms:
//!
//! - [`BigInt::mul`]: shift-and-add over the bits of the multiplier. This is
//!   the general product.
//! - [`BigInt::mul_assign_repeated`] / [`BigInt::mul_small`]: repeated
//!   addition, linear in the multiplier. Only meant for small multipliers
//!   such as digit accumulation while parsing.

use super::{limb_is_negative, sign_fill, BigInt, BigIntError, DoubleLimb, Limb, SignedLimb, LIMB_BITS};

impl BigInt {
    /// `self += rhs`
    pub fn add_assign(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.add_signed_limbs(rhs.limbs())
    }

    /// `self += rhs` for a single signed limb
    pub fn add_small(&mut self, rhs: SignedLimb) -> Result<(), BigIntError> {
        self.add_signed_limbs(&[rhs as Limb])
    }

    /// `self -= rhs`
    pub fn sub_assign(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        let mut negated = rhs.clone();
        negated.negate()?;
        self.add_assign(&negated)
    }

    fn add_signed_limbs(&mut self, rhs: &[Limb]) -> Result<(), BigIntError> {
        let Some(&rhs_top) = rhs.last() else {
            return Ok(());
        };

        if self.len() < rhs.len() {
            self.grow(rhs.len() - self.len())?;
        }

        let negative = self.is_negative();
        let rhs_negative = limb_is_negative(rhs_top);
        let rhs_fill = sign_fill(rhs_negative);

        let mut carry: DoubleLimb = 0;
        for (i, limb) in self.limbs_mut().iter_mut().enumerate() {
            let other = rhs.get(i).copied().unwrap_or(rhs_fill);
            let sum = DoubleLimb::from(*limb) + DoubleLimb::from(other) + carry;
            carry = sum >> LIMB_BITS;
            *limb = sum as Limb;
        }

        // Same-signed operands whose sum flipped sign overflowed the width
        if negative == rhs_negative && self.is_negative() != negative {
            self.grow_signed(1, negative)?;
        }
        Ok(())
    }

    /// Two's-complement negation: complement every limb, then add one
    pub fn negate(&mut self) -> Result<(), BigIntError> {
        if self.is_empty() {
            return Ok(());
        }
        for limb in self.limbs_mut() {
            *limb = !*limb;
        }
        self.add_small(1)
    }

    /// `self *= rhs` by repeated addition of the original value.
    ///
    /// Steps a copy of `rhs` toward zero, so the cost is linear in the
    /// magnitude of `rhs`.
    pub fn mul_assign_repeated(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        if rhs.is_zero() {
            return self.set_zero();
        }

        let copy = self.clone();
        let mut counter = rhs.clone();
        let step = if rhs.is_negative() { 1 } else { -1 };

        counter.add_small(step)?;
        while !counter.is_zero() {
            self.add_assign(&copy)?;
            counter.add_small(step)?;
        }

        if rhs.is_negative() {
            self.negate()?;
        }
        Ok(())
    }

    /// `self *= rhs` by repeated addition, for small scalar multipliers
    pub fn mul_small(&mut self, rhs: SignedLimb) -> Result<(), BigIntError> {
        if rhs == 0 {
            return self.set_zero();
        }

        let copy = self.clone();
        for _ in 1..rhs.unsigned_abs() {
            self.add_assign(&copy)?;
        }

        if rhs < 0 {
            self.negate()?;
        }
        Ok(())
    }

    /// Shift-and-add product.
    ///
    /// Both operands are widened to twice the longer length, which holds any
    /// product exactly; the result is truncated back to that width and
    /// canonicalized.
    pub fn mul(&self, rhs: &BigInt) -> Result<BigInt, BigIntError> {
        let mut product = BigInt::zero(self.heap())?;
        if self.is_empty() || rhs.is_empty() {
            return Ok(product);
        }

        let total_len = self.len().max(rhs.len()) * 2;
        let mut shifted = self.clone();
        let mut multiplier = rhs.clone();
        product.resize(total_len)?;
        shifted.resize(total_len)?;
        multiplier.resize(total_len)?;

        for i in 0..multiplier.bit_width() {
            if multiplier.bit(i) {
                product.add_assign(&shifted)?;
            }
            shifted.shift_left(1);
        }

        if product.len() > total_len {
            product.shrink(product.len() - total_len)?;
        }
        product.shrink_if_can()?;
        Ok(product)
    }

    /// Shift left by `by` bits within the current width
    pub fn shift_left(&mut self, by: usize) {
        let bits = self.bit_width();
        if by >= bits {
            self.limbs_mut().fill(0);
            return;
        }
        if by == 0 {
            return;
        }

        let (limb_shift, bit_shift) = (by / LIMB_BITS, by % LIMB_BITS);
        let limbs = self.limbs_mut();

        // High to low so every source limb is read before it is overwritten
        for i in (limb_shift..limbs.len()).rev() {
            let src = i - limb_shift;
            let mut moved = limbs[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                moved |= limbs[src - 1] >> (LIMB_BITS - bit_shift);
            }
            limbs[i] = moved;
        }
        self.clear_first_bits(by);
    }

    /// Clear bits `0..before`
    pub fn clear_first_bits(&mut self, before: usize) {
        let (unit, unit_at) = (before / LIMB_BITS, before % LIMB_BITS);
        let limbs = self.limbs_mut();
        let full = unit.min(limbs.len());
        limbs[..full].fill(0);
        if let Some(limb) = limbs.get_mut(unit) {
            *limb = (*limb >> unit_at) << unit_at;
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
    fn add_widens_on_positive_overflow() {
        let heap = Heap::new();
        let mut a = n(&heap, i32::MAX as i64);
        a.add_assign(&n(&heap, i32::MAX as i64)).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_i64(), Some(2 * i32::MAX as i64));
    }

    #[test]
    fn add_widens_on_negative_overflow() {
        let heap = Heap::new();
        let mut a = n(&heap, i32::MIN as i64);
        a.add_assign(&n(&heap, i32::MIN as i64)).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_i64(), Some(2 * i32::MIN as i64));
    }

    #[test]
    fn add_sign_extends_shorter_operand() {
        let heap = Heap::new();
        let mut a = n(&heap, 1 << 32);
        a.add_assign(&n(&heap, -1)).unwrap();
        assert_eq!(a.to_i64(), Some((1 << 32) - 1));
    }

    #[test]
    fn negate_min_limb_widens() {
        let heap = Heap::new();
        let mut a = n(&heap, i32::MIN as i64);
        a.negate().unwrap();
        assert_eq!(a.to_i64(), Some(-(i32::MIN as i64)));
    }

    #[test]
    fn repeated_multiplication_handles_signs() {
        let heap = Heap::new();
        let mut a = n(&heap, 7);
        a.mul_assign_repeated(&n(&heap, -6)).unwrap();
        assert_eq!(a.to_i64(), Some(-42));

        let mut b = n(&heap, -3);
        b.mul_small(-4).unwrap();
        assert_eq!(b.to_i64(), Some(12));

        let mut c = n(&heap, 123);
        c.mul_small(0).unwrap();
        assert!(c.is_zero());
    }

    #[test]
    fn shift_and_add_product() {
        let heap = Heap::new();
        let cases = [
            (3, 4, 12),
            (-3, 4, -12),
            (3, -4, -12),
            (-3, -4, 12),
            (0, -99, 0),
            (i32::MAX as i64, i32::MAX as i64, (i32::MAX as i64).pow(2)),
            (i32::MIN as i64, i32::MIN as i64, (i32::MIN as i64).pow(2)),
        ];
        for (a, b, expected) in cases {
            let product = n(&heap, a).mul(&n(&heap, b)).unwrap();
            assert_eq!(product.to_i64(), Some(expected), "{} * {}", a, b);
        }
    }

    #[test]
    fn shift_left_moves_across_limbs() {
        let heap = Heap::new();
        let mut a = n(&heap, 1);
        a.grow(2).unwrap();
        a.shift_left(40);
        assert_eq!(a.to_i64(), Some(1 << 40));
        a.shift_left(a.bit_width());
        assert!(a.is_zero());
    }
}
