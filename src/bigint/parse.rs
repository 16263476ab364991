//! Decimal parsing and rendering
//!
//! Parsing accepts `-`? digits (`.` digits)?. Only the integral part is
//! supported; a non-empty fractional part is rejected.

use super::{BigInt, BigIntError, Limb, SignedLimb, LIMB_BITS};
use crate::memory::heap::Heap;
use std::fmt;

/// Largest power of ten that fits in a limb, used as the rendering radix
const DECIMAL_CHUNK: u64 = 1_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 9;

impl BigInt {
    /// Parse a decimal numeral with an optional leading `-`
    pub fn parse(heap: &Heap, text: &str, precision: Limb) -> Result<BigInt, BigIntError> {
        let error = |message: String| BigIntError::Parse {
            input: text.to_string(),
            message,
        };

        if text.is_empty() {
            return Err(error("Empty string".to_string()));
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut fixed_end = unsigned.len();
        let mut has_fraction = false;
        let mut seen_point = false;
        for (i, c) in unsigned.char_indices() {
            if c == '.' {
                if seen_point {
                    return Err(error(format!(
                        "Encountered a second decimal point in '{}'",
                        text
                    )));
                }
                seen_point = true;
                has_fraction = i + 1 < unsigned.len();
                fixed_end = i;
            } else if !c.is_ascii_digit() {
                return Err(error(format!("'{}' is not a digit in '{}'", c, text)));
            }
        }

        let fixed = &unsigned[..fixed_end];
        if fixed.is_empty() {
            return Err(error("No integral digits".to_string()));
        }
        if has_fraction {
            return Err(BigIntError::Unsupported {
                feature: "Decimal parsing",
            });
        }

        let mut value = BigInt::zero(heap)?;
        value.precision = precision;
        let mut multiplier = BigInt::from_i64(heap, 1)?;

        // Horner from the least significant digit
        for digit in fixed.bytes().rev() {
            let mut term = multiplier.clone();
            term.mul_small(SignedLimb::from(digit - b'0'))?;
            value.add_assign(&term)?;
            multiplier.mul_small(10)?;
        }

        if negative {
            value.negate()?;
        }
        value.shrink_if_can()?;
        Ok(value)
    }

    /// Unsigned magnitude of the value as little-endian limbs
    fn magnitude(&self) -> Vec<Limb> {
        let mut limbs = self.limbs().to_vec();
        if self.is_negative() {
            let mut carry = true;
            for limb in &mut limbs {
                let (sum, overflow) = (!*limb).overflowing_add(carry as Limb);
                *limb = sum;
                carry = overflow;
            }
        }
        limbs
    }
}

/// Divide `limbs` in place by `divisor`, returning the remainder
fn div_rem_small(limbs: &mut [Limb], divisor: u64) -> u64 {
    let mut remainder = 0u64;
    for limb in limbs.iter_mut().rev() {
        let current = (remainder << LIMB_BITS) | u64::from(*limb);
        *limb = (current / divisor) as Limb;
        remainder = current % divisor;
    }
    remainder
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut magnitude = self.magnitude();
        let mut chunks = Vec::new();
        while magnitude.iter().any(|&limb| limb != 0) {
            chunks.push(div_rem_small(&mut magnitude, DECIMAL_CHUNK));
        }

        let mut digits = String::new();
        if self.is_negative() {
            digits.push('-');
        }
        match chunks.split_last() {
            None => digits.push('0'),
            Some((most, rest)) => {
                digits.push_str(&most.to_string());
                for chunk in rest.iter().rev() {
                    digits.push_str(&format!("{:0width$}", chunk, width = DECIMAL_CHUNK_DIGITS));
                }
            }
        }
        f.pad(&digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_integers() {
        let heap = Heap::new();
        let cases = ["0", "7", "-5", "4294967296", "-9223372036854775808", "12."];
        let expected = [0, 7, -5, 1 << 32, i64::MIN, 12];
        for (text, value) in cases.iter().zip(expected) {
            let parsed = BigInt::parse(&heap, text, 10).unwrap();
            assert_eq!(parsed.to_i64(), Some(value), "parsing {}", text);
        }
    }

    #[test]
    fn rejects_malformed_numerals() {
        let heap = Heap::new();
        for text in ["", "-", "1.2.3", "12a", "--1", "."] {
            assert!(
                matches!(
                    BigInt::parse(&heap, text, 10),
                    Err(BigIntError::Parse { .. })
                ),
                "{:?} should not parse",
                text
            );
        }
    }

    #[test]
    fn rejects_fractional_digits() {
        let heap = Heap::new();
        assert_eq!(
            BigInt::parse(&heap, "3.14", 10).unwrap_err(),
            BigIntError::Unsupported {
                feature: "Decimal parsing"
            }
        );
    }

    #[test]
    fn renders_large_values() {
        let heap = Heap::new();
        let text = "-123456789012345678901234567890";
        let value = BigInt::parse(&heap, text, 10).unwrap();
        assert_eq!(value.to_string(), text);
        assert_eq!(BigInt::zero(&heap).unwrap().to_string(), "0");
        assert_eq!(BigInt::empty(&heap).to_string(), "0");
    }
}
