//! Heap accounting for integer limb storage
//!
//! This module provides the allocator every [`BigInt`] grows and shrinks
//! through:
//! - Explicit allocate / reallocate / release of limb blocks
//! - An allocation table keyed by block address
//! - Monotone counters and high-water marks for bytes and live entries
//! - Untracked-release detection
//!
//! # Ownership
//!
//! [`Heap`] is a cheap handle onto one accounting context. The context is
//! built once at startup and shared by every number created from it; the
//! blocks themselves are owned exclusively by their [`HeapBlock`] holder.
//!
//! [`BigInt`]: crate::bigint::BigInt

use crate::bigint::{BigIntError, Limb};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::mem::size_of;
use std::rc::Rc;

/// Address of a live block, as recorded in the allocation table
pub type Address = usize;

const LIMB_BYTES: usize = size_of::<Limb>();

/// An owned, contiguous run of limbs handed out by a [`Heap`]
#[derive(Debug)]
pub struct HeapBlock {
    data: Box<[Limb]>,
}

impl HeapBlock {
    /// Address used as the allocation table key
    pub fn address(&self) -> Address {
        self.data.as_ptr() as Address
    }

    /// Number of limbs in the block
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn limbs(&self) -> &[Limb] {
        &self.data
    }

    pub fn limbs_mut(&mut self) -> &mut [Limb] {
        &mut self.data
    }

    fn bytes(&self) -> usize {
        self.data.len() * LIMB_BYTES
    }
}

/// Counters derived from the allocation table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub allocations: u64,
    pub reallocations: u64,
    pub releases: u64,
    pub current_bytes: usize,
    pub peak_bytes: usize,
    pub live_entries: usize,
    pub peak_entries: usize,
}

#[derive(Debug, Default)]
struct HeapAccounting {
    allocations: FxHashMap<Address, usize>,
    stats: HeapStats,
}

impl HeapAccounting {
    fn track(&mut self, address: Address, bytes: usize) {
        self.allocations.insert(address, bytes);
        self.stats.current_bytes += bytes;
        self.refresh_peaks();
    }

    fn untrack(&mut self, address: Address) -> Option<usize> {
        let bytes = self.allocations.remove(&address)?;
        self.stats.current_bytes -= bytes;
        self.stats.live_entries = self.allocations.len();
        Some(bytes)
    }

    fn refresh_peaks(&mut self) {
        self.stats.live_entries = self.allocations.len();
        self.stats.peak_bytes = self.stats.peak_bytes.max(self.stats.current_bytes);
        self.stats.peak_entries = self.stats.peak_entries.max(self.stats.live_entries);
    }
}

/// Handle onto one heap accounting context
#[derive(Debug, Clone, Default)]
pub struct Heap {
    inner: Rc<RefCell<HeapAccounting>>,
}

impl Heap {
    /// Create a fresh accounting context with an empty allocation table
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-filled block of `limbs` limbs
    pub fn allocate(&self, limbs: usize) -> Result<HeapBlock, BigIntError> {
        let mut data: Vec<Limb> = Vec::new();
        data.try_reserve_exact(limbs)
            .map_err(|_| BigIntError::AllocationFailure {
                requested: limbs * LIMB_BYTES,
            })?;
        data.resize(limbs, 0);

        let block = HeapBlock {
            data: data.into_boxed_slice(),
        };

        let mut accounting = self.inner.borrow_mut();
        accounting.stats.allocations += 1;
        accounting.track(block.address(), block.bytes());
        Ok(block)
    }

    /// Register a block built from an existing limb vector (used for deep copies)
    pub fn adopt(&self, limbs: Vec<Limb>) -> HeapBlock {
        let block = HeapBlock {
            data: limbs.into_boxed_slice(),
        };

        let mut accounting = self.inner.borrow_mut();
        accounting.stats.allocations += 1;
        accounting.track(block.address(), block.bytes());
        block
    }

    /// Resize a block to `limbs` limbs, preserving its prefix.
    ///
    /// A `None` source behaves like [`Heap::allocate`]. When the resize fails
    /// the source block is gone and its table entry is released with it.
    pub fn reallocate(
        &self,
        block: Option<HeapBlock>,
        limbs: usize,
    ) -> Result<HeapBlock, BigIntError> {
        let Some(block) = block else {
            return self.allocate(limbs);
        };

        let old_address = block.address();
        let mut data = Vec::from(block.data);

        if limbs > data.len() {
            if data.try_reserve_exact(limbs - data.len()).is_err() {
                let mut accounting = self.inner.borrow_mut();
                if accounting.untrack(old_address).is_some() {
                    accounting.stats.releases += 1;
                }
                return Err(BigIntError::AllocationFailure {
                    requested: limbs * LIMB_BYTES,
                });
            }
            data.resize(limbs, 0);
        } else {
            data.truncate(limbs);
        }

        let block = HeapBlock {
            data: data.into_boxed_slice(),
        };

        let mut accounting = self.inner.borrow_mut();
        if accounting.untrack(old_address).is_none() {
            return Err(BigIntError::UntrackedFree {
                address: old_address,
            });
        }
        accounting.stats.reallocations += 1;
        accounting.track(block.address(), block.bytes());
        Ok(block)
    }

    /// Release a block back to the heap
    pub fn release(&self, block: HeapBlock) -> Result<(), BigIntError> {
        let address = block.address();
        drop(block);

        let mut accounting = self.inner.borrow_mut();
        match accounting.untrack(address) {
            Some(_) => {
                accounting.stats.releases += 1;
                Ok(())
            }
            None => Err(BigIntError::UntrackedFree { address }),
        }
    }

    /// Current counters
    pub fn stats(&self) -> HeapStats {
        self.inner.borrow().stats
    }

    /// Live allocations sorted by address (for UI display)
    pub fn allocations(&self) -> Vec<(Address, usize)> {
        let accounting = self.inner.borrow();
        let mut entries: Vec<_> = accounting
            .allocations
            .iter()
            .map(|(&address, &bytes)| (address, bytes))
            .collect();
        entries.sort_unstable_by_key(|(address, _)| *address);
        entries
    }

    /// Whether `block` is recorded in this context's allocation table
    pub fn tracks(&self, block: &HeapBlock) -> bool {
        self.inner.borrow().allocations.contains_key(&block.address())
    }
}
