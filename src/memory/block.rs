//! A single simulated allocation
//!
//! [`Block`] is one fixed-size run of bytes with the checking a real
//! allocator never gives you: per-byte initialization tracking, bounds
//! enforcement on every access, and a tombstone state after free so that
//! late accesses are reported as use-after-free rather than corrupting
//! unrelated data.

use super::value::Address;
use crate::errors::MemoryError;

/// A block of simulated memory
#[derive(Debug, Clone)]
pub struct Block {
    base_address: Address,
    size: usize,
    storage: Vec<u8>,
    initialized: Vec<bool>, // Per-byte initialization tracking
    freed: bool,
}

impl Block {
    /// Create a fully uninitialized block at a base address
    pub fn new(base_address: Address, size: usize) -> Self {
        Block {
            base_address,
            size,
            storage: vec![0; size],
            initialized: vec![false; size],
            freed: false,
        }
    }

    /// Base address assigned at allocation, stable for the block's lifetime
    pub fn base_address(&self) -> Address {
        self.base_address
    }

    /// Size in bytes, fixed at creation
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if this block has been freed
    pub fn is_freed(&self) -> bool {
        self.freed
    }

    /// Check if an absolute address falls inside this block's extent
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base_address && address - self.base_address < self.size as u64
    }

    /// Absolute address of the byte at `offset`, for error reporting
    fn address_at(&self, offset: usize) -> Address {
        self.base_address.saturating_add(offset as u64)
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<(), MemoryError> {
        if self.freed {
            return Err(MemoryError::UseAfterFree {
                address: self.address_at(offset),
            });
        }
        match offset.checked_add(length) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(MemoryError::OutOfBounds {
                address: self.address_at(offset),
                length,
            }),
        }
    }

    /// Write bytes at an offset, marking the covered range initialized
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        self.check_range(offset, bytes.len())?;
        self.storage[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.initialized[offset..offset + bytes.len()].fill(true);
        Ok(())
    }

    /// Read bytes at an offset; every byte in the range must have been written
    pub fn read(&self, offset: usize, length: usize) -> Result<&[u8], MemoryError> {
        self.check_range(offset, length)?;
        if let Some(i) = self.initialized[offset..offset + length]
            .iter()
            .position(|&init| !init)
        {
            return Err(MemoryError::UninitializedRead {
                address: self.address_at(offset + i),
            });
        }
        Ok(&self.storage[offset..offset + length])
    }

    /// Free the block, releasing its buffers
    ///
    /// The record itself is retained as a tombstone so that later accesses
    /// fail with [`MemoryError::UseAfterFree`] and a second free fails with
    /// [`MemoryError::DoubleFree`].
    pub fn free(&mut self) -> Result<(), MemoryError> {
        if self.freed {
            return Err(MemoryError::DoubleFree {
                address: self.base_address,
            });
        }
        self.freed = true;
        self.storage = Vec::new();
        self.initialized = Vec::new();
        Ok(())
    }
}
