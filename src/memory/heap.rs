//! Simulated heap
//!
//! This module provides the heap a collector under test allocates from:
//! - Explicit allocation/deallocation (malloc/free) under an optional
//!   capacity limit
//! - Address-to-block resolution for interior pointers
//! - Raw byte access, fixed-width struct encoding, and memcopy
//! - Tombstone tracking for freed blocks (use-after-free and double-free
//!   detection)
//! - A registry handing host values synthetic addresses
//!
//! Every operation either fully completes or fails with a
//! [`MemoryError`] and no effect; there is no partial success to reason
//! about when a collector test goes wrong.

use super::block::Block;
use super::format_size;
use super::registry::{ObjectHandle, ObjectRegistry};
use super::value::{Address, FieldType, Value};
use crate::errors::MemoryError;
use log::trace;
use std::collections::BTreeMap;

/// First block address; non-zero so no block address equals the null sentinel
pub const HEAP_ADDRESS_START: Address = 0x1000_0000;

/// The simulated heap
#[derive(Debug)]
pub struct Heap {
    // Ordered by base address; freed blocks stay behind as tombstones
    blocks: BTreeMap<Address, Block>,
    next_address: Address,
    used: usize,
    capacity: Option<usize>,
    registry: ObjectRegistry,
}

impl Heap {
    /// Create a heap with unlimited capacity
    pub fn new() -> Self {
        Heap {
            blocks: BTreeMap::new(),
            next_address: HEAP_ADDRESS_START,
            used: 0,
            capacity: None,
            registry: ObjectRegistry::new(),
        }
    }

    /// Create a heap with a maximum capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Heap {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Allocate a block of memory
    ///
    /// Addresses are assigned monotonically upward and never reused, so a
    /// freed address can never silently alias a later allocation.
    pub fn malloc(&mut self, size: usize) -> Result<Address, MemoryError> {
        if let Some(limit) = self.capacity {
            match self.used.checked_add(size) {
                Some(total) if total <= limit => {}
                _ => {
                    return Err(MemoryError::OutOfMemory {
                        requested: size,
                        in_use: self.used,
                        limit,
                    });
                }
            }
        }

        let address = self.next_address;
        // Advance by at least one byte so zero-sized blocks get unique bases
        self.next_address += size.max(1) as u64;
        self.blocks.insert(address, Block::new(address, size));
        self.used += size;
        trace!("malloc({}) -> 0x{:x}", size, address);

        Ok(address)
    }

    /// Free a block by its base address (mark as tombstone)
    ///
    /// The block's bytes are released and its size returns to the available
    /// capacity; the tombstone stays behind to catch double frees.
    pub fn free(&mut self, address: Address) -> Result<(), MemoryError> {
        match self.blocks.get_mut(&address) {
            Some(block) if !block.is_freed() => {
                block.free()?;
                self.used -= block.size();
                trace!("free(0x{:x})", address);
                Ok(())
            }
            Some(_) => Err(MemoryError::DoubleFree { address }),
            None => Err(MemoryError::InvalidFree { address }),
        }
    }

    /// Resolve an address to the live block whose extent contains it
    ///
    /// Fails with [`MemoryError::OutOfBounds`] for addresses inside no live
    /// block, including addresses inside a freed one.
    pub fn find_block(&self, address: Address) -> Result<&Block, MemoryError> {
        // The candidate is the block with the greatest base <= address;
        // live extents never overlap, so no other block can contain it
        match self.blocks.range(..=address).next_back() {
            Some((_, block)) if !block.is_freed() && block.contains(address) => Ok(block),
            _ => Err(MemoryError::OutOfBounds { address, length: 1 }),
        }
    }

    fn find_block_mut(&mut self, address: Address) -> Result<&mut Block, MemoryError> {
        match self.blocks.range_mut(..=address).next_back() {
            Some((_, block)) if !block.is_freed() && block.contains(address) => Ok(block),
            _ => Err(MemoryError::OutOfBounds { address, length: 1 }),
        }
    }

    /// Write bytes starting at an address
    pub fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let block = self.find_block_mut(address)?;
        let offset = (address - block.base_address()) as usize;
        block.write(offset, bytes)
    }

    /// Read bytes starting at an address
    pub fn read_bytes(&self, address: Address, length: usize) -> Result<Vec<u8>, MemoryError> {
        let block = self.find_block(address)?;
        let offset = (address - block.base_address()) as usize;
        Ok(block.read(offset, length)?.to_vec())
    }

    /// Encode a sequence of values at an address
    ///
    /// The values are encoded into a scratch buffer first and written with a
    /// single block write, so a failing write leaves no partial struct.
    pub fn set_struct(&mut self, address: Address, values: &[Value]) -> Result<(), MemoryError> {
        let mut buf = Vec::with_capacity(values.iter().map(Value::size).sum());
        for value in values {
            value.encode_into(&mut buf);
        }
        self.write_bytes(address, &buf)
    }

    /// Decode a sequence of values described by a format from an address
    pub fn get_struct(
        &self,
        format: &[FieldType],
        address: Address,
    ) -> Result<Vec<Value>, MemoryError> {
        let bytes = self.read_bytes(address, format_size(format))?;
        let mut values = Vec::with_capacity(format.len());
        let mut offset = 0;
        for field in format {
            values.push(field.decode(&bytes[offset..offset + field.size()]));
            offset += field.size();
        }
        Ok(values)
    }

    /// Copy bytes between two addresses
    ///
    /// The source range is fully read before any destination byte is
    /// written, so overlapping same-block copies never corrupt themselves.
    pub fn memcopy(
        &mut self,
        source: Address,
        destination: Address,
        length: usize,
    ) -> Result<(), MemoryError> {
        let bytes = self.read_bytes(source, length)?;
        self.write_bytes(destination, &bytes)?;
        trace!("memcopy 0x{:x} -> 0x{:x} ({} bytes)", source, destination, length);
        Ok(())
    }

    /// Get the synthetic address for a host value, registering it on first
    /// sight (idempotent)
    pub fn get_object_address(&mut self, handle: ObjectHandle) -> Address {
        self.registry.get_address(handle)
    }

    /// Recover the host value registered at a synthetic address
    pub fn get_object(&self, address: Address) -> Result<ObjectHandle, MemoryError> {
        self.registry.get_object(address)
    }

    /// Total bytes held by live blocks
    pub fn used(&self) -> usize {
        self.used
    }

    /// The capacity limit, if finite
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of live (non-freed) blocks
    pub fn live_block_count(&self) -> usize {
        self.live_blocks().count()
    }

    /// Iterate over live blocks in base-address order
    pub fn live_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values().filter(|block| !block.is_freed())
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
