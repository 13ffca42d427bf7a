//! Error types for the simulated heap
//!
//! This module defines [`MemoryError`], which represents every memory-rule
//! violation the simulation can detect (as opposed to bugs in the simulation
//! itself, which panic).
//!
//! All memory errors are fatal to the operation that raised them - the
//! operation completes nothing and leaves the heap unchanged.

use crate::memory::value::Address;
use std::fmt;

/// Memory-rule violations detected by the simulation
#[derive(Debug, Clone)]
pub enum MemoryError {
    /// Access outside a block's extent, or an address inside no live block
    OutOfBounds { address: Address, length: usize },

    /// Read of a byte that was never written
    UninitializedRead { address: Address },

    /// Access to a freed block
    UseAfterFree { address: Address },

    /// Freeing an already-freed block
    DoubleFree { address: Address },

    /// Freeing an address that is not a live block's base address
    InvalidFree { address: Address },

    /// Allocation would exceed the heap's capacity
    OutOfMemory {
        requested: usize,
        in_use: usize,
        limit: usize,
    },

    /// Object-registry lookup of an address that was never registered
    InvalidAddress { address: Address },

    /// Pop from a strict-mode address list with no elements
    EmptyPop,
}

impl MemoryError {
    /// Get the address the violation occurred at, if the error carries one
    pub fn address(&self) -> Option<Address> {
        match self {
            MemoryError::OutOfBounds { address, .. } => Some(*address),
            MemoryError::UninitializedRead { address } => Some(*address),
            MemoryError::UseAfterFree { address } => Some(*address),
            MemoryError::DoubleFree { address } => Some(*address),
            MemoryError::InvalidFree { address } => Some(*address),
            MemoryError::InvalidAddress { address } => Some(*address),
            MemoryError::OutOfMemory { .. } => None,
            MemoryError::EmptyPop => None,
        }
    }
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OutOfBounds { address, length } => {
                write!(
                    f,
                    "Out of bounds: {} byte{} at address 0x{:x}",
                    length,
                    if *length == 1 { "" } else { "s" },
                    address
                )
            }
            MemoryError::UninitializedRead { address } => {
                write!(f, "Uninitialized read at address 0x{:x}", address)
            }
            MemoryError::UseAfterFree { address } => {
                write!(f, "Use-after-free: address 0x{:x} has been freed", address)
            }
            MemoryError::DoubleFree { address } => {
                write!(f, "Double free detected at address 0x{:x}", address)
            }
            MemoryError::InvalidFree { address } => {
                write!(
                    f,
                    "Invalid free: address 0x{:x} is not a live allocation",
                    address
                )
            }
            MemoryError::OutOfMemory {
                requested,
                in_use,
                limit,
            } => {
                write!(
                    f,
                    "Out of memory: requested {} bytes, {} already allocated, limit is {}",
                    requested, in_use, limit
                )
            }
            MemoryError::InvalidAddress { address } => {
                write!(
                    f,
                    "Invalid address: no object registered at 0x{:x}",
                    address
                )
            }
            MemoryError::EmptyPop => {
                write!(f, "Pop from an empty address list")
            }
        }
    }
}

impl std::error::Error for MemoryError {}
