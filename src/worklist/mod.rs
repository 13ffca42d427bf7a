//! Pooled address worklists for collector bookkeeping
//!
//! A collector in the middle of tracing cannot call back into the allocator
//! it is collecting. This module provides the bookkeeping structures that
//! make that possible:
//! - [`pool`]: a cache of reusable fixed-capacity chunks
//! - [`list`]: LIFO address stacks (mark stacks, remembered sets) built from
//!   pooled chunks
//!
//! Chunks retired by one list are reused by the next, so steady-state
//! collector cycles push and pop addresses without growing the host heap.

pub mod list;
pub mod pool;

/// Number of address slots per chunk in a default pool; keeps a chunk with
/// its header just under 8 KiB
pub const DEFAULT_CHUNK_CAPACITY: usize = 1019;
