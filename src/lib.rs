//! # Introduction
//!
//! simheap is a test bench for garbage collectors: a simulated
//! byte-addressable heap that checks every access, plus the pooled address
//! lists a collector needs for its own bookkeeping while it works on that
//! heap.
//!
//! ## Collector test loop
//!
//! ```text
//! Collector under test → malloc/free/read/write → Heap (fully checked)
//!                      → append/pop → AddressList ← chunks ← ChunkPool
//! ```
//!
//! 1. [`memory`] — the simulated heap: [`memory::block::Block`] allocations
//!    with per-byte initialization tracking, the [`memory::heap::Heap`]
//!    resolving addresses and enforcing a capacity limit, fixed-width
//!    struct encoding over [`memory::value::Value`], and a
//!    [`memory::registry::ObjectRegistry`] giving host values synthetic
//!    addresses.
//! 2. [`worklist`] — [`worklist::list::AddressList`] mark stacks built from
//!    chunks recycled through a shared [`worklist::pool::ChunkPool`], so
//!    tracing never calls back into the allocator being collected.
//! 3. [`errors`] — [`errors::MemoryError`], every memory-rule violation the
//!    model detects.
//!
//! ## Checked rules
//!
//! Bounds on every access, reads only of written bytes, no access to freed
//! blocks, no double or invalid frees, and strict capacity accounting.
//! Violations surface as errors at the faulting operation instead of as
//! corruption discovered much later.

pub mod errors;
pub mod memory;
pub mod worklist;
