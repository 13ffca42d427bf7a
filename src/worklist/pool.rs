//! Reusable chunk pool
//!
//! [`ChunkPool`] caches the fixed-capacity chunks that address lists are
//! built from. Chunks handed back by retired lists are threaded into an
//! intrusive stack through their own `previous` links, so pooling itself
//! allocates nothing; the host allocator is only touched when the pool runs
//! dry. Once created, a chunk is never returned to the host allocator while
//! the pool lives, trading memory for allocation-free collector paths.
//!
//! A pool is shared between lists as an `Rc<ChunkPool>`; interior
//! mutability keeps sharing single-threaded and explicit.

use super::DEFAULT_CHUNK_CAPACITY;
use crate::memory::value::{Address, NULL_ADDRESS};
use log::debug;
use std::cell::{Cell, RefCell};

/// A fixed-capacity run of address slots, linkable into a stack
#[derive(Debug)]
pub struct Chunk {
    pub(crate) previous: Option<Box<Chunk>>,
    pub(crate) length: usize,
    pub(crate) items: Box<[Address]>,
}

impl Chunk {
    fn new(capacity: usize) -> Box<Chunk> {
        Box::new(Chunk {
            previous: None,
            length: 0,
            items: vec![NULL_ADDRESS; capacity].into_boxed_slice(),
        })
    }
}

/// A cache of currently-unused chunks, all of one fixed capacity
#[derive(Debug)]
pub struct ChunkPool {
    chunk_capacity: usize,
    unused: RefCell<Option<Box<Chunk>>>,
    available: Cell<usize>,
    created: Cell<usize>,
}

impl ChunkPool {
    /// Create a pool whose chunks hold `chunk_capacity` addresses each
    ///
    /// Panics if `chunk_capacity` is zero.
    pub fn new(chunk_capacity: usize) -> Self {
        assert!(chunk_capacity > 0, "chunk capacity must be at least 1");
        ChunkPool {
            chunk_capacity,
            unused: RefCell::new(None),
            available: Cell::new(0),
            created: Cell::new(0),
        }
    }

    /// Take a chunk from the pool, allocating a fresh one only if the pool
    /// is empty
    ///
    /// The returned chunk always has `length == 0` and no `previous` link.
    pub fn get(&self) -> Box<Chunk> {
        let mut unused = self.unused.borrow_mut();
        match unused.take() {
            Some(mut chunk) => {
                *unused = chunk.previous.take();
                chunk.length = 0;
                self.available.set(self.available.get() - 1);
                chunk
            }
            None => {
                debug!(
                    "chunk pool empty, allocating a fresh {}-slot chunk",
                    self.chunk_capacity
                );
                self.created.set(self.created.get() + 1);
                Chunk::new(self.chunk_capacity)
            }
        }
    }

    /// Return a chunk to the pool for reuse
    ///
    /// Contents are not validated; stale addresses are cleared on the next
    /// `get`. The chunk must have come from a pool of the same capacity.
    pub fn put(&self, mut chunk: Box<Chunk>) {
        let mut unused = self.unused.borrow_mut();
        chunk.previous = unused.take();
        *unused = Some(chunk);
        self.available.set(self.available.get() + 1);
    }

    /// Address slots per chunk
    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Number of chunks currently sitting in the pool
    pub fn available_chunks(&self) -> usize {
        self.available.get()
    }

    /// Number of chunks this pool has ever created
    pub fn total_chunks(&self) -> usize {
        self.created.get()
    }
}

impl Default for ChunkPool {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CAPACITY)
    }
}

// Dropping the chain as-is would recurse one stack frame per chunk
impl Drop for ChunkPool {
    fn drop(&mut self) {
        let mut cursor = self.unused.get_mut().take();
        while let Some(mut chunk) = cursor {
            cursor = chunk.previous.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_allocates_when_empty() {
        let pool = ChunkPool::new(8);
        let first = pool.get();
        let second = pool.get();

        assert_eq!(first.items.len(), 8);
        assert_eq!(first.length, 0);
        assert!(first.previous.is_none());
        assert_eq!(second.items.len(), 8);
        assert_eq!(pool.total_chunks(), 2);
        assert_eq!(pool.available_chunks(), 0);
    }

    #[test]
    fn test_put_then_get_reuses() {
        let pool = ChunkPool::new(8);
        let mut chunk = pool.get();
        chunk.items[0] = 0xbeef;
        chunk.length = 5;
        pool.put(chunk);
        assert_eq!(pool.available_chunks(), 1);

        let reused = pool.get();
        assert_eq!(pool.total_chunks(), 1);
        assert_eq!(pool.available_chunks(), 0);
        // Same allocation handed back, reset for use
        assert_eq!(reused.items[0], 0xbeef);
        assert_eq!(reused.length, 0);
        assert!(reused.previous.is_none());
    }

    #[test]
    fn test_pool_is_a_stack() {
        let pool = ChunkPool::new(4);
        let mut first = pool.get();
        let mut second = pool.get();
        first.items[0] = 1;
        second.items[0] = 2;

        pool.put(first);
        pool.put(second);
        assert_eq!(pool.get().items[0], 2);
        assert_eq!(pool.get().items[0], 1);
    }

    #[test]
    fn test_deep_pool_drops_cleanly() {
        let pool = ChunkPool::new(1);
        let chunks: Vec<_> = (0..200_000).map(|_| pool.get()).collect();
        for chunk in chunks {
            pool.put(chunk);
        }
        assert_eq!(pool.available_chunks(), 200_000);
        // Teardown walks the chain without a stack frame per chunk
        drop(pool);
    }

    #[test]
    fn test_default_capacity() {
        let pool = ChunkPool::default();
        assert_eq!(pool.chunk_capacity(), DEFAULT_CHUNK_CAPACITY);
        assert_eq!(pool.chunk_capacity(), 1019);
    }

    #[test]
    #[should_panic(expected = "chunk capacity")]
    fn test_zero_capacity_rejected() {
        ChunkPool::new(0);
    }
}
