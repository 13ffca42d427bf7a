//! LIFO address stacks over pooled chunks
//!
//! [`AddressList`] records raw addresses for a collector (a mark stack, a
//! remembered set) without ever calling into the managed allocator: growth
//! and shrink relink chunks drawn from and returned to a shared
//! [`ChunkPool`]. Null addresses are filtered on append, so tracing code can
//! push every pointer field it sees and only real targets come back out.

use super::pool::{Chunk, ChunkPool};
use crate::errors::MemoryError;
use crate::memory::value::{Address, NULL_ADDRESS};
use std::rc::Rc;

/// Behavior of [`AddressList::pop`] on a list with no elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopMode {
    /// Popping an empty list fails with [`MemoryError::EmptyPop`]
    Strict,
    /// Popping an empty list returns the null address
    Tolerant,
}

/// A stack of non-null addresses built from linked pooled chunks
#[derive(Debug)]
pub struct AddressList {
    head: Option<Box<Chunk>>, // Some until the chunks are released
    pool: Rc<ChunkPool>,
    pop_mode: PopMode,
}

impl AddressList {
    /// Create an empty list drawing its chunks from `pool`
    pub fn new(pool: Rc<ChunkPool>, pop_mode: PopMode) -> Self {
        let head = Some(pool.get());
        AddressList {
            head,
            pool,
            pop_mode,
        }
    }

    fn head(&self) -> &Chunk {
        match self.head.as_deref() {
            Some(chunk) => chunk,
            None => unreachable!("address list used after release"),
        }
    }

    fn head_mut(&mut self) -> &mut Chunk {
        match self.head.as_deref_mut() {
            Some(chunk) => chunk,
            None => unreachable!("address list used after release"),
        }
    }

    /// Push an address; the null address is ignored
    pub fn append(&mut self, address: Address) {
        if address == NULL_ADDRESS {
            return;
        }
        if self.head().length == self.pool.chunk_capacity() {
            self.enlarge();
        }
        let head = self.head_mut();
        head.items[head.length] = address;
        head.length += 1;
    }

    /// Pop the most recently appended address
    ///
    /// On a list with no elements, [`PopMode::Strict`] fails with
    /// [`MemoryError::EmptyPop`] and [`PopMode::Tolerant`] returns
    /// [`NULL_ADDRESS`].
    pub fn pop(&mut self) -> Result<Address, MemoryError> {
        if !self.non_empty() {
            return match self.pop_mode {
                PopMode::Strict => Err(MemoryError::EmptyPop),
                PopMode::Tolerant => Ok(NULL_ADDRESS),
            };
        }
        if self.head().length == 0 {
            self.shrink();
        }
        let head = self.head_mut();
        head.length -= 1;
        Ok(head.items[head.length])
    }

    /// Check whether any appended address has not been popped yet
    pub fn non_empty(&self) -> bool {
        let head = self.head();
        head.length != 0 || head.previous.is_some()
    }

    /// Tear the list down, returning every chunk to the pool
    ///
    /// Dropping the list has the same effect; `delete` makes the teardown
    /// point explicit in collector code.
    pub fn delete(mut self) {
        self.release_chunks();
    }

    // Link a pooled chunk in as the new head
    fn enlarge(&mut self) {
        let mut fresh = self.pool.get();
        fresh.previous = self.head.take();
        self.head = Some(fresh);
    }

    // Retire the exhausted head chunk; only called with a previous chunk
    // present, which is full by construction
    fn shrink(&mut self) {
        if let Some(mut old) = self.head.take() {
            self.head = old.previous.take();
            self.pool.put(old);
        }
    }

    fn release_chunks(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut chunk) = cursor {
            cursor = chunk.previous.take();
            self.pool.put(chunk);
        }
    }
}

impl Drop for AddressList {
    fn drop(&mut self) {
        self.release_chunks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pool() -> Rc<ChunkPool> {
        Rc::new(ChunkPool::new(4))
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut list = AddressList::new(small_pool(), PopMode::Strict);
        list.append(1);
        list.append(2);
        list.append(3);

        assert_eq!(list.pop().unwrap(), 3);
        assert_eq!(list.pop().unwrap(), 2);
        assert_eq!(list.pop().unwrap(), 1);
        assert!(!list.non_empty());
    }

    #[test]
    fn test_null_append_is_ignored() {
        let mut list = AddressList::new(small_pool(), PopMode::Strict);
        list.append(NULL_ADDRESS);
        assert!(!list.non_empty());

        list.append(7);
        list.append(NULL_ADDRESS);
        list.append(8);
        assert_eq!(list.pop().unwrap(), 8);
        assert_eq!(list.pop().unwrap(), 7);
        assert!(!list.non_empty());
    }

    #[test]
    fn test_strict_empty_pop_fails() {
        let mut list = AddressList::new(small_pool(), PopMode::Strict);
        assert!(matches!(list.pop(), Err(MemoryError::EmptyPop)));

        list.append(5);
        assert_eq!(list.pop().unwrap(), 5);
        assert!(matches!(list.pop(), Err(MemoryError::EmptyPop)));
    }

    #[test]
    fn test_tolerant_empty_pop_returns_null() {
        let mut list = AddressList::new(small_pool(), PopMode::Tolerant);
        assert_eq!(list.pop().unwrap(), NULL_ADDRESS);

        // The list stays usable after an empty pop
        list.append(5);
        assert_eq!(list.pop().unwrap(), 5);
        assert_eq!(list.pop().unwrap(), NULL_ADDRESS);
        assert_eq!(list.pop().unwrap(), NULL_ADDRESS);
    }

    #[test]
    fn test_crosses_chunk_boundaries() {
        let pool = small_pool();
        let mut list = AddressList::new(Rc::clone(&pool), PopMode::Strict);
        let count = pool.chunk_capacity() as Address * 3 + 5;

        for address in 1..=count {
            list.append(address);
        }
        for expected in (1..=count).rev() {
            assert!(list.non_empty());
            assert_eq!(list.pop().unwrap(), expected);
        }
        assert!(!list.non_empty());
        assert!(matches!(list.pop(), Err(MemoryError::EmptyPop)));
    }

    #[test]
    fn test_shrink_returns_chunks_while_popping() {
        let pool = small_pool();
        let mut list = AddressList::new(Rc::clone(&pool), PopMode::Strict);

        // 17 addresses over 4-slot chunks occupy 5 chunks
        for address in 1..=17 {
            list.append(address);
        }
        assert_eq!(pool.total_chunks(), 5);
        assert_eq!(pool.available_chunks(), 0);

        for _ in 0..6 {
            list.pop().unwrap();
        }
        assert_eq!(pool.available_chunks(), 2);
    }

    #[test]
    fn test_delete_returns_all_chunks() {
        let pool = Rc::new(ChunkPool::new(2));
        let mut list = AddressList::new(Rc::clone(&pool), PopMode::Strict);
        for address in 1..=7 {
            list.append(address);
        }
        assert_eq!(pool.total_chunks(), 4);
        assert_eq!(pool.available_chunks(), 0);

        list.delete();
        assert_eq!(pool.available_chunks(), 4);
    }

    #[test]
    fn test_drop_returns_all_chunks() {
        let pool = Rc::new(ChunkPool::new(2));
        {
            let mut list = AddressList::new(Rc::clone(&pool), PopMode::Strict);
            for address in 1..=5 {
                list.append(address);
            }
            assert_eq!(pool.available_chunks(), 0);
        }
        assert_eq!(pool.available_chunks(), pool.total_chunks());
    }

    #[test]
    fn test_chunks_recycle_between_lists() {
        let pool = small_pool();
        let mut list = AddressList::new(Rc::clone(&pool), PopMode::Strict);
        for address in 1..=17 {
            list.append(address);
        }
        list.delete();
        let created = pool.total_chunks();

        // A second list of the same depth allocates nothing new
        let mut list = AddressList::new(Rc::clone(&pool), PopMode::Strict);
        for address in 1..=17 {
            list.append(address);
        }
        assert_eq!(pool.total_chunks(), created);
        list.delete();
    }

    #[test]
    fn test_two_lists_share_one_pool() {
        let pool = small_pool();
        let mut marks = AddressList::new(Rc::clone(&pool), PopMode::Strict);
        let mut remembered = AddressList::new(Rc::clone(&pool), PopMode::Strict);

        for address in 1..=6 {
            marks.append(address);
            remembered.append(address * 100);
        }
        assert_eq!(marks.pop().unwrap(), 6);
        assert_eq!(remembered.pop().unwrap(), 600);
        assert_eq!(marks.pop().unwrap(), 5);
        assert_eq!(remembered.pop().unwrap(), 500);
    }
}
