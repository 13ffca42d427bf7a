//! Host object registry
//!
//! A collector under test sometimes needs to thread references to host-side
//! values (type descriptors, finalizer callbacks) through simulated memory,
//! where only raw addresses fit. [`ObjectRegistry`] hands every registered
//! value a synthetic address in a range disjoint from block addresses, and
//! recovers the value from that address later.
//!
//! Registration is keyed by `Rc` allocation identity: registering a clone of
//! an already-registered handle returns the existing address. The registry
//! keeps a strong handle to everything registered, so a synthetic address can
//! never dangle while the registry is alive.

use super::value::Address;
use crate::errors::MemoryError;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an arbitrary host value
pub type ObjectHandle = Rc<dyn Any>;

/// First synthetic object address; the top half of the address space is
/// reserved for the registry so object and block addresses never collide
pub const OBJECT_ADDRESS_START: Address = 1 << 63;

/// Bidirectional mapping between host values and synthetic addresses
pub struct ObjectRegistry {
    by_identity: FxHashMap<usize, Address>,
    by_address: FxHashMap<Address, ObjectHandle>,
    next_address: Address,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        ObjectRegistry {
            by_identity: FxHashMap::default(),
            by_address: FxHashMap::default(),
            next_address: OBJECT_ADDRESS_START,
        }
    }

    fn identity(handle: &ObjectHandle) -> usize {
        Rc::as_ptr(handle) as *const () as usize
    }

    /// Get the synthetic address for a handle, registering it on first sight
    pub fn get_address(&mut self, handle: ObjectHandle) -> Address {
        let identity = Self::identity(&handle);
        if let Some(&address) = self.by_identity.get(&identity) {
            return address;
        }
        let address = self.next_address;
        self.next_address += 1;
        self.by_identity.insert(identity, address);
        self.by_address.insert(address, handle);
        address
    }

    /// Recover the handle registered at a synthetic address
    pub fn get_object(&self, address: Address) -> Result<ObjectHandle, MemoryError> {
        match self.by_address.get(&address) {
            Some(handle) => Ok(Rc::clone(handle)),
            None => Err(MemoryError::InvalidAddress { address }),
        }
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Rc<dyn Any> has no Debug, so summarize instead of deriving
impl fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("registered", &self.by_address.len())
            .field("next_address", &self.next_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = ObjectRegistry::new();
        let handle: ObjectHandle = Rc::new(String::from("type descriptor"));

        let addr = registry.get_address(Rc::clone(&handle));
        assert_eq!(registry.get_address(Rc::clone(&handle)), addr);
        assert_eq!(registry.get_address(handle), addr);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_objects_get_distinct_addresses() {
        let mut registry = ObjectRegistry::new();
        let first = registry.get_address(Rc::new(1i32));
        let second = registry.get_address(Rc::new(2i32));

        assert_ne!(first, second);
        assert!(first >= OBJECT_ADDRESS_START);
        assert!(second >= OBJECT_ADDRESS_START);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_roundtrip_recovers_the_value() {
        let mut registry = ObjectRegistry::new();
        let addr = registry.get_address(Rc::new(String::from("marker")));

        let handle = registry.get_object(addr).unwrap();
        match handle.downcast_ref::<String>() {
            Some(s) => assert_eq!(s, "marker"),
            None => panic!("Expected a String handle"),
        }
    }

    #[test]
    fn test_unregistered_address_fails() {
        let registry = ObjectRegistry::new();
        let err = registry.get_object(OBJECT_ADDRESS_START).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::InvalidAddress {
                address: OBJECT_ADDRESS_START
            }
        ));
    }
}
