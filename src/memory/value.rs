//! Primitive value representation for struct encoding
//!
//! This module defines [`Value`], the tagged primitives that can be stored in
//! and recovered from simulated memory, and [`FieldType`], the corresponding
//! type codes used to describe a struct layout.
//!
//! # Field Widths
//!
//! All fields use fixed, platform-independent widths:
//! - `Int`: 4 bytes, little-endian signed
//! - `Char`: 1 byte
//! - `Addr`: 8 bytes, little-endian
//!
//! Struct layouts are the plain concatenation of field encodings: no padding,
//! no alignment. A format's encoded size is computable from the format alone
//! (see [`format_size`](super::format_size)).

/// Memory address type (64-bit)
pub type Address = u64;

/// The null address sentinel; never a valid block or object address
pub const NULL_ADDRESS: Address = 0;

/// Type codes for struct fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Char,
    Addr,
}

impl FieldType {
    /// Encoded width of this field in bytes
    pub fn size(self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::Char => 1,
            FieldType::Addr => 8,
        }
    }

    /// Decode one field from its encoded bytes.
    ///
    /// `bytes` must be exactly [`size`](FieldType::size) bytes long.
    pub fn decode(self, bytes: &[u8]) -> Value {
        match self {
            FieldType::Int => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                Value::Int(i32::from_le_bytes(raw))
            }
            FieldType::Char => Value::Char(bytes[0]),
            FieldType::Addr => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Value::Addr(Address::from_le_bytes(raw))
            }
        }
    }
}

/// Primitive values stored in simulated memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Char(u8),
    Addr(Address),
}

impl Value {
    /// Get the type code for this value
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Int(_) => FieldType::Int,
            Value::Char(_) => FieldType::Char,
            Value::Addr(_) => FieldType::Addr,
        }
    }

    /// Encoded width of this value in bytes
    pub fn size(&self) -> usize {
        self.field_type().size()
    }

    /// Append this value's encoding to a byte buffer
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int(n) => out.extend_from_slice(&n.to_le_bytes()),
            Value::Char(c) => out.push(*c),
            Value::Addr(addr) => out.extend_from_slice(&addr.to_le_bytes()),
        }
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the char value, returns None if not a Char
    pub fn as_char(&self) -> Option<u8> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Get the address value, returns None if not an Addr
    pub fn as_addr(&self) -> Option<Address> {
        match self {
            Value::Addr(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Check if this value is the null address
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Addr(NULL_ADDRESS))
    }
}
