//! Memory model for the collector test bench
//!
//! This module provides the simulated memory abstractions:
//! - [`value`]: tagged primitives ([`value::Value`]) and struct field codes
//!   ([`value::FieldType`])
//! - [`block`]: a single allocation with per-byte initialization tracking
//! - [`heap`]: malloc/free, address resolution, struct codec, memcopy
//! - [`registry`]: host values mapped to synthetic addresses
//!
//! # Struct Layout
//!
//! Struct encoding uses fixed, platform-independent field widths:
//! - `Int`: 4 bytes
//! - `Char`: 1 byte
//! - `Addr`: 8 bytes
//!
//! Fields are packed sequentially in little-endian byte order with no
//! padding, so a format's encoded size is the sum of its field widths:
//! ```text
//! [Int, Int, Char]  →  4 + 4 + 1 = 9 bytes
//! ```

pub mod block;
pub mod heap;
pub mod registry;
pub mod value;

use value::FieldType;

/// Calculate the encoded size of a struct format in bytes
pub fn format_size(format: &[FieldType]) -> usize {
    format.iter().map(|field| field.size()).sum()
}
