//! Generic Palm database record framework.
//!
//! Every record in a Palm database carries the same metadata regardless of
//! the application that owns it: a 24-bit unique id, an attribute nibble and
//! a category nibble. Application record types implement [`PalmRecord`] to
//! convert between their fields and the raw payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DatebookError, DatebookResult};

/// Highest value a 24-bit record id can hold.
pub const MAX_RECORD_ID: u32 = 0x00ff_ffff;

/// Number of categories a database can define.
pub const CATEGORY_COUNT: usize = 16;

/// Unique id of a record within its database (24 bits on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(u32);

impl RecordId {
    pub fn new(id: u32) -> DatebookResult<Self> {
        if id > MAX_RECORD_ID {
            return Err(DatebookError::OutOfRange {
                field: "record id",
                value: i64::from(id),
            });
        }
        Ok(RecordId(id))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Split into the three big-endian bytes stored in a record list entry.
    pub fn to_bytes(self) -> [u8; 3] {
        let b = self.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        RecordId(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

/// Record attribute flags (upper nibble of the attribute byte).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttributes(u8);

impl RecordAttributes {
    pub const DELETED: u8 = 0x80;
    pub const DIRTY: u8 = 0x40;
    pub const BUSY: u8 = 0x20;
    pub const SECRET: u8 = 0x10;
    /// Only meaningful together with `DELETED`; shares its bit with the category.
    pub const ARCHIVED: u8 = 0x08;

    pub fn from_bits(bits: u8) -> Self {
        RecordAttributes(bits & 0xf0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_deleted(self) -> bool {
        self.0 & Self::DELETED != 0
    }

    pub fn is_dirty(self) -> bool {
        self.0 & Self::DIRTY != 0
    }

    pub fn is_busy(self) -> bool {
        self.0 & Self::BUSY != 0
    }

    pub fn is_secret(self) -> bool {
        self.0 & Self::SECRET != 0
    }

    pub fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.0 |= flag & 0xf0;
        } else {
            self.0 &= !flag;
        }
    }
}

impl fmt::Display for RecordAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_deleted() {
            names.push("deleted");
        }
        if self.is_dirty() {
            names.push("dirty");
        }
        if self.is_busy() {
            names.push("busy");
        }
        if self.is_secret() {
            names.push("secret");
        }
        if names.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", names.join(","))
        }
    }
}

/// Identity and bookkeeping shared by every record type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: RecordId,
    /// Position of the record within its database.
    pub index: usize,
    pub attributes: RecordAttributes,
    /// Category index, 0..=15.
    pub category: u8,
    /// Raw payload the record was decoded from, if any.
    #[serde(skip)]
    pub contents: Option<Vec<u8>>,
}

impl RecordMeta {
    pub fn new(
        contents: Vec<u8>,
        id: RecordId,
        index: usize,
        attributes: u8,
        category: u8,
    ) -> DatebookResult<Self> {
        if usize::from(category) >= CATEGORY_COUNT {
            return Err(DatebookError::OutOfRange {
                field: "category",
                value: i64::from(category),
            });
        }
        Ok(RecordMeta {
            id,
            index,
            attributes: RecordAttributes::from_bits(attributes),
            category,
            contents: Some(contents),
        })
    }

    /// The combined attribute/category byte of a record list entry.
    pub fn attribute_byte(&self) -> u8 {
        self.attributes.bits() | (self.category & 0x0f)
    }
}

/// A record type with a binary payload representation.
pub trait PalmRecord: Sized {
    /// Decode a record from its payload.
    fn unpack(data: &[u8]) -> DatebookResult<Self>;

    /// Encode the record into its payload.
    fn pack(&self) -> DatebookResult<Vec<u8>>;
}
