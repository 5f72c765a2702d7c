//! Employee record and its fixed-width slot codec
//!
//! ## Slot layout (716 bytes)
//! ```text
//! [id: u32 LE][manager_id: u32 LE][reserved: 8][name: 200][bio: 500]
//! ```
//! String fields are zero-padded. Encoding rejects names or bios that do not
//! fit instead of spilling into the next slot.

use super::FixedField;
use crate::{IndexError, Result};
use std::fmt;

/// Width of the name field
pub const NAME_LEN: usize = 200;

/// Width of the bio field
pub const BIO_LEN: usize = 500;

/// Numeric header: id, manager id and reserved padding
pub const SLOT_HEADER_LEN: usize = 16;

/// One encoded record
pub const SLOT_SIZE: usize = SLOT_HEADER_LEN + NAME_LEN + BIO_LEN;

const ID_OFFSET: usize = 0;
const MANAGER_OFFSET: usize = 4;
const NAME_OFFSET: usize = SLOT_HEADER_LEN;
const BIO_OFFSET: usize = NAME_OFFSET + NAME_LEN;

/// Encoded slot image
pub type Slot = [u8; SLOT_SIZE];

/// A fixed-schema record keyed by `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u32,
    pub manager_id: u32,
    pub name: String,
    pub bio: String,
}

impl Record {
    pub fn new(id: u32, name: impl Into<String>, bio: impl Into<String>, manager_id: u32) -> Self {
        Self {
            id,
            manager_id,
            name: name.into(),
            bio: bio.into(),
        }
    }

    /// Encode into a slot image. Fails with `FieldTooLong` before any byte is
    /// produced if either string exceeds its width.
    pub fn encode(&self) -> Result<Slot> {
        let name = FixedField::<NAME_LEN>::new("name", &self.name)?;
        let bio = FixedField::<BIO_LEN>::new("bio", &self.bio)?;

        let mut slot = [0u8; SLOT_SIZE];
        slot[ID_OFFSET..ID_OFFSET + 4].copy_from_slice(&self.id.to_le_bytes());
        slot[MANAGER_OFFSET..MANAGER_OFFSET + 4].copy_from_slice(&self.manager_id.to_le_bytes());
        slot[NAME_OFFSET..BIO_OFFSET].copy_from_slice(name.padded());
        slot[BIO_OFFSET..SLOT_SIZE].copy_from_slice(bio.padded());
        Ok(slot)
    }

    /// Decode a slot image produced by [`Record::encode`]
    pub fn decode(slot: &[u8]) -> Result<Self> {
        if slot.len() != SLOT_SIZE {
            return Err(IndexError::Corruption(format!(
                "slot is {} bytes, expected {}",
                slot.len(),
                SLOT_SIZE
            )));
        }

        let name = FixedField::<NAME_LEN>::decode("name", &slot[NAME_OFFSET..BIO_OFFSET])?;
        let bio = FixedField::<BIO_LEN>::decode("bio", &slot[BIO_OFFSET..SLOT_SIZE])?;

        Ok(Self {
            id: slot_id(slot),
            manager_id: read_u32(slot, MANAGER_OFFSET),
            name: name.as_str().to_owned(),
            bio: bio.as_str().to_owned(),
        })
    }
}

/// Key stored in a slot image, without decoding the string fields
pub fn slot_id(slot: &[u8]) -> u32 {
    read_u32(slot, ID_OFFSET)
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tID: {}", self.id)?;
        writeln!(f, "\tNAME: {}", self.name)?;
        writeln!(f, "\tBIO: {}", self.bio)?;
        write!(f, "\tMANAGER_ID: {}", self.manager_id)
    }
}
