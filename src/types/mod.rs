//! Record types stored in the index

mod fixed_field;
mod record;

pub use fixed_field::FixedField;
pub use record::{slot_id, Record, Slot, BIO_LEN, NAME_LEN, SLOT_HEADER_LEN, SLOT_SIZE};
