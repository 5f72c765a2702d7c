//! Index layer implementation
//!
//! Linear hashing over bucket pages with overflow chaining

pub mod directory;
pub mod linear_hash;
pub mod shared;

pub use directory::{hash, HashDirectory};
pub use linear_hash::{IndexStats, LinearHashIndex, PageInfo};
pub use shared::SharedIndex;
