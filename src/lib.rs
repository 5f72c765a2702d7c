//! lhindex: on-disk linear hash index
//!
//! Maps a `u32` key to a fixed-schema employee record stored in 4 KB pages
//! of a single flat file.
//!
//! ## Architecture
//! - Storage layer: `BlockStore` page I/O + `Page` layout (count, overflow link, 5 slots)
//! - Record layer: fixed 716-byte slot codec with bounded string fields
//! - Index layer: `HashDirectory` addressing + `LinearHashIndex` insert/split/lookup
//! - Loader: bulk insert from delimited text

pub mod config;
pub mod index;
pub mod loader;
pub mod storage;
pub mod types;

mod error;

pub use config::{IndexConfig, RehashScope};
pub use error::{IndexError, Result};

pub use index::{HashDirectory, IndexStats, LinearHashIndex, PageInfo, SharedIndex};
pub use loader::{load_from_path, load_from_reader};
pub use types::Record;
