//! Storage layer implementation
//!
//! Fixed-size pages in a single flat file

pub mod block_store;
pub mod page;

pub use block_store::BlockStore;
pub use page::{Page, PageHeader, PageId, PAGE_SIZE, SLOTS_PER_PAGE};
