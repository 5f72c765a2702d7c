//! Linear hashing directory
//!
//! Maps a bucket address (the low `i` bits of `hash(id)`) to the primary
//! page of that bucket. The directory grows one bucket at a time in address
//! order; addresses that are not split yet fold back onto their sibling in
//! the lower half of the address space.
//!
//! Kept free of file I/O so addressing and split bookkeeping can be tested
//! on their own.

use crate::config::HASH_SPACE;
use crate::storage::PageId;

/// Fixed 8-bit hash: `id mod 256`
pub fn hash(id: u32) -> u32 {
    id % HASH_SPACE
}

/// Directory plus the counters that drive growth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDirectory {
    /// Primary page of each bucket; `pages.len()` is `n`
    pages: Vec<PageId>,

    /// Hash bits in use (`i`)
    address_bits: u32,

    /// Records inserted so far
    records: u64,
}

impl HashDirectory {
    /// Directory over existing primary pages, `i = ceil(log2(n))`
    pub fn new(pages: Vec<PageId>) -> Self {
        let address_bits = bits_for(pages.len());
        Self {
            pages,
            address_bits,
            records: 0,
        }
    }

    /// Directory whose bucket `k` lives in page `k`
    pub fn with_buckets(n: u32) -> Self {
        Self::new((0..n).collect())
    }

    /// Active bucket count (`n`)
    pub fn bucket_count(&self) -> usize {
        self.pages.len()
    }

    /// Hash bits in use (`i`)
    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn record_inserted(&mut self) {
        self.records += 1;
    }

    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    /// Primary page of bucket `address`
    pub fn page(&self, address: usize) -> Option<PageId> {
        self.pages.get(address).copied()
    }

    /// Bucket address of `id` under the current `(n, i)`
    pub fn address(&self, id: u32) -> usize {
        let mask = (1u32 << self.address_bits) - 1;
        let mut bits = (hash(id) & mask) as usize;
        if bits >= self.pages.len() {
            bits -= 1 << (self.address_bits - 1);
        }
        bits
    }

    /// Primary page that `id` resolves to
    pub fn page_for(&self, id: u32) -> PageId {
        self.pages[self.address(id)]
    }

    /// Every hash value already has its own bucket
    pub fn is_saturated(&self) -> bool {
        self.pages.len() >= HASH_SPACE as usize
    }

    /// Add the split target bucket at address `n`, widening `i` once `n`
    /// exceeds `2^i`. Returns the new bucket's address.
    pub fn push_bucket(&mut self, page: PageId) -> usize {
        self.pages.push(page);
        if self.pages.len() > (1usize << self.address_bits) {
            self.address_bits += 1;
        }
        self.pages.len() - 1
    }

    /// Bucket whose records may move to `address`, the newest bucket
    pub fn split_source(&self, address: usize) -> usize {
        address - (1usize << (self.address_bits - 1))
    }
}

fn bits_for(buckets: usize) -> u32 {
    buckets.max(1).next_power_of_two().trailing_zeros()
}
