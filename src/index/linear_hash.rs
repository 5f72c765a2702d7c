//! Linear hash index engine
//!
//! ## Design
//! - **Buckets**: one primary page per directory entry, plus a singly linked
//!   chain of overflow pages reached through each page's one-byte link
//! - **Growth**: when primary pages are at least `expand_threshold` full, one
//!   new bucket is appended and records that now address it are relocated
//! - **No caching**: every operation reads and writes pages straight through
//!   the [`BlockStore`]
//!
//! ## Architecture
//! ```text
//! directory:  [0] [1] [2] [3] [4]
//!              |   |   |   |   |
//! file:       [P0][P1][P2][P3][ov0][P4]...
//!              +---- link ----^
//! ```
//!
//! Overflow pages never count toward the fill ratio; chain capacity is
//! unbounded, so including them would keep the ratio from ever settling.

use super::directory::HashDirectory;
use crate::config::{IndexConfig, RehashScope};
use crate::storage::{BlockStore, Page, PageId, SLOTS_PER_PAGE};
use crate::types::{slot_id, Record, Slot};
use crate::{IndexError, Result};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Snapshot of index shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    /// Records inserted
    pub records: u64,

    /// Active buckets (`n`)
    pub buckets: usize,

    /// Hash bits in use (`i`)
    pub address_bits: u32,

    /// Pages allocated in the file (the allocation cursor)
    pub pages: u32,

    /// Pages reachable only through overflow links
    pub overflow_pages: u32,

    /// Primary-page fill ratio
    pub fill_ratio: f64,
}

/// One page of a bucket chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: PageId,
    pub count: usize,
}

/// On-disk linear hash index from `u32` key to [`Record`]
pub struct LinearHashIndex {
    /// Page file
    store: BlockStore,

    /// Directory, `i` and record count
    directory: HashDirectory,

    /// Configuration
    config: IndexConfig,

    /// Growth stopped at the hash space limit (logged once)
    saturated: bool,
}

impl LinearHashIndex {
    /// Create a fresh index at `path`, replacing any existing file
    pub fn create<P: AsRef<Path>>(path: P, config: IndexConfig) -> Result<Self> {
        config.validate()?;

        let store = BlockStore::create(path, config.initial_buckets, config.sync_on_write)?;
        let directory = HashDirectory::with_buckets(config.initial_buckets);
        debug!(
            path = %store.path().display(),
            buckets = directory.bucket_count(),
            address_bits = directory.address_bits(),
            "created index"
        );

        Ok(Self {
            store,
            directory,
            config,
            saturated: false,
        })
    }

    /// Create with [`IndexConfig::default`]
    pub fn with_defaults<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create(path, IndexConfig::default())
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Records inserted
    pub fn len(&self) -> u64 {
        self.directory.records()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active buckets (`n`)
    pub fn bucket_count(&self) -> usize {
        self.directory.bucket_count()
    }

    /// Hash bits in use (`i`)
    pub fn address_bits(&self) -> u32 {
        self.directory.address_bits()
    }

    pub fn directory(&self) -> &HashDirectory {
        &self.directory
    }

    /// Primary page a key resolves to
    pub fn address_of(&self, id: u32) -> PageId {
        self.directory.page_for(id)
    }

    /// Insert a record.
    ///
    /// The record is encoded before any page is touched, so a
    /// `FieldTooLong` failure leaves the index unchanged.
    pub fn insert(&mut self, record: &Record) -> Result<()> {
        let slot = record.encode()?;
        let address = self.directory.address(record.id);
        let page = self.place(address, &slot)?;
        self.directory.record_inserted();
        trace!(id = record.id, address, page, "placed record");

        if self.fill_ratio()? >= self.config.expand_threshold {
            self.expand()?;
        }
        Ok(())
    }

    /// Find the record with key `id`; `Ok(None)` when absent
    pub fn lookup(&self, id: u32) -> Result<Option<Record>> {
        let mut next = Some(self.directory.page_for(id));
        while let Some(page_id) = next {
            let page = self.store.read_page(page_id)?;
            if let Some(slot) = page.find(id).and_then(|i| page.slot(i)) {
                return Record::decode(slot).map(Some);
            }
            next = page.overflow();
        }
        Ok(None)
    }

    /// Like [`lookup`](Self::lookup) but reports absence as `RecordNotFound`
    pub fn require(&self, id: u32) -> Result<Record> {
        self.lookup(id)?.ok_or(IndexError::RecordNotFound(id))
    }

    pub fn contains(&self, id: u32) -> Result<bool> {
        Ok(self.lookup(id)?.is_some())
    }

    /// Occupied slots over primary capacity, overflow pages excluded
    pub fn fill_ratio(&self) -> Result<f64> {
        let mut occupied = 0usize;
        for &page_id in self.directory.pages() {
            occupied += self.store.read_header(page_id)?.count as usize;
        }
        let capacity = self.directory.bucket_count() * SLOTS_PER_PAGE;
        Ok(occupied as f64 / capacity as f64)
    }

    /// Pages of bucket `address` in link order
    pub fn bucket_chain(&self, address: usize) -> Result<Vec<PageInfo>> {
        let mut chain = Vec::new();
        let mut next = self.directory.page(address);
        while let Some(page_id) = next {
            let header = self.store.read_header(page_id)?;
            chain.push(PageInfo {
                page: page_id,
                count: header.count as usize,
            });
            next = header.overflow_page(page_id);
        }
        Ok(chain)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        let pages = self.store.page_count();
        Ok(IndexStats {
            records: self.len(),
            buckets: self.bucket_count(),
            address_bits: self.address_bits(),
            pages,
            overflow_pages: pages - self.bucket_count() as u32,
            fill_ratio: self.fill_ratio()?,
        })
    }

    /// Flush file contents to disk
    pub fn sync(&self) -> Result<()> {
        self.store.sync()
    }

    /// Write a slot into the first page of bucket `address` with room,
    /// linking a new overflow page from the chain tail when every page is
    /// full. Returns the page written.
    fn place(&mut self, address: usize, slot: &Slot) -> Result<PageId> {
        let primary = self.directory.page(address).ok_or_else(|| {
            IndexError::Corruption(format!("bucket address {} outside directory", address))
        })?;

        let mut page = self.store.read_page(primary)?;
        loop {
            if !page.is_full() {
                page.push(slot)?;
                self.store.write_page(&page)?;
                return Ok(page.id());
            }
            match page.overflow() {
                Some(next) => page = self.store.read_page(next)?,
                None => break,
            }
        }

        // Link must be representable before the page is allocated
        let target = self.store.page_count();
        page.link_overflow(target)?;
        let overflow_id = self.store.allocate_page()?;

        let mut overflow = Page::empty(overflow_id);
        overflow.push(slot)?;
        self.store.write_page(&overflow)?;
        self.store.write_page(&page)?;

        debug!(
            bucket = address,
            from = page.id(),
            to = overflow_id,
            "linked overflow page"
        );
        Ok(overflow_id)
    }

    /// Split one bucket: append address `n`, widen `i` if needed, then
    /// relocate every record whose address changed.
    fn expand(&mut self) -> Result<()> {
        if self.directory.is_saturated() {
            if !self.saturated {
                warn!(
                    buckets = self.directory.bucket_count(),
                    "hash space exhausted, directory will not grow further"
                );
                self.saturated = true;
            }
            return Ok(());
        }

        let page_id = self.store.allocate_page()?;
        let target = self.directory.push_bucket(page_id);

        let scan: Vec<usize> = match self.config.rehash_scope {
            RehashScope::AllBuckets => (0..self.directory.bucket_count()).collect(),
            RehashScope::SplitSource => vec![self.directory.split_source(target)],
        };

        let mut moved = 0;
        for address in scan {
            moved += self.rehash_bucket(address)?;
        }

        debug!(
            buckets = self.directory.bucket_count(),
            address_bits = self.directory.address_bits(),
            new_page = page_id,
            moved,
            "expanded directory"
        );
        Ok(())
    }

    /// Move records of bucket `address` that now hash elsewhere.
    /// Returns how many moved.
    fn rehash_bucket(&mut self, address: usize) -> Result<usize> {
        let mut moved = 0;
        let mut next = self.directory.page(address);

        while let Some(page_id) = next {
            let mut page = self.store.read_page(page_id)?;
            let mut evicted: Vec<(usize, Slot)> = Vec::new();

            let mut index = 0;
            while let Some(slot) = page.slot(index) {
                let dest = self.directory.address(slot_id(slot));
                if dest == address {
                    index += 1;
                    continue;
                }
                if let Some(slot) = page.remove(index) {
                    evicted.push((dest, slot));
                }
            }

            if !evicted.is_empty() {
                self.store.write_page(&page)?;
                for (dest, slot) in &evicted {
                    self.place(*dest, slot)?;
                }
                moved += evicted.len();
            }
            next = page.overflow();
        }

        Ok(moved)
    }
}
