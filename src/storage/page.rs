//! Fixed 4 KB bucket pages
//!
//! ## Layout
//! ```text
//! [count: u8][overflow delta: u8][slot 0: 716]...[slot 4: 716][unused]
//! ```
//! `count` is the number of occupied slots, always the lowest-indexed ones.
//! The overflow delta is the distance in pages from this page to the next
//! page of the same bucket; 0 means the chain ends here.

use crate::types::{slot_id, Slot, SLOT_SIZE};
use crate::{IndexError, Result};

/// Page size on disk
pub const PAGE_SIZE: usize = 4096;

/// Count byte plus overflow byte
pub const PAGE_HEADER_LEN: usize = 2;

/// Record slots per page
pub const SLOTS_PER_PAGE: usize = 5;

/// Largest forward distance the one-byte overflow link can encode
pub const MAX_OVERFLOW_DELTA: u32 = u8::MAX as u32;

/// Page number within the index file
pub type PageId = u32;

const _: () = assert!(PAGE_HEADER_LEN + SLOTS_PER_PAGE * SLOT_SIZE <= PAGE_SIZE);

/// Decoded page header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageHeader {
    /// Occupied slots (0..=5)
    pub count: u8,

    /// Forward delta to the overflow page, 0 = none
    pub overflow: u8,
}

impl PageHeader {
    pub fn decode(raw: &[u8]) -> Result<Self> {
        if raw.len() < PAGE_HEADER_LEN {
            return Err(IndexError::Corruption(format!(
                "page header is {} bytes, expected {}",
                raw.len(),
                PAGE_HEADER_LEN
            )));
        }

        let header = Self {
            count: raw[0],
            overflow: raw[1],
        };
        if header.count as usize > SLOTS_PER_PAGE {
            return Err(IndexError::Corruption(format!(
                "page header count {} exceeds {} slots",
                header.count, SLOTS_PER_PAGE
            )));
        }
        Ok(header)
    }

    pub fn encode(&self) -> [u8; PAGE_HEADER_LEN] {
        [self.count, self.overflow]
    }

    /// Page number of the overflow continuation of page `page_id`
    pub fn overflow_page(&self, page_id: PageId) -> Option<PageId> {
        match self.overflow {
            0 => None,
            delta => Some(page_id + delta as PageId),
        }
    }
}

/// One bucket page held in memory between a read and a write
#[derive(Clone)]
pub struct Page {
    id: PageId,
    header: PageHeader,
    /// Full page image; header bytes are refreshed on serialize
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// A zero-filled page
    pub fn empty(id: PageId) -> Self {
        Self {
            id,
            header: PageHeader::default(),
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    pub fn deserialize(id: PageId, buf: &[u8]) -> Result<Self> {
        if buf.len() != PAGE_SIZE {
            return Err(IndexError::Corruption(format!(
                "page {} image is {} bytes, expected {}",
                id,
                buf.len(),
                PAGE_SIZE
            )));
        }

        let header = PageHeader::decode(buf)?;
        let mut data = Box::new([0u8; PAGE_SIZE]);
        data.copy_from_slice(buf);
        Ok(Self { id, header, data })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = self.data.to_vec();
        buf[..PAGE_HEADER_LEN].copy_from_slice(&self.header.encode());
        buf
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn header(&self) -> PageHeader {
        self.header
    }

    pub fn count(&self) -> usize {
        self.header.count as usize
    }

    pub fn is_full(&self) -> bool {
        self.count() == SLOTS_PER_PAGE
    }

    pub fn overflow(&self) -> Option<PageId> {
        self.header.overflow_page(self.id)
    }

    /// Point this page's overflow link at `target`.
    ///
    /// The link is a forward delta in one byte, so `target` must lie
    /// 1..=255 pages after this page.
    pub fn link_overflow(&mut self, target: PageId) -> Result<()> {
        let delta = target
            .checked_sub(self.id)
            .filter(|&d| d > 0 && d <= MAX_OVERFLOW_DELTA)
            .ok_or(IndexError::OverflowChainUnaddressable {
                from: self.id,
                to: target,
            })?;
        self.header.overflow = delta as u8;
        Ok(())
    }

    fn slot_range(index: usize) -> std::ops::Range<usize> {
        let start = PAGE_HEADER_LEN + index * SLOT_SIZE;
        start..start + SLOT_SIZE
    }

    /// Occupied slot image
    pub fn slot(&self, index: usize) -> Option<&[u8]> {
        (index < self.count()).then(|| &self.data[Self::slot_range(index)])
    }

    /// Key of an occupied slot
    pub fn key_at(&self, index: usize) -> Option<u32> {
        self.slot(index).map(slot_id)
    }

    /// Index of the occupied slot holding `id`
    pub fn find(&self, id: u32) -> Option<usize> {
        (0..self.count()).find(|&i| self.key_at(i) == Some(id))
    }

    /// Append a slot after the last occupied one; returns its index
    pub fn push(&mut self, slot: &Slot) -> Result<usize> {
        if self.is_full() {
            return Err(IndexError::Corruption(format!(
                "push into full page {}",
                self.id
            )));
        }

        let index = self.count();
        self.data[Self::slot_range(index)].copy_from_slice(slot);
        self.header.count += 1;
        Ok(index)
    }

    /// Remove an occupied slot, shifting later slots down by one and zeroing
    /// the vacated tail slot
    pub fn remove(&mut self, index: usize) -> Option<Slot> {
        let count = self.count();
        if index >= count {
            return None;
        }

        let mut removed = [0u8; SLOT_SIZE];
        removed.copy_from_slice(&self.data[Self::slot_range(index)]);

        let start = Self::slot_range(index).start;
        let end = Self::slot_range(count - 1).end;
        self.data.copy_within(start + SLOT_SIZE..end, start);
        self.data[Self::slot_range(count - 1)].fill(0);
        self.header.count -= 1;

        Some(removed)
    }
}
