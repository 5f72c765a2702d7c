//! Page-granular file I/O
//!
//! The block store is the only code that knows pages live at
//! `page_id * PAGE_SIZE` in a single file. Callers read and write whole
//! [`Page`]s by number and grow the file one zero-filled page at a time.
//! Nothing is cached between calls: every read goes to the file.

use super::page::{Page, PageHeader, PageId, PAGE_HEADER_LEN, PAGE_SIZE};
use crate::{IndexError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub struct BlockStore {
    /// Index file, exclusively owned
    file: File,

    /// Storage path
    path: PathBuf,

    /// Allocation cursor: the next page number to hand out
    next_free: PageId,

    /// Sync after every page write
    sync_on_write: bool,
}

impl BlockStore {
    /// Create (or truncate) the index file and pre-size it to
    /// `initial_pages` zero-filled pages
    pub fn create<P: AsRef<Path>>(path: P, initial_pages: u32, sync_on_write: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.set_len(initial_pages as u64 * PAGE_SIZE as u64)?;
        if sync_on_write {
            file.sync_all()?;
        }

        Ok(Self {
            file,
            path,
            next_free: initial_pages,
            sync_on_write,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pages allocated so far (also the next page number to be allocated)
    pub fn page_count(&self) -> u32 {
        self.next_free
    }

    fn check_range(&self, page_id: PageId) -> Result<()> {
        if page_id >= self.next_free {
            return Err(IndexError::PageOutOfRange {
                page: page_id,
                allocated: self.next_free,
            });
        }
        Ok(())
    }

    fn offset(page_id: PageId) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }

    pub fn read_page(&self, page_id: PageId) -> Result<Page> {
        self.check_range(page_id)?;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        let mut buf = vec![0u8; PAGE_SIZE];
        file.read_exact(&mut buf)?;

        Page::deserialize(page_id, &buf)
    }

    /// Read only the two header bytes of a page
    pub fn read_header(&self, page_id: PageId) -> Result<PageHeader> {
        self.check_range(page_id)?;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        let mut buf = [0u8; PAGE_HEADER_LEN];
        file.read_exact(&mut buf)?;

        PageHeader::decode(&buf)
    }

    pub fn write_page(&self, page: &Page) -> Result<()> {
        self.check_range(page.id())?;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(Self::offset(page.id())))?;
        file.write_all(&page.serialize())?;

        if self.sync_on_write {
            file.sync_data()?;
        }
        Ok(())
    }

    /// Append one zero-filled page and advance the allocation cursor
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = self.next_free;
        let next = page_id.checked_add(1).ok_or_else(|| {
            IndexError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "page number space exhausted",
            ))
        })?;

        self.file.set_len(Self::offset(next))?;
        if self.sync_on_write {
            self.file.sync_data()?;
        }
        self.next_free = next;
        Ok(page_id)
    }

    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use tempfile::TempDir;

    fn create_test_store(pages: u32) -> (BlockStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.idx");
        let store = BlockStore::create(path, pages, false).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_create_presizes_file() {
        let (store, _temp) = create_test_store(4);
        assert_eq!(store.page_count(), 4);
        assert_eq!(
            std::fs::metadata(store.path()).unwrap().len(),
            4 * PAGE_SIZE as u64
        );

        let page = store.read_page(3).unwrap();
        assert_eq!(page.count(), 0);
        assert_eq!(page.overflow(), None);
    }

    #[test]
    fn test_write_then_read() {
        let (store, _temp) = create_test_store(2);
        let record = Record::new(17, "Grace", "Admiral", 3);

        let mut page = Page::empty(1);
        page.push(&record.encode().unwrap()).unwrap();
        store.write_page(&page).unwrap();

        let loaded = store.read_page(1).unwrap();
        assert_eq!(loaded.count(), 1);
        assert_eq!(Record::decode(loaded.slot(0).unwrap()).unwrap(), record);
        assert_eq!(store.read_header(1).unwrap().count, 1);

        // Neighbouring page untouched
        assert_eq!(store.read_page(0).unwrap().count(), 0);
    }

    #[test]
    fn test_allocate_appends() {
        let (mut store, _temp) = create_test_store(2);
        assert_eq!(store.allocate_page().unwrap(), 2);
        assert_eq!(store.allocate_page().unwrap(), 3);
        assert_eq!(store.page_count(), 4);
        assert_eq!(
            std::fs::metadata(store.path()).unwrap().len(),
            4 * PAGE_SIZE as u64
        );
        assert_eq!(store.read_page(3).unwrap().count(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let (store, _temp) = create_test_store(1);
        assert!(matches!(
            store.read_page(1),
            Err(IndexError::PageOutOfRange { page: 1, allocated: 1 })
        ));
        assert!(store.write_page(&Page::empty(5)).is_err());
    }

    #[test]
    fn test_create_truncates_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reuse.idx");
        std::fs::write(&path, vec![0xAB; PAGE_SIZE * 3]).unwrap();

        let store = BlockStore::create(&path, 1, false).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), PAGE_SIZE as u64);
        assert_eq!(store.read_page(0).unwrap().count(), 0);
    }

    #[test]
    fn test_create_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("idx");
        let store = BlockStore::create(&path, 2, true).unwrap();
        assert_eq!(store.page_count(), 2);
        assert!(path.exists());
    }
}
