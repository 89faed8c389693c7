//! File-backed page store - one file per relation fork.
//!
//! The [`FileStore`] handles all direct file operations:
//! - Reading and writing pages
//! - Extending relation forks
//! - Opening fork files lazily

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{BlockNumber, BufferTag, Error, ForkNumber, RelFileLocator, Result};
use crate::storage::{Page, PageStore};

/// Stores relation forks as files under a root directory.
///
/// # File Layout
/// ```text
/// root/
///   <tablespace>/<database>/<relation>        main fork
///   <tablespace>/<database>/<relation>_fsm    free space map
///   <tablespace>/<database>/<relation>_vm     visibility map
///   <tablespace>/<database>/<relation>_init   init fork
/// ```
///
/// Block N of a fork is located at file offset `N × PAGE_SIZE`.
///
/// # Thread Safety
/// Open files sit behind one `Mutex`; concurrent I/O against the store is
/// serialized.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct FileStore {
    root: PathBuf,
    files: Mutex<HashMap<(RelFileLocator, ForkNumber), File>>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            files: Mutex::new(HashMap::new()),
        })
    }

    /// Path of the file holding `fork` of `locator`.
    pub fn fork_path(&self, locator: RelFileLocator, fork: ForkNumber) -> PathBuf {
        let file_name = match fork {
            ForkNumber::Main => locator.relation_number.to_string(),
            other => format!("{}_{}", locator.relation_number, other.name()),
        };
        self.root
            .join(locator.tablespace_id.to_string())
            .join(locator.database_id.to_string())
            .join(file_name)
    }

    /// Append `count` zeroed blocks to a relation fork.
    ///
    /// Returns the number of the first new block.
    pub fn extend(
        &self,
        locator: RelFileLocator,
        fork: ForkNumber,
        count: u32,
    ) -> Result<BlockNumber> {
        let mut files = self.files.lock();
        let file = self.file_for(&mut files, locator, fork)?;

        let first = Self::blocks_in(file)?;
        file.seek(SeekFrom::Start(first as u64 * PAGE_SIZE as u64))?;

        let zeros = [0u8; PAGE_SIZE];
        for _ in 0..count {
            file.write_all(&zeros)?;
        }
        file.sync_all()?;

        Ok(BlockNumber::new(first))
    }

    /// Number of blocks in a relation fork (0 if the file does not exist).
    pub fn nblocks(&self, locator: RelFileLocator, fork: ForkNumber) -> Result<u32> {
        let mut files = self.files.lock();
        if !files.contains_key(&(locator, fork)) && !self.fork_path(locator, fork).exists() {
            return Ok(0);
        }
        let file = self.file_for(&mut files, locator, fork)?;
        Self::blocks_in(file)
    }

    fn file_for<'a>(
        &self,
        files: &'a mut HashMap<(RelFileLocator, ForkNumber), File>,
        locator: RelFileLocator,
        fork: ForkNumber,
    ) -> Result<&'a mut File> {
        if !files.contains_key(&(locator, fork)) {
            let path = self.fork_path(locator, fork);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?;
            files.insert((locator, fork), file);
        }
        files
            .get_mut(&(locator, fork))
            .ok_or_else(|| Error::Storage(format!("fork file for {} vanished", locator)))
    }

    fn blocks_in(file: &File) -> Result<u32> {
        Ok((file.metadata()?.len() / PAGE_SIZE as u64) as u32)
    }
}

impl PageStore for FileStore {
    fn read_page(&self, tag: &BufferTag, page: &mut Page) -> Result<()> {
        let mut files = self.files.lock();
        let file = self.file_for(&mut files, tag.locator(), tag.fork_number)?;

        if tag.block_number.0 >= Self::blocks_in(file)? {
            return Err(Error::Storage(format!("could not read block {}", tag)));
        }

        let offset = tag.block_number.0 as u64 * PAGE_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(page.as_mut_slice())?;

        Ok(())
    }

    fn write_page(&self, tag: &BufferTag, page: &Page) -> Result<()> {
        let mut files = self.files.lock();
        let file = self.file_for(&mut files, tag.locator(), tag.fork_number)?;

        let offset = tag.block_number.0 as u64 * PAGE_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?;

        Ok(())
    }
}
