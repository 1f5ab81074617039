// Minix filesystem session
// Owns the image handle, the parsed superblock and the derived layout.

use log::{debug, info, warn};
use mfstool_core::{FsOptions, MfsError};
use std::io::{Read, Seek, Write};

use super::constants::*;
use super::directory::DirectoryListing;
use super::inode::Inode;
use super::layout::Layout;
use super::superblock::Superblock;
use super::writer::EntryKind;

pub struct MinixFs<D> {
    pub(super) device: D,
    pub(super) superblock: Superblock,
    pub(super) layout: Layout,
    pub(super) options: FsOptions,
}

impl<D: Read + Seek> MinixFs<D> {
    /// Parse the superblock of an image and derive its layout
    pub fn open(mut device: D, options: FsOptions) -> Result<Self, MfsError> {
        use std::io::SeekFrom;

        device.seek(SeekFrom::Start(SUPERBLOCK_OFFSET))?;
        let mut block = vec![0u8; SUPERBLOCK_SIZE];
        let read = read_up_to(&mut device, &mut block)?;
        let superblock = Superblock::parse(&block[..read])?;
        let layout = Layout::new(&superblock, &options)?;

        if !superblock.is_clean() {
            warn!("Superblock state 0x{:04X}: filesystem was not cleanly unmounted", superblock.state);
        }
        info!(
            "Opened Minix image: {} inodes, {} zones, {}-byte entries, data from zone {}",
            superblock.ninodes, superblock.nzones, layout.entry_size, layout.first_data_zone
        );

        Ok(Self {
            device,
            superblock,
            layout,
            options,
        })
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn options(&self) -> &FsOptions {
        &self.options
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    /// Inode of the entry at `path`
    pub fn stat(&mut self, path: &str) -> Result<Inode, MfsError> {
        let inode_num = self.resolve_path(path)?;
        self.read_inode(inode_num)
    }

    /// Live entries of the directory at `path`
    pub fn list(&mut self, path: &str) -> Result<DirectoryListing, MfsError> {
        debug!("Listing {}", path);
        let inode = self.stat(path)?;
        if !inode.is_directory() {
            return Err(MfsError::NotADirectory(path.to_string()));
        }
        self.list_directory(&inode)
    }

    /// Full content of the regular file at `path`
    pub fn read_file(&mut self, path: &str) -> Result<Vec<u8>, MfsError> {
        debug!("Reading {}", path);
        let inode = self.stat(path)?;
        if inode.is_directory() {
            return Err(MfsError::IsADirectory(path.to_string()));
        }
        self.read_all(&inode)
    }
}

impl<D: Read + Write + Seek> MinixFs<D> {
    /// Create an empty file or an initialized directory at `path`
    pub fn create(&mut self, path: &str, kind: EntryKind) -> Result<u16, MfsError> {
        let (parent, name) = self.resolve_parent(path)?;
        let inode_num = self.create_entry(parent, name, kind)?;
        self.flush()?;
        Ok(inode_num)
    }

    pub fn touch(&mut self, path: &str) -> Result<u16, MfsError> {
        self.create(path, EntryKind::File)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<u16, MfsError> {
        self.create(path, EntryKind::Directory)
    }

    /// Append bytes to the regular file at `path`
    pub fn append(&mut self, path: &str, data: &[u8]) -> Result<Inode, MfsError> {
        let inode_num = self.resolve_path(path)?;
        let inode = self.append_inode(inode_num, data)?;
        self.flush()?;
        Ok(inode)
    }
}

/// Read until `buf` is full or the source is exhausted
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, MfsError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
