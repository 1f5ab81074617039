// Mutating operations: appending to regular files and creating entries

use log::{debug, trace};
use mfstool_core::MfsError;
use std::io::{Read, Seek, Write};

use super::bitmap::BitmapKind;
use super::constants::BLOCK_SIZE;
use super::directory::encode_entry;
use super::filesystem::MinixFs;
use super::inode::Inode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

fn now() -> u32 {
    chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32
}

impl<D: Read + Write + Seek> MinixFs<D> {
    /// Append `data` to a regular file, returning the updated inode.
    ///
    /// The inode is persisted each time a zone is filled, so an allocation
    /// failure part way through leaves `size` and `zone[]` describing exactly
    /// the bytes that reached the image.
    pub fn append_inode(&mut self, inode_num: u16, data: &[u8]) -> Result<Inode, MfsError> {
        let mut inode = self.read_inode(inode_num)?;
        if inode.is_directory() {
            return Err(MfsError::IsADirectory(format!("inode {}", inode_num)));
        }
        if data.is_empty() {
            return Ok(inode);
        }

        let direct = self.layout.direct_zones;
        let size = inode.size as usize;
        let mut remaining = data;
        inode.mtime = now();

        // The write cursor sits in the last nonzero zone; size must land inside it
        let last = inode.zone[..direct].iter().rposition(|&z| z != 0);
        let mut slot = match last {
            Some(last) => {
                let before = last * BLOCK_SIZE;
                if inode.zone[..last].contains(&0) || size < before || size > before + BLOCK_SIZE {
                    return Err(MfsError::FormatError(format!(
                        "inode {}: size {} disagrees with last zone slot {}",
                        inode_num, size, last
                    )));
                }
                let zone = inode.zone[last];
                let used = size - before;
                let n = (BLOCK_SIZE - used).min(remaining.len());
                if n > 0 {
                    trace!("Filling {} bytes of zone {} at offset {}", n, zone, used);
                    self.write_zone(zone, used, &remaining[..n])?;
                    inode.size += n as u32;
                    remaining = &remaining[n..];
                    self.write_inode(inode_num, &inode)?;
                }
                last + 1
            }
            None if size == 0 => 0,
            None => {
                return Err(MfsError::FormatError(format!(
                    "inode {} has size {} but no zones",
                    inode_num, size
                )))
            }
        };

        // Spill the rest into freshly allocated zones
        while !remaining.is_empty() {
            if slot >= direct {
                return Err(MfsError::FileTooLarge(format!(
                    "inode {} has no empty direct zone slot",
                    inode_num
                )));
            }
            let zone = self.allocate_zone()?;
            let n = remaining.len().min(BLOCK_SIZE);
            trace!("Writing {} bytes into new zone {} (slot {})", n, zone, slot);
            self.write_zone(zone, 0, &remaining[..n])?;
            inode.zone[slot] = zone;
            inode.size += n as u32;
            remaining = &remaining[n..];
            self.write_inode(inode_num, &inode)?;
            slot += 1;
        }

        debug!("Appended {} bytes to inode {} (size now {})", data.len(), inode_num, inode.size);
        Ok(inode)
    }

    /// Create a file or directory named `name` inside directory `parent_num`
    pub fn create_entry(&mut self, parent_num: u16, name: &str, kind: EntryKind) -> Result<u16, MfsError> {
        if name.is_empty() || name.contains('/') || name.contains('\0') {
            return Err(MfsError::InvalidInput(format!("invalid entry name '{}'", name)));
        }

        let mut parent = self.read_inode(parent_num)?;
        if !parent.is_directory() {
            return Err(MfsError::NotADirectory(format!("inode {}", parent_num)));
        }
        if self.lookup(&parent, name.as_bytes())?.is_some() {
            return Err(MfsError::NameExists(name.to_string()));
        }

        let entry_size = self.layout.entry_size;
        // Reject over-long names before anything is allocated
        encode_entry(0, name.as_bytes(), entry_size)?;
        let slot = self.find_free_slot(&parent)?;

        let inode_bit = self.find_free_slot_in(BitmapKind::Inode)?;
        let zone_bit = match kind {
            EntryKind::Directory => Some(self.find_free_slot_in(BitmapKind::Zone)?),
            EntryKind::File => None,
        };

        self.claim(BitmapKind::Inode, inode_bit)?;
        let inode_num = inode_bit as u16;
        let mtime = now();

        let inode = match zone_bit {
            Some(bit) => {
                self.claim(BitmapKind::Zone, bit)?;
                let zone = self.layout.zone_for_bit(bit);

                let mut block = vec![0u8; BLOCK_SIZE];
                block[..entry_size].copy_from_slice(&encode_entry(inode_num, b".", entry_size)?);
                block[entry_size..2 * entry_size]
                    .copy_from_slice(&encode_entry(parent_num, b"..", entry_size)?);
                self.write_zone(zone, 0, &block)?;

                let mut dir = Inode::new_directory(mtime);
                dir.zone[0] = zone;
                dir.size = (2 * entry_size) as u32;
                dir
            }
            None => Inode::new_file(mtime),
        };
        self.write_inode(inode_num, &inode)?;

        self.write_entry(&slot, inode_num, name.as_bytes())?;

        let span = ((slot.index + 1) * entry_size) as u32;
        if span > parent.size {
            parent.size = span;
        }
        if kind == EntryKind::Directory {
            parent.links = parent.links.saturating_add(1);
        }
        parent.mtime = mtime;
        self.write_inode(parent_num, &parent)?;

        debug!("Created {:?} '{}' as inode {} in inode {}", kind, name, inode_num, parent_num);
        Ok(inode_num)
    }
}
