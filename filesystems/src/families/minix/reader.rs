// Reading regular file content across direct zones

use log::debug;
use mfstool_core::MfsError;
use std::io::{Read, Seek};

use super::constants::BLOCK_SIZE;
use super::filesystem::MinixFs;
use super::inode::Inode;

impl<D: Read + Seek> MinixFs<D> {
    /// Concatenate an inode's zones up to exactly `inode.size` bytes
    pub fn read_all(&mut self, inode: &Inode) -> Result<Vec<u8>, MfsError> {
        let size = inode.size as usize;
        let mut data = Vec::with_capacity(size);
        let mut remaining = size;

        for slot in 0..self.layout.direct_zones {
            let zone = inode.zone[slot];
            if remaining == 0 || zone == 0 {
                break;
            }
            let chunk = remaining.min(BLOCK_SIZE);
            let bytes = self.read_zone(zone)?;
            data.extend_from_slice(&bytes[..chunk]);
            remaining -= chunk;
        }

        if remaining > 0 {
            return Err(MfsError::FormatError(format!(
                "inode size {} exceeds its {} readable bytes in direct zones",
                size,
                size - remaining
            )));
        }

        debug!("Read {} bytes", data.len());
        Ok(data)
    }
}
