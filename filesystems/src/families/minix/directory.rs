// Minix directory entries: a 16-bit inode number followed by a NUL-padded name.
// Entry width is 16 or 32 bytes depending on the superblock magic.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;
use mfstool_core::MfsError;
use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};

use super::constants::*;
use super::filesystem::MinixFs;
use super::inode::Inode;

/// Live directory entries keyed by raw name bytes
pub type DirectoryListing = BTreeMap<Vec<u8>, u16>;

/// Directory entry width for a superblock magic
pub fn entry_size(magic: u16) -> usize {
    if magic == MINIX_SUPER_MAGIC {
        16
    } else {
        32
    }
}

/// Decode one entry; the name has its trailing NUL padding stripped
pub fn decode_entry(bytes: &[u8]) -> Result<(u16, Vec<u8>), MfsError> {
    if bytes.len() < 2 {
        return Err(MfsError::FormatError(format!(
            "directory entry truncated: {} bytes",
            bytes.len()
        )));
    }
    let inode = LittleEndian::read_u16(&bytes[..2]);
    let name = &bytes[2..];
    let end = name.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    Ok((inode, name[..end].to_vec()))
}

pub fn encode_entry(inode: u16, name: &[u8], entry_size: usize) -> Result<Vec<u8>, MfsError> {
    let max = entry_size - 2;
    if name.len() > max {
        return Err(MfsError::NameTooLong {
            name: String::from_utf8_lossy(name).into_owned(),
            max,
        });
    }
    let mut entry = vec![0u8; entry_size];
    LittleEndian::write_u16(&mut entry[..2], inode);
    entry[2..2 + name.len()].copy_from_slice(name);
    Ok(entry)
}

/// Location of a directory slot inside the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirSlot {
    /// Slot ordinal across the directory's zones
    pub index: usize,
    pub zone: u16,
    /// Byte offset of the slot within its zone
    pub offset: usize,
}

impl<D: Read + Seek> MinixFs<D> {
    /// Nonzero direct zones of an inode, in array order
    pub(super) fn direct_zones(&self, inode: &Inode) -> Vec<u16> {
        inode.zone[..self.layout.direct_zones]
            .iter()
            .copied()
            .filter(|&z| z != 0)
            .collect()
    }

    /// Live entries of a directory inode
    pub fn list_directory(&mut self, dir: &Inode) -> Result<DirectoryListing, MfsError> {
        let entry_size = self.layout.entry_size;
        let mut remaining = (dir.size as usize).div_ceil(entry_size);
        let mut listing = DirectoryListing::new();

        for zone in self.direct_zones(dir) {
            if remaining == 0 {
                break;
            }
            let data = self.read_zone(zone)?;
            for raw in data.chunks_exact(entry_size).take(remaining) {
                remaining -= 1;
                let (inode, name) = decode_entry(raw)?;
                if inode == 0 {
                    continue;
                }
                trace!("Entry '{}' -> inode {}", String::from_utf8_lossy(&name), inode);
                listing.entry(name).or_insert(inode);
            }
        }

        Ok(listing)
    }

    /// Look a single name up in a directory inode
    pub fn lookup(&mut self, dir: &Inode, name: &[u8]) -> Result<Option<u16>, MfsError> {
        Ok(self.list_directory(dir)?.get(name).copied())
    }

    /// First slot with inode number 0 in the directory's allocated zones
    pub fn find_free_slot(&mut self, dir: &Inode) -> Result<DirSlot, MfsError> {
        let entry_size = self.layout.entry_size;
        let per_zone = self.layout.entries_per_zone();

        for (ordinal, zone) in self.direct_zones(dir).into_iter().enumerate() {
            let data = self.read_zone(zone)?;
            let free = data
                .chunks_exact(entry_size)
                .position(|raw| LittleEndian::read_u16(&raw[..2]) == 0);
            if let Some(i) = free {
                return Ok(DirSlot {
                    index: ordinal * per_zone + i,
                    zone,
                    offset: i * entry_size,
                });
            }
        }

        Err(MfsError::AllocatorFull(
            "directory has no free entry slot in its allocated zones".to_string(),
        ))
    }
}

impl<D: Read + Write + Seek> MinixFs<D> {
    pub(super) fn write_entry(&mut self, slot: &DirSlot, inode: u16, name: &[u8]) -> Result<(), MfsError> {
        let entry = encode_entry(inode, name, self.layout.entry_size)?;
        self.write_zone(slot.zone, slot.offset, &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_size_by_magic() {
        assert_eq!(entry_size(MINIX_SUPER_MAGIC), 16);
        assert_eq!(entry_size(MINIX_SUPER_MAGIC2), 32);
    }

    #[test]
    fn test_encode_layout() {
        let entry = encode_entry(0x0102, b"hello", 16).unwrap();
        assert_eq!(entry.len(), 16);
        assert_eq!(&entry[..2], &[0x02, 0x01]);
        assert_eq!(&entry[2..7], b"hello");
        assert!(entry[7..].iter().all(|&b| b == 0));

        assert_eq!(decode_entry(&entry).unwrap(), (0x0102, b"hello".to_vec()));
    }

    #[test]
    fn test_name_length_limits() {
        let longest = [b'a'; 30];
        let entry = encode_entry(7, &longest, 32).unwrap();
        assert_eq!(decode_entry(&entry).unwrap(), (7, longest.to_vec()));

        let err = encode_entry(7, &[b'a'; 15], 16).unwrap_err();
        assert!(matches!(err, MfsError::NameTooLong { max: 14, .. }));
    }

    #[test]
    fn test_decode_free_slot() {
        assert_eq!(decode_entry(&[0u8; 32]).unwrap(), (0, Vec::new()));
        assert!(matches!(decode_entry(&[1]), Err(MfsError::FormatError(_))));
    }
}
