// Minix V1 inode codec (32-byte records)

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use mfstool_core::{MfsError, INODE_ZONE_SLOTS};
use serde::Serialize;
use std::io::Cursor;

use super::constants::*;

/// Inode record: mode, uid, size, mtime, gid, links, zone[9]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Inode {
    pub mode: u16,
    pub uid: u16,
    pub size: u32,
    pub mtime: u32,
    pub gid: u8,
    pub links: u8,
    pub zone: [u16; INODE_ZONE_SLOTS],
}

impl Inode {
    pub fn parse(bytes: &[u8]) -> Result<Self, MfsError> {
        if bytes.len() < INODE_SIZE {
            return Err(MfsError::FormatError(format!(
                "inode record truncated: {} < {} bytes",
                bytes.len(),
                INODE_SIZE
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let mut inode = Inode {
            mode: cursor.read_u16::<LittleEndian>()?,
            uid: cursor.read_u16::<LittleEndian>()?,
            size: cursor.read_u32::<LittleEndian>()?,
            mtime: cursor.read_u32::<LittleEndian>()?,
            gid: cursor.read_u8()?,
            links: cursor.read_u8()?,
            zone: [0; INODE_ZONE_SLOTS],
        };
        cursor.read_u16_into::<LittleEndian>(&mut inode.zone)?;
        Ok(inode)
    }

    pub fn serialize(&self) -> [u8; INODE_SIZE] {
        let mut record = [0u8; INODE_SIZE];
        LittleEndian::write_u16(&mut record[0..2], self.mode);
        LittleEndian::write_u16(&mut record[2..4], self.uid);
        LittleEndian::write_u32(&mut record[4..8], self.size);
        LittleEndian::write_u32(&mut record[8..12], self.mtime);
        record[12] = self.gid;
        record[13] = self.links;
        LittleEndian::write_u16_into(&self.zone, &mut record[14..]);
        record
    }

    pub fn new_file(mtime: u32) -> Self {
        Self {
            mode: DEFAULT_FILE_MODE,
            links: 1,
            mtime,
            ..Self::default()
        }
    }

    pub fn new_directory(mtime: u32) -> Self {
        Self {
            mode: DEFAULT_DIR_MODE,
            links: 2,
            mtime,
            ..Self::default()
        }
    }

    pub fn is_directory(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    pub fn is_regular(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    /// Number of zones the current size spans
    pub fn zones_in_use(&self) -> usize {
        (self.size as usize).div_ceil(BLOCK_SIZE)
    }

    pub fn kind_str(&self) -> &'static str {
        match self.mode & S_IFMT {
            S_IFDIR => "directory",
            S_IFREG => "regular file",
            _ => "special",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let inode = Inode {
            mode: DEFAULT_DIR_MODE,
            uid: 1000,
            size: 64,
            mtime: 0x6500_0000,
            gid: 7,
            links: 3,
            zone: [20, 21, 0, 0, 0, 0, 0, 0, 99],
        };
        let record = inode.serialize();
        assert_eq!(record.len(), 32);
        assert_eq!(u16::from_le_bytes([record[0], record[1]]), 0o040755);
        assert_eq!(u32::from_le_bytes([record[4], record[5], record[6], record[7]]), 64);
        assert_eq!(record[12], 7);
        assert_eq!(record[13], 3);
        assert_eq!(u16::from_le_bytes([record[14], record[15]]), 20);
        assert_eq!(u16::from_le_bytes([record[30], record[31]]), 99);

        assert_eq!(Inode::parse(&record).unwrap(), inode);
    }

    #[test]
    fn test_truncated_inode() {
        assert!(matches!(Inode::parse(&[0u8; 31]), Err(MfsError::FormatError(_))));
    }

    #[test]
    fn test_type_helpers() {
        let file = Inode::new_file(0);
        assert!(file.is_regular());
        assert!(!file.is_directory());
        assert_eq!(file.zones_in_use(), 0);

        let mut dir = Inode::new_directory(0);
        assert!(dir.is_directory());
        dir.size = 1025;
        assert_eq!(dir.zones_in_use(), 2);
    }
}
