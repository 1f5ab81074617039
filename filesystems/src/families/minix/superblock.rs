// Minix superblock codec
// The superblock occupies block 1; only its first 20 bytes carry fields.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use mfstool_core::MfsError;
use serde::Serialize;
use std::io::Cursor;

use super::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Superblock {
    pub ninodes: u16,
    pub nzones: u16,
    pub imap_blocks: u16,
    pub zmap_blocks: u16,
    pub firstdatazone: u16,
    pub log_zone_size: u16,
    pub maxfilesize: u32,
    pub magic: u16,
    pub state: u16,
}

impl Superblock {
    /// Decode the superblock fields; trailing bytes beyond the field table are ignored
    pub fn parse(bytes: &[u8]) -> Result<Self, MfsError> {
        if bytes.len() < SUPERBLOCK_FIELDS_SIZE {
            return Err(MfsError::FormatError(format!(
                "superblock truncated: {} < {} bytes",
                bytes.len(),
                SUPERBLOCK_FIELDS_SIZE
            )));
        }

        let mut cursor = Cursor::new(bytes);
        Ok(Self {
            ninodes: cursor.read_u16::<LittleEndian>()?,
            nzones: cursor.read_u16::<LittleEndian>()?,
            imap_blocks: cursor.read_u16::<LittleEndian>()?,
            zmap_blocks: cursor.read_u16::<LittleEndian>()?,
            firstdatazone: cursor.read_u16::<LittleEndian>()?,
            log_zone_size: cursor.read_u16::<LittleEndian>()?,
            maxfilesize: cursor.read_u32::<LittleEndian>()?,
            magic: cursor.read_u16::<LittleEndian>()?,
            state: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Encode into a full zero-padded superblock block
    pub fn serialize(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut block = [0u8; SUPERBLOCK_SIZE];
        LittleEndian::write_u16(&mut block[0..2], self.ninodes);
        LittleEndian::write_u16(&mut block[2..4], self.nzones);
        LittleEndian::write_u16(&mut block[4..6], self.imap_blocks);
        LittleEndian::write_u16(&mut block[6..8], self.zmap_blocks);
        LittleEndian::write_u16(&mut block[8..10], self.firstdatazone);
        LittleEndian::write_u16(&mut block[10..12], self.log_zone_size);
        LittleEndian::write_u32(&mut block[12..16], self.maxfilesize);
        LittleEndian::write_u16(&mut block[16..18], self.magic);
        LittleEndian::write_u16(&mut block[18..20], self.state);
        block
    }

    /// Check the fields a session relies on
    pub fn validate(&self) -> Result<(), MfsError> {
        if self.magic != MINIX_SUPER_MAGIC && self.magic != MINIX_SUPER_MAGIC2 {
            return Err(MfsError::FormatError(format!(
                "unrecognized magic 0x{:04X}",
                self.magic
            )));
        }
        if self.log_zone_size != 0 {
            return Err(MfsError::FormatError(format!(
                "unsupported log_zone_size {} (zones must be one block)",
                self.log_zone_size
            )));
        }
        if self.imap_blocks == 0 || self.zmap_blocks == 0 {
            return Err(MfsError::FormatError("bitmap block count is zero".to_string()));
        }
        if self.ninodes == 0 {
            return Err(MfsError::FormatError("superblock reports zero inodes".to_string()));
        }
        if self.firstdatazone == 0 || self.firstdatazone >= self.nzones {
            return Err(MfsError::FormatError(format!(
                "first data zone {} outside 1..{}",
                self.firstdatazone, self.nzones
            )));
        }
        Ok(())
    }

    /// Directory entry width selected by the magic value
    pub fn entry_size(&self) -> usize {
        super::directory::entry_size(self.magic)
    }

    pub fn is_clean(&self) -> bool {
        self.state & MINIX_VALID_FS != 0 && self.state & MINIX_ERROR_FS == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Superblock {
        Superblock {
            ninodes: 352,
            nzones: 1024,
            imap_blocks: 1,
            zmap_blocks: 1,
            firstdatazone: 16,
            log_zone_size: 0,
            maxfilesize: MINIX_MAX_FILE_SIZE,
            magic: MINIX_SUPER_MAGIC2,
            state: MINIX_VALID_FS,
        }
    }

    #[test]
    fn test_field_offsets() {
        let block = sample().serialize();
        assert_eq!(u16::from_le_bytes([block[0], block[1]]), 352);
        assert_eq!(u16::from_le_bytes([block[8], block[9]]), 16);
        assert_eq!(
            u32::from_le_bytes([block[12], block[13], block[14], block[15]]),
            MINIX_MAX_FILE_SIZE
        );
        assert_eq!(u16::from_le_bytes([block[16], block[17]]), 0x138F);
        assert!(block[SUPERBLOCK_FIELDS_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_serialized() {
        let sb = sample();
        assert_eq!(Superblock::parse(&sb.serialize()).unwrap(), sb);
        assert_eq!(sb.entry_size(), 32);
        assert!(sb.is_clean());
    }

    #[test]
    fn test_truncated_superblock() {
        let err = Superblock::parse(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, MfsError::FormatError(_)));
    }

    #[test]
    fn test_validate_rejects_unknown_magic() {
        let mut sb = sample();
        sb.magic = 0xEF53;
        assert!(matches!(sb.validate(), Err(MfsError::FormatError(_))));

        let mut sb = sample();
        sb.log_zone_size = 1;
        assert!(matches!(sb.validate(), Err(MfsError::FormatError(_))));

        sb = sample();
        sb.magic = MINIX_SUPER_MAGIC;
        sb.validate().unwrap();
        assert_eq!(sb.entry_size(), 16);
    }
}
