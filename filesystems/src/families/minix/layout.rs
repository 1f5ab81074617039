// Derived on-disk layout, computed once per session from the superblock

use mfstool_core::{FsOptions, MfsError, INODE_ZONE_SLOTS};
use serde::Serialize;

use super::constants::*;
use super::superblock::Superblock;

const BITS_PER_BLOCK: usize = BLOCK_SIZE * 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// First block of the inode bitmap
    pub imap_start: u64,
    /// First block of the zone bitmap
    pub zmap_start: u64,
    /// First block of the inode table
    pub inode_table_start: u64,
    pub inode_table_blocks: u64,
    pub first_data_zone: u16,
    pub nzones: u16,
    pub ninodes: u16,
    /// Directory entry width, 16 or 32
    pub entry_size: usize,
    /// Bits scanned in the inode bitmap (bit 0 is reserved)
    pub inode_bits: usize,
    /// Bits scanned in the zone bitmap, one per data zone
    pub zone_bits: usize,
    /// Zone-array slots usable as direct data pointers
    pub direct_zones: usize,
}

impl Layout {
    pub fn new(sb: &Superblock, options: &FsOptions) -> Result<Self, MfsError> {
        sb.validate()?;

        if options.direct_zones == 0 || options.direct_zones > INODE_ZONE_SLOTS {
            return Err(MfsError::InvalidInput(format!(
                "direct zone count {} outside 1..={}",
                options.direct_zones, INODE_ZONE_SLOTS
            )));
        }

        let imap_start = IMAP_START_BLOCK;
        let zmap_start = imap_start + sb.imap_blocks as u64;
        let inode_table_start = zmap_start + sb.zmap_blocks as u64;
        let inode_table_blocks = (sb.ninodes as u64 * INODE_SIZE as u64).div_ceil(BLOCK_SIZE as u64);

        if inode_table_start + inode_table_blocks > sb.firstdatazone as u64 {
            return Err(MfsError::FormatError(format!(
                "inode table (blocks {}..{}) overlaps first data zone {}",
                inode_table_start,
                inode_table_start + inode_table_blocks,
                sb.firstdatazone
            )));
        }

        let inode_bits = sb.ninodes as usize + 1;
        let zone_bits = (sb.nzones - sb.firstdatazone) as usize;

        if inode_bits > sb.imap_blocks as usize * BITS_PER_BLOCK {
            return Err(MfsError::FormatError(format!(
                "{} inodes do not fit in {} inode bitmap block(s)",
                sb.ninodes, sb.imap_blocks
            )));
        }
        if zone_bits > sb.zmap_blocks as usize * BITS_PER_BLOCK {
            return Err(MfsError::FormatError(format!(
                "{} data zones do not fit in {} zone bitmap block(s)",
                zone_bits,
                sb.zmap_blocks
            )));
        }

        Ok(Self {
            imap_start,
            zmap_start,
            inode_table_start,
            inode_table_blocks,
            first_data_zone: sb.firstdatazone,
            nzones: sb.nzones,
            ninodes: sb.ninodes,
            entry_size: sb.entry_size(),
            inode_bits,
            zone_bits,
            direct_zones: options.direct_zones,
        })
    }

    /// Byte offset of a 1-based inode number in the inode table
    pub fn inode_offset(&self, inode_num: u16) -> u64 {
        self.inode_table_start * BLOCK_SIZE as u64 + (inode_num as u64 - 1) * INODE_SIZE as u64
    }

    pub fn zone_offset(&self, zone: u16) -> u64 {
        zone as u64 * BLOCK_SIZE as u64
    }

    /// Zone number backed by a zone bitmap bit
    pub fn zone_for_bit(&self, bit: usize) -> u16 {
        (self.first_data_zone as usize + bit) as u16
    }

    /// Zone bitmap bit backing a data zone
    pub fn bit_for_zone(&self, zone: u16) -> usize {
        (zone - self.first_data_zone) as usize
    }

    pub fn is_data_zone(&self, zone: u16) -> bool {
        zone >= self.first_data_zone && zone < self.nzones
    }

    pub fn name_len(&self) -> usize {
        self.entry_size - 2
    }

    /// Directory entries per zone
    pub fn entries_per_zone(&self) -> usize {
        BLOCK_SIZE / self.entry_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn superblock() -> Superblock {
        Superblock {
            ninodes: 64,
            nzones: 200,
            imap_blocks: 1,
            zmap_blocks: 1,
            firstdatazone: 6,
            log_zone_size: 0,
            maxfilesize: MINIX_MAX_FILE_SIZE,
            magic: MINIX_SUPER_MAGIC2,
            state: MINIX_VALID_FS,
        }
    }

    #[test]
    fn test_layout_offsets() {
        let layout = Layout::new(&superblock(), &FsOptions::default()).unwrap();
        assert_eq!(layout.zmap_start, 3);
        assert_eq!(layout.inode_table_start, 4);
        assert_eq!(layout.inode_table_blocks, 2);
        assert_eq!(layout.inode_offset(1), 4 * 1024);
        assert_eq!(layout.inode_offset(3), 4 * 1024 + 64);
        assert_eq!(layout.entry_size, 32);
        assert_eq!(layout.entries_per_zone(), 32);
        assert_eq!(layout.zone_bits, 194);
        assert_eq!(layout.zone_for_bit(0), 6);
        assert_eq!(layout.zone_for_bit(1), 7);
        assert_eq!(layout.bit_for_zone(10), 4);
    }

    #[test]
    fn test_overlapping_inode_table() {
        let mut sb = superblock();
        sb.firstdatazone = 5;
        assert!(matches!(
            Layout::new(&sb, &FsOptions::default()),
            Err(MfsError::FormatError(_))
        ));
    }

    #[test]
    fn test_direct_zone_option_range() {
        let options = FsOptions { direct_zones: 10, ..FsOptions::default() };
        assert!(matches!(
            Layout::new(&superblock(), &options),
            Err(MfsError::InvalidInput(_))
        ));
    }
}
