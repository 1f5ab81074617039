// Minix V1 image formatter
// Lays out an empty filesystem: superblock, bitmaps, inode table and a root directory.

use log::info;
use mfstool_core::{FormatOptions, MfsError};
use std::io::{Seek, SeekFrom, Write};

use super::bitmap::Bitmap;
use super::constants::*;
use super::directory::encode_entry;
use super::inode::Inode;
use super::superblock::Superblock;

const BITS_PER_BLOCK: usize = BLOCK_SIZE * 8;

pub struct MinixFormatter;

impl MinixFormatter {
    /// Compute the superblock for a set of format options
    pub fn plan(options: &FormatOptions) -> Result<Superblock, MfsError> {
        let magic = match options.name_len {
            14 => MINIX_SUPER_MAGIC,
            30 => MINIX_SUPER_MAGIC2,
            other => {
                return Err(MfsError::InvalidInput(format!(
                    "name length must be 14 or 30, got {}",
                    other
                )))
            }
        };
        if options.inodes < 2 {
            return Err(MfsError::InvalidInput("at least 2 inodes are required".to_string()));
        }

        let ninodes = options.inodes as usize;
        let nzones = options.blocks as usize;
        let imap_blocks = (ninodes + 1).div_ceil(BITS_PER_BLOCK);
        let zmap_blocks = nzones.div_ceil(BITS_PER_BLOCK);
        let inode_table_blocks = (ninodes * INODE_SIZE).div_ceil(BLOCK_SIZE);
        let firstdatazone = 2 + imap_blocks + zmap_blocks + inode_table_blocks;

        // Room for the root directory plus at least one more zone
        if nzones < firstdatazone + 2 {
            return Err(MfsError::InvalidInput(format!(
                "{} blocks is too small: metadata alone needs {}",
                nzones, firstdatazone
            )));
        }

        Ok(Superblock {
            ninodes: options.inodes,
            nzones: options.blocks,
            imap_blocks: imap_blocks as u16,
            zmap_blocks: zmap_blocks as u16,
            firstdatazone: firstdatazone as u16,
            log_zone_size: 0,
            maxfilesize: MINIX_MAX_FILE_SIZE,
            magic,
            state: MINIX_VALID_FS,
        })
    }

    /// Write a fresh empty filesystem over the whole device
    pub fn format<D: Write + Seek>(device: &mut D, options: &FormatOptions) -> Result<Superblock, MfsError> {
        let sb = Self::plan(options)?;
        let entry_size = sb.entry_size();
        let root_zone = sb.firstdatazone;

        info!(
            "Formatting Minix image: {} inodes, {} blocks, {}-byte entries",
            sb.ninodes, sb.nzones, entry_size
        );

        device.seek(SeekFrom::Start(0))?;
        let zeros = vec![0u8; BLOCK_SIZE];
        for _ in 0..sb.nzones {
            device.write_all(&zeros)?;
        }

        device.seek(SeekFrom::Start(SUPERBLOCK_OFFSET))?;
        device.write_all(&sb.serialize())?;

        // Inode map: bit 0 reserved, bit 1 root, bits past ninodes padded as used
        let inode_bits = sb.ninodes as usize + 1;
        let mut imap = Bitmap::new(sb.imap_blocks as usize * BITS_PER_BLOCK);
        imap.set_bit(0);
        imap.set_bit(ROOT_INODE as usize);
        imap.set_range(inode_bits, imap.len() - inode_bits);
        device.seek(SeekFrom::Start(IMAP_START_BLOCK * BLOCK_SIZE as u64))?;
        device.write_all(imap.as_bytes())?;

        // Zone map: bit 0 is the root directory's zone, bits past the last zone padded
        let zone_bits = (sb.nzones - sb.firstdatazone) as usize;
        let mut zmap = Bitmap::new(sb.zmap_blocks as usize * BITS_PER_BLOCK);
        zmap.set_bit(0);
        zmap.set_range(zone_bits, zmap.len() - zone_bits);
        device.write_all(zmap.as_bytes())?;

        let mut root = Inode::new_directory(chrono::Utc::now().timestamp().max(0) as u32);
        root.size = (2 * entry_size) as u32;
        root.zone[0] = root_zone;
        let inode_table = (IMAP_START_BLOCK + sb.imap_blocks as u64 + sb.zmap_blocks as u64) * BLOCK_SIZE as u64;
        device.seek(SeekFrom::Start(inode_table))?;
        device.write_all(&root.serialize())?;

        device.seek(SeekFrom::Start(root_zone as u64 * BLOCK_SIZE as u64))?;
        device.write_all(&encode_entry(ROOT_INODE, b".", entry_size)?)?;
        device.write_all(&encode_entry(ROOT_INODE, b"..", entry_size)?)?;

        device.flush()?;
        Ok(sb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_geometry() {
        let sb = MinixFormatter::plan(&FormatOptions { inodes: 64, blocks: 200, name_len: 30 }).unwrap();
        assert_eq!(sb.imap_blocks, 1);
        assert_eq!(sb.zmap_blocks, 1);
        // boot + super + imap + zmap + 2 inode table blocks
        assert_eq!(sb.firstdatazone, 6);
        assert_eq!(sb.magic, MINIX_SUPER_MAGIC2);
        sb.validate().unwrap();
    }

    #[test]
    fn test_plan_rejects_bad_options() {
        let too_small = FormatOptions { inodes: 64, blocks: 6, name_len: 30 };
        assert!(matches!(MinixFormatter::plan(&too_small), Err(MfsError::InvalidInput(_))));

        let bad_name = FormatOptions { name_len: 20, ..FormatOptions::default() };
        assert!(matches!(MinixFormatter::plan(&bad_name), Err(MfsError::InvalidInput(_))));
    }
}
