// Occupancy bitmaps for inode and zone allocation
// One bit per slot, LSB-first within each byte; bit set = allocated.

use log::{debug, trace};
use mfstool_core::MfsError;
use std::io::{Read, Seek, Write};

use super::constants::BLOCK_SIZE;
use super::filesystem::MinixFs;

/// In-memory view of an occupancy bitmap
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<u8>,
    size_bits: usize,
}

impl Bitmap {
    /// Create a bitmap with every slot free
    pub fn new(size_bits: usize) -> Self {
        Self {
            data: vec![0u8; size_bits.div_ceil(8)],
            size_bits,
        }
    }

    /// Wrap raw bitmap bytes; only the first `size_bits` bits are considered
    pub fn from_bytes(mut data: Vec<u8>, size_bits: usize) -> Self {
        data.resize(size_bits.div_ceil(8), 0);
        Self { data, size_bits }
    }

    pub fn len(&self) -> usize {
        self.size_bits
    }

    pub fn is_empty(&self) -> bool {
        self.size_bits == 0
    }

    /// Index of the first clear bit, if any
    pub fn find_first_zero(&self) -> Option<usize> {
        self.data
            .iter()
            .enumerate()
            .find(|(_, &byte)| byte != 0xFF)
            .map(|(i, &byte)| i * 8 + byte.trailing_ones() as usize)
            .filter(|&bit| bit < self.size_bits)
    }

    pub fn set_bit(&mut self, index: usize) {
        if index < self.size_bits {
            self.data[index / 8] |= 1 << (index % 8);
        }
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < self.size_bits && self.data[index / 8] & (1 << (index % 8)) != 0
    }

    pub fn set_range(&mut self, start: usize, count: usize) {
        for i in start..start.saturating_add(count).min(self.size_bits) {
            self.set_bit(i);
        }
    }

    pub fn count_free(&self) -> usize {
        let used: usize = self.data.iter().map(|b| b.count_ones() as usize).sum();
        // Bits past size_bits are never set through this type, but raw images may carry padding
        let padding: usize = (self.size_bits..self.data.len() * 8)
            .filter(|&i| self.data[i / 8] & (1 << (i % 8)) != 0)
            .count();
        self.size_bits - (used - padding)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Which of the two on-disk bitmaps an allocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapKind {
    Inode,
    Zone,
}

impl<D: Read + Seek> MinixFs<D> {
    /// Scan a bitmap from its first block for the first clear bit among `slot_count` bits
    pub fn find_free(&mut self, bitmap_start_block: u64, slot_count: usize) -> Result<usize, MfsError> {
        let bytes = self.read_at(bitmap_start_block * BLOCK_SIZE as u64, slot_count.div_ceil(8))?;
        let bitmap = Bitmap::from_bytes(bytes, slot_count);
        bitmap.find_first_zero().ok_or_else(|| {
            MfsError::AllocatorFull(format!(
                "bitmap at block {} has no free bit among {} slots",
                bitmap_start_block, slot_count
            ))
        })
    }

    pub fn is_used(&mut self, bitmap_start_block: u64, index: usize) -> Result<bool, MfsError> {
        let byte = self.read_at(bitmap_start_block * BLOCK_SIZE as u64 + (index / 8) as u64, 1)?[0];
        Ok(byte & (1 << (index % 8)) != 0)
    }

    pub fn bitmap(&mut self, kind: BitmapKind) -> Result<Bitmap, MfsError> {
        let (start, bits) = self.bitmap_geometry(kind);
        let bytes = self.read_at(start * BLOCK_SIZE as u64, bits.div_ceil(8))?;
        Ok(Bitmap::from_bytes(bytes, bits))
    }

    fn bitmap_geometry(&self, kind: BitmapKind) -> (u64, usize) {
        match kind {
            BitmapKind::Inode => (self.layout.imap_start, self.layout.inode_bits),
            BitmapKind::Zone => (self.layout.zmap_start, self.layout.zone_bits),
        }
    }

    /// Find a free slot in one of the session's bitmaps without claiming it
    pub(super) fn find_free_slot_in(&mut self, kind: BitmapKind) -> Result<usize, MfsError> {
        let (start, bits) = self.bitmap_geometry(kind);
        let bit = self.find_free(start, bits).map_err(|e| match e {
            MfsError::AllocatorFull(_) => MfsError::AllocatorFull(match kind {
                BitmapKind::Inode => "no free inode".to_string(),
                BitmapKind::Zone => "no free zone".to_string(),
            }),
            other => other,
        })?;
        // Inode numbers start at 1, so inode bit 0 never backs a real inode
        if kind == BitmapKind::Inode && bit == 0 {
            return Err(MfsError::FormatError(
                "reserved bit 0 of the inode bitmap is clear".to_string(),
            ));
        }
        Ok(bit)
    }
}

impl<D: Read + Write + Seek> MinixFs<D> {
    /// Set a single bitmap bit, rewriting only the byte that holds it
    pub fn mark_used(&mut self, bitmap_start_block: u64, index: usize) -> Result<(), MfsError> {
        let offset = bitmap_start_block * BLOCK_SIZE as u64 + (index / 8) as u64;
        let byte = self.read_at(offset, 1)?[0] | (1 << (index % 8));
        trace!("Marking bit {} of bitmap at block {}", index, bitmap_start_block);
        self.write_at(offset, &[byte])
    }

    pub(super) fn claim(&mut self, kind: BitmapKind, bit: usize) -> Result<(), MfsError> {
        let (start, _) = self.bitmap_geometry(kind);
        self.mark_used(start, bit)
    }

    /// Allocate an inode number
    pub fn allocate_inode(&mut self) -> Result<u16, MfsError> {
        let bit = self.find_free_slot_in(BitmapKind::Inode)?;
        self.claim(BitmapKind::Inode, bit)?;
        debug!("Allocated inode {}", bit);
        Ok(bit as u16)
    }

    /// Allocate a data zone and return its zone number
    pub fn allocate_zone(&mut self) -> Result<u16, MfsError> {
        let bit = self.find_free_slot_in(BitmapKind::Zone)?;
        self.claim(BitmapKind::Zone, bit)?;
        let zone = self.layout.zone_for_bit(bit);
        debug!("Allocated zone {} (bit {})", zone, bit);
        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_first_zero_lsb_first() {
        let bitmap = Bitmap::from_bytes(vec![0xFF, 0b0000_0111], 16);
        assert_eq!(bitmap.find_first_zero(), Some(11));

        let full = Bitmap::from_bytes(vec![0xFF, 0xFF], 16);
        assert_eq!(full.find_first_zero(), None);
    }

    #[test]
    fn test_find_first_zero_respects_size() {
        // Bits 0..10 used; bit 10 is past the end of a 10-bit map
        let bitmap = Bitmap::from_bytes(vec![0xFF, 0b0000_0011], 10);
        assert_eq!(bitmap.find_first_zero(), None);
    }

    #[test]
    fn test_set_bit_never_found_again() {
        let mut bitmap = Bitmap::new(20);
        for expected in 0..20 {
            let free = bitmap.find_first_zero().unwrap();
            assert_eq!(free, expected);
            assert!(!bitmap.is_set(free));
            bitmap.set_bit(free);
            assert!(bitmap.is_set(free));
        }
        assert_eq!(bitmap.find_first_zero(), None);
        assert_eq!(bitmap.count_free(), 0);
    }

    #[test]
    fn test_bitmap_operations() {
        let mut bitmap = Bitmap::new(100);
        assert_eq!(bitmap.count_free(), 100);

        bitmap.set_bit(0);
        bitmap.set_bit(10);
        bitmap.set_bit(99);
        bitmap.set_bit(150);
        assert!(bitmap.is_set(10));
        assert!(!bitmap.is_set(50));
        assert!(!bitmap.is_set(150));
        assert_eq!(bitmap.count_free(), 97);

        bitmap.set_range(20, 10);
        assert!((20..30).all(|i| bitmap.is_set(i)));
        assert_eq!(bitmap.count_free(), 87);
        assert_eq!(bitmap.as_bytes()[0], 0b0000_0001);
    }

    #[test]
    fn test_count_free_ignores_padding() {
        // 12 valid bits, padding bits 12..16 set as a formatter leaves them
        let bitmap = Bitmap::from_bytes(vec![0b0000_0011, 0b1111_0000], 12);
        assert_eq!(bitmap.count_free(), 10);
        assert_eq!(bitmap.find_first_zero(), Some(2));
    }
}
