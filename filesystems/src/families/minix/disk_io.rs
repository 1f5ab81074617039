// Raw image access for a Minix session: byte ranges, inode records, zones

use log::trace;
use mfstool_core::MfsError;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use super::constants::*;
use super::filesystem::MinixFs;
use super::inode::Inode;

impl<D: Read + Seek> MinixFs<D> {
    pub(super) fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, MfsError> {
        let mut buffer = vec![0u8; len];
        self.device.seek(SeekFrom::Start(offset))?;
        self.device.read_exact(&mut buffer).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => MfsError::FormatError(format!(
                "image truncated: cannot read {} bytes at offset {}",
                len, offset
            )),
            _ => MfsError::IoError(e),
        })?;
        Ok(buffer)
    }

    fn check_inode_num(&self, inode_num: u16) -> Result<(), MfsError> {
        if inode_num == 0 || inode_num > self.layout.ninodes {
            return Err(MfsError::FormatError(format!(
                "inode number {} outside 1..={}",
                inode_num, self.layout.ninodes
            )));
        }
        Ok(())
    }

    pub(super) fn check_data_zone(&self, zone: u16) -> Result<(), MfsError> {
        if !self.layout.is_data_zone(zone) {
            return Err(MfsError::FormatError(format!(
                "zone {} outside data area {}..{}",
                zone, self.layout.first_data_zone, self.layout.nzones
            )));
        }
        Ok(())
    }

    /// Read an inode by its 1-based number
    pub fn read_inode(&mut self, inode_num: u16) -> Result<Inode, MfsError> {
        self.check_inode_num(inode_num)?;
        let offset = self.layout.inode_offset(inode_num);
        trace!("Reading inode {} at offset {}", inode_num, offset);
        let record = self.read_at(offset, INODE_SIZE)?;
        Inode::parse(&record)
    }

    /// Read a whole data zone
    pub(super) fn read_zone(&mut self, zone: u16) -> Result<Vec<u8>, MfsError> {
        self.check_data_zone(zone)?;
        self.read_at(self.layout.zone_offset(zone), BLOCK_SIZE)
    }
}

impl<D: Read + Write + Seek> MinixFs<D> {
    pub(super) fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), MfsError> {
        if self.options.read_only {
            return Err(MfsError::ReadOnly(format!(
                "refusing to write {} bytes at offset {}",
                data.len(),
                offset
            )));
        }
        self.device.seek(SeekFrom::Start(offset))?;
        self.device.write_all(data)?;
        Ok(())
    }

    pub fn write_inode(&mut self, inode_num: u16, inode: &Inode) -> Result<(), MfsError> {
        self.check_inode_num(inode_num)?;
        let offset = self.layout.inode_offset(inode_num);
        trace!("Writing inode {} (size {}) at offset {}", inode_num, inode.size, offset);
        self.write_at(offset, &inode.serialize())
    }

    /// Write into a data zone starting `offset` bytes into it
    pub(super) fn write_zone(&mut self, zone: u16, offset: usize, data: &[u8]) -> Result<(), MfsError> {
        self.check_data_zone(zone)?;
        if offset + data.len() > BLOCK_SIZE {
            return Err(MfsError::InvalidInput(format!(
                "write of {} bytes at {} overruns zone {}",
                data.len(),
                offset,
                zone
            )));
        }
        self.write_at(self.layout.zone_offset(zone) + offset as u64, data)
    }

    pub fn flush(&mut self) -> Result<(), MfsError> {
        self.device.flush()?;
        Ok(())
    }
}
