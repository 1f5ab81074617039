use crate::MfsError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// A raw disk image backing a filesystem session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDevice {
    pub path: PathBuf,
    pub size: u64,
    pub read_only: bool,
}

impl ImageDevice {
    /// Describe an existing image file
    pub fn open<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Self, MfsError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                MfsError::PathNotFound(format!("image {}", path.display()))
            }
            _ => MfsError::IoError(e),
        })?;

        if !metadata.is_file() {
            return Err(MfsError::InvalidInput(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        debug!("Image {} ({} bytes, read_only={})", path.display(), metadata.len(), read_only);

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            read_only,
        })
    }

    /// Create (or truncate) an image file of the given size
    pub fn create<P: AsRef<Path>>(path: P, size: u64) -> Result<Self, MfsError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size)?;

        Ok(Self {
            path: path.to_path_buf(),
            size,
            read_only: false,
        })
    }

    /// Open the backing file with the access mode this device was described with
    pub fn open_file(&self) -> Result<File, MfsError> {
        let file = OpenOptions::new()
            .read(true)
            .write(!self.read_only)
            .open(&self.path)?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_existing_image() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[0xAB; 2048]).unwrap();

        let device = ImageDevice::open(temp.path(), true).unwrap();
        assert_eq!(device.size, 2048);

        let mut buf = Vec::new();
        device.open_file().unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf.len(), 2048);
    }

    #[test]
    fn test_read_only_handle_rejects_writes() {
        let temp = NamedTempFile::new().unwrap();
        let device = ImageDevice::open(temp.path(), true).unwrap();
        let mut file = device.open_file().unwrap();
        assert!(file.write_all(b"x").is_err());
    }

    #[test]
    fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageDevice::open(dir.path().join("nope.img"), false).unwrap_err();
        assert!(matches!(err, MfsError::PathNotFound(_)));
    }

    #[test]
    fn test_create_sets_length() {
        let dir = tempfile::tempdir().unwrap();
        let device = ImageDevice::create(dir.path().join("new.img"), 64 * 1024).unwrap();
        assert_eq!(std::fs::metadata(&device.path).unwrap().len(), 64 * 1024);
        assert!(!device.read_only);
    }
}
