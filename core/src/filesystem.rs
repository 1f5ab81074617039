use serde::{Deserialize, Serialize};

/// Number of zone slots in a V1 inode record
pub const INODE_ZONE_SLOTS: usize = 9;

/// Every zone-array slot is a direct data pointer unless a session opts down
pub const DEFAULT_DIRECT_ZONES: usize = INODE_ZONE_SLOTS;

/// Options controlling how a filesystem session treats the image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsOptions {
    pub read_only: bool,
    /// Leading zone-array slots treated as direct data pointers
    pub direct_zones: usize,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            direct_zones: DEFAULT_DIRECT_ZONES,
        }
    }
}

impl FsOptions {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    pub inodes: u16,
    /// Total image size in 1 KiB blocks
    pub blocks: u16,
    /// Maximum file name length: 14 or 30
    pub name_len: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            inodes: 128,
            blocks: 1024,
            name_len: 30,
        }
    }
}
