// Minix V1 on-disk constants

/// Fixed block (and zone) size
pub const BLOCK_SIZE: usize = 1024;

/// Superblock lives in block 1, after the boot block
pub const SUPERBLOCK_OFFSET: u64 = BLOCK_SIZE as u64;
pub const SUPERBLOCK_SIZE: usize = BLOCK_SIZE;
/// Bytes of the superblock actually carrying fields
pub const SUPERBLOCK_FIELDS_SIZE: usize = 20;

/// First bitmap block (inode map)
pub const IMAP_START_BLOCK: u64 = 2;

pub const INODE_SIZE: usize = 32;
pub const ROOT_INODE: u16 = 1;

/// 14-character names, 16-byte directory entries
pub const MINIX_SUPER_MAGIC: u16 = 0x137F;
/// 30-character names, 32-byte directory entries
pub const MINIX_SUPER_MAGIC2: u16 = 0x138F;

/// Superblock `state` values
pub const MINIX_VALID_FS: u16 = 0x0001;
pub const MINIX_ERROR_FS: u16 = 0x0002;

/// Largest file addressable through the full V1 zone tree (7 + 512 + 512*512 zones)
pub const MINIX_MAX_FILE_SIZE: u32 = 268_966_912;

// Mode bits
pub const S_IFMT: u16 = 0o170000;
pub const S_IFDIR: u16 = 0o040000;
pub const S_IFREG: u16 = 0o100000;

pub const DEFAULT_FILE_MODE: u16 = S_IFREG | 0o644;
pub const DEFAULT_DIR_MODE: u16 = S_IFDIR | 0o755;
