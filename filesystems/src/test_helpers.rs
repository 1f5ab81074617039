// Test helpers for filesystem testing

use crate::families::minix::{MinixFormatter, MinixFs};
use mfstool_core::{FormatOptions, FsOptions};
use std::io::Cursor;

pub type MemoryFs = MinixFs<Cursor<Vec<u8>>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Format an in-memory image with the given name length (14 or 30)
pub fn create_test_image(inodes: u16, blocks: u16, name_len: usize) -> Cursor<Vec<u8>> {
    let mut image = Cursor::new(Vec::new());
    MinixFormatter::format(&mut image, &FormatOptions { inodes, blocks, name_len })
        .expect("Failed to format test image");
    image
}

/// Open a freshly formatted image with 32-byte directory entries
pub fn create_test_fs() -> MemoryFs {
    init_logging();
    MinixFs::open(create_test_image(64, 256, 30), FsOptions::default())
        .expect("Failed to open test image")
}

pub fn create_test_fs_with(name_len: usize, options: FsOptions) -> MemoryFs {
    init_logging();
    MinixFs::open(create_test_image(64, 256, name_len), options)
        .expect("Failed to open test image")
}

/// Create a file at `path` holding `content`
pub fn write_file(fs: &mut MemoryFs, path: &str, content: &[u8]) -> u16 {
    let inode = fs.touch(path).expect("touch failed");
    fs.append(path, content).expect("append failed");
    inode
}
