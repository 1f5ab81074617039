// Minix V1 filesystem family
// Superblock/inode codecs, bitmap allocation, directories, path resolution and file I/O

pub mod constants;
pub mod superblock;
pub mod inode;
pub mod layout;
pub mod bitmap;
pub mod directory;
pub mod path_resolution;
pub mod reader;
pub mod writer;
pub mod filesystem;
pub mod formatter;
mod disk_io;


pub use bitmap::{Bitmap, BitmapKind};
pub use directory::{decode_entry, encode_entry, entry_size, DirSlot, DirectoryListing};
pub use filesystem::MinixFs;
pub use formatter::MinixFormatter;
pub use inode::Inode;
pub use layout::Layout;
pub use path_resolution::split_path;
pub use superblock::Superblock;
pub use writer::EntryKind;
