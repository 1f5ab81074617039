// Filesystem families organization
pub mod families;

#[cfg(test)]
pub mod test_helpers;

pub use families::minix::{
    EntryKind, Inode, Layout, MinixFormatter, MinixFs, Superblock,
};
