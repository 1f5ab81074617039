pub mod device;
pub mod error;
pub mod filesystem;

pub use device::ImageDevice;
pub use error::{ErrorKind, MfsError};
pub use filesystem::{FormatOptions, FsOptions, DEFAULT_DIRECT_ZONES, INODE_ZONE_SLOTS};
