// Filesystem families supported by mfstool
pub mod minix;
