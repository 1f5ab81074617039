use thiserror::Error;

#[derive(Debug, Error)]
pub enum MfsError {
    #[error("Malformed image: {0}")]
    FormatError(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Name already exists: {0}")]
    NameExists(String),

    #[error("Name too long: '{name}' (max {max} bytes)")]
    NameTooLong { name: String, max: usize },

    #[error("No free slot: {0}")]
    AllocatorFull(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image is opened read-only: {0}")]
    ReadOnly(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Stable tag for each error family, independent of the message text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FormatError,
    PathNotFound,
    NotADirectory,
    IsADirectory,
    NameExists,
    NameTooLong,
    AllocatorFull,
    FileTooLarge,
    InvalidInput,
    ReadOnly,
    Io,
}

impl MfsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MfsError::FormatError(_) => ErrorKind::FormatError,
            MfsError::PathNotFound(_) => ErrorKind::PathNotFound,
            MfsError::NotADirectory(_) => ErrorKind::NotADirectory,
            MfsError::IsADirectory(_) => ErrorKind::IsADirectory,
            MfsError::NameExists(_) => ErrorKind::NameExists,
            MfsError::NameTooLong { .. } => ErrorKind::NameTooLong,
            MfsError::AllocatorFull(_) => ErrorKind::AllocatorFull,
            MfsError::FileTooLarge(_) => ErrorKind::FileTooLarge,
            MfsError::InvalidInput(_) => ErrorKind::InvalidInput,
            MfsError::ReadOnly(_) => ErrorKind::ReadOnly,
            MfsError::IoError(_) => ErrorKind::Io,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::FormatError => "FormatError",
            ErrorKind::PathNotFound => "PathNotFound",
            ErrorKind::NotADirectory => "NotADirectory",
            ErrorKind::IsADirectory => "IsADirectory",
            ErrorKind::NameExists => "NameExists",
            ErrorKind::NameTooLong => "NameTooLong",
            ErrorKind::AllocatorFull => "AllocatorFull",
            ErrorKind::FileTooLarge => "FileTooLarge",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::ReadOnly => "ReadOnly",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}
