// Path resolution for Minix images
// Walks slash-separated paths from a directory inode to a terminal inode number

use log::{debug, trace};
use mfstool_core::MfsError;
use std::io::{Read, Seek};

use super::constants::ROOT_INODE;
use super::filesystem::MinixFs;

/// Split a path into its non-empty components
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl<D: Read + Seek> MinixFs<D> {
    /// Resolve `components` starting at directory inode `start`
    pub fn resolve(&mut self, start: u16, components: &[&str]) -> Result<u16, MfsError> {
        let mut current = start;
        let mut walked = String::new();

        for (i, component) in components.iter().enumerate() {
            let dir = self.read_inode(current)?;
            if !dir.is_directory() {
                return Err(MfsError::NotADirectory(if walked.is_empty() {
                    "/".to_string()
                } else {
                    walked.clone()
                }));
            }

            walked.push('/');
            walked.push_str(component);
            trace!("Resolving component '{}' in inode {}", component, current);

            let next = self
                .lookup(&dir, component.as_bytes())?
                .ok_or_else(|| MfsError::PathNotFound(walked.clone()))?;

            if i + 1 < components.len() && !self.read_inode(next)?.is_directory() {
                return Err(MfsError::NotADirectory(walked));
            }
            current = next;
        }

        Ok(current)
    }

    /// Resolve an absolute or root-relative path to an inode number
    pub fn resolve_path(&mut self, path: &str) -> Result<u16, MfsError> {
        debug!("Resolving path: {}", path);
        self.resolve(ROOT_INODE, &split_path(path))
    }

    /// Resolve the directory that would hold `path`, returning it with the final name
    pub fn resolve_parent<'p>(&mut self, path: &'p str) -> Result<(u16, &'p str), MfsError> {
        let components = split_path(path);
        let (name, parents) = components
            .split_last()
            .ok_or_else(|| MfsError::InvalidInput(format!("'{}' names the root directory", path)))?;

        let parent = self.resolve(ROOT_INODE, parents)?;
        if !self.read_inode(parent)?.is_directory() {
            return Err(MfsError::NotADirectory(format!("/{}", parents.join("/"))));
        }
        Ok((parent, *name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/a//b/c/"), vec!["a", "b", "c"]);
        assert_eq!(split_path("hello"), vec!["hello"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }
}
