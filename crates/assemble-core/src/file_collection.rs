//! Defines types of file collections and the FileCollection trait.
//!
//! Artifacts handed out by a resolution are already-resolved concrete files, not source trees
//! to be scanned — so unlike a general-purpose file collection, [`Component`] only ever names a
//! single file or another nested [`FileSet`], never a directory to walk.

use crate::buildable::Buildable;
use crate::utilities::Spec;
use std::collections::HashSet;
use std::env::{join_paths, JoinPathsError};
use std::ffi::OsString;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

use crate::file_collection::fileset::FileSet;

pub mod fileset;

/// A collection of files.
pub trait FileCollection: Send + Sync + Buildable {
    /// Gets a set of files that make up this file collection
    fn files(&self) -> HashSet<PathBuf>;

    /// Gets whether this file collection contains any files
    fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    /// Create a PATH based on the files in this collection
    fn as_path(&self) -> Result<OsString, JoinPathsError> {
        join_paths(self.files())
    }
}

#[derive(Clone)]
pub enum Component {
    Path(PathBuf),
    Collection(FileSet),
}

impl Component {
    pub fn iter(&self) -> Box<dyn Iterator<Item = PathBuf> + '_> {
        match self {
            Component::Path(p) => Box::new(Some(p.clone()).into_iter()),
            Component::Collection(c) => Box::new(c.iter()),
        }
    }
}

impl<'f> IntoIterator for &'f Component {
    type Item = PathBuf;
    type IntoIter = Box<dyn Iterator<Item = PathBuf> + 'f>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over file components.
pub struct FileIterator<'files> {
    components: &'files [Component],
    filters: &'files dyn FileFilter,
    index: usize,
    current_iterator: Option<Box<dyn Iterator<Item = PathBuf> + 'files>>,
}

impl<'files> FileIterator<'files> {
    fn next_iterator(&mut self) -> Option<Box<dyn Iterator<Item = PathBuf> + 'files>> {
        if self.index == self.components.len() {
            return None;
        }

        let output = Some(self.components[self.index].iter());
        self.index += 1;
        output
    }

    fn get_next_path(&mut self) -> Option<PathBuf> {
        'OUTER: loop {
            if self.current_iterator.is_none() {
                self.current_iterator = self.next_iterator();
            }

            if let Some(iterator) = &mut self.current_iterator {
                for path in iterator.by_ref() {
                    if self.filters.accept(&path) {
                        break 'OUTER Some(path);
                    }
                }
            } else {
                break None;
            }
            self.current_iterator = None;
        }
    }
}

impl<'files> Iterator for FileIterator<'files> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_path()
    }
}

pub trait FileFilter: Spec<Path> + Send + Sync {}

assert_obj_safe!(FileFilter);

impl<F> FileFilter for F where F: Spec<Path> + Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::True;

    #[test]
    fn component_iterates_single_file() {
        let component = Component::Path(PathBuf::from("/tmp/a.txt"));
        let files: Vec<_> = component.iter().collect();
        assert_eq!(files, vec![PathBuf::from("/tmp/a.txt")]);
    }

    #[test]
    fn file_iterator_applies_filter() {
        let components = vec![
            Component::Path(PathBuf::from("/tmp/a.txt")),
            Component::Path(PathBuf::from("/tmp/b.jar")),
        ];
        let filter = |p: &Path| p.extension().map(|e| e == "jar").unwrap_or(false);
        let iter = FileIterator {
            components: &components,
            filters: &filter,
            index: 0,
            current_iterator: None,
        };
        let matched: Vec<_> = iter.collect();
        assert_eq!(matched, vec![PathBuf::from("/tmp/b.jar")]);
    }

    #[test]
    fn true_filter_accepts_all() {
        let filter: True<Path> = True::new();
        assert!(filter.accept(Path::new("/anything")));
    }
}
