//! Dependency declarations.
//!
//! Specific dependency kinds (external module coordinates, project-to-project dependencies,
//! version catalogs, ...) are external collaborators — only the shape every dependency shares,
//! and the one concrete kind this crate needs to exercise file-collection views
//! ([`FileCollectionDependency`]), live here.

use crate::buildable::{Buildable, TaskDependencyContainer};
use crate::file_collection::fileset::FileSet;
use crate::file_collection::FileCollection;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing identity for a [`Dependency`] instance. Two dependencies are never
/// equal by id even if every other field matches — equality for collection purposes is
/// determined by the container, not by `Dependency` itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DependencyId(u64);

impl DependencyId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// An opaque declaration of something a configuration depends on.
pub trait Dependency: Debug + Send + Sync {
    /// The identity of this particular declaration.
    fn id(&self) -> DependencyId;

    /// Produce an independent, equal instance with a fresh identity — used by
    /// [`Configuration::copy`](crate::configuration::Configuration::copy).
    fn copy(&self) -> Box<dyn Dependency>;

    /// Downcast support for the one concrete subtype this crate distinguishes: file-collection
    /// dependencies, which expose a file set and build dependencies directly rather than going
    /// through the resolver.
    fn as_file_collection(&self) -> Option<&dyn FileCollectionDependency> {
        None
    }
}

assert_obj_safe!(Dependency);

/// A dependency whose contents are already known files on disk, rather than coordinates to be
/// resolved against a repository.
pub trait FileCollectionDependency: Dependency {
    fn files(&self) -> FileSet;
}

/// A concrete [`FileCollectionDependency`] wrapping a [`FileSet`] directly.
#[derive(Debug, Clone)]
pub struct LocalFileDependency {
    id: DependencyId,
    files: FileSet,
}

impl LocalFileDependency {
    pub fn new(files: FileSet) -> Self {
        Self {
            id: DependencyId::next(),
            files,
        }
    }
}

impl Dependency for LocalFileDependency {
    fn id(&self) -> DependencyId {
        self.id
    }

    fn copy(&self) -> Box<dyn Dependency> {
        Box::new(LocalFileDependency {
            id: DependencyId::next(),
            files: self.files.clone(),
        })
    }

    fn as_file_collection(&self) -> Option<&dyn FileCollectionDependency> {
        Some(self)
    }
}

impl FileCollectionDependency for LocalFileDependency {
    fn files(&self) -> FileSet {
        self.files.clone()
    }
}

impl Buildable for LocalFileDependency {
    fn build_dependencies(&self) -> TaskDependencyContainer {
        self.files.build_dependencies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_produces_distinct_identity() {
        let dep = LocalFileDependency::new(FileSet::with_path("/tmp/a.jar"));
        let copy = dep.copy();
        assert_ne!(dep.id(), copy.id());
    }

    #[test]
    fn file_collection_dependency_exposes_files() {
        let dep = LocalFileDependency::new(FileSet::with_path("/tmp/a.jar"));
        let as_fc = dep.as_file_collection().unwrap();
        assert_eq!(as_fc.files().files().len(), 1);
    }
}
