//! Produced artifacts — files a configuration can be asked to publish or consume.

use crate::buildable::{Buildable, TaskDependencyContainer};
use crate::file_collection::fileset::FileSet;
use crate::file_collection::FileCollection;
use std::fmt::Debug;
use std::path::PathBuf;

/// An opaque produced artifact. Carries a file set (conventionally one file, but modeled as a
/// `FileSet` so a directory of class files can be published just as easily as a single jar)
/// and whatever build dependencies are needed to produce it.
pub trait PublishArtifact: Debug + Buildable {
    /// The file (or files) this artifact resolves to.
    fn files(&self) -> FileSet;

    /// The file extension this artifact declares, if any — used to seed an
    /// [`AttributeContainer`](crate::attributes::AttributeContainer) when matching transforms.
    fn extension(&self) -> Option<&str>;
}

assert_obj_safe!(PublishArtifact);

/// A [`PublishArtifact`] backed by a single file already present on disk.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    file: PathBuf,
    extension: Option<String>,
    built_by: FileSet,
}

impl FileArtifact {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let extension = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string);
        let built_by = FileSet::with_path(&file);
        Self {
            file,
            extension,
            built_by,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.file
    }
}

impl PublishArtifact for FileArtifact {
    fn files(&self) -> FileSet {
        FileSet::with_path(&self.file)
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

impl Buildable for FileArtifact {
    fn build_dependencies(&self) -> TaskDependencyContainer {
        self.built_by.build_dependencies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_extension_from_path() {
        let artifact = FileArtifact::new("/tmp/out/lib.aar");
        assert_eq!(artifact.extension(), Some("aar"));
        assert_eq!(artifact.files().files().len(), 1);
    }

    #[test]
    fn no_extension_when_path_has_none() {
        let artifact = FileArtifact::new("/tmp/out/README");
        assert_eq!(artifact.extension(), None);
    }
}
