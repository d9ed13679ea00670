//! The lazy, spec-filtered file collection view over a configuration's resolved files (§4.7).

use crate::buildable::{Buildable, TaskDependencyContainer};
use crate::configuration::core::Configuration;
use crate::configuration::state::ResolvedState;
use crate::dependency::Dependency;
use crate::file_collection::FileCollection;
use crate::lenient_view::{ArtifactVisitor, LenientView};
use crate::utilities::Spec;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Returned by [`Configuration::file_collection`]. Requesting its files drives the owning
/// configuration to `ARTIFACTS_RESOLVED` under the resolution lock, then walks the lenient view
/// filtered by `spec`; its build dependencies forward to the owning configuration's
/// build-dependency query rather than tracking any of its own.
pub struct ConfigurationFileCollection {
    configuration: Configuration,
    spec: Arc<dyn Spec<dyn Dependency> + Send + Sync>,
}

impl ConfigurationFileCollection {
    pub(crate) fn new(
        configuration: Configuration,
        spec: Arc<dyn Spec<dyn Dependency> + Send + Sync>,
    ) -> Self {
        Self { configuration, spec }
    }
}

impl FileCollection for ConfigurationFileCollection {
    fn files(&self) -> HashSet<PathBuf> {
        if let Err(e) = self
            .configuration
            .resolve_to_state_or_later(ResolvedState::ArtifactsResolved)
        {
            warn!(
                "{} could not resolve to ARTIFACTS_RESOLVED for a file collection view: {}",
                self.configuration.path(),
                e
            );
            return HashSet::new();
        }

        let first_level = self.configuration.first_level_components();
        let (mut visitor, collected) = ArtifactVisitor::collecting_files();
        let walked = self.configuration.with_resolved_results(|results| {
            results.map(|results| {
                let view = LenientView::new(self.configuration.path().clone(), results);
                view.walk(self.spec.as_ref(), &first_level, &mut visitor)
            })
        });

        if let Some(Err(e)) = walked {
            warn!("{} lenient file walk failed: {}", self.configuration.path(), e);
        }

        collected.lock().iter().cloned().collect()
    }
}

impl Buildable for ConfigurationFileCollection {
    fn build_dependencies(&self) -> TaskDependencyContainer {
        self.configuration.build_dependencies().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::tests::EchoResolver;
    use crate::identifier::ProjectId;
    use crate::utilities::True;

    #[test]
    fn files_drives_resolution_and_forwards_build_dependencies() {
        let configuration = Configuration::new(
            ProjectId::root().configuration_path("runtime").unwrap(),
            Arc::new(EchoResolver),
        );
        let view = configuration.file_collection(Arc::new(True::new()));

        assert_eq!(configuration.resolved_state(), ResolvedState::Unresolved);
        let files = view.files();
        assert_eq!(configuration.resolved_state(), ResolvedState::ArtifactsResolved);
        assert_eq!(files, HashSet::from([PathBuf::from("/tmp/resolved.jar")]));
        assert!(view.build_dependencies().is_empty());
    }

    #[test]
    fn resolution_failure_yields_empty_files() {
        use crate::error::ConfigurationError;
        use crate::identifier::ConfigurationPath;
        use crate::resolver::{Resolver, ResolverResults};

        struct NeverResolves;
        impl Resolver for NeverResolves {
            fn resolve_build_dependencies(
                &self,
                _path: &ConfigurationPath,
                _out: &mut ResolverResults,
            ) -> TaskDependencyContainer {
                TaskDependencyContainer::new()
            }

            fn resolve_graph(
                &self,
                path: &ConfigurationPath,
                _out: &mut ResolverResults,
            ) -> Result<(), ConfigurationError> {
                Err(ConfigurationError::ResolutionNotAllowed { path: path.clone() })
            }

            fn resolve_artifacts(
                &self,
                _path: &ConfigurationPath,
                _out: &mut ResolverResults,
            ) -> Result<(), ConfigurationError> {
                Ok(())
            }
        }

        let configuration = Configuration::new(
            ProjectId::root().configuration_path("broken").unwrap(),
            Arc::new(NeverResolves),
        );
        let view = configuration.file_collection(Arc::new(True::new()));
        assert!(view.files().is_empty());
    }
}
