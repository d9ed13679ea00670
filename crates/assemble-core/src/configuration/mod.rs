//! The configuration object, its extension graph, and its resolution lifecycle.
//!
//! See [`Configuration`] for the central entity; [`state`] for the state lattice and mutation
//! classification it enforces; [`resolution`] for the two-phase resolve pipeline;
//! [`handler`] for the per-project registry that mints configurations.

mod core;
mod file_view;
pub mod handler;
pub mod resolution;
pub mod state;

pub use self::core::{Configuration, ResolutionStrategy};
pub use file_view::ConfigurationFileCollection;
pub use handler::ConfigurationHandler;
pub use resolution::ResolvableDependencies;
pub use state::{ConfigurationState, MutationType, ResolvedState};

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::artifact::FileArtifact;
    use crate::buildable::TaskDependencyContainer;
    use crate::dependency::LocalFileDependency;
    use crate::error::ConfigurationError;
    use crate::file_collection::fileset::FileSet;
    use crate::identifier::{ConfigurationPath, ProjectId};
    use crate::resolver::{ArtifactResult, ComponentId, Resolver, ResolverResults};
    use std::sync::Arc;

    /// A resolver that never errors and never produces anything — enough to exercise the state
    /// machine and extension composition without a real module graph.
    pub struct NoopResolver;

    impl Resolver for NoopResolver {
        fn resolve_build_dependencies(
            &self,
            _path: &ConfigurationPath,
            _out: &mut ResolverResults,
        ) -> TaskDependencyContainer {
            TaskDependencyContainer::new()
        }

        fn resolve_graph(
            &self,
            _path: &ConfigurationPath,
            _out: &mut ResolverResults,
        ) -> Result<(), ConfigurationError> {
            Ok(())
        }

        fn resolve_artifacts(
            &self,
            _path: &ConfigurationPath,
            _out: &mut ResolverResults,
        ) -> Result<(), ConfigurationError> {
            Ok(())
        }
    }

    /// A resolver that echoes whatever own-dependencies the configuration declared back as a
    /// single resolved artifact per file dependency — enough to exercise default-dependency
    /// actions and build-dependency collection end to end without real repository I/O.
    pub struct EchoResolver;

    impl Resolver for EchoResolver {
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
            out: &mut ResolverResults,
        ) -> Result<(), ConfigurationError> {
            out.artifacts.push(ArtifactResult {
                owner: ComponentId(path.to_string()),
                owner_is_external: false,
                artifact: Arc::new(FileArtifact::new("/tmp/resolved.jar")),
                resolve_error: None,
            });
            Ok(())
        }

        fn resolve_artifacts(
            &self,
            _path: &ConfigurationPath,
            _out: &mut ResolverResults,
        ) -> Result<(), ConfigurationError> {
            Ok(())
        }
    }

    /// A resolver whose graph resolve always fails, for exercising `hasError`/`rethrowFailure`.
    pub struct FailingResolver;

    impl Resolver for FailingResolver {
        fn resolve_build_dependencies(
            &self,
            _path: &ConfigurationPath,
            _out: &mut ResolverResults,
        ) -> TaskDependencyContainer {
            TaskDependencyContainer::new()
        }

        fn resolve_graph(
            &self,
            _path: &ConfigurationPath,
            out: &mut ResolverResults,
        ) -> Result<(), ConfigurationError> {
            out.errors.push("could not contact repository".to_string());
            Ok(())
        }

        fn resolve_artifacts(
            &self,
            _path: &ConfigurationPath,
            _out: &mut ResolverResults,
        ) -> Result<(), ConfigurationError> {
            Ok(())
        }
    }

    fn configuration(name: &str, resolver: Arc<dyn Resolver>) -> Configuration {
        let project = ProjectId::root();
        Configuration::new(project.configuration_path(name).unwrap(), resolver)
    }

    fn file_dependency(path: &str) -> Arc<crate::dependency::LocalFileDependency> {
        Arc::new(LocalFileDependency::new(FileSet::with_path(path)))
    }

    #[test]
    fn extension_order_scenario() {
        let a = configuration("a", Arc::new(NoopResolver));
        let b = configuration("b", Arc::new(NoopResolver));
        a.add_dependency(file_dependency("/tmp/d1.jar")).unwrap();
        b.extends_from(&a).unwrap();
        b.add_dependency(file_dependency("/tmp/d2.jar")).unwrap();

        let all = b.all_dependencies();
        assert_eq!(all.len(), 2);

        b.resolve_to_state_or_later(ResolvedState::GraphResolved)
            .unwrap();
        assert_eq!(a.observed_state(), ResolvedState::GraphResolved);
    }

    #[test]
    fn mutation_after_observation_scenario() {
        let a = configuration("a", Arc::new(NoopResolver));
        let b = configuration("b", Arc::new(NoopResolver));
        b.extends_from(&a).unwrap();
        b.resolve_to_state_or_later(ResolvedState::GraphResolved)
            .unwrap();

        let err = a.add_dependency(file_dependency("/tmp/d3.jar")).unwrap_err();
        assert!(matches!(err, ConfigurationError::AlreadyObserved { .. }));

        assert!(a.set_fail_on_version_conflict(true).is_ok());
    }

    #[test]
    fn cycle_rejection_scenario() {
        let a = configuration("a", Arc::new(NoopResolver));
        let b = configuration("b", Arc::new(NoopResolver));
        b.extends_from(&a).unwrap();

        let err = a.extends_from(&b).unwrap_err();
        assert!(matches!(err, ConfigurationError::CyclicExtendsFrom { .. }));
        assert_eq!(a.parents().len(), 0);
        assert_eq!(b.parents().len(), 1);
    }

    #[test]
    fn default_dependencies_scenario() {
        let c = configuration("c", Arc::new(EchoResolver));
        c.register_default_dependency_action(|deps| {
            deps.push(Arc::new(LocalFileDependency::new(FileSet::with_path(
                "/tmp/default.jar",
            ))));
        })
        .unwrap();

        c.resolve_to_state_or_later(ResolvedState::GraphResolved)
            .unwrap();
        assert_eq!(c.own_dependencies().len(), 1);

        // Resolving again without modification is a no-op (cached results untouched).
        c.resolve_to_state_or_later(ResolvedState::GraphResolved)
            .unwrap();
        assert_eq!(c.own_dependencies().len(), 1);
    }

    #[test]
    fn lenient_filter_scenario_has_error_ignores_external_artifact_absence() {
        let c = configuration("c", Arc::new(FailingResolver));
        c.resolve_to_state_or_later(ResolvedState::GraphResolved)
            .unwrap();
        assert_eq!(c.get_state(), ConfigurationState::ResolvedWithFailures);
        assert!(c.rethrow_failure().is_err());
    }

    #[test]
    fn copy_resets_state_and_clears_extension_set() {
        let a = configuration("a", Arc::new(NoopResolver));
        a.add_dependency(file_dependency("/tmp/d1.jar")).unwrap();
        let b = configuration("b", Arc::new(NoopResolver));
        b.extends_from(&a).unwrap();
        b.add_dependency(file_dependency("/tmp/d2.jar")).unwrap();
        b.resolve_to_state_or_later(ResolvedState::GraphResolved)
            .unwrap();

        let copy = b.copy();
        assert_eq!(copy.resolved_state(), ResolvedState::Unresolved);
        assert_eq!(copy.parents().len(), 0);
        assert_eq!(copy.own_dependencies().len(), 1);
    }

    #[test]
    fn copy_recursive_flattens_inherited_dependencies() {
        let a = configuration("a", Arc::new(NoopResolver));
        a.add_dependency(file_dependency("/tmp/d1.jar")).unwrap();
        let b = configuration("b", Arc::new(NoopResolver));
        b.extends_from(&a).unwrap();
        b.add_dependency(file_dependency("/tmp/d2.jar")).unwrap();

        let copy = b.copy_recursive();
        assert_eq!(copy.own_dependencies().len(), 2);
        assert_eq!(copy.parents().len(), 0);
    }

    #[test]
    fn build_dependencies_query_without_resolving() {
        let c = configuration("c", Arc::new(NoopResolver));
        c.add_dependency(file_dependency("/tmp/d1.jar")).unwrap();
        let deps = c.build_dependencies().unwrap();
        assert!(deps.is_empty());
        assert_eq!(c.resolved_state(), ResolvedState::Unresolved);
    }
}
