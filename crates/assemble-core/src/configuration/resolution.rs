//! The two-phase resolution lifecycle: `UNRESOLVED -> GRAPH_RESOLVED -> ARTIFACTS_RESOLVED`.

use crate::buildable::TaskDependencyContainer;
use crate::configuration::core::Configuration;
use crate::configuration::state::ResolvedState;
use crate::error::ConfigurationError;
use crate::identifier::ConfigurationPath;
use crate::resolver::ResolverResults;
use std::sync::atomic::Ordering;

/// The read-only view of a configuration handed to `beforeResolve`/`afterResolve` listeners.
pub struct ResolvableDependencies {
    path: ConfigurationPath,
}

impl ResolvableDependencies {
    pub fn new(path: ConfigurationPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &ConfigurationPath {
        &self.path
    }
}

/// Resets `insideBeforeResolve` on every exit path, mirroring the "reset flag on all exit
/// paths" requirement in §4.3 without duplicating it at every `return`/`?`.
struct BeforeResolveGuard<'a>(&'a Configuration);

impl<'a> Drop for BeforeResolveGuard<'a> {
    fn drop(&mut self) {
        self.0 .0.inside_before_resolve.store(false, Ordering::SeqCst);
    }
}

impl Configuration {
    /// `resolveToStateOrLater(target)`. Holds the per-configuration resolution lock for the
    /// whole operation, so at most one resolution of this configuration is ever in flight.
    pub fn resolve_to_state_or_later(&self, target: ResolvedState) -> Result<(), ConfigurationError> {
        if !self.can_be_resolved() {
            return Err(ConfigurationError::ResolutionNotAllowed {
                path: self.path().clone(),
            });
        }

        let _resolving = self.0.resolving.lock();

        if matches!(
            target,
            ResolvedState::GraphResolved | ResolvedState::ArtifactsResolved
        ) {
            self.resolve_graph_if_required(target)?;
        }
        if target == ResolvedState::ArtifactsResolved {
            self.resolve_artifacts_if_required()?;
        }
        Ok(())
    }

    fn resolve_graph_if_required(&self, target: ResolvedState) -> Result<(), ConfigurationError> {
        {
            let resolution = self.0.resolution.lock();
            match resolution.state {
                ResolvedState::ArtifactsResolved => {
                    return if resolution.dependencies_modified {
                        Err(ConfigurationError::ReResolvedAfterModification {
                            path: self.path().clone(),
                        })
                    } else {
                        Ok(())
                    };
                }
                ResolvedState::GraphResolved => {
                    return if !resolution.dependencies_modified {
                        Ok(())
                    } else {
                        Err(ConfigurationError::ReResolvedAfterModification {
                            path: self.path().clone(),
                        })
                    };
                }
                ResolvedState::Unresolved => {}
            }
        }

        self.0.inside_before_resolve.store(true, Ordering::SeqCst);
        let guard = BeforeResolveGuard(self);
        let incoming = ResolvableDependencies::new(self.path().clone());
        self.listeners().lock().broadcast_before_resolve(&incoming);
        self.run_default_dependency_actions();
        drop(guard);

        let mut results = ResolverResults::default();
        let resolve_outcome = self.0.resolver.resolve_graph(self.path(), &mut results);

        match resolve_outcome {
            Ok(()) => {
                let mut resolution = self.0.resolution.lock();
                resolution.dependencies_modified = false;
                resolution.state = ResolvedState::GraphResolved;
                resolution.cached_results = Some(results);
                debug!("{} reached GRAPH_RESOLVED", self.path());
            }
            Err(e) => {
                let mut resolution = self.0.resolution.lock();
                resolution.cached_results = Some(results);
                return Err(e);
            }
        }

        self.mark_as_observed(target);
        let incoming = ResolvableDependencies::new(self.path().clone());
        self.listeners().lock().broadcast_after_resolve(&incoming);
        Ok(())
    }

    fn resolve_artifacts_if_required(&self) -> Result<(), ConfigurationError> {
        {
            let resolution = self.0.resolution.lock();
            if resolution.state == ResolvedState::ArtifactsResolved {
                return Ok(());
            }
            if resolution.state != ResolvedState::GraphResolved {
                return Err(ConfigurationError::ArtifactsBeforeGraph {
                    path: self.path().clone(),
                });
            }
        }

        let mut resolution = self.0.resolution.lock();
        let results = resolution
            .cached_results
            .as_mut()
            .expect("cached results present once GRAPH_RESOLVED");
        self.0.resolver.resolve_artifacts(self.path(), results)?;
        resolution.state = ResolvedState::ArtifactsResolved;
        debug!("{} reached ARTIFACTS_RESOLVED", self.path());
        Ok(())
    }

    /// Re-raises every error captured in the cached resolver results as one aggregated failure.
    pub fn rethrow_failure(&self) -> Result<(), ConfigurationError> {
        let resolution = self.0.resolution.lock();
        match &resolution.cached_results {
            Some(results) => results.rethrow_failure(self.path()),
            None => Ok(()),
        }
    }

    pub fn with_resolved_results<R>(&self, f: impl FnOnce(Option<&ResolverResults>) -> R) -> R {
        let resolution = self.0.resolution.lock();
        f(resolution.cached_results.as_ref())
    }
}

/// The build-dependency query (§4.3): drives the graph if the strategy demands it; otherwise,
/// for an unresolved configuration, asks the resolver for build dependencies into a throwaway,
/// uncached results object. Either way, dependencies are gathered from resolved local
/// components and file dependencies.
pub fn build_dependencies_query(
    config: &Configuration,
) -> Result<TaskDependencyContainer, ConfigurationError> {
    let strategy = config.resolution_strategy();
    let mut out = TaskDependencyContainer::new();

    if strategy.resolve_graph_to_determine_task_dependencies {
        config.resolve_to_state_or_later(ResolvedState::GraphResolved)?;
        config.with_resolved_results(|results| {
            if let Some(results) = results {
                collect_build_dependencies(results, &mut out);
            }
        });
    } else if config.resolved_state() == ResolvedState::Unresolved {
        let mut scratch = ResolverResults::default();
        let from_resolver = config
            .0
            .resolver
            .resolve_build_dependencies(config.path(), &mut scratch);
        out.merge(&from_resolver);
        collect_build_dependencies(&scratch, &mut out);
    } else {
        config.with_resolved_results(|results| {
            if let Some(results) = results {
                collect_build_dependencies(results, &mut out);
            }
        });
    }

    for dependency in config.all_dependencies() {
        if let Some(file_dep) = dependency.as_file_collection() {
            out.merge(&file_dep.files().build_dependencies());
        }
    }

    Ok(out)
}

fn collect_build_dependencies(results: &ResolverResults, out: &mut TaskDependencyContainer) {
    for artifact in &results.artifacts {
        trace!("considering artifact from {} for build dependencies", artifact.owner.0);
        out.merge(&artifact.artifact.build_dependencies());
    }
}
