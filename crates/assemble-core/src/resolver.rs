//! External interfaces this crate consumes but does not implement: the resolver engine,
//! repository access, and project wiring all live in the host build-tool runtime.

use crate::artifact::PublishArtifact;
use crate::buildable::TaskDependencyContainer;
use crate::dependency::{DependencyId, FileCollectionDependency};
use crate::error::ConfigurationError;
use crate::identifier::ConfigurationPath;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// The module identity a component in the graph resolved to (external: the resolver owns the
/// full metadata model, this crate only needs an identity to key artifacts and dedup by).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ComponentId(pub String);

/// A single resolved node in the module graph, as produced by [`Resolver::resolve_graph`].
#[derive(Debug, Clone)]
pub struct ResolvedComponent {
    pub id: ComponentId,
    /// Whether this node resolved to a project within the same build, as opposed to an
    /// external module — the lenient view's ignore-missing-external filter only applies to
    /// the latter.
    pub is_external: bool,
    pub dependencies: Vec<ComponentId>,
}

/// An artifact produced for one resolved node, keyed by that node's id.
#[derive(Debug)]
pub struct ArtifactResult {
    pub owner: ComponentId,
    /// Mirrors `ResolvedComponent::is_external` for `owner` — the lenient view's
    /// ignore-missing-external filter needs it without re-walking `graph`.
    pub owner_is_external: bool,
    pub artifact: Arc<dyn PublishArtifact>,
    /// Populated when materializing this artifact's file failed — the lenient view drops this
    /// entry silently when `owner` is external, and propagates it otherwise.
    pub resolve_error: Option<String>,
}

/// The populated results of a resolution — the module graph, resolved artifacts, and file
/// dependencies. One instance is cached per [`Configuration`](crate::configuration::Configuration)
/// and reused across repeated queries until the configuration is mutated and re-resolved.
#[derive(Debug, Default)]
pub struct ResolverResults {
    pub graph: Vec<ResolvedComponent>,
    pub artifacts: Vec<ArtifactResult>,
    pub file_dependencies: Vec<Box<dyn FileCollectionDependencyHandle>>,
    pub errors: Vec<String>,
    /// Which graph node each first-level dependency declaration resolved to, populated by
    /// [`Resolver::resolve_graph`] — the linkage the lenient view's filtered path (§4.4) and the
    /// file collection view (§4.7) need to turn a `dependencySpec` over declarations into a set
    /// of graph nodes.
    pub first_level: Vec<(DependencyId, ComponentId)>,
}

/// Object-safe handle standing in for a resolved [`FileCollectionDependency`] attached to the
/// results — boxed so `ResolverResults` can hold a heterogeneous set without generics leaking
/// into every call site.
pub trait FileCollectionDependencyHandle: Debug + Send + Sync {
    fn dependency(&self) -> &dyn FileCollectionDependency;
}

impl ResolverResults {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
            || self
                .artifacts
                .iter()
                .any(|a| a.resolve_error.is_some() && !a.owner_is_external)
    }

    pub fn rethrow_failure(&self, path: &ConfigurationPath) -> Result<(), ConfigurationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::ResolutionFailure {
                path: path.clone(),
                errors: self.errors.clone(),
            })
        }
    }
}

/// The external resolver engine. Given a configuration's declared dependencies, artifacts, and
/// attributes, it builds the module graph and materializes artifacts. Network I/O, version
/// selection, and conflict resolution all live on the other side of this trait.
pub trait Resolver: Send + Sync {
    fn resolve_build_dependencies(
        &self,
        path: &ConfigurationPath,
        out: &mut ResolverResults,
    ) -> TaskDependencyContainer;

    fn resolve_graph(
        &self,
        path: &ConfigurationPath,
        out: &mut ResolverResults,
    ) -> Result<(), ConfigurationError>;

    fn resolve_artifacts(
        &self,
        path: &ConfigurationPath,
        out: &mut ResolverResults,
    ) -> Result<(), ConfigurationError>;
}

/// Where a just-materialized artifact file ended up — used by the cache-locking manager
/// (§5, "Shared resources") to serialize disk cache access across configurations.
#[derive(Debug, Clone)]
pub struct MaterializedFile {
    pub path: PathBuf,
}
