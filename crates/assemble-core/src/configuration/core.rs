//! The configuration object: identity, roles, dependency/artifact/attribute storage, the
//! extension graph, and the mutation/observation validator.

use crate::attributes::AttributeContainer;
use crate::buildable::TaskDependencyContainer;
use crate::configuration::file_view::ConfigurationFileCollection;
use crate::configuration::state::{ConfigurationState, MutationType, ResolvedState};
use crate::dependency::Dependency;
use crate::error::ConfigurationError;
use crate::exclude_rule::{ExcludeRule, ExcludeRuleContainer};
use crate::artifact::PublishArtifact;
use crate::identifier::ConfigurationPath;
use crate::listener::ListenerManager;
use crate::resolver::{ComponentId, Resolver, ResolverResults};
use crate::utilities::Spec;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// The data a resolution step actually advances: current state, whether a mutation has
/// invalidated the cached results, and the cached results themselves. Guarded by
/// `resolutionLock` in the concurrency model — see [`ConfigurationData::resolution`].
#[derive(Default)]
pub(crate) struct ResolutionData {
    pub state: ResolvedState,
    pub dependencies_modified: bool,
    pub cached_results: Option<ResolverResults>,
}

pub(crate) type DefaultDependencyAction =
    Arc<dyn Fn(&mut Vec<Arc<dyn Dependency>>) + Send + Sync>;

#[derive(Clone, Copy, Debug)]
pub struct ResolutionStrategy {
    pub fail_on_version_conflict: bool,
    pub resolve_graph_to_determine_task_dependencies: bool,
}

impl Default for ResolutionStrategy {
    fn default() -> Self {
        Self {
            fail_on_version_conflict: false,
            resolve_graph_to_determine_task_dependencies: false,
        }
    }
}

/// Everything guarded loosely by "the caller's thread" in the concurrency model (§5):
/// dependency/artifact/exclude-rule/attribute storage, roles and metadata, the extension set,
/// and default-dependency actions. A `parking_lot::Mutex` stands in for that informal
/// single-writer discipline so the type remains `Send + Sync` in Rust.
pub(crate) struct MutableData {
    pub description: Option<String>,
    pub format: Option<String>,
    pub visible: bool,
    pub transitive: bool,
    pub can_be_consumed: bool,
    pub can_be_resolved: bool,
    pub own_dependencies: Vec<Arc<dyn Dependency>>,
    pub own_artifacts: Vec<Arc<dyn PublishArtifact>>,
    pub exclude_rules: ExcludeRuleContainer,
    pub attributes: AttributeContainer,
    pub parents: Vec<Configuration>,
    pub default_dependency_actions: Vec<DefaultDependencyAction>,
    pub strategy: ResolutionStrategy,
}

impl Default for MutableData {
    fn default() -> Self {
        Self {
            description: None,
            format: None,
            visible: true,
            transitive: true,
            can_be_consumed: true,
            can_be_resolved: true,
            own_dependencies: Vec::new(),
            own_artifacts: Vec::new(),
            exclude_rules: ExcludeRuleContainer::new(),
            attributes: AttributeContainer::new(),
            parents: Vec::new(),
            default_dependency_actions: Vec::new(),
            strategy: ResolutionStrategy::default(),
        }
    }
}

pub(crate) struct ConfigurationData {
    pub path: ConfigurationPath,
    pub name: String,
    pub resolver: Arc<dyn Resolver>,
    pub listeners: Mutex<ListenerManager>,
    pub resolution: Mutex<ResolutionData>,
    /// Serializes an entire `resolveToStateOrLater` call — the coarse `resolutionLock` of the
    /// concurrency model. Distinct from `resolution` itself, which only guards individual field
    /// reads/writes, so that code running under this lock can still consult `resolution`
    /// without re-entering a non-reentrant mutex.
    pub resolving: Mutex<()>,
    pub observation: Mutex<ResolvedState>,
    pub data: Mutex<MutableData>,
    pub children: Mutex<Vec<Weak<ConfigurationData>>>,
    pub inside_before_resolve: AtomicBool,
}

/// A named, mutable container of dependency declarations, produced artifacts, exclude rules,
/// and attributes — the central entity of this crate. Cheap to clone: it's a handle around a
/// single shared `Arc<ConfigurationData>`, the way the wider workspace clones `SharedProject`.
#[derive(Clone)]
pub struct Configuration(pub(crate) Arc<ConfigurationData>);

impl Configuration {
    pub fn new(path: ConfigurationPath, resolver: Arc<dyn Resolver>) -> Self {
        let name = path.name().to_string();
        Self(Arc::new(ConfigurationData {
            path,
            name,
            resolver,
            listeners: Mutex::new(ListenerManager::new()),
            resolution: Mutex::new(ResolutionData::default()),
            resolving: Mutex::new(()),
            observation: Mutex::new(ResolvedState::Unresolved),
            data: Mutex::new(MutableData::default()),
            children: Mutex::new(Vec::new()),
            inside_before_resolve: AtomicBool::new(false),
        }))
    }

    pub fn path(&self) -> &ConfigurationPath {
        &self.0.path
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn listeners(&self) -> &Mutex<ListenerManager> {
        &self.0.listeners
    }

    fn ptr_eq(&self, other: &Configuration) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // ---- roles & metadata -------------------------------------------------

    pub fn can_be_consumed(&self) -> bool {
        self.0.data.lock().can_be_consumed
    }

    pub fn can_be_resolved(&self) -> bool {
        self.0.data.lock().can_be_resolved
    }

    pub fn set_can_be_consumed(&self, value: bool) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Role)?;
        self.0.data.lock().can_be_consumed = value;
        Ok(())
    }

    pub fn set_can_be_resolved(&self, value: bool) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Role)?;
        self.0.data.lock().can_be_resolved = value;
        Ok(())
    }

    pub fn description(&self) -> Option<String> {
        self.0.data.lock().description.clone()
    }

    pub fn set_description(&self, description: impl Into<String>) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Role)?;
        self.0.data.lock().description = Some(description.into());
        Ok(())
    }

    pub fn format(&self) -> Option<String> {
        self.0.data.lock().format.clone()
    }

    pub fn set_format(&self, format: impl Into<String>) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Role)?;
        self.0.data.lock().format = Some(format.into());
        Ok(())
    }

    pub fn visible(&self) -> bool {
        self.0.data.lock().visible
    }

    pub fn set_visible(&self, value: bool) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Role)?;
        self.0.data.lock().visible = value;
        Ok(())
    }

    pub fn transitive(&self) -> bool {
        self.0.data.lock().transitive
    }

    pub fn set_transitive(&self, value: bool) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Role)?;
        self.0.data.lock().transitive = value;
        Ok(())
    }

    // ---- dependencies, artifacts, exclude rules, attributes ----------------

    pub fn add_dependency(&self, dependency: Arc<dyn Dependency>) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Dependencies)?;
        self.0.data.lock().own_dependencies.push(dependency);
        Ok(())
    }

    pub fn own_dependencies(&self) -> Vec<Arc<dyn Dependency>> {
        self.0.data.lock().own_dependencies.clone()
    }

    /// Own dependencies plus the recursive union of every parent's, own-first then parents in
    /// insertion order (invariant 5).
    pub fn all_dependencies(&self) -> Vec<Arc<dyn Dependency>> {
        let data = self.0.data.lock();
        let mut out = data.own_dependencies.clone();
        for parent in &data.parents {
            out.extend(parent.all_dependencies());
        }
        out
    }

    pub fn add_artifact(&self, artifact: Arc<dyn PublishArtifact>) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Artifacts)?;
        self.0.data.lock().own_artifacts.push(artifact);
        Ok(())
    }

    pub fn own_artifacts(&self) -> Vec<Arc<dyn PublishArtifact>> {
        self.0.data.lock().own_artifacts.clone()
    }

    pub fn all_artifacts(&self) -> Vec<Arc<dyn PublishArtifact>> {
        let data = self.0.data.lock();
        let mut out = data.own_artifacts.clone();
        for parent in &data.parents {
            out.extend(parent.all_artifacts());
        }
        out
    }

    pub fn add_exclude_rule(&self, rule: ExcludeRule) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Dependencies)?;
        self.0.data.lock().exclude_rules.add(rule);
        Ok(())
    }

    pub fn exclude_rules(&self) -> ExcludeRuleContainer {
        self.0.data.lock().exclude_rules.clone()
    }

    pub fn with_attributes<R>(&self, f: impl FnOnce(&mut AttributeContainer) -> R) -> Result<R, ConfigurationError> {
        self.validate_mutation(MutationType::Attributes)?;
        Ok(f(&mut self.0.data.lock().attributes))
    }

    pub fn attributes(&self) -> AttributeContainer {
        self.0.data.lock().attributes.clone()
    }

    pub fn register_default_dependency_action(
        &self,
        action: impl Fn(&mut Vec<Arc<dyn Dependency>>) + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Dependencies)?;
        self.0
            .data
            .lock()
            .default_dependency_actions
            .push(Arc::new(action));
        Ok(())
    }

    pub fn resolution_strategy(&self) -> ResolutionStrategy {
        self.0.data.lock().strategy
    }

    pub fn set_fail_on_version_conflict(&self, value: bool) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Strategy)?;
        self.0.data.lock().strategy.fail_on_version_conflict = value;
        Ok(())
    }

    pub fn set_resolve_graph_to_determine_task_dependencies(
        &self,
        value: bool,
    ) -> Result<(), ConfigurationError> {
        self.validate_mutation(MutationType::Strategy)?;
        self.0
            .data
            .lock()
            .strategy
            .resolve_graph_to_determine_task_dependencies = value;
        Ok(())
    }

    // ---- extension composition (§4.2) --------------------------------------

    /// `[self, P1, P1's parents..., P2, P2's parents..., ...]`, deduplicated so a doubly-reached
    /// ancestor appears exactly once, at its last-visited position.
    pub fn hierarchy(&self) -> Vec<ConfigurationPath> {
        let raw = self.hierarchy_raw();
        let mut last_index = std::collections::HashMap::new();
        for (i, path) in raw.iter().enumerate() {
            last_index.insert(path.clone(), i);
        }
        raw.into_iter()
            .enumerate()
            .filter(|(i, path)| last_index[path] == *i)
            .map(|(_, path)| path)
            .collect()
    }

    fn hierarchy_raw(&self) -> Vec<ConfigurationPath> {
        let mut out = vec![self.0.path.clone()];
        for parent in &self.0.data.lock().parents {
            out.extend(parent.hierarchy_raw());
        }
        out
    }

    /// Reject if `parent.hierarchy()` already contains `self` (cycle prevention). Idempotent
    /// on repeated calls with the same already-registered parent.
    pub fn extends_from(&self, parent: &Configuration) -> Result<(), ConfigurationError> {
        if parent.hierarchy().contains(self.path()) {
            return Err(ConfigurationError::CyclicExtendsFrom {
                child: self.path().clone(),
                parent: parent.path().clone(),
            });
        }

        let already_parent = self
            .0
            .data
            .lock()
            .parents
            .iter()
            .any(|p| p.ptr_eq(parent));
        if already_parent {
            return Ok(());
        }

        self.0.data.lock().parents.push(parent.clone());
        parent
            .0
            .children
            .lock()
            .push(Arc::downgrade(&self.0));
        Ok(())
    }

    /// Fully replaces the parent set: unregisters from every current parent, then applies the
    /// new set one by one via [`Configuration::extends_from`].
    pub fn set_extends_from(
        &self,
        new_parents: impl IntoIterator<Item = Configuration>,
    ) -> Result<(), ConfigurationError> {
        let current = std::mem::take(&mut self.0.data.lock().parents);
        for parent in &current {
            parent
                .0
                .children
                .lock()
                .retain(|weak| weak.upgrade().map_or(true, |strong| !Arc::ptr_eq(&strong, &self.0)));
        }
        for parent in new_parents {
            self.extends_from(&parent)?;
        }
        Ok(())
    }

    pub fn parents(&self) -> Vec<Configuration> {
        self.0.data.lock().parents.clone()
    }

    // ---- mutation & observation validator (§4.1) ---------------------------

    pub(crate) fn validate_mutation(&self, mutation: MutationType) -> Result<(), ConfigurationError> {
        let resolution = self.0.resolution.lock();
        if resolution.state == ResolvedState::ArtifactsResolved {
            return Err(ConfigurationError::AlreadyResolved {
                path: self.path().clone(),
            });
        }
        if resolution.state == ResolvedState::GraphResolved {
            return Err(ConfigurationError::TaskDependenciesAlreadyResolved {
                path: self.path().clone(),
            });
        }
        drop(resolution);

        let observed = *self.0.observation.lock();
        if matches!(
            observed,
            ResolvedState::GraphResolved | ResolvedState::ArtifactsResolved
        ) && !mutation.is_strategy()
        {
            return Err(ConfigurationError::AlreadyObserved {
                path: self.path().clone(),
                in_before_resolve: self.0.inside_before_resolve.load(Ordering::SeqCst),
            });
        }

        for weak_child in self.0.children.lock().iter() {
            if let Some(child) = weak_child.upgrade() {
                Configuration(child).validate_parent_mutation(mutation)?;
            }
        }

        if !mutation.is_strategy() {
            self.0.resolution.lock().dependencies_modified = true;
        }

        Ok(())
    }

    /// Propagation the other direction: a parent's data changed, so every child that extends it
    /// must agree the change is still allowed given the child's own state.
    fn validate_parent_mutation(&self, mutation: MutationType) -> Result<(), ConfigurationError> {
        if mutation.is_strategy() {
            return Ok(());
        }

        let state = self.0.resolution.lock().state;
        if state == ResolvedState::ArtifactsResolved {
            return Err(ConfigurationError::AlreadyResolved {
                path: self.path().clone(),
            });
        }
        if state == ResolvedState::GraphResolved && mutation == MutationType::Dependencies {
            return Err(ConfigurationError::TaskDependenciesAlreadyResolved {
                path: self.path().clone(),
            });
        }

        self.0.resolution.lock().dependencies_modified = true;
        for weak_child in self.0.children.lock().iter() {
            if let Some(child) = weak_child.upgrade() {
                Configuration(child).validate_parent_mutation(mutation)?;
            }
        }
        Ok(())
    }

    // ---- observation propagation -------------------------------------------

    /// `observedState = max(observedState, requested)`, then propagates upward to every
    /// registered parent (invariant: `observedState(parent) >= observedState(child)`).
    pub(crate) fn mark_as_observed(&self, requested: ResolvedState) {
        {
            let mut observed = self.0.observation.lock();
            if *observed >= requested {
                return;
            }
            *observed = requested;
            debug!("{} observed at {}", self.path(), requested);
        }
        for parent in &self.0.data.lock().parents {
            parent.mark_as_observed(requested);
        }
    }

    pub fn observed_state(&self) -> ResolvedState {
        *self.0.observation.lock()
    }

    pub fn resolved_state(&self) -> ResolvedState {
        self.0.resolution.lock().state
    }

    pub fn get_state(&self) -> ConfigurationState {
        let resolution = self.0.resolution.lock();
        match resolution.state {
            ResolvedState::Unresolved => ConfigurationState::Unresolved,
            ResolvedState::GraphResolved => {
                let has_error = resolution
                    .cached_results
                    .as_ref()
                    .map(ResolverResults::has_error)
                    .unwrap_or(false);
                if has_error {
                    ConfigurationState::ResolvedWithFailures
                } else {
                    ConfigurationState::GraphResolved
                }
            }
            ResolvedState::ArtifactsResolved => ConfigurationState::ArtifactsResolved,
        }
    }

    // ---- default dependencies ----------------------------------------------

    /// Runs this configuration's default-dependency actions (only if its own-dependency set is
    /// currently empty), then recurses into every parent's pre-empty hook.
    pub(crate) fn run_default_dependency_actions(&self) {
        let actions = {
            let data = self.0.data.lock();
            if !data.own_dependencies.is_empty() {
                Vec::new()
            } else {
                data.default_dependency_actions.clone()
            }
        };
        for action in actions {
            let mut data = self.0.data.lock();
            action(&mut data.own_dependencies);
        }
        for parent in &self.0.data.lock().parents {
            parent.run_default_dependency_actions();
        }
    }

    // ---- build-dependency query (§4.3) -------------------------------------

    pub fn build_dependencies(&self) -> Result<TaskDependencyContainer, ConfigurationError> {
        use crate::configuration::resolution::build_dependencies_query;
        build_dependencies_query(self)
    }

    // ---- file collection view (§4.7) ---------------------------------------

    /// A lazy, `spec`-filtered view over this configuration's resolved files: requesting its
    /// files drives resolution to `ARTIFACTS_RESOLVED`, then walks the lenient view. Its build
    /// dependencies forward to [`Configuration::build_dependencies`].
    pub fn file_collection(
        &self,
        spec: Arc<dyn Spec<dyn Dependency> + Send + Sync>,
    ) -> ConfigurationFileCollection {
        ConfigurationFileCollection::new(self.clone(), spec)
    }

    /// Pairs each of this configuration's dependencies (own and inherited) with the resolved
    /// component id it mapped to, per the cached results' `first_level` linkage. Empty before
    /// the graph has resolved, or for a resolver that never populates the linkage.
    pub(crate) fn first_level_components(&self) -> Vec<(Arc<dyn Dependency>, ComponentId)> {
        let by_id: HashMap<_, _> = {
            let resolution = self.0.resolution.lock();
            match &resolution.cached_results {
                Some(results) => results.first_level.iter().cloned().collect(),
                None => return Vec::new(),
            }
        };
        self.all_dependencies()
            .into_iter()
            .filter_map(|dep| by_id.get(&dep.id()).cloned().map(|component| (dep, component)))
            .collect()
    }

    // ---- copy / copyRecursive (§3 lifecycle, §6, §8 invariant 5) -----------

    /// `D.resolvedState == UNRESOLVED`, `D.extendsFrom == ∅`, `D.dependencies == own
    /// dependencies satisfying `spec`, each independently copied`. `canBeConsumed`/
    /// `canBeResolved` are carried over, matching the choice recorded for `copyRecursive` in the
    /// design notes and applied uniformly here.
    pub fn copy_filtered(&self, spec: &dyn Spec<dyn Dependency>) -> Configuration {
        self.copy_from(self.own_dependencies(), spec)
    }

    pub fn copy(&self) -> Configuration {
        self.copy_filtered(&crate::utilities::True::new())
    }

    /// Like [`Configuration::copy`], but the copy's own-dependency set is seeded from
    /// [`Configuration::all_dependencies`] (own plus every inherited dependency), flattened —
    /// since the copy carries no `extendsFrom` edges, this is the only way it can retain what
    /// the source inherited.
    pub fn copy_recursive_filtered(&self, spec: &dyn Spec<dyn Dependency>) -> Configuration {
        self.copy_from(self.all_dependencies(), spec)
    }

    pub fn copy_recursive(&self) -> Configuration {
        self.copy_recursive_filtered(&crate::utilities::True::new())
    }

    fn copy_from(
        &self,
        source: Vec<Arc<dyn Dependency>>,
        spec: &dyn Spec<dyn Dependency>,
    ) -> Configuration {
        let data = self.0.data.lock();
        let copy = Configuration::new(self.0.path.clone(), self.0.resolver.clone());
        {
            let mut copy_data = copy.0.data.lock();
            copy_data.can_be_consumed = data.can_be_consumed;
            copy_data.can_be_resolved = data.can_be_resolved;
            copy_data.visible = data.visible;
            copy_data.transitive = data.transitive;
            copy_data.description = data.description.clone();
            copy_data.format = data.format.clone();
            copy_data.attributes = data.attributes.clone();
            copy_data.own_artifacts = data.own_artifacts.clone();
            copy_data.own_dependencies = source
                .into_iter()
                .filter(|d| spec.accept(d.as_ref()))
                .map(|d| Arc::from(d.copy()))
                .collect();
        }
        copy
    }

    // ---- diagnostics --------------------------------------------------------

    /// Human-readable multi-line dump: identity, local and all dependencies/artifacts.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Configuration {{");
        let _ = writeln!(out, "  path: {}", self.path());
        let _ = writeln!(out, "  name: {}", self.name());
        let _ = writeln!(out, "  state: {}", self.get_state());
        let _ = writeln!(out, "  dependencies (own): {}", self.own_dependencies().len());
        let _ = writeln!(out, "  dependencies (all): {}", self.all_dependencies().len());
        let _ = writeln!(out, "  artifacts (own): {}", self.own_artifacts().len());
        let _ = writeln!(out, "  artifacts (all): {}", self.all_artifacts().len());
        let _ = write!(out, "}}");
        out
    }
}
