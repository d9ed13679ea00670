//! Build-dependency queries.
//!
//! Task execution and the wider task graph are external collaborators (out of scope here); this
//! module only carries enough identity for a build-dependency query to return something
//! concrete. A [`TaskId`] is an opaque handle the host runtime resolves against its own graph.

use crate::identifier::TaskId;
use std::collections::HashSet;
use std::sync::Arc;

/// Anything that has build dependencies — tasks that must run before this thing is usable.
pub trait Buildable: Send + Sync {
    /// The set of tasks that build this object.
    fn build_dependencies(&self) -> TaskDependencyContainer;
}

impl<B: Buildable + ?Sized> Buildable for Box<B> {
    fn build_dependencies(&self) -> TaskDependencyContainer {
        (**self).build_dependencies()
    }
}

impl<B: Buildable + ?Sized> Buildable for Arc<B> {
    fn build_dependencies(&self) -> TaskDependencyContainer {
        (**self).build_dependencies()
    }
}

assert_obj_safe!(Buildable);

/// Anything that can be turned into something [`Buildable`] — mirrors the way a dependency,
/// an artifact, or a bare task id can all act as a source of build dependencies.
pub trait IntoBuildable {
    type Buildable: Buildable;

    fn into_buildable(self) -> Self::Buildable;
}

impl<B: Buildable> IntoBuildable for B {
    type Buildable = B;

    fn into_buildable(self) -> Self::Buildable {
        self
    }
}

/// The result of a build-dependency query: a flat set of task ids gathered from resolved local
/// components and file dependencies (see the resolution lifecycle's build-dependency query).
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct TaskDependencyContainer {
    tasks: HashSet<TaskId>,
}

impl TaskDependencyContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: TaskId) {
        self.tasks.insert(id);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = TaskId>) {
        self.tasks.extend(other);
    }

    pub fn merge(&mut self, other: &TaskDependencyContainer) {
        self.tasks.extend(other.tasks.iter().cloned());
    }

    pub fn tasks(&self) -> &HashSet<TaskId> {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl FromIterator<TaskId> for TaskDependencyContainer {
    fn from_iter<T: IntoIterator<Item = TaskId>>(iter: T) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

/// An un-ordered collection of objects that each independently contribute build dependencies;
/// a thin aggregate used by file collections and dependency containers.
#[derive(Default, Clone)]
pub struct BuiltByContainer {
    sources: Vec<Arc<dyn Buildable>>,
}

impl BuiltByContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<B>(&mut self, buildable: B)
    where
        B: IntoBuildable,
        <B as IntoBuildable>::Buildable: 'static,
    {
        self.sources.push(Arc::new(buildable.into_buildable()));
    }

    pub fn build_dependencies(&self) -> TaskDependencyContainer {
        let mut out = TaskDependencyContainer::new();
        for source in &self.sources {
            out.merge(&source.build_dependencies());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(TaskId);

    impl Buildable for Fixed {
        fn build_dependencies(&self) -> TaskDependencyContainer {
            let mut container = TaskDependencyContainer::new();
            container.add(self.0.clone());
            container
        }
    }

    #[test]
    fn container_merges_sources() {
        let mut built_by = BuiltByContainer::new();
        built_by.add(Fixed(TaskId::new(":compile").unwrap()));
        built_by.add(Fixed(TaskId::new(":generate").unwrap()));
        let deps = built_by.build_dependencies();
        assert_eq!(deps.tasks().len(), 2);
    }
}
