//! Identifiers used by configurations, projects, and the tasks they build.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The separator between parts of an identifier.
pub const ID_SEPARATOR: char = ':';

/// Represents some identifier in an assemble project.
///
/// Acts like a path. Consists of two parts, the `this` part and the `parent`. For example, in
/// `root:inner:task`, the `this` is `task` and the `parent` is `root:inner`.
#[derive(Default, Clone, Eq, PartialEq, Hash)]
pub struct Id {
    parent: Option<Box<Id>>,
    this: String,
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(parent) = self.parent.as_deref() {
            write!(f, "{}{ID_SEPARATOR}{}", parent, self.this)
        } else {
            write!(f, "{ID_SEPARATOR}{}", self.this)
        }
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl Id {
    /// Create a new id.
    ///
    /// # Example
    /// ```
    /// # use assemble_core::identifier::Id;
    /// let id = Id::new("root:inner:task").unwrap();
    /// assert!(Id::new("&task").is_err());
    /// assert!(Id::new("2132").is_err());
    /// ```
    pub fn new<S: AsRef<str>>(val: S) -> Result<Self, InvalidId> {
        let as_str = val.as_ref();
        Self::from_iter(as_str.split(ID_SEPARATOR))
    }

    pub(crate) fn new_uncheckable<S: AsRef<str>>(val: S) -> Self {
        Self::new(val).expect("valid identifier")
    }

    /// Try to create an Id from an iterator of parts. Each part must be a valid **part** of an
    /// identifier (no embedded separators).
    pub fn from_iter<S: AsRef<str>>(iter: impl IntoIterator<Item = S>) -> Result<Self, InvalidId> {
        let mut iterator = iter.into_iter();
        let start = iterator
            .next()
            .ok_or_else(|| InvalidId::new(""))
            .and_then(|u| Self::new_unit(u.as_ref()))?;

        iterator.try_fold(start, |accum, obj| {
            let next_id = Self::new_unit(obj.as_ref())?;
            Ok(accum.concat(next_id))
        })
    }

    fn new_unit(id: &str) -> Result<Self, InvalidId> {
        is_valid_identifier(id).map(|_| Id {
            parent: None,
            this: id.to_string(),
        })
    }

    /// Joins something that can be turned into an identifier to the end of this Id.
    pub fn join<S: AsRef<str>>(&self, next: S) -> Result<Self, InvalidId> {
        Id::new(next).map(|id| self.clone().concat(id))
    }

    /// Concatenate two Id's together, `other` becoming the deepest descendant.
    pub fn concat(self, mut other: Self) -> Self {
        other.insert_as_topmost(self);
        other
    }

    fn insert_as_topmost(&mut self, parent: Self) {
        match &mut self.parent {
            Some(p) => p.insert_as_topmost(parent),
            missing => *missing = Some(Box::new(parent)),
        }
    }

    /// Returns this part of the identifier path.
    pub fn this(&self) -> &str {
        &self.this
    }

    /// Returns the parent identifier of this id, if it exists.
    pub fn parent(&self) -> Option<&Id> {
        self.parent.as_deref()
    }

    /// Gets the ancestors of this id, deepest first.
    ///
    /// For `root:inner:task`, yields `root:inner:task`, `root:inner`, then `root`.
    pub fn ancestors(&self) -> impl Iterator<Item = &Id> {
        let mut deque = VecDeque::new();
        let mut ptr = self;
        deque.push_back(ptr);
        while let Some(parent) = ptr.parent.as_ref() {
            deque.push_back(parent);
            ptr = parent;
        }
        deque.into_iter()
    }

    pub fn as_path(&self) -> PathBuf {
        PathBuf::from_iter(self.ancestors().collect::<Vec<_>>().into_iter().rev().map(Id::this))
    }
}

impl<S: AsRef<str> + ?Sized> PartialEq<S> for Id {
    fn eq(&self, other: &S) -> bool {
        Id::new(other).map(|id| self == &id).unwrap_or(false)
    }
}

/// How tasks are referenced. Tasks themselves are an external collaborator (task-graph wiring is
/// out of scope) — this type only carries identity so that build-dependency queries have
/// something concrete to return.
#[derive(Default, Eq, PartialEq, Clone, Hash)]
pub struct TaskId(Id);

impl TaskId {
    pub fn new<S: AsRef<str>>(s: S) -> Result<TaskId, InvalidId> {
        Id::new(s).map(Self)
    }
}

impl Debug for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Deref for TaskId {
    type Target = Id;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Id> for TaskId {
    fn from(i: Id) -> Self {
        Self(i)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How projects are referenced. Unlike tasks, projects don't have to have parents.
#[derive(Default, Eq, PartialEq, Clone, Hash)]
pub struct ProjectId(Id);

impl ProjectId {
    pub fn root() -> Self {
        Self(Id::new("root").unwrap())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InvalidId> {
        let mut path = path.as_ref();
        if let Ok(prefixless) = path.strip_prefix("/") {
            path = prefixless;
        }
        let parts = path
            .iter()
            .map(|s| {
                s.to_str()
                    .ok_or_else(|| InvalidId::new(path.to_string_lossy().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Id::from_iter(parts).map(Self)
    }

    pub fn new(id: &str) -> Result<Self, InvalidId> {
        Id::new(id).map(Self)
    }

    /// Produce the identifier of a configuration owned by this project, e.g. `root:compileClasspath`.
    pub fn configuration_path(&self, name: &str) -> Result<ConfigurationPath, InvalidId> {
        self.0.join(name).map(ConfigurationPath)
    }
}

impl Debug for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for ProjectId {
    type Target = Id;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The unique path of a [`Configuration`](crate::configuration::Configuration) within a project,
/// e.g. `root:compileClasspath`.
#[derive(Default, Eq, PartialEq, Clone, Hash)]
pub struct ConfigurationPath(Id);

impl ConfigurationPath {
    pub fn new<S: AsRef<str>>(s: S) -> Result<Self, InvalidId> {
        Id::new(s).map(Self)
    }

    /// The final segment of the path — conventionally also the configuration's name.
    pub fn name(&self) -> &str {
        self.0.this()
    }
}

impl Debug for ConfigurationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Display for ConfigurationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConfigurationPath {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug)]
pub struct InvalidId(pub String);

impl InvalidId {
    pub fn new(string: impl AsRef<str>) -> Self {
        Self(string.as_ref().to_string())
    }
}

impl Display for InvalidId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid identifier {:?}", self.0)
    }
}

impl Error for InvalidId {}

pub fn is_valid_identifier(id: &str) -> Result<(), InvalidId> {
    static VALID_ID_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-zA-Z][\w-]*$").expect("invalid pattern"));

    if VALID_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(InvalidId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_string() {
        let id = Id::from_iter(["project", "task"]).unwrap();
        assert_eq!(id.to_string(), ":project:task");

        let id = Id::from_iter(["task"]).unwrap();
        assert_eq!(id.to_string(), ":task");
    }

    #[test]
    fn ancestors() {
        let id = Id::new_uncheckable("root:child:task");
        let mut ancestors = id.ancestors();
        assert_eq!(ancestors.next(), Some(&Id::new_uncheckable("root:child:task")));
        assert_eq!(ancestors.next(), Some(&Id::new_uncheckable("root:child")));
        assert_eq!(ancestors.next(), Some(&Id::new_uncheckable("root")));
        assert_eq!(ancestors.next(), None);
    }

    #[test]
    fn rejects_invalid_parts() {
        assert!(Id::new("2abc").is_err());
        assert!(Id::new("a b").is_err());
    }

    #[test]
    fn configuration_path_from_project() {
        let project = ProjectId::new("root").unwrap();
        let path = project.configuration_path("compileClasspath").unwrap();
        assert_eq!(path.name(), "compileClasspath");
        assert_eq!(path.to_string(), ":root:compileClasspath");
    }
}
