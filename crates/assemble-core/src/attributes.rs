//! Typed, name-keyed attribute containers used to match consumer requirements against
//! producer capabilities and to select [artifact transforms](crate::transform).

use crate::error::ConfigurationError;
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A typed key: a name plus the Rust type its values carry. Two attributes with the same
/// name but different types are a user error — `Attribute` itself only ever describes one
/// type, the mismatch is caught when a second attribute with a colliding name is inserted.
#[derive(Clone)]
pub struct Attribute<T: 'static> {
    name: Arc<str>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: 'static> Attribute<T> {
    pub fn of(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl<T: 'static> Debug for Attribute<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Attribute({:?}: {})", self.name, self.type_name())
    }
}

impl<T: 'static> PartialEq for Attribute<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T: 'static> Eq for Attribute<T> {}

/// A single entry in an [`AttributeContainer`], with its value erased behind `dyn Any` but
/// kept alongside the declared type's name and id so insertion can reject mismatches.
#[derive(Clone)]
struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    display: Arc<str>,
}

impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}

static EMPTY: Lazy<AttributeContainer> = Lazy::new(|| AttributeContainer {
    entries: BTreeMap::new(),
    immutable: true,
});

/// A mapping from [`Attribute`] to value. Values are untyped at storage but constrained at
/// insertion: the runtime type must match the attribute's declared type, and a name cannot be
/// reused with a different type than it was first registered with.
///
/// Has two forms, distinguished by the `immutable` flag: a mutable working container that a
/// [`Configuration`](crate::configuration::Configuration) accumulates into, and an immutable
/// snapshot obtained via [`AttributeContainer::as_immutable`].
#[derive(Clone, Debug, Default)]
pub struct AttributeContainer {
    entries: BTreeMap<Arc<str>, Entry>,
    immutable: bool,
}

impl AttributeContainer {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            immutable: false,
        }
    }

    /// Insert or overwrite a typed value for `attribute`. Rejects a name collision against an
    /// existing attribute of a different type, and rejects mutation of an immutable snapshot.
    pub fn put<T>(&mut self, attribute: &Attribute<T>, value: T) -> Result<(), ConfigurationError>
    where
        T: Send + Sync + Display + 'static,
    {
        if self.immutable {
            return Err(ConfigurationError::AttributeContainerImmutable);
        }

        if let Some(existing) = self.entries.get(attribute.name()) {
            if existing.type_id != attribute.type_id() {
                return Err(ConfigurationError::AttributeTypeMismatch {
                    name: attribute.name().to_string(),
                    existing_type: existing.type_name,
                    new_type: attribute.type_name(),
                });
            }
        }

        let display: Arc<str> = Arc::from(format!("{}={}", attribute.name(), value));
        self.entries.insert(
            Arc::from(attribute.name()),
            Entry {
                type_id: attribute.type_id(),
                type_name: attribute.type_name(),
                value: Arc::new(value),
                display,
            },
        );
        Ok(())
    }

    /// Look up the typed value for `attribute`, if present. Returns `None` both when the name
    /// is absent and when it is present under a different type (a caller asking with the wrong
    /// `Attribute<T>` simply doesn't see it; the type check at `put` time is what prevents two
    /// different types from ever sharing a name in the first place).
    pub fn get<T: 'static>(&self, attribute: &Attribute<T>) -> Option<&T> {
        self.entries
            .get(attribute.name())
            .filter(|entry| entry.type_id == attribute.type_id())
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for every attribute present in `required` whose value in `self` equals the value
    /// recorded in `required`; extra attributes in `self` are allowed. Values are compared by
    /// their rendered `Display` form since the container type-erases them.
    pub fn satisfies(&self, required: &AttributeContainer) -> bool {
        required
            .entries
            .iter()
            .all(|(name, req_entry)| match self.entries.get(name) {
                Some(entry) => entry.display == req_entry.display,
                None => false,
            })
    }

    /// Produce an immutable snapshot. An empty container always returns the shared process-wide
    /// `EMPTY` instance; a non-empty container shares its storage since the owner is not
    /// expected to mutate a container after taking a snapshot of it.
    pub fn as_immutable(&self) -> AttributeContainer {
        if self.entries.is_empty() {
            return EMPTY.clone();
        }
        let mut clone = self.clone();
        clone.immutable = true;
        clone
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }
}

impl Display for AttributeContainer {
    /// Sorted by attribute name — `entries` is a `BTreeMap` so iteration order is already sorted.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, entry) in self.entries.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", entry.display)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_type_mismatch_on_same_name() {
        let mut attrs = AttributeContainer::new();
        let ext = Attribute::<String>::of("extension");
        attrs.put(&ext, "aar".to_string()).unwrap();

        let ext_as_int = Attribute::<i32>::of("extension");
        let err = attrs.put(&ext_as_int, 1).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::AttributeTypeMismatch { .. }
        ));
    }

    #[test]
    fn empty_snapshot_is_shared() {
        let a = AttributeContainer::new().as_immutable();
        let b = AttributeContainer::new().as_immutable();
        assert_eq!(a.to_string(), b.to_string());
        assert!(a.is_empty() && b.is_empty());
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut attrs = AttributeContainer::new();
        attrs
            .put(&Attribute::<String>::of("format"), "JAR".to_string())
            .unwrap();
        let once = attrs.as_immutable();
        let twice = once.as_immutable();
        assert_eq!(once.to_string(), twice.to_string());
    }

    #[test]
    fn immutable_snapshot_rejects_mutation() {
        let mut attrs = AttributeContainer::new();
        attrs
            .put(&Attribute::<String>::of("format"), "JAR".to_string())
            .unwrap();
        let mut snapshot = attrs.as_immutable();
        let err = snapshot
            .put(&Attribute::<String>::of("other"), "x".to_string())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::AttributeContainerImmutable
        ));
    }

    #[test]
    fn satisfies_allows_extra_attributes() {
        let mut from = AttributeContainer::new();
        from.put(&Attribute::<String>::of("extension"), "aar".to_string())
            .unwrap();
        from.put(&Attribute::<String>::of("format"), "JAR".to_string())
            .unwrap();

        let mut required = AttributeContainer::new();
        required
            .put(&Attribute::<String>::of("extension"), "aar".to_string())
            .unwrap();

        assert!(from.satisfies(&required));
    }

    #[test]
    fn display_is_sorted_by_name() {
        let mut attrs = AttributeContainer::new();
        attrs
            .put(&Attribute::<String>::of("zeta"), "1".to_string())
            .unwrap();
        attrs
            .put(&Attribute::<String>::of("alpha"), "2".to_string())
            .unwrap();
        assert_eq!(attrs.to_string(), "{alpha=2, zeta=1}");
    }
}
