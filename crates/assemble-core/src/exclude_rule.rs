//! Exclude rules: group/module pairs a configuration can use to prune transitive dependencies.

use std::fmt::{Display, Formatter};

/// A `(group, module)` pair excluded from resolution. Immutable after insertion — there is no
/// way to mutate a rule once added to an [`ExcludeRuleContainer`], only to add or remove whole
/// rules.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ExcludeRule {
    group: String,
    module: String,
}

impl ExcludeRule {
    pub fn new(group: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            module: module.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn module(&self) -> &str {
        &self.module
    }
}

impl Display for ExcludeRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.module)
    }
}

/// An ordered, deduplicated set of [`ExcludeRule`]s owned by a configuration.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRuleContainer {
    rules: Vec<ExcludeRule>,
}

impl ExcludeRuleContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: ExcludeRule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExcludeRule> {
        self.rules.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_same_rule_twice_is_idempotent() {
        let mut rules = ExcludeRuleContainer::new();
        rules.add(ExcludeRule::new("org.foo", "bar"));
        rules.add(ExcludeRule::new("org.foo", "bar"));
        assert_eq!(rules.len(), 1);
    }
}
