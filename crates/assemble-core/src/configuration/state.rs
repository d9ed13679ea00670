//! The resolution/observation state lattice and the mutation classification every
//! mutating operation on a [`Configuration`](super::Configuration) must declare.

use std::fmt::{Display, Formatter};

/// Where a configuration's resolution has reached. Monotonic non-decreasing while
/// `dependenciesModified` is false (invariant 2 in the data model).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ResolvedState {
    Unresolved,
    GraphResolved,
    ArtifactsResolved,
}

impl Display for ResolvedState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolvedState::Unresolved => "UNRESOLVED",
            ResolvedState::GraphResolved => "GRAPH_RESOLVED",
            ResolvedState::ArtifactsResolved => "ARTIFACTS_RESOLVED",
        };
        write!(f, "{s}")
    }
}

impl Default for ResolvedState {
    fn default() -> Self {
        ResolvedState::Unresolved
    }
}

/// The publicly observable state of a configuration, as returned by `get_state()`. Distinct
/// from [`ResolvedState`] only in that it surfaces a resolved-but-failed graph as
/// `ResolvedWithFailures` rather than silently reporting `GraphResolved`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfigurationState {
    Unresolved,
    GraphResolved,
    ResolvedWithFailures,
    ArtifactsResolved,
}

impl Display for ConfigurationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConfigurationState::Unresolved => "UNRESOLVED",
            ConfigurationState::GraphResolved => "GRAPH_RESOLVED",
            ConfigurationState::ResolvedWithFailures => "RESOLVED_WITH_FAILURES",
            ConfigurationState::ArtifactsResolved => "ARTIFACTS_RESOLVED",
        };
        write!(f, "{s}")
    }
}

/// Classifies a mutating operation so `validate_mutation` can apply the right rule. `Strategy`
/// mutations are the sole exception to "no mutation once observed" (§4.1 rule 3) and never
/// propagate to children (§4.1, parent mutation).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MutationType {
    Dependencies,
    Artifacts,
    Strategy,
    Attributes,
    Role,
}

impl MutationType {
    pub fn is_strategy(&self) -> bool {
        matches!(self, MutationType::Strategy)
    }
}
