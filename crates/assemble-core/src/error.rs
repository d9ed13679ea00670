//! An error with a payload, and the concrete error taxonomy for the configuration subsystem.

use crate::identifier::ConfigurationPath;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// An payload with an error
#[derive(Debug)]
pub struct PayloadError<E> {
    kind: E,
    bt: Backtrace,
}

impl<E> PayloadError<E> {
    /// Create a new payloaded error.
    #[inline]
    pub fn new<E2>(error: E2) -> Self
    where
        E2: Into<E>,
    {
        Self::with_backtrace(error, Backtrace::capture())
    }

    /// create a new payload error with a backtrace
    pub fn with_backtrace<E2>(kind: E2, bt: Backtrace) -> Self
    where
        E2: Into<E>,
    {
        Self {
            kind: kind.into(),
            bt,
        }
    }

    /// Gets the error kind
    pub fn kind(&self) -> &E {
        &self.kind
    }

    /// Gets the backtrace
    pub fn backtrace(&self) -> &Backtrace {
        &self.bt
    }

    /// Convert the error type
    pub fn into<T>(self) -> PayloadError<T>
    where
        E: Into<T>,
    {
        PayloadError {
            kind: self.kind.into(),
            bt: self.bt,
        }
    }

    /// Unwraps the payloaded error
    pub fn into_inner(self) -> E {
        self.kind
    }
}

impl<E> From<E> for PayloadError<E> {
    fn from(e: E) -> Self {
        Self::new(e)
    }
}

impl<E: Display> Display for PayloadError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl<E: Error> Error for PayloadError<E> {}

impl<E> AsRef<E> for PayloadError<E> {
    fn as_ref(&self) -> &E {
        &self.kind
    }
}

/// A result with a pay-loaded error
pub type Result<T, E = ConfigurationError> = std::result::Result<T, PayloadError<E>>;

/// The error taxonomy for the configuration graph and resolution lifecycle.
///
/// `AlreadyResolved` through `ResolutionNotAllowed` are user-mutation errors: they indicate
/// the caller did something the state machine forbids, not a bug in this crate. The two
/// `ReResolvedAfterModification` / `ArtifactsBeforeGraph` variants are state-machine errors —
/// they indicate an invariant this crate itself should have upheld was violated.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("configuration {path} is already resolved and cannot be mutated")]
    AlreadyResolved { path: ConfigurationPath },

    #[error("configuration {path}'s task dependencies have already been resolved")]
    TaskDependenciesAlreadyResolved { path: ConfigurationPath },

    #[error("configuration {path} has already been included in a dependency resolution")]
    AlreadyObserved {
        path: ConfigurationPath,
        /// Set when the mutation was attempted from inside a `beforeResolve` callback, so the
        /// caller can be pointed at the default-dependencies mechanism instead.
        in_before_resolve: bool,
    },

    #[error("{child} cannot extend from {parent}: {parent} already (transitively) extends from {child}")]
    CyclicExtendsFrom {
        child: ConfigurationPath,
        parent: ConfigurationPath,
    },

    #[error("attribute {name:?} already registered with type {existing_type}, cannot re-register with type {new_type}")]
    AttributeTypeMismatch {
        name: String,
        existing_type: &'static str,
        new_type: &'static str,
    },

    #[error("attribute name {name:?} collides with an existing attribute of a different type")]
    AttributeNameCollision { name: String },

    #[error("this attribute container is an immutable snapshot and cannot be mutated")]
    AttributeContainerImmutable,

    #[error("configuration {path} cannot be resolved (canBeResolved == false)")]
    ResolutionNotAllowed { path: ConfigurationPath },

    #[error("configuration {path} was modified after being resolved to ARTIFACTS_RESOLVED")]
    ReResolvedAfterModification { path: ConfigurationPath },

    #[error("attempted to resolve artifacts for {path} before the graph was resolved")]
    ArtifactsBeforeGraph { path: ConfigurationPath },

    #[error("resolution of {path} failed with {} error(s)", errors.len())]
    ResolutionFailure {
        path: ConfigurationPath,
        errors: Vec<String>,
    },

    #[error("transform {transform} failed on input {input}: {cause}")]
    TransformFailure {
        transform: String,
        input: PathBuf,
        cause: String,
    },

    #[error("failed resolving {context} for {path} ({display_name}): {}", .causes.join("; "))]
    ArtifactResolve {
        /// `"files"` or `"artifacts"`, matching the view the caller asked for.
        context: &'static str,
        path: ConfigurationPath,
        display_name: String,
        causes: Vec<String>,
    },

    #[error(transparent)]
    InvalidId(#[from] crate::identifier::InvalidId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload() {
        let path = ConfigurationPath::new("compileClasspath").unwrap();
        let res = PayloadError::new(ConfigurationError::AlreadyResolved { path });
        let bt = res.backtrace();
        println!("{:?}", bt);
    }

    #[test]
    fn display_mentions_path() {
        let path = ConfigurationPath::new("compileClasspath").unwrap();
        let err = ConfigurationError::ResolutionNotAllowed { path };
        assert!(err.to_string().contains("compileClasspath"));
    }
}
