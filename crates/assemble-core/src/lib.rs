//! # `assemble-core`
//!
//! The configuration graph and two-phase dependency resolution lifecycle that sits at the
//! center of the assemble build tool: named configurations that aggregate dependencies,
//! artifacts, and exclude rules; extend one another to inherit their contents; and drive a
//! resolution pipeline whose results are cached and exposed through a lenient, transform-aware
//! artifact view.

#![deny(rustdoc::broken_intra_doc_links)]

#[macro_use]
extern crate static_assertions;

#[macro_use]
extern crate log;

pub mod artifact;
pub mod attributes;
pub mod buildable;
pub mod configuration;
pub mod dependency;
pub mod error;
pub mod exclude_rule;
pub mod file_collection;
pub mod identifier;
pub mod immutable;
pub mod lenient_view;
pub mod listener;
pub mod logging;
pub mod named;
pub mod resolver;
pub mod transform;
pub mod utilities;

pub use configuration::Configuration;
pub use error::{ConfigurationError, PayloadError};

pub mod prelude {
    //! Commonly used types across the configuration and resolution subsystem.

    pub use crate::attributes::{Attribute, AttributeContainer};
    pub use crate::buildable::{Buildable, TaskDependencyContainer};
    pub use crate::configuration::{
        Configuration, ConfigurationFileCollection, ConfigurationHandler, ConfigurationState, ResolvedState,
    };
    pub use crate::dependency::{Dependency, FileCollectionDependency};
    pub use crate::error::{ConfigurationError, PayloadError, Result};
    pub use crate::identifier::{ConfigurationPath, ProjectId, TaskId};
    pub use crate::lenient_view::{ArtifactVisitor, LenientView};
    pub use crate::resolver::{Resolver, ResolverResults};
    pub use crate::transform::{Transform, TransformRegistry};
}
