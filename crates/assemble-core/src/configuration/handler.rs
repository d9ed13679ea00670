//! A per-project registry of configurations, keyed by name.

use crate::configuration::core::Configuration;
use crate::error::ConfigurationError;
use crate::identifier::ProjectId;
use crate::resolver::Resolver;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns every [`Configuration`] declared by one project, and mints new ones against a shared
/// [`Resolver`]. Mirrors the role a project plays in the data model's "Configuration is created
/// by the owning project with a resolver, listener manager, and identity strings" lifecycle
/// note — the listener manager itself lives per-configuration (`Configuration::listeners`).
pub struct ConfigurationHandler {
    project: ProjectId,
    resolver: Arc<dyn Resolver>,
    configurations: Mutex<HashMap<String, Configuration>>,
}

impl ConfigurationHandler {
    pub fn new(project: ProjectId, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            project,
            resolver,
            configurations: Mutex::new(HashMap::new()),
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Creates a configuration named `name` if it doesn't already exist, returning the existing
    /// one otherwise (matches the idempotent feel of `extendsFrom` elsewhere in this subsystem).
    pub fn maybe_create(&self, name: &str) -> Result<Configuration, ConfigurationError> {
        let mut configurations = self.configurations.lock();
        if let Some(existing) = configurations.get(name) {
            return Ok(existing.clone());
        }
        let path = self.project.configuration_path(name)?;
        let config = Configuration::new(path, self.resolver.clone());
        configurations.insert(name.to_string(), config.clone());
        Ok(config)
    }

    pub fn get(&self, name: &str) -> Option<Configuration> {
        self.configurations.lock().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.configurations.lock().keys().cloned().collect()
    }

    pub fn all(&self) -> Vec<Configuration> {
        self.configurations.lock().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::tests::NoopResolver;

    #[test]
    fn maybe_create_is_idempotent() {
        let handler = ConfigurationHandler::new(ProjectId::root(), Arc::new(NoopResolver));
        let a = handler.maybe_create("compileClasspath").unwrap();
        let b = handler.maybe_create("compileClasspath").unwrap();
        assert_eq!(a.path(), b.path());
        assert_eq!(handler.names().len(), 1);
    }
}
