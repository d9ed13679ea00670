//! Resolution lifecycle listeners.
//!
//! `beforeResolve`/`afterResolve` are plain `(incoming) -> ()` callbacks, not a reflective
//! dispatch mechanism — a uniform closure-backed broadcaster is enough.

use crate::configuration::ResolvableDependencies;
use std::sync::Arc;

/// A callback invoked immediately before, or immediately after, a configuration resolves.
/// `incoming` is a read-only view of the configuration being resolved.
pub trait DependencyResolutionListener: Send + Sync {
    fn before_resolve(&self, incoming: &ResolvableDependencies) {
        let _ = incoming;
    }

    fn after_resolve(&self, incoming: &ResolvableDependencies) {
        let _ = incoming;
    }
}

impl<F> DependencyResolutionListener for F
where
    F: Fn(&ResolvableDependencies) + Send + Sync,
{
    fn before_resolve(&self, incoming: &ResolvableDependencies) {
        (self)(incoming)
    }
}

/// Broadcasts `beforeResolve`/`afterResolve` to every registered listener, in registration
/// order. Each configuration owns one `ListenerManager`.
#[derive(Default, Clone)]
pub struct ListenerManager {
    listeners: Vec<Arc<dyn DependencyResolutionListener>>,
}

impl ListenerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Arc<dyn DependencyResolutionListener>) {
        self.listeners.push(listener);
    }

    pub fn broadcast_before_resolve(&self, incoming: &ResolvableDependencies) {
        for listener in &self.listeners {
            listener.before_resolve(incoming);
        }
    }

    pub fn broadcast_after_resolve(&self, incoming: &ResolvableDependencies) {
        for listener in &self.listeners {
            listener.after_resolve(incoming);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ConfigurationPath;
    use parking_lot::Mutex;

    #[test]
    fn listeners_fire_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ListenerManager::new();

        let order1 = order.clone();
        manager.add(Arc::new(move |_: &ResolvableDependencies| {
            order1.lock().push(1);
        }));
        let order2 = order.clone();
        manager.add(Arc::new(move |_: &ResolvableDependencies| {
            order2.lock().push(2);
        }));

        let incoming = ResolvableDependencies::new(ConfigurationPath::new("compile").unwrap());
        manager.broadcast_before_resolve(&incoming);

        assert_eq!(*order.lock(), vec![1, 2]);
    }
}
