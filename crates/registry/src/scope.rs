//! Per-request resolution scope.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::registry::{Lifetime, Registry, RegistryError};

/// A resolution scope tied to one inbound unit of work.
///
/// Scoped bindings resolve to one instance per scope: the first resolution
/// runs the factory, later resolutions within the same scope get clones of
/// the cached value. Dropping the scope (at end of request) releases the
/// cached instances.
pub struct RequestScope {
    registry: Arc<Registry>,
    cache: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl RequestScope {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolve `T` (typically `Arc<dyn Trait>`) from the registry.
    pub fn resolve<T>(&self) -> Result<T, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = TypeId::of::<T>();

        if let Some(hit) = self.cached::<T>(&key) {
            return Ok(hit);
        }

        let binding = self
            .registry
            .binding(&key)
            .ok_or(RegistryError::NotBound(core::any::type_name::<T>()))?;
        let descriptor = binding.descriptor;
        let lifetime = binding.lifetime;
        let factory = Arc::clone(&binding.factory);

        match lifetime {
            Lifetime::Singleton => {
                if let Some(existing) = self.registry.singleton::<T>(&key) {
                    return Ok(existing);
                }
                // Built outside any lock; factories may resolve their own
                // dependencies through this scope.
                let built = factory(self)?;
                let value = downcast::<T>(built, descriptor)?;
                Ok(self.registry.store_singleton(key, value))
            }
            Lifetime::Scoped => {
                let built = factory(self)?;
                let value = downcast::<T>(built, descriptor)?;

                let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
                let entry = cache
                    .entry(key)
                    .or_insert_with(|| Box::new(value) as Box<dyn Any + Send + Sync>);
                entry
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or(RegistryError::TypeMismatch { descriptor })
            }
        }
    }

    fn cached<T>(&self, key: &TypeId) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(key).and_then(|b| b.downcast_ref::<T>()).cloned()
    }
}

impl core::fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestScope").finish_non_exhaustive()
    }
}

fn downcast<T: 'static>(
    boxed: Box<dyn Any + Send + Sync>,
    descriptor: &'static str,
) -> Result<T, RegistryError> {
    boxed
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| RegistryError::TypeMismatch { descriptor })
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Counter: Send + Sync + std::fmt::Debug {
        fn value(&self) -> u64;
    }

    #[derive(Debug)]
    struct FixedCounter(u64);

    impl Counter for FixedCounter {
        fn value(&self) -> u64 {
            self.0
        }
    }

    fn registry_with_counter() -> Arc<Registry> {
        let mut registry = Registry::new();
        registry
            .bind_scoped::<Arc<dyn Counter>, _>("ICounter", |_| Ok(Arc::new(FixedCounter(42))))
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn scoped_instances_are_shared_within_a_scope() {
        let scope = RequestScope::new(registry_with_counter());

        let a = scope.resolve::<Arc<dyn Counter>>().unwrap();
        let b = scope.resolve::<Arc<dyn Counter>>().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.value(), 42);
    }

    #[test]
    fn scoped_instances_are_fresh_across_scopes() {
        let registry = registry_with_counter();

        let a = RequestScope::new(Arc::clone(&registry))
            .resolve::<Arc<dyn Counter>>()
            .unwrap();
        let b = RequestScope::new(registry)
            .resolve::<Arc<dyn Counter>>()
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unbound_type_is_an_error() {
        let scope = RequestScope::new(Arc::new(Registry::new()));
        let err = scope.resolve::<Arc<dyn Counter>>().unwrap_err();
        assert!(matches!(err, RegistryError::NotBound(_)));
    }
}
