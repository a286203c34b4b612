//! Registration table: descriptor type → factory + lifetime.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::scope::RequestScope;

/// Wiring error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A descriptor was bound twice. Registration conflicts fail fast rather
    /// than silently letting the last write win.
    #[error("descriptor already bound: {0}")]
    DuplicateBinding(&'static str),

    /// Resolution was attempted for a type nothing registered.
    #[error("no binding for {0}")]
    NotBound(&'static str),

    /// A factory produced a value of the wrong type.
    #[error("factory for {descriptor} produced an unexpected type")]
    TypeMismatch { descriptor: &'static str },

    /// A factory failed while constructing its value.
    #[error("failed to construct {descriptor}: {message}")]
    Construction {
        descriptor: &'static str,
        message: String,
    },
}

/// How long a resolved instance lives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance for the whole process, created lazily and shared.
    Singleton,
    /// A fresh instance per request scope, shared within that scope and
    /// released when the scope is dropped.
    Scoped,
}

type AnyFactory =
    Arc<dyn Fn(&RequestScope) -> Result<Box<dyn Any + Send + Sync>, RegistryError> + Send + Sync>;

pub(crate) struct Binding {
    pub(crate) descriptor: &'static str,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: AnyFactory,
}

/// The registration table.
///
/// Keyed by the `TypeId` of the resolved type (typically `Arc<dyn Trait>`);
/// the descriptor name is kept alongside for diagnostics and conflict
/// reporting. Built once at startup before any request is served.
pub struct Registry {
    bindings: HashMap<TypeId, Binding>,
    singletons: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            singletons: RwLock::new(HashMap::new()),
        }
    }

    /// Bind `T` with an explicit lifetime.
    pub fn bind_with<T, F>(
        &mut self,
        descriptor: &'static str,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&RequestScope) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        let key = TypeId::of::<T>();
        if self.bindings.contains_key(&key) {
            return Err(RegistryError::DuplicateBinding(descriptor));
        }

        let factory: AnyFactory =
            Arc::new(move |scope| Ok(Box::new(factory(scope)?) as Box<dyn Any + Send + Sync>));

        self.bindings.insert(
            key,
            Binding {
                descriptor,
                lifetime,
                factory,
            },
        );
        Ok(())
    }

    /// Bind `T` with per-request lifetime.
    pub fn bind_scoped<T, F>(&mut self, descriptor: &'static str, factory: F) -> Result<(), RegistryError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&RequestScope) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        self.bind_with::<T, F>(descriptor, Lifetime::Scoped, factory)
    }

    /// Bind `T` as a lazily-created process-wide singleton.
    pub fn bind_singleton<T, F>(&mut self, descriptor: &'static str, factory: F) -> Result<(), RegistryError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&RequestScope) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        self.bind_with::<T, F>(descriptor, Lifetime::Singleton, factory)
    }

    /// Bind an already-constructed value as a singleton.
    pub fn bind_instance<T>(&mut self, descriptor: &'static str, value: T) -> Result<(), RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.bind_with(descriptor, Lifetime::Singleton, move |_| Ok(value.clone()))
    }

    pub fn is_bound<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Number of installed bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Descriptor names of all installed bindings (diagnostics).
    pub fn descriptors(&self) -> Vec<&'static str> {
        self.bindings.values().map(|b| b.descriptor).collect()
    }

    pub(crate) fn binding(&self, key: &TypeId) -> Option<&Binding> {
        self.bindings.get(key)
    }

    pub(crate) fn singleton<T>(&self, key: &TypeId) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let map = self
            .singletons
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.get(key).and_then(|b| b.downcast_ref::<T>()).cloned()
    }

    /// Store a freshly built singleton, keeping an existing one if another
    /// thread won the race.
    pub(crate) fn store_singleton<T>(&self, key: TypeId, value: T) -> T
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut map = self
            .singletons
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = map.get(&key).and_then(|b| b.downcast_ref::<T>()).cloned() {
            return existing;
        }
        map.insert(key, Box::new(value.clone()));
        value
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("descriptors", &self.descriptors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn duplicate_binding_fails_fast() {
        let mut registry = Registry::new();
        registry
            .bind_scoped::<Arc<dyn Greeter>, _>("IGreeter", |_| Ok(Arc::new(EnglishGreeter)))
            .unwrap();

        let err = registry
            .bind_scoped::<Arc<dyn Greeter>, _>("IGreeter", |_| Ok(Arc::new(EnglishGreeter)))
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateBinding("IGreeter"));
    }

    #[test]
    fn instance_binding_resolves_as_singleton() {
        let mut registry = Registry::new();
        let shared: Arc<dyn Greeter> = Arc::new(EnglishGreeter);
        registry
            .bind_instance("IGreeter", Arc::clone(&shared))
            .unwrap();

        let registry = Arc::new(registry);
        let a = RequestScope::new(Arc::clone(&registry))
            .resolve::<Arc<dyn Greeter>>()
            .unwrap();
        let b = RequestScope::new(registry)
            .resolve::<Arc<dyn Greeter>>()
            .unwrap();

        assert!(Arc::ptr_eq(&a, &shared));
        assert!(Arc::ptr_eq(&a, &b));
    }
}
