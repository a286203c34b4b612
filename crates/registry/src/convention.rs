//! Naming-convention registrar over module manifests.
//!
//! Reflection-free rendition of role-suffix scanning: each module ships a
//! static manifest naming its exported descriptors and its providers, and
//! [`bind_role`] matches them by the `I`-prefix convention. Every bind is a
//! typed function checked at compile time; the convention only decides
//! *whether* it runs.

use std::collections::BTreeSet;

use crate::registry::{Registry, RegistryError};

/// Marker prepended to a provider name to derive its descriptor name
/// (`MessagesService` → `IMessagesService`).
pub const DESCRIPTOR_MARKER: char = 'I';

/// A concrete implementation a module offers for registration.
///
/// `name` is the convention name the registrar matches on; `bind` performs
/// the typed registration (per-request lifetime) when the convention matches.
pub struct Provider {
    pub name: &'static str,
    pub bind: fn(&mut Registry) -> Result<(), RegistryError>,
}

/// Static manifest of one module's registrable surface.
pub struct ModuleManifest {
    pub module: &'static str,
    /// Descriptor names the module exports (`"IMessagesService"`, ...).
    pub descriptors: &'static [&'static str],
    pub providers: &'static [Provider],
}

/// Bind every provider whose name ends with `suffix` and whose expected
/// descriptor (`I` + provider name) is exported by any scanned module.
///
/// Providers with the wrong suffix, or with no matching descriptor, are
/// skipped silently. Modules are scanned in the given order, providers in
/// declaration order; a duplicate binding fails fast. Returns the number of
/// bindings installed.
pub fn bind_role(
    suffix: &str,
    registry: &mut Registry,
    modules: &[&ModuleManifest],
) -> Result<usize, RegistryError> {
    let exported: BTreeSet<&str> = modules
        .iter()
        .flat_map(|m| m.descriptors.iter().copied())
        .collect();

    let mut bound = 0;
    for module in modules {
        for provider in module.providers {
            if !provider.name.ends_with(suffix) {
                continue;
            }

            let expected = format!("{DESCRIPTOR_MARKER}{}", provider.name);
            if !exported.contains(expected.as_str()) {
                tracing::debug!(
                    module = module.module,
                    provider = provider.name,
                    "no matching descriptor exported; skipping"
                );
                continue;
            }

            (provider.bind)(registry)?;
            tracing::debug!(module = module.module, descriptor = %expected, "bound by convention");
            bound += 1;
        }
    }

    Ok(bound)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::RequestScope;
    use std::sync::Arc;

    trait OrdersRepository: Send + Sync {
        fn label(&self) -> &'static str;
    }

    struct InMemoryOrdersRepository;

    impl OrdersRepository for InMemoryOrdersRepository {
        fn label(&self) -> &'static str {
            "orders"
        }
    }

    fn bind_orders_repository(registry: &mut Registry) -> Result<(), RegistryError> {
        registry.bind_scoped::<Arc<dyn OrdersRepository>, _>("IOrdersRepository", |_| {
            Ok(Arc::new(InMemoryOrdersRepository))
        })
    }

    fn bind_never(_registry: &mut Registry) -> Result<(), RegistryError> {
        panic!("bind must not run for unmatched providers");
    }

    static ORDERS_MODULE: ModuleManifest = ModuleManifest {
        module: "orders",
        descriptors: &["IOrdersRepository"],
        providers: &[
            Provider {
                name: "OrdersRepository",
                bind: bind_orders_repository,
            },
            // Wrong suffix for a "Repository" scan.
            Provider {
                name: "OrdersHelper",
                bind: bind_never,
            },
        ],
    };

    static WIDGETS_MODULE: ModuleManifest = ModuleManifest {
        module: "widgets",
        // No IWidgetsService exported anywhere.
        descriptors: &[],
        providers: &[Provider {
            name: "WidgetsService",
            bind: bind_never,
        }],
    };

    #[test]
    fn matching_provider_and_descriptor_yield_one_binding() {
        let mut registry = Registry::new();
        let bound = bind_role("Repository", &mut registry, &[&ORDERS_MODULE]).unwrap();

        assert_eq!(bound, 1);
        assert_eq!(registry.len(), 1);

        let scope = RequestScope::new(Arc::new(registry));
        let repo = scope.resolve::<Arc<dyn OrdersRepository>>().unwrap();
        assert_eq!(repo.label(), "orders");
    }

    #[test]
    fn wrong_suffix_is_skipped_silently() {
        let mut registry = Registry::new();
        // "OrdersHelper" never matches the suffix, so bind_never is not hit.
        let bound = bind_role("Repository", &mut registry, &[&ORDERS_MODULE]).unwrap();
        assert_eq!(bound, 1);
    }

    #[test]
    fn provider_without_descriptor_yields_no_binding() {
        let mut registry = Registry::new();
        let bound = bind_role("Service", &mut registry, &[&WIDGETS_MODULE]).unwrap();

        assert_eq!(bound, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_descriptor_across_modules_fails_fast() {
        static DUPLICATE_MODULE: ModuleManifest = ModuleManifest {
            module: "orders-duplicate",
            descriptors: &["IOrdersRepository"],
            providers: &[Provider {
                name: "OrdersRepository",
                bind: bind_orders_repository_dup,
            }],
        };

        let mut registry = Registry::new();
        let err = bind_role(
            "Repository",
            &mut registry,
            &[&ORDERS_MODULE, &DUPLICATE_MODULE],
        )
        .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateBinding("IOrdersRepository"));
    }

    fn bind_orders_repository_dup(registry: &mut Registry) -> Result<(), RegistryError> {
        registry.bind_scoped::<Arc<dyn OrdersRepository>, _>("IOrdersRepository", |_| {
            Ok(Arc::new(InMemoryOrdersRepository))
        })
    }
}
