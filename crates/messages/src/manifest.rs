//! Module manifest: what the convention registrar scans for this module.

use std::sync::Arc;

use armature_core::UserId;
use armature_observability::DiagnosticsLogger;
use armature_registry::{ModuleManifest, Provider, Registry, RegistryError, RequestScope};
use armature_storage::{seed_if_empty, EntityStore, InMemoryEntityStore};

use crate::message::Message;
use crate::repository::{MessagesRepository, StoredMessagesRepository};
use crate::service::{DefaultMessagesService, MessagesService};

/// Scanned by `bind_role` for the "Service" and "Repository" suffixes.
pub static MANIFEST: ModuleManifest = ModuleManifest {
    module: "messages",
    descriptors: &["IMessagesService", "IMessagesRepository"],
    providers: &[
        Provider {
            name: "MessagesService",
            bind: bind_messages_service,
        },
        Provider {
            name: "MessagesRepository",
            bind: bind_messages_repository,
        },
    ],
};

fn bind_messages_service(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.bind_scoped::<Arc<dyn MessagesService>, _>("IMessagesService", |scope| {
        let repository = scope.resolve::<Arc<dyn MessagesRepository>>()?;
        Ok(Arc::new(DefaultMessagesService::new(repository)) as Arc<dyn MessagesService>)
    })
}

fn bind_messages_repository(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.bind_scoped::<Arc<dyn MessagesRepository>, _>("IMessagesRepository", |scope| {
        let store = scope.resolve::<Arc<dyn EntityStore<Message>>>()?;
        Ok(Arc::new(StoredMessagesRepository::new(store)) as Arc<dyn MessagesRepository>)
    })
}

/// Store binding hook handed to the composition root ahead of role
/// registration.
pub fn bind_stores(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.bind_singleton::<Arc<dyn EntityStore<Message>>, _>("IMessagesStore", |scope| {
        let logger = scope.resolve::<Arc<dyn DiagnosticsLogger>>()?;
        Ok(Arc::new(InMemoryEntityStore::new(logger)) as Arc<dyn EntityStore<Message>>)
    })
}

/// Seed sample messages once storage is wired; runs after the pipeline is
/// built and before serving.
pub fn seed(scope: &RequestScope) -> Result<usize, RegistryError> {
    let store = scope.resolve::<Arc<dyn EntityStore<Message>>>()?;
    let actor = UserId::new();
    Ok(seed_if_empty(&store, actor, sample_messages))
}

fn sample_messages() -> Vec<Message> {
    vec![
        Message::new("ops", "Welcome to armature."),
        Message::new("ops", "Storage seeded with sample data."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use armature_mapping::compose;

    fn composed() -> Arc<Registry> {
        let mut registry = Registry::new();
        compose::register(&mut registry, &[bind_stores], &[&MANIFEST], &[]).unwrap();
        Arc::new(registry)
    }

    #[test]
    fn convention_scan_binds_service_and_repository() {
        let registry = composed();
        let scope = RequestScope::new(Arc::clone(&registry));

        scope.resolve::<Arc<dyn MessagesService>>().unwrap();
        scope.resolve::<Arc<dyn MessagesRepository>>().unwrap();
    }

    #[test]
    fn service_and_repository_share_the_store_singleton() {
        let registry = composed();

        let scope = RequestScope::new(Arc::clone(&registry));
        let service = scope.resolve::<Arc<dyn MessagesService>>().unwrap();
        let created = service
            .create(
                UserId::new(),
                crate::message::NewMessage {
                    recipient: "ops".to_string(),
                    body: "hello".to_string(),
                },
            )
            .unwrap();

        // A later scope sees the same underlying store.
        let other = RequestScope::new(registry);
        let service = other.resolve::<Arc<dyn MessagesService>>().unwrap();
        assert!(service.get(created.audit.guid).is_ok());
    }

    #[test]
    fn seeding_runs_once() {
        let registry = composed();
        let scope = RequestScope::new(Arc::clone(&registry));

        let first = seed(&scope).unwrap();
        let second = seed(&scope).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
    }
}
