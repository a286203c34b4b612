//! Audited key/value entity storage abstractions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use armature_core::{Audited, EntityAudit, UserId};
use armature_observability::{DiagnosticsLogger, LogLevel};

/// Entity store abstraction over audited records.
///
/// `list` skips soft-deleted records; `get` returns them so callers can
/// distinguish a missing record from a deactivated one.
pub trait EntityStore<V>: Send + Sync {
    /// Insert a record, assigning id, guid and creation stamps. Returns the
    /// stamped record.
    fn insert(&self, actor: UserId, value: V) -> V;
    fn get(&self, guid: Uuid) -> Option<V>;
    fn list(&self) -> Vec<V>;
    /// Apply a mutation and restamp the modification fields.
    fn update(&self, actor: UserId, guid: Uuid, apply: &dyn Fn(&mut V)) -> Option<V>;
    /// Soft delete. Returns false when the record does not exist.
    fn deactivate(&self, actor: UserId, guid: Uuid) -> bool;
    /// Number of records, soft-deleted included.
    fn count(&self) -> usize;
}

impl<V, S> EntityStore<V> for Arc<S>
where
    S: EntityStore<V> + ?Sized,
{
    fn insert(&self, actor: UserId, value: V) -> V {
        (**self).insert(actor, value)
    }

    fn get(&self, guid: Uuid) -> Option<V> {
        (**self).get(guid)
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }

    fn update(&self, actor: UserId, guid: Uuid, apply: &dyn Fn(&mut V)) -> Option<V> {
        (**self).update(actor, guid, apply)
    }

    fn deactivate(&self, actor: UserId, guid: Uuid) -> bool {
        (**self).deactivate(actor, guid)
    }

    fn count(&self) -> usize {
        (**self).count()
    }
}

/// In-memory audited store for tests/dev.
pub struct InMemoryEntityStore<V> {
    inner: RwLock<HashMap<Uuid, V>>,
    sequence: AtomicI64,
    logger: Arc<dyn DiagnosticsLogger>,
}

impl<V> InMemoryEntityStore<V> {
    pub fn new(logger: Arc<dyn DiagnosticsLogger>) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            sequence: AtomicI64::new(0),
            logger,
        }
    }
}

impl<V> EntityStore<V> for InMemoryEntityStore<V>
where
    V: Audited + Clone + Send + Sync + 'static,
{
    fn insert(&self, actor: UserId, mut value: V) -> V {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        *value.audit_mut() = EntityAudit::stamp_created(id, actor, Utc::now());
        let guid = value.audit().guid;

        if let Ok(mut map) = self.inner.write() {
            map.insert(guid, value.clone());
        }

        let _ = self
            .logger
            .log(LogLevel::Debug, &format!("inserted record {guid}"));
        value
    }

    fn get(&self, guid: Uuid) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&guid).cloned()
    }

    fn list(&self) -> Vec<V> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.values()
            .filter(|v| v.audit().is_active)
            .cloned()
            .collect()
    }

    fn update(&self, actor: UserId, guid: Uuid, apply: &dyn Fn(&mut V)) -> Option<V> {
        let mut map = self.inner.write().ok()?;
        let value = map.get_mut(&guid)?;
        apply(value);
        value.audit_mut().stamp_modified(actor, Utc::now());
        Some(value.clone())
    }

    fn deactivate(&self, actor: UserId, guid: Uuid) -> bool {
        let mut map = match self.inner.write() {
            Ok(m) => m,
            Err(_) => return false,
        };

        match map.get_mut(&guid) {
            Some(value) => {
                value.audit_mut().deactivate(actor, Utc::now());
                let _ = self
                    .logger
                    .log(LogLevel::Debug, &format!("deactivated record {guid}"));
                true
            }
            None => false,
        }
    }

    fn count(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }
}
