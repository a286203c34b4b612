//! Startup seeding support.

use armature_core::UserId;

use crate::store::EntityStore;

/// Insert the built records when the store has none. Returns how many were
/// inserted; re-running against a populated store is a no-op.
pub fn seed_if_empty<V, F>(store: &dyn EntityStore<V>, actor: UserId, build: F) -> usize
where
    F: FnOnce() -> Vec<V>,
{
    if store.count() > 0 {
        return 0;
    }

    let records = build();
    let seeded = records.len();
    for record in records {
        store.insert(actor, record);
    }

    tracing::info!(records = seeded, "seeded storage");
    seeded
}
