//! Save-time interception and audit stamping.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use common::UserId;

use crate::entity::Entity;
use crate::tracker::{ChangeTracker, EntityState};

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that returns a settable instant. Used in tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Identity of the caller on whose behalf changes are saved.
pub trait CurrentUser: Send + Sync {
    /// Returns the caller's ID, or [`UserId::anonymous`] when there is none.
    fn id(&self) -> UserId;
}

impl CurrentUser for UserId {
    fn id(&self) -> UserId {
        *self
    }
}

/// Hook run by a repository immediately before pending changes are written.
pub trait SaveChangesInterceptor<E: Entity>: Send + Sync {
    fn saving_changes(&self, tracker: &mut ChangeTracker<E>);
}

/// Stamps creation and modification metadata on every pending auditable
/// entity.
///
/// One instant is read from the clock per save, so every entity written
/// in the same save carries the same timestamp.
#[derive(Clone)]
pub struct AuditableEntityInterceptor {
    clock: Arc<dyn Clock>,
    user: Arc<dyn CurrentUser>,
}

impl AuditableEntityInterceptor {
    pub fn new(clock: Arc<dyn Clock>, user: Arc<dyn CurrentUser>) -> Self {
        Self { clock, user }
    }
}

impl<E: Entity> SaveChangesInterceptor<E> for AuditableEntityInterceptor {
    fn saving_changes(&self, tracker: &mut ChangeTracker<E>) {
        if !tracker.has_changes() {
            return;
        }

        let now = self.clock.now();
        let user = self.user.id().to_string();
        let mut stamped: u64 = 0;

        for entry in tracker.entries_mut() {
            if !entry.is_pending() {
                continue;
            }

            let added = entry.state() == EntityState::Added;
            let audit = entry.entity_mut().audit_mut();
            if added {
                audit.created_by = Some(user.clone());
                audit.created = Some(now);
            }
            audit.last_modified_by = Some(user.clone());
            audit.last_modified = Some(now);
            stamped += 1;
        }

        metrics::counter!("entities_audited_total").increment(stamped);
        tracing::debug!(stamped, %user, %now, "audit stamps applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Auditable, TodoEntity};
    use chrono::TimeZone;

    fn instant(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn interceptor(clock: Arc<FixedClock>, user: UserId) -> AuditableEntityInterceptor {
        AuditableEntityInterceptor::new(clock, Arc::new(user))
    }

    #[test]
    fn added_entity_gets_created_and_modified_stamps() {
        let clock = Arc::new(FixedClock::new(instant(0)));
        let user = UserId::from_uuid(uuid::Uuid::new_v4());
        let mut tracker = ChangeTracker::new();
        tracker.track_added(TodoEntity::new("a", 1, None, None));

        interceptor(clock, user).saving_changes(&mut tracker);

        let audit = tracker.entries().next().unwrap().entity().audit().clone();
        assert_eq!(audit.created, Some(instant(0)));
        assert_eq!(audit.created, audit.last_modified);
        assert_eq!(audit.created_by, Some(user.to_string()));
        assert_eq!(audit.created_by, audit.last_modified_by);
    }

    #[test]
    fn modified_entity_keeps_creation_stamp() {
        let clock = Arc::new(FixedClock::new(instant(0)));
        let creator = UserId::from_uuid(uuid::Uuid::new_v4());
        let editor = UserId::from_uuid(uuid::Uuid::new_v4());

        let mut tracker = ChangeTracker::new();
        tracker.track_added(TodoEntity::new("a", 1, None, None));
        interceptor(clock.clone(), creator).saving_changes(&mut tracker);
        tracker.accept_all_changes();

        let mut entity = tracker.entries().next().unwrap().entity().clone();
        entity.title = "b".to_string();
        tracker.mark_modified(entity);
        clock.advance(Duration::seconds(30));
        interceptor(clock, editor).saving_changes(&mut tracker);

        let audit = tracker.entries().next().unwrap().entity().audit().clone();
        assert_eq!(audit.created, Some(instant(0)));
        assert_eq!(audit.created_by, Some(creator.to_string()));
        assert_eq!(audit.last_modified, Some(instant(30)));
        assert_eq!(audit.last_modified_by, Some(editor.to_string()));
    }

    #[test]
    fn unchanged_entity_is_not_stamped() {
        let clock = Arc::new(FixedClock::new(instant(0)));
        let mut tracker = ChangeTracker::new();
        tracker.track_unchanged(TodoEntity::new("a", 1, None, None));

        interceptor(clock, UserId::anonymous()).saving_changes(&mut tracker);

        let audit = tracker.entries().next().unwrap().entity().audit().clone();
        assert!(audit.created.is_none());
        assert!(audit.last_modified.is_none());
    }

    #[test]
    fn owned_change_stamps_modification_only() {
        let clock = Arc::new(FixedClock::new(instant(5)));
        let mut tracker = ChangeTracker::new();
        let entity = tracker.track_unchanged(TodoEntity::new("a", 1, None, None));
        tracker.mark_owned_changed(entity.id());

        interceptor(clock, UserId::anonymous()).saving_changes(&mut tracker);

        let audit = tracker.entries().next().unwrap().entity().audit().clone();
        assert!(audit.created.is_none());
        assert_eq!(audit.last_modified, Some(instant(5)));
    }

    #[test]
    fn batch_shares_one_timestamp() {
        struct TickingClock(Mutex<i64>);
        impl Clock for TickingClock {
            fn now(&self) -> DateTime<Utc> {
                let mut ticks = self.0.lock().unwrap();
                *ticks += 1;
                instant(*ticks)
            }
        }

        let mut tracker = ChangeTracker::new();
        for i in 0..5 {
            tracker.track_added(TodoEntity::new(format!("item {i}"), i, None, None));
        }
        let interceptor = AuditableEntityInterceptor::new(
            Arc::new(TickingClock(Mutex::new(0))),
            Arc::new(UserId::anonymous()),
        );

        interceptor.saving_changes(&mut tracker);

        let stamps: Vec<_> = tracker
            .entries()
            .map(|e| e.entity().audit().last_modified)
            .collect();
        assert!(stamps.iter().all(|s| *s == Some(instant(1))));
    }

    #[test]
    fn anonymous_writes_use_nil_identity() {
        let clock = Arc::new(FixedClock::new(instant(0)));
        let mut tracker = ChangeTracker::new();
        tracker.track_added(TodoEntity::new("a", 1, None, None));

        interceptor(clock, UserId::anonymous()).saving_changes(&mut tracker);

        let audit = tracker.entries().next().unwrap().entity().audit().clone();
        assert_eq!(
            audit.created_by.as_deref(),
            Some("00000000-0000-0000-0000-000000000000")
        );
    }
}
