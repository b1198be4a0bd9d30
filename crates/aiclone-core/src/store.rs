//! The session store: single source of truth for who is logged in.
//!
//! Every mutation applies a [`UserState`] transition, writes the result
//! through the [`Persister`], then publishes the new snapshot on a watch
//! channel. All three steps finish before the mutating call returns, so a
//! restart straight after a mutation observes the post-mutation value and
//! observers never see two mutations interleaved.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::persist::{FileStorage, MemoryStorage, Persister};
use crate::session::Session;
use crate::state::UserState;

pub struct SessionStore {
    persister: Persister,
    tx: watch::Sender<UserState>,
    /// Set when the last save failed; the next mutation saves even if it
    /// changes nothing, so storage catches up with memory.
    dirty: AtomicBool,
}

impl SessionStore {
    /// Build a store, restoring whatever the persister has on record.
    pub fn open(persister: Persister) -> Self {
        let state = persister.load();
        info!(
            key = persister.key(),
            logged_in = state.user.is_some(),
            "Session store opened"
        );
        let (tx, _rx) = watch::channel(state);
        Self {
            persister,
            tx,
            dirty: AtomicBool::new(false),
        }
    }

    /// Store backed by `<dir>/user-storage.json`.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Self {
        Self::open(Persister::new(FileStorage::new(dir)))
    }

    /// Store backed by a fresh in-process map.
    pub fn in_memory() -> Self {
        Self::open(Persister::new(MemoryStorage::new()))
    }

    /// The live session, if any.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().user.is_some()
    }

    /// Replace the stored session unconditionally.
    pub fn set_session(&self, session: Session) {
        info!(user_id = %session.id, plan = %session.plan, "Session set");
        self.mutate(|state| {
            state.set_session(session);
            true
        });
    }

    /// Replace the credit balance of the active session. Logged out: no-op.
    pub fn update_credits(&self, credits: u64) {
        let updated = self.mutate(|state| state.update_credits(credits));
        if !updated {
            debug!(credits, "Ignoring credit update without an active session");
        }
    }

    /// Clear the session. Safe to call when already logged out.
    pub fn logout(&self) {
        if self.mutate(|state| state.logout()) {
            info!("Logged out");
        }
    }

    /// Watch the full state. The handle starts with the current value marked seen.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Watch a derived value, e.g. just the credit count.
    pub fn select<T, F>(&self, project: F) -> Projection<T>
    where
        T: Clone + PartialEq,
        F: Fn(Option<&Session>) -> T + Send + Sync + 'static,
    {
        let rx = self.tx.subscribe();
        let last = project(rx.borrow().user.as_ref());
        Projection {
            rx,
            project: Box::new(project),
            last,
        }
    }

    /// Apply a transition and notify only when it changed something. Persists
    /// on change, or when an earlier save is still outstanding.
    fn mutate(&self, transition: impl FnOnce(&mut UserState) -> bool) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = transition(state);
            if changed || self.dirty.load(Ordering::Acquire) {
                self.persist(state);
            }
            changed
        })
    }

    fn persist(&self, state: &UserState) {
        match self.persister.save(state) {
            Ok(()) => self.dirty.store(false, Ordering::Release),
            Err(e) => {
                warn!(error = %e, "Failed to persist session state");
                self.dirty.store(true, Ordering::Release);
            }
        }
    }
}

// ============================================================================
// Observers
// ============================================================================

/// A view's handle on the full session snapshot.
#[derive(Clone)]
pub struct Subscription {
    rx: watch::Receiver<UserState>,
}

impl Subscription {
    pub fn current(&self) -> Option<Session> {
        self.rx.borrow().user.clone()
    }

    /// True once for each batch of mutations since the last call.
    pub fn changed(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            // Ok(false), or the store has been dropped
            _ => false,
        }
    }
}

/// A read-only projection of the session that only reports real changes.
pub struct Projection<T> {
    rx: watch::Receiver<UserState>,
    project: Box<dyn Fn(Option<&Session>) -> T + Send + Sync>,
    last: T,
}

impl<T: Clone + PartialEq> Projection<T> {
    /// The value last handed out.
    pub fn get(&self) -> &T {
        &self.last
    }

    /// `Some(new)` if the store changed and the projected value differs.
    pub fn changed(&mut self) -> Option<T> {
        if !matches!(self.rx.has_changed(), Ok(true)) {
            return None;
        }
        let next = (self.project)(self.rx.borrow_and_update().user.as_ref());
        if next == self.last {
            return None;
        }
        self.last = next.clone();
        Some(next)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::persist::{StateStorage, StorageError, STORAGE_KEY};
    use crate::session::Plan;

    /// Memory storage that can be told to fail its next write.
    #[derive(Clone, Default)]
    struct FailingStorage {
        inner: MemoryStorage,
        fail_next: Arc<AtomicBool>,
    }

    impl StateStorage for FailingStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Io {
                    path: PathBuf::from(key),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.write(key, value)
        }
    }

    fn ann() -> Session {
        Session::new("u1", "a@b.com", Plan::Free)
            .with_name("Ann")
            .with_credits(100)
    }

    #[test]
    fn test_subscription_sees_each_mutation_once() {
        let store = SessionStore::in_memory();
        let mut sub = store.subscribe();
        assert!(!sub.changed());

        store.set_session(ann());
        assert!(sub.changed());
        assert!(!sub.changed());
        assert_eq!(sub.current(), Some(ann()));
    }

    #[test]
    fn test_noop_mutations_do_not_notify() {
        let store = SessionStore::in_memory();
        let mut sub = store.subscribe();
        store.update_credits(5);
        store.logout();
        assert!(!sub.changed());
    }

    #[test]
    fn test_projection_ignores_unrelated_changes() {
        let store = SessionStore::in_memory();
        store.set_session(ann());
        let mut credits = store.select(|user| user.map(|u| u.credits));
        assert_eq!(credits.get(), &Some(100));

        // Same balance, different name
        store.set_session(ann().with_name("Annie"));
        assert_eq!(credits.changed(), None);

        store.update_credits(7);
        assert_eq!(credits.changed(), Some(Some(7)));
        assert_eq!(credits.changed(), None);

        store.logout();
        assert_eq!(credits.changed(), Some(None));
    }

    #[test]
    fn test_mutation_persists_before_return() {
        let storage = MemoryStorage::new();
        let store = SessionStore::open(Persister::new(storage.clone()));
        store.set_session(ann());

        let raw = storage.get_raw(STORAGE_KEY).unwrap();
        assert_eq!(crate::persist::decode(&raw).unwrap().user, Some(ann()));

        store.logout();
        let raw = storage.get_raw(STORAGE_KEY).unwrap();
        assert_eq!(crate::persist::decode(&raw).unwrap().user, None);
    }

    #[test]
    fn test_failed_logout_write_is_retried() {
        let storage = FailingStorage::default();
        let store = SessionStore::open(Persister::new(storage.clone()));
        store.set_session(ann());

        storage.fail_next.store(true, Ordering::SeqCst);
        store.logout();
        assert_eq!(store.current(), None);

        // Second logout changes nothing in memory but flushes the record
        store.logout();
        let restarted = SessionStore::open(Persister::new(storage));
        assert_eq!(restarted.current(), None);
    }

    #[test]
    fn test_failed_write_is_flushed_by_next_noop_mutation() {
        let storage = FailingStorage::default();
        let store = SessionStore::open(Persister::new(storage.clone()));
        store.set_session(ann());

        storage.fail_next.store(true, Ordering::SeqCst);
        store.logout();

        // No session, so nothing changes and observers stay quiet,
        // but the outstanding write goes through
        let mut sub = store.subscribe();
        store.update_credits(5);
        assert!(!sub.changed());

        let restarted = SessionStore::open(Persister::new(storage));
        assert_eq!(restarted.current(), None);
    }
}
