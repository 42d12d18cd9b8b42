//! In-memory wizard sessions.
//!
//! Each session carries its own lock, so events on one session apply one at
//! a time while other sessions proceed. A session is closed when it is
//! removed, evicted or successfully submitted; a closed session refuses
//! further events and is never written back.

use crate::error::{Result, SurveyError};
use crate::types::Variant;
use crate::wizard::{Outcome, Step, WizardState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_IDLE: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: Mutex<WizardState>,
    closed: AtomicBool,
}

impl Session {
    fn new(id: Uuid, variant: Variant) -> Self {
        Self {
            id,
            state: Mutex::new(WizardState::new(variant)),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Lock the session's state. Blocks while an event is being applied.
    pub fn lock(&self) -> Result<MutexGuard<'_, WizardState>> {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.is_closed() {
            return Err(self.not_found());
        }
        Ok(guard)
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> Result<WizardState> {
        Ok(self.lock()?.clone())
    }

    /// Compute the next step from the current state and store it, holding
    /// the session lock throughout.
    ///
    /// A submitted step closes the session. A session closed while `step`
    /// ran keeps its last state and the call fails with `SessionNotFound`.
    pub fn apply<F>(&self, step: F) -> Result<Step>
    where
        F: FnOnce(&WizardState) -> Result<Step>,
    {
        let mut state = self.lock()?;
        let next = step(&*state)?;
        if matches!(next.outcome, Outcome::Submitted { .. }) {
            self.close();
            tracing::debug!(id = %self.id, "session submitted and closed");
            return Ok(next);
        }
        if self.is_closed() {
            return Err(self.not_found());
        }
        *state = next.state.clone();
        Ok(next)
    }

    fn not_found(&self) -> SurveyError {
        SurveyError::SessionNotFound(self.id.to_string())
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Entry {
    session: Arc<Session>,
    touched: Instant,
    /// Access order, for least-recently-used eviction.
    tick: u64,
}

/// Live sessions keyed by id. Every session of one store uses the same form
/// variant. Idle sessions are evicted whenever a new session is opened, and
/// the store never holds more than its configured maximum.
#[derive(Debug)]
pub struct SessionStore {
    variant: Variant,
    idle: Duration,
    max_sessions: usize,
    tick: u64,
    sessions: HashMap<Uuid, Entry>,
}

impl SessionStore {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            idle: DEFAULT_IDLE,
            max_sessions: DEFAULT_MAX_SESSIONS,
            tick: 0,
            sessions: HashMap::new(),
        }
    }

    pub fn with_limits(mut self, idle: Duration, max_sessions: usize) -> Self {
        self.idle = idle;
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start a fresh session.
    pub fn create(&mut self) -> Arc<Session> {
        self.open(Uuid::new_v4())
    }

    pub fn get(&mut self, id: &Uuid) -> Result<Arc<Session>> {
        let tick = self.next_tick();
        let Some(entry) = self.sessions.get_mut(id) else {
            return Err(SurveyError::SessionNotFound(id.to_string()));
        };
        if entry.session.is_closed() {
            self.sessions.remove(id);
            return Err(SurveyError::SessionNotFound(id.to_string()));
        }
        entry.touched = Instant::now();
        entry.tick = tick;
        Ok(Arc::clone(&entry.session))
    }

    /// The live session for `id`, opened on first access.
    pub fn get_or_init(&mut self, id: Uuid) -> Arc<Session> {
        match self.get(&id) {
            Ok(session) => session,
            Err(_) => self.open(id),
        }
    }

    /// Abandon a session. Events still in flight on it are discarded.
    pub fn remove(&mut self, id: &Uuid) -> Result<Arc<Session>> {
        let entry = self
            .sessions
            .remove(id)
            .ok_or_else(|| SurveyError::SessionNotFound(id.to_string()))?;
        entry.session.close();
        Ok(entry.session)
    }

    /// Drop `session` from the store if it is still the one registered
    /// under its id.
    pub fn discard(&mut self, session: &Session) {
        let id = session.id();
        let registered = self
            .sessions
            .get(&id)
            .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(&entry.session), session));
        if registered {
            self.sessions.remove(&id);
        }
    }

    /// Close and drop every session idle for at least the configured time
    /// as of `now`. Returns how many were evicted.
    pub fn evict_idle_at(&mut self, now: Instant) -> usize {
        let idle = self.idle;
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            let keep = !entry.session.is_closed()
                && now.saturating_duration_since(entry.touched) < idle;
            if !keep {
                entry.session.close();
            }
            keep
        });
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    fn open(&mut self, id: Uuid) -> Arc<Session> {
        self.evict_idle_at(Instant::now());
        while self.sessions.len() >= self.max_sessions {
            let Some(oldest) = self
                .sessions
                .iter()
                .min_by_key(|(_, entry)| entry.tick)
                .map(|(id, _)| *id)
            else {
                break;
            };
            if let Some(entry) = self.sessions.remove(&oldest) {
                entry.session.close();
                tracing::debug!(id = %oldest, "evicted least recently used session");
            }
        }

        let session = Arc::new(Session::new(id, self.variant));
        let tick = self.next_tick();
        self.sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                touched: Instant::now(),
                tick,
            },
        );
        tracing::debug!(%id, variant = %self.variant, "session opened");
        session
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldIssue;

    fn moved_to(state: &WizardState, page: usize) -> Result<Step> {
        let mut next = state.clone();
        next.current_page = page;
        Ok(Step {
            state: next,
            outcome: Outcome::Moved {
                from: state.current_page,
                to: page,
            },
        })
    }

    #[test]
    fn create_starts_on_page_one() {
        let mut store = SessionStore::new(Variant::TwoPage);
        let session = store.create();
        let state = session.snapshot().unwrap();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.variant, Variant::TwoPage);
        assert!(store.get(&session.id()).is_ok());
    }

    #[test]
    fn get_or_init_keeps_existing_state() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let id = Uuid::new_v4();
        store
            .get_or_init(id)
            .apply(|state| moved_to(state, 2))
            .unwrap();
        assert_eq!(store.get_or_init(id).snapshot().unwrap().current_page, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_session_is_not_found() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let id = Uuid::new_v4();
        assert!(matches!(store.get(&id), Err(SurveyError::SessionNotFound(_))));
        assert!(matches!(store.remove(&id), Err(SurveyError::SessionNotFound(_))));
    }

    #[test]
    fn failed_step_leaves_state_alone() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let session = store.create();
        let err = session
            .apply(|_| Err(SurveyError::NetworkFailure("offline".into())))
            .unwrap_err();
        assert!(matches!(err, SurveyError::NetworkFailure(_)));
        assert_eq!(session.snapshot().unwrap().current_page, 1);
    }

    #[test]
    fn removed_session_refuses_events() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let session = store.create();
        store.remove(&session.id()).unwrap();
        let err = session.apply(|state| moved_to(state, 2)).unwrap_err();
        assert!(matches!(err, SurveyError::SessionNotFound(_)));
        assert!(store.get(&session.id()).is_err());
    }

    #[test]
    fn removal_during_step_is_not_written_back() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let session = store.create();
        let id = session.id();
        let err = session
            .apply(|state| {
                store.remove(&id).unwrap();
                moved_to(state, 2)
            })
            .unwrap_err();
        assert!(matches!(err, SurveyError::SessionNotFound(_)));

        // The id starts over as a fresh session.
        assert_eq!(store.get_or_init(id).snapshot().unwrap().current_page, 1);
    }

    #[test]
    fn concurrent_steps_apply_in_turn() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let session = store.create();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    session
                        .apply(|state| {
                            std::thread::sleep(Duration::from_millis(5));
                            let mut next = state.clone();
                            next.form.school_info.school_name.push('x');
                            Ok(Step {
                                state: next,
                                outcome: Outcome::Updated {
                                    notices: Vec::<FieldIssue>::new(),
                                },
                            })
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(session.snapshot().unwrap().form.school_info.school_name, "xxxxxxxx");
    }

    #[test]
    fn idle_sessions_are_evicted() {
        let mut store =
            SessionStore::new(Variant::ThreePage).with_limits(Duration::from_secs(600), 10);
        let stale = store.create();
        assert_eq!(store.evict_idle_at(Instant::now()), 0);

        let evicted = store.evict_idle_at(Instant::now() + Duration::from_secs(601));
        assert_eq!(evicted, 1);
        assert!(store.is_empty());
        assert!(stale.is_closed());
        assert!(matches!(stale.snapshot(), Err(SurveyError::SessionNotFound(_))));
    }

    #[test]
    fn opening_a_session_sweeps_idle_ones() {
        let mut store = SessionStore::new(Variant::ThreePage).with_limits(Duration::ZERO, 10);
        let first = store.create();
        let second = store.get_or_init(Uuid::new_v4());
        assert_eq!(store.len(), 1);
        assert!(first.is_closed());
        assert!(!second.is_closed());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let mut store =
            SessionStore::new(Variant::ThreePage).with_limits(Duration::from_secs(600), 2);
        let a = store.create();
        let b = store.create();
        store.get(&a.id()).unwrap();

        let c = store.create();
        assert_eq!(store.len(), 2);
        assert!(b.is_closed());
        assert!(store.get(&a.id()).is_ok());
        assert!(store.get(&c.id()).is_ok());
        assert!(store.get(&b.id()).is_err());
    }

    #[test]
    fn discard_only_drops_the_same_session() {
        let mut store = SessionStore::new(Variant::ThreePage);
        let id = Uuid::new_v4();
        let old = store.get_or_init(id);
        store.remove(&id).unwrap();
        let current = store.get_or_init(id);

        store.discard(&old);
        assert_eq!(store.len(), 1);
        store.discard(&current);
        assert!(store.is_empty());
    }
}
