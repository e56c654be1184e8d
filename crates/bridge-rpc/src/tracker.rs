//! Session tracker — couples one request's lifecycle to store mutations.
//!
//! The tracker is request-scoped. `preflight` activates the caller's
//! session before the reviewer runs; `record_success`/`record_failure`
//! settle it afterwards. Storage failures are logged and swallowed at every
//! step — persistence must never turn a successful review into a failure.
//!
//! Completion is always recorded against the preflight id when one exists,
//! even when the reviewer came back with a different thread id: the
//! caller's observable session is the one they asked to resume, so that is
//! the row whose status flips.
//!
//! Dropping a tracker that preflighted but never settled marks the session
//! failed best-effort. That is the unwind-safe rendition of an outermost
//! catch clause: a panic between preflight and settlement still leaves the
//! persisted state honest.

use bridge_store::{NewReview, Store};
use tracing::warn;

/// Request-scoped store coordinator.
pub struct SessionTracker {
    store: Option<Store>,
    preflight_id: Option<String>,
    settled: bool,
}

impl SessionTracker {
    /// A tracker over `store`; `None` yields a no-op tracker.
    #[must_use]
    pub fn new(store: Option<Store>) -> Self {
        Self {
            store,
            preflight_id: None,
            settled: false,
        }
    }

    /// Activate the caller-supplied session, if any, and remember it.
    ///
    /// An activation failure is logged but leaves the preflight id unset,
    /// so a later `record_failure` will not thrash a row this request
    /// never owned.
    pub fn preflight(&mut self, session_id: Option<&str>) {
        let (Some(store), Some(id)) = (&self.store, session_id) else {
            return;
        };
        match store.sessions.activate(id) {
            Ok(_) => self.preflight_id = Some(id.to_owned()),
            Err(err) => warn!(session_id = id, %err, "session preflight failed"),
        }
    }

    /// Record a successful review: ensure the session row exists, append
    /// the log entry, and mark the session completed.
    pub fn record_success(&mut self, result_session_id: &str, entry: NewReview) {
        self.settled = true;
        let Some(store) = &self.store else {
            return;
        };

        if self.preflight_id.is_none() {
            if let Err(err) = store.sessions.get_or_create(result_session_id) {
                warn!(session_id = result_session_id, %err, "session row creation failed");
            }
        }
        if let Err(err) = store.reviews.save(&entry) {
            warn!(session_id = result_session_id, %err, "review log append failed");
        }

        let completion_id = self.preflight_id.as_deref().unwrap_or(result_session_id);
        if let Err(err) = store.sessions.mark_completed(completion_id) {
            warn!(session_id = completion_id, %err, "session completion failed");
        }
    }

    /// Record a failed review against the preflighted session, if any.
    pub fn record_failure(&mut self) {
        self.settled = true;
        let (Some(store), Some(id)) = (&self.store, self.preflight_id.as_deref()) else {
            return;
        };
        if let Err(err) = store.sessions.mark_failed(id) {
            warn!(session_id = id, %err, "session failure marking failed");
        }
    }

    /// As [`record_failure`](Self::record_failure), swallowing everything.
    /// Used where the request state is unknown (outermost cleanup).
    pub fn record_failure_best_effort(&mut self) {
        self.record_failure();
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        if !self.settled && self.preflight_id.is_some() {
            self.record_failure_best_effort();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::types::ReviewKind;
    use bridge_store::{SessionStatus, MEMORY_PATH};

    fn store() -> Store {
        Store::open(MEMORY_PATH).unwrap()
    }

    fn entry(session: &str) -> NewReview {
        NewReview {
            session_id: session.to_owned(),
            kind: ReviewKind::Plan,
            verdict: "approve".to_owned(),
            summary: "ok".to_owned(),
            findings_json: "[]".to_owned(),
        }
    }

    #[test]
    fn no_store_is_a_noop() {
        let mut tracker = SessionTracker::new(None);
        tracker.preflight(Some("s1"));
        tracker.record_success("s1", entry("s1"));
        tracker.record_failure();
    }

    #[test]
    fn preflight_activates_session() {
        let store = store();
        let mut tracker = SessionTracker::new(Some(store.clone()));
        tracker.preflight(Some("s1"));
        let info = store.sessions.lookup("s1").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::InProgress);
        tracker.record_success("s1", entry("s1"));
    }

    #[test]
    fn preflight_without_session_id_does_nothing() {
        let store = store();
        let mut tracker = SessionTracker::new(Some(store.clone()));
        tracker.preflight(None);
        tracker.record_failure();
        // no row was ever created, and failure had nothing to mark
        assert!(store.sessions.lookup("s1").unwrap().is_none());
    }

    #[test]
    fn success_without_preflight_creates_and_completes_result_session() {
        let store = store();
        let mut tracker = SessionTracker::new(Some(store.clone()));
        tracker.preflight(None);
        tracker.record_success("thread_abc", entry("thread_abc"));

        let info = store.sessions.lookup("thread_abc").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Completed);
        assert_eq!(store.reviews.by_session("thread_abc").unwrap().len(), 1);
    }

    #[test]
    fn completion_lands_on_preflight_id_even_when_result_differs() {
        let store = store();
        let mut tracker = SessionTracker::new(Some(store.clone()));
        tracker.preflight(Some("caller_session"));
        tracker.record_success("different_thread", entry("different_thread"));

        let caller = store.sessions.lookup("caller_session").unwrap().unwrap();
        assert_eq!(caller.status, SessionStatus::Completed);
        // the reviewer's new thread id never got a completion
        let other = store.sessions.lookup("different_thread").unwrap();
        assert!(other.is_none() || other.unwrap().status == SessionStatus::InProgress);
    }

    #[test]
    fn failure_marks_preflighted_session() {
        let store = store();
        let mut tracker = SessionTracker::new(Some(store.clone()));
        tracker.preflight(Some("s1"));
        tracker.record_failure();
        let info = store.sessions.lookup("s1").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Failed);
    }

    #[test]
    fn failure_without_preflight_marks_nothing() {
        let store = store();
        let mut tracker = SessionTracker::new(Some(store.clone()));
        tracker.record_failure();
        assert!(store.sessions.lookup("s1").unwrap().is_none());
    }

    #[test]
    fn drop_after_preflight_marks_failed() {
        let store = store();
        {
            let mut tracker = SessionTracker::new(Some(store.clone()));
            tracker.preflight(Some("s1"));
            // dropped without settling (the panic/unwind path)
        }
        let info = store.sessions.lookup("s1").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Failed);
    }

    #[test]
    fn drop_after_success_does_not_mark_failed() {
        let store = store();
        {
            let mut tracker = SessionTracker::new(Some(store.clone()));
            tracker.preflight(Some("s1"));
            tracker.record_success("s1", entry("s1"));
        }
        let info = store.sessions.lookup("s1").unwrap().unwrap();
        assert_eq!(info.status, SessionStatus::Completed);
    }

    #[test]
    fn resume_flow_reactivates_then_completes() {
        let store = store();
        // first request completes session X
        let mut t1 = SessionTracker::new(Some(store.clone()));
        t1.preflight(None);
        t1.record_success("x", entry("x"));
        assert_eq!(
            store.sessions.lookup("x").unwrap().unwrap().status,
            SessionStatus::Completed
        );

        // second request resumes X: preflight flips it back to in_progress
        let mut t2 = SessionTracker::new(Some(store.clone()));
        t2.preflight(Some("x"));
        assert_eq!(
            store.sessions.lookup("x").unwrap().unwrap().status,
            SessionStatus::InProgress
        );
        t2.record_success("x", entry("x"));
        assert_eq!(
            store.sessions.lookup("x").unwrap().unwrap().status,
            SessionStatus::Completed
        );
        assert_eq!(store.reviews.by_session("x").unwrap().len(), 2);
    }
}
