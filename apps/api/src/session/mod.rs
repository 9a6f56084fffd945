//! Per-user session state for the interactive flow.
//!
//! A session holds the submitted resume and JD and whatever has been computed
//! from them. Sessions live in process memory only.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::document::DocumentText;
use crate::models::feedback::{FeedbackText, MatchReport};

pub mod handlers;

pub const MISSING_RESUME_ON_SUBMIT_WARNING: &str = "⚠️ Please upload a Resume before submitting.";
pub const MISSING_JD_ON_SUBMIT_WARNING: &str =
    "⚠️ Please upload a Job Description (JD) if you want JD Matching.";
pub const MISSING_BOTH_WARNING: &str = "⚠️ Please upload both Resume and JD first.";
pub const MISSING_RESUME_WARNING: &str = "⚠️ Please upload a Resume first.";
pub const RUN_JD_MATCHING_HINT: &str =
    "⚠️ Click 'Run JD Matching' to compute the JD Matching Score.";
pub const RUN_RESUME_FEEDBACK_HINT: &str = "⚠️ Click 'Run Resume Feedback' to generate feedback.";

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resume: Option<DocumentText>,
    pub jd: Option<DocumentText>,
    pub cleaned_jd: Option<FeedbackText>,
    pub similarity_score: Option<f32>,
    pub jd_matching_feedback: Option<FeedbackText>,
    pub ats_feedback: Option<FeedbackText>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            resume: None,
            jd: None,
            cleaned_jd: None,
            similarity_score: None,
            jd_matching_feedback: None,
            ats_feedback: None,
        }
    }

    /// Stores a match run. A run that produced no score still replaces the
    /// cleaned JD and feedback, and clears the stale score.
    pub fn record_match(&mut self, report: MatchReport) {
        self.cleaned_jd = Some(report.cleaned_jd);
        self.similarity_score = report.similarity_score;
        self.jd_matching_feedback = Some(report.feedback);
    }
}

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Shared, clonable handle to all live sessions.
///
/// A session expires once it has been idle (no create or update) for the
/// store's TTL. Expired sessions read as missing and are removed lazily on
/// access, on every `create`, and by [`SessionStore::spawn_sweeper`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_SESSION_TTL_SECS as i64))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.updated_at >= self.idle_ttl
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        let mut sessions = self.inner.write().await;
        let now = session.created_at;
        sessions.retain(|_, s| !self.is_expired(s, now));
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        {
            let sessions = self.inner.read().await;
            let session = sessions.get(&id)?;
            if !self.is_expired(session, Utc::now()) {
                return Some(session.clone());
            }
        }
        self.evict_if_expired(id).await;
        None
    }

    /// Applies `f` to the session under the write lock and returns the
    /// updated snapshot. `f` must not block.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Option<Session>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.inner.write().await;
        let now = Utc::now();
        if self.is_expired(sessions.get(&id)?, now) {
            sessions.remove(&id);
            debug!("Session {id} expired");
            return None;
        }
        let session = sessions.get_mut(&id)?;
        f(session);
        session.updated_at = now;
        Some(session.clone())
    }

    /// Removes a session. Returns false if it did not exist or had expired.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id);
        matches!(removed, Some(session) if !self.is_expired(&session, Utc::now()))
    }

    /// Drops every expired session and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        before - sessions.len()
    }

    async fn evict_if_expired(&self, id: Uuid) {
        let mut sessions = self.inner.write().await;
        // Re-checked: an update may have landed between the two locks.
        if sessions
            .get(&id)
            .is_some_and(|s| self.is_expired(s, Utc::now()))
        {
            sessions.remove(&id);
            debug!("Session {id} expired");
        }
    }

    /// Purges expired sessions every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: std::time::Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    info!("Purged {purged} idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::DocumentSource;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();
        let session = store.create().await;
        let fetched = store.get(session.id).await.unwrap();
        assert_eq!(fetched.id, session.id);
        assert!(fetched.resume.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.update(Uuid::new_v4(), |_| {}).await.is_none());
    }

    #[tokio::test]
    async fn test_update_mutates_and_bumps_timestamp() {
        let store = SessionStore::new();
        let session = store.create().await;
        let updated = store
            .update(session.id, |s| {
                s.resume = Some(DocumentText::new(
                    "Rust engineer".to_string(),
                    DocumentSource::PastedText,
                ))
            })
            .await
            .unwrap();
        assert_eq!(updated.resume.unwrap().word_count, 2);
        assert!(updated.updated_at >= session.updated_at);
    }

    #[tokio::test]
    async fn test_idle_session_reads_as_missing_and_is_evicted() {
        let store = SessionStore::with_ttl(Duration::zero());
        let session = store.create().await;

        assert!(store.get(session.id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_update_of_expired_session_is_none() {
        let store = SessionStore::with_ttl(Duration::zero());
        let session = store.create().await;

        let updated = store
            .update(session.id, |s| s.similarity_score = Some(0.5))
            .await;
        assert!(updated.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_purge_drops_only_idle_sessions() {
        let store = SessionStore::with_ttl(Duration::minutes(30));
        let stale = store.create().await;
        let fresh = store.create().await;
        store
            .inner
            .write()
            .await
            .get_mut(&stale.id)
            .unwrap()
            .updated_at -= Duration::hours(1);

        assert_eq!(store.purge_expired().await, 1);
        assert!(store.get(stale.id).await.is_none());
        assert!(store.get(fresh.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_sweeps_expired_sessions() {
        let store = SessionStore::with_ttl(Duration::minutes(30));
        let stale = store.create().await;
        store
            .inner
            .write()
            .await
            .get_mut(&stale.id)
            .unwrap()
            .updated_at -= Duration::hours(1);

        let latest = store.create().await;

        assert_eq!(store.len().await, 1);
        assert!(store.get(stale.id).await.is_none());
        assert!(store.get(latest.id).await.is_some());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let store = SessionStore::new();
        let session = store.create().await;

        assert!(store.remove(session.id).await);
        assert!(!store.remove(session.id).await);
        assert!(store.get(session.id).await.is_none());
    }

    #[test]
    fn test_record_match_clears_stale_score() {
        let mut session = Session::new();
        session.similarity_score = Some(0.8);
        session.record_match(MatchReport {
            cleaned_jd: FeedbackText::Warning("too long".to_string()),
            similarity_score: None,
            feedback: FeedbackText::Warning("too long".to_string()),
        });
        assert_eq!(session.similarity_score, None);
        assert!(session.cleaned_jd.unwrap().is_warning());
    }
}
