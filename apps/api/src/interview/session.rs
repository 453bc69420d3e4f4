//! Session Store — in-memory interview sessions keyed by connection (or chat interview) id.
//!
//! The store is created at server start and owned by `AppState`; nothing about it is
//! global. Callers serialize events per key, so the mutex only guards the map itself
//! and is never held across an await.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::interview::question_bank::Role;

pub type SessionKey = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingAnswer,
    /// An answer was scored and the next question is being fetched.
    AwaitingFollowUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewSession {
    pub key: SessionKey,
    pub role: Role,
    pub current_index: usize,
    pub cumulative_score: u32,
    pub answer_history: Vec<String>,
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(key: SessionKey, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            key,
            role,
            current_index: 0,
            cumulative_score: 0,
            answer_history: Vec::new(),
            phase: Phase::AwaitingAnswer,
            started_at: now,
            last_activity: now,
        }
    }

    /// The question the candidate is currently answering.
    pub fn current_question(&self) -> Option<&'static str> {
        self.role.question(self.current_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.role.question_count()
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionKey, InterviewSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, InterviewSession>> {
        // Every write is a single insert/remove, so a poisoned map is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a fresh session. Returns `None` if `key` already owns one.
    pub fn create(&self, key: SessionKey, role: Role) -> Option<InterviewSession> {
        let mut sessions = self.lock();
        if sessions.contains_key(&key) {
            return None;
        }
        let session = InterviewSession::new(key, role, Utc::now());
        sessions.insert(key, session.clone());
        Some(session)
    }

    pub fn get(&self, key: SessionKey) -> Option<InterviewSession> {
        self.lock().get(&key).cloned()
    }

    /// Replaces the state for `key` with whatever `f` returns, under one lock.
    /// `None` in or out means no session.
    pub fn update<R>(
        &self,
        key: SessionKey,
        f: impl FnOnce(Option<InterviewSession>) -> (Option<InterviewSession>, R),
    ) -> R {
        let mut sessions = self.lock();
        let (next, out) = f(sessions.remove(&key));
        if let Some(session) = next {
            sessions.insert(key, session);
        }
        out
    }

    /// Applies `f` to the session for `key`, if any.
    pub fn mutate<R>(&self, key: SessionKey, f: impl FnOnce(&mut InterviewSession) -> R) -> Option<R> {
        self.lock().get_mut(&key).map(f)
    }

    /// Removes the session for `key`. Deleting a missing key is a no-op.
    pub fn delete(&self, key: SessionKey) -> Option<InterviewSession> {
        self.lock().remove(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<InterviewSession> {
        self.lock().values().cloned().collect()
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were removed.
    pub fn purge_idle(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - ttl;
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.last_activity >= cutoff);
        before - sessions.len()
    }
}
