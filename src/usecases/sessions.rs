//! Per-user session map.
//!
//! The outer lock is held only to fetch or create an entry; each session has its own
//! mutex, so events of one user are processed one at a time and users never block each other.

use crate::domain::Session;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Arc<Mutex<Session>>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Session for `user_id`, created in `Idle` on first use.
    pub async fn session(&self, user_id: i64, now: DateTime<Utc>) -> Arc<Mutex<Session>> {
        let mut map = self.sessions.lock().await;
        Arc::clone(
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(now)))),
        )
    }
}
