//! Per-caller throttling for price previews.
//!
//! Previews recompute the whole cut list and rule set, and the editor fires
//! one on every change. The throttle counts requests per caller in fixed
//! one-minute windows. It lives in [`AppState`](crate::state::AppState)
//! behind an `Arc`; the mutex is held only for the map update.
//!
//! Callers pick their own key (customer id or forwarded address), so the
//! number of tracked keys is capped. When the map is full, expired windows
//! are pruned first; if it is still full, requests from untracked keys are
//! refused until windows expire.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use wardrobe_core::types::DbId;

/// Default cap on distinct callers tracked at once.
pub const DEFAULT_MAX_KEYS: usize = 10_000;

/// Who a preview is counted against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThrottleKey {
    Customer(DbId),
    Client(String),
    Anonymous,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

#[derive(Debug)]
pub struct PreviewThrottle {
    limit: u32,
    max_keys: usize,
    window: Duration,
    windows: Mutex<HashMap<ThrottleKey, Window>>,
}

impl PreviewThrottle {
    /// `limit` requests per minute per key; `0` disables throttling.
    pub fn per_minute(limit: u32) -> Self {
        Self::with_max_keys(limit, DEFAULT_MAX_KEYS)
    }

    /// As [`per_minute`](Self::per_minute), tracking at most `max_keys` callers.
    pub fn with_max_keys(limit: u32, max_keys: usize) -> Self {
        Self {
            limit,
            max_keys,
            window: Duration::minutes(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Callers currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Record a request and report whether it is within budget.
    pub fn allow(&self, key: &ThrottleKey) -> bool {
        self.allow_at(key, Utc::now())
    }

    pub fn allow_at(&self, key: &ThrottleKey, now: DateTime<Utc>) -> bool {
        if self.limit == 0 {
            return true;
        }
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !windows.contains_key(key) && windows.len() >= self.max_keys {
            let window = self.window;
            windows.retain(|_, w| now.signed_duration_since(w.started) < window);
            if windows.len() >= self.max_keys {
                tracing::warn!(
                    tracked = windows.len(),
                    max_keys = self.max_keys,
                    "Preview throttle full; refusing new caller"
                );
                return false;
            }
        }

        let entry = windows.entry(key.clone()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.signed_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }
}
