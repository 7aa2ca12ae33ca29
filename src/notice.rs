//! Transient user-visible notices (the viewer's toasts).
//!
//! Errors stay visible for five seconds, success messages for three.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const ERROR_TTL_MS: i64 = 5_000;
pub const SUCCESS_TTL_MS: i64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self::at(NoticeLevel::Error, message, Utc::now())
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::at(NoticeLevel::Success, message, Utc::now())
    }

    pub fn at(level: NoticeLevel, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let ttl = match level {
            NoticeLevel::Error => ERROR_TTL_MS,
            NoticeLevel::Success => SUCCESS_TTL_MS,
        };
        Self {
            level,
            message: message.into(),
            created_at: now,
            expires_at: now + Duration::milliseconds(ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Notices raised so far, pruned of expired ones on every push and read.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
        }
        let now = notice.created_at;
        self.notices.retain(|n| !n.is_expired(now));
        self.notices.push(notice);
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn active(&mut self, now: DateTime<Utc>) -> Vec<Notice> {
        self.notices.retain(|n| !n.is_expired(now));
        self.notices.clone()
    }

    /// Drop every notice (the toast close button).
    pub fn dismiss_all(&mut self) {
        self.notices.clear();
    }
}
