use std::time::{Duration, Instant};

use crate::services::reconciler::{DEFAULT_FAILURE_MESSAGE, EnrollOutcome};

/// How long a notice stays on screen after it is posted.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

pub const ALREADY_ENROLLED_NOTICE: &str = "Already enrolled in this program";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    posted_at: Instant,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>, posted_at: Instant) -> Self {
        Self {
            kind,
            text: text.into(),
            posted_at,
        }
    }

    pub fn for_outcome(outcome: &EnrollOutcome, posted_at: Instant) -> Self {
        match outcome {
            EnrollOutcome::Success(msg) => Notice::new(NoticeKind::Success, msg.clone(), posted_at),
            EnrollOutcome::AlreadyEnrolled => {
                Notice::new(NoticeKind::Info, ALREADY_ENROLLED_NOTICE, posted_at)
            }
            EnrollOutcome::ValidationError(msg) => {
                Notice::new(NoticeKind::Error, msg.clone(), posted_at)
            }
            EnrollOutcome::TransportError(msg) if msg.is_empty() => {
                Notice::new(NoticeKind::Error, DEFAULT_FAILURE_MESSAGE, posted_at)
            }
            EnrollOutcome::TransportError(msg) => {
                Notice::new(NoticeKind::Error, msg.clone(), posted_at)
            }
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.posted_at) < NOTICE_TTL
    }
}

/// Holds at most one notice; a newer one replaces it.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn post(&mut self, notice: Notice) {
        self.current = Some(notice);
    }

    /// Drops the notice once it has expired.
    pub fn visible(&mut self, now: Instant) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .is_some_and(|notice| !notice.is_visible_at(now))
        {
            self.current = None;
        }
        self.current.as_ref()
    }
}
