use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::{Arc, Mutex};

/// Source of wall-clock time for the dashboard.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date in the local timezone.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. Clones share the same time, so a test can keep
/// a handle and advance the clock owned by a dashboard.
#[derive(Debug, Clone)]
pub struct FixedClock {
    inner: Arc<Mutex<(DateTime<Utc>, NaiveDate)>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new((now, now.date_naive()))),
        }
    }

    /// Move to `now`; the calendar date follows the UTC date.
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = (now, now.date_naive());
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let now = self.now() + by;
        self.set(now);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner
            .lock()
            .map(|guard| guard.0)
            .unwrap_or_else(|poisoned| poisoned.into_inner().0)
    }

    fn today(&self) -> NaiveDate {
        self.inner
            .lock()
            .map(|guard| guard.1)
            .unwrap_or_else(|poisoned| poisoned.into_inner().1)
    }
}
