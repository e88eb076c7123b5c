use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

/// Turns raw keystroke input into a normalized search term.
///
/// Every [`input`](Debouncer::input) restarts the quiet window; the trimmed
/// input is emitted by [`poll`](Debouncer::poll) once the window elapses with
/// no further input. Time is passed in by the caller, so the owner's event
/// loop decides when to poll.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    raw: String,
    normalized: String,
    deadline: Option<Instant>,
    mounted: bool,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            raw: String::new(),
            normalized: String::new(),
            deadline: None,
            mounted: true,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// When the pending emission will fire, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn input(&mut self, raw: impl Into<String>, now: Instant) {
        if !self.mounted {
            return;
        }
        self.raw = raw.into();
        self.deadline = Some(now + self.window);
    }

    /// Emits the normalized term if the quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        match self.deadline {
            Some(deadline) if self.mounted && now >= deadline => {
                self.deadline = None;
                self.normalized = self.raw.trim().to_string();
                Some(self.normalized.as_str())
            }
            _ => None,
        }
    }

    /// Applies the current raw input immediately, dropping any pending timer.
    pub fn flush(&mut self) -> &str {
        self.deadline = None;
        self.normalized = self.raw.trim().to_string();
        &self.normalized
    }

    /// Tears the timer down; nothing is emitted afterwards.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.deadline = None;
    }
}
