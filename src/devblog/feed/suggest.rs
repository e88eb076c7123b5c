use super::filter::{is_search_query, MIN_QUERY_LEN};
use crate::model::Post;
use std::time::{Duration, Instant};

pub const SUGGESTION_LIMIT: usize = 5;

/// How long the dropdown survives losing focus, so a pointer-down on an
/// entry still lands.
pub const BLUR_GRACE: Duration = Duration::from_millis(150);

/// Type-ahead entries: a prefix of the filtered results, never re-ranked.
pub fn suggestions<'a>(filtered: &[&'a Post], normalized_query: &str) -> Vec<&'a Post> {
    if !is_search_query(normalized_query) {
        return Vec::new();
    }
    filtered.iter().take(SUGGESTION_LIMIT).copied().collect()
}

/// Visibility of the suggestion dropdown.
#[derive(Debug)]
pub struct SuggestionBox {
    grace: Duration,
    visible: bool,
    hide_at: Option<Instant>,
}

impl Default for SuggestionBox {
    fn default() -> Self {
        Self::new(BLUR_GRACE)
    }
}

impl SuggestionBox {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            visible: false,
            hide_at: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn on_input(&mut self, raw: &str) {
        self.visible = raw.trim().chars().count() >= MIN_QUERY_LEN;
        self.hide_at = None;
    }

    pub fn on_focus(&mut self, normalized_query: &str) {
        if is_search_query(normalized_query) {
            self.visible = true;
            self.hide_at = None;
        }
    }

    pub fn on_blur(&mut self, now: Instant) {
        if self.visible {
            self.hide_at = Some(now + self.grace);
        }
    }

    /// Applies a pending blur-hide once its grace delay has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.hide_at.is_some_and(|at| now >= at) {
            self.visible = false;
            self.hide_at = None;
        }
    }

    /// Picks an entry. Succeeds while the dropdown is still showing, even if
    /// a blur-hide is pending; the pending hide is cancelled.
    pub fn select<'a>(&mut self, post: &'a Post, now: Instant) -> Option<&'a str> {
        self.tick(now);
        if !self.visible {
            return None;
        }
        self.visible = false;
        self.hide_at = None;
        Some(post.route_key())
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
        self.hide_at = None;
    }
}
