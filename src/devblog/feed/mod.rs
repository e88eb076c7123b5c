//! # Feed Pipeline
//!
//! The post feed is derived, never stored: every read recomputes it from
//! three inputs.
//!
//! ```text
//!  PostStore ──────────┐
//!  Category ───────────┼──► filter_posts ──► Paginator ──► visible posts
//!  Debouncer (query) ──┘          │
//!                                 └────────► suggestions (first 5)
//! ```
//!
//! - [`store::PostStore`] holds the full list and decides which load is
//!   authoritative.
//! - [`debounce::Debouncer`] turns raw keystrokes into the normalized query.
//! - [`filter`] applies category then search. Order is preserved.
//! - [`paginate::Paginator`] reveals a growing prefix, reset on category change.
//! - [`suggest`] takes a prefix of the filtered list for type-ahead.
//!
//! [`FeedView`] owns all of it for one mounted view. Recomputation is
//! synchronous and cheap; nothing is cached, so the pipeline can never show
//! a result that disagrees with its inputs.

use crate::config::BlogConfig;
use crate::error::BlogError;
use crate::model::Post;
use std::time::{Duration, Instant};

pub mod debounce;
pub mod filter;
pub mod highlight;
pub mod paginate;
pub mod store;
pub mod suggest;

pub use filter::Category;
pub use store::{LoadOutcome, LoadTicket};

use debounce::Debouncer;
use paginate::Paginator;
use store::PostStore;
use suggest::SuggestionBox;

pub const LATEST_HEADING: &str = "Latest Posts";
pub const SEARCH_HEADING: &str = "Search Results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_size: usize,
    pub quiet_window: Duration,
    pub blur_grace: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            quiet_window: debounce::DEFAULT_QUIET_WINDOW,
            blur_grace: suggest::BLUR_GRACE,
        }
    }
}

impl From<&BlogConfig> for FeedSettings {
    fn from(config: &BlogConfig) -> Self {
        Self {
            page_size: config.page_size,
            quiet_window: config.debounce(),
            ..Self::default()
        }
    }
}

/// State of one mounted feed view.
#[derive(Debug)]
pub struct FeedView {
    store: PostStore,
    query: Debouncer,
    category: Category,
    paginator: Paginator,
    dropdown: SuggestionBox,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new(FeedSettings::default())
    }
}

impl FeedView {
    pub fn new(settings: FeedSettings) -> Self {
        Self {
            store: PostStore::new(),
            query: Debouncer::new(settings.quiet_window),
            category: Category::All,
            paginator: Paginator::new(settings.page_size),
            dropdown: SuggestionBox::new(settings.blur_grace),
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.store.begin_load()
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<Post>, BlogError>,
    ) -> LoadOutcome {
        self.store.complete_load(ticket, result)
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn posts(&self) -> &[Post] {
        self.store.posts()
    }

    pub fn on_input(&mut self, raw: &str, now: Instant) {
        self.query.input(raw, now);
        self.dropdown.on_input(raw);
    }

    pub fn on_focus(&mut self) {
        self.dropdown.on_focus(self.query.normalized());
    }

    pub fn on_blur(&mut self, now: Instant) {
        self.dropdown.on_blur(now);
    }

    /// Advances timers. Returns true when a new normalized query was applied.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.dropdown.tick(now);
        self.query.poll(now).is_some()
    }

    /// Sets the query without waiting for the quiet window.
    pub fn apply_query(&mut self, raw: &str) {
        self.query.input(raw, Instant::now());
        self.query.flush();
    }

    pub fn query(&self) -> &str {
        self.query.normalized()
    }

    pub fn raw_query(&self) -> &str {
        self.query.raw()
    }

    pub fn is_searching(&self) -> bool {
        filter::is_search_query(self.query.normalized())
    }

    pub fn heading(&self) -> &'static str {
        if self.is_searching() {
            SEARCH_HEADING
        } else {
            LATEST_HEADING
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn categories(&self) -> Vec<Category> {
        filter::categories(self.store.posts())
    }

    /// Switching category always starts again from the first page.
    pub fn select_category(&mut self, category: Category) {
        self.category = category;
        self.paginator.reset();
    }

    pub fn filtered(&self) -> Vec<&Post> {
        filter::filter_posts(self.store.posts(), &self.category, self.query.normalized())
    }

    pub fn page(&self) -> usize {
        self.paginator.page()
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages(self.filtered().len())
    }

    pub fn visible(&self) -> Vec<&Post> {
        let filtered = self.filtered();
        self.paginator.visible(&filtered).to_vec()
    }

    pub fn has_more(&self) -> bool {
        self.paginator.has_more(self.filtered().len())
    }

    pub fn on_sentinel_visible(&mut self) -> bool {
        let count = self.filtered().len();
        self.paginator.on_sentinel_visible(count)
    }

    pub fn advance_to(&mut self, page: usize) {
        let count = self.filtered().len();
        self.paginator.advance_to(page, count);
    }

    pub fn suggestions(&self) -> Vec<&Post> {
        suggest::suggestions(&self.filtered(), self.query.normalized())
    }

    pub fn suggestions_visible(&self) -> bool {
        self.dropdown.is_visible() && !self.suggestions().is_empty()
    }

    /// Picks the `index`-th suggestion, returning the route key to open.
    pub fn select_suggestion(&mut self, index: usize, now: Instant) -> Option<String> {
        let target = self.suggestions().get(index).map(|p| (*p).clone())?;
        self.dropdown
            .select(&target, now)
            .map(str::to_string)
    }

    pub fn unmount(&mut self) {
        self.query.unmount();
        self.dropdown.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with(count: usize) -> FeedView {
        let mut view = FeedView::default();
        let posts = (0..count)
            .map(|i| {
                let tags: &[&str] = if i % 2 == 0 { &["java"] } else { &["rust"] };
                Post::new(i.to_string(), format!("Post number {}", i)).with_tags(tags)
            })
            .collect();
        let ticket = view.begin_load();
        view.complete_load(ticket, Ok(posts));
        view
    }

    #[test]
    fn fourteen_posts_three_pages() {
        let mut view = feed_with(14);
        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.visible().len(), 6);
        assert!(view.on_sentinel_visible());
        assert_eq!(view.visible().len(), 12);
        assert!(view.on_sentinel_visible());
        assert_eq!(view.visible().len(), 14);
        assert!(!view.has_more());
        assert!(!view.on_sentinel_visible());
        assert_eq!(view.page(), 3);
    }

    #[test]
    fn category_change_resets_page() {
        let mut view = feed_with(30);
        view.advance_to(3);
        assert_eq!(view.page(), 3);
        view.select_category(Category::Tag("java".into()));
        assert_eq!(view.page(), 1);
        assert_eq!(view.visible().len(), 6);
        assert!(view.visible().iter().all(|p| p.has_tag("java")));
    }

    #[test]
    fn heading_follows_query() {
        let mut view = feed_with(3);
        assert_eq!(view.heading(), LATEST_HEADING);
        view.apply_query("n");
        assert_eq!(view.heading(), LATEST_HEADING);
        view.apply_query(" number 1 ");
        assert_eq!(view.query(), "number 1");
        assert_eq!(view.heading(), SEARCH_HEADING);
    }

    #[test]
    fn suggestions_are_prefix_of_results() {
        let mut view = feed_with(20);
        view.apply_query("post");
        let results: Vec<String> = view.filtered().iter().map(|p| p.id.clone()).collect();
        let picks: Vec<String> = view.suggestions().iter().map(|p| p.id.clone()).collect();
        assert_eq!(picks.len(), 5);
        assert_eq!(&results[..5], &picks[..]);
    }

    #[test]
    fn debounced_input_drives_results() {
        let t0 = Instant::now();
        let mut view = feed_with(12);
        view.on_input("number 11", t0);
        assert!(!view.tick(t0 + Duration::from_millis(100)));
        assert_eq!(view.filtered().len(), 12);
        assert!(view.tick(t0 + Duration::from_millis(300)));
        assert_eq!(view.filtered().len(), 1);
        assert!(view.suggestions_visible());
    }

    #[test]
    fn selecting_suggestion_returns_route_key() {
        let t0 = Instant::now();
        let mut view = feed_with(3);
        view.on_input("number 2", t0);
        view.tick(t0 + Duration::from_millis(300));
        view.on_blur(t0 + Duration::from_millis(310));
        let key = view.select_suggestion(0, t0 + Duration::from_millis(320));
        assert_eq!(key.as_deref(), Some("2"));
        assert!(!view.suggestions_visible());
    }

    #[test]
    fn empty_store_has_zero_pages() {
        let view = FeedView::default();
        assert_eq!(view.total_pages(), 0);
        assert!(view.visible().is_empty());
        assert!(!view.has_more());
    }

    #[test]
    fn unmount_stops_query_updates() {
        let t0 = Instant::now();
        let mut view = feed_with(3);
        view.on_input("number 1", t0);
        view.unmount();
        assert!(!view.tick(t0 + Duration::from_secs(1)));
        assert_eq!(view.query(), "");
    }
}
