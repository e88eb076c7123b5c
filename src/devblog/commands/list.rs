use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::{listed, select_category};
use crate::commands::{CmdMessage, CmdResult, FeedPage};
use crate::error::Result;
use crate::feed::{FeedSettings, FeedView, LoadOutcome};

pub const EMPTY_FEED: &str = "No matching posts found.";

/// What the user asked to see: the inputs of the feed pipeline.
#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub category: Option<String>,
    pub query: Option<String>,
    /// Pages to reveal, starting at 1.
    pub page: usize,
}

pub fn run<B: BlogBackend>(
    backend: &B,
    auth: &AuthContext,
    settings: FeedSettings,
    request: &FeedRequest,
) -> Result<CmdResult> {
    let mut view = FeedView::new(settings);
    let mut result = CmdResult::default();

    let ticket = view.begin_load();
    if let LoadOutcome::Failed(reason) = view.complete_load(ticket, backend.public_posts()) {
        result.add_message(CmdMessage::error(format!(
            "Failed to load posts: {}",
            reason
        )));
        return Ok(result);
    }

    if let Some(label) = request.category.as_deref() {
        select_category(&mut view, label, &mut result);
    }
    if let Some(query) = request.query.as_deref() {
        view.apply_query(query);
    }
    view.advance_to(request.page.max(1));

    let visible = view.visible().into_iter().cloned().collect();
    result.feed = Some(FeedPage {
        heading: view.heading(),
        category: view.category().label().to_string(),
        query: view.query().to_string(),
        page: view.page(),
        total_pages: view.total_pages(),
        matches: view.filtered().len(),
        has_more: view.has_more(),
    });
    result.categories = view
        .categories()
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    result = result.with_listed_posts(listed(auth, visible));

    if result.listed_posts.is_empty() {
        result.add_message(CmdMessage::info(EMPTY_FEED));
    }
    Ok(result)
}
