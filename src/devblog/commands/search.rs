use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::{listed, select_category};
use crate::commands::list::EMPTY_FEED;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::feed::{FeedSettings, FeedView, LoadOutcome};
use std::time::Instant;

/// Type-ahead suggestions for `query`, as the search box would show them
/// once typing settles.
pub fn run<B: BlogBackend>(
    backend: &B,
    auth: &AuthContext,
    settings: FeedSettings,
    query: &str,
    category: Option<&str>,
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
    if let Some(label) = category {
        select_category(&mut view, label, &mut result);
    }

    let typed_at = Instant::now();
    view.on_input(query, typed_at);
    view.tick(typed_at + settings.quiet_window);

    if !view.is_searching() {
        result.add_message(CmdMessage::info("Type at least 2 characters to search."));
        return Ok(result);
    }

    let picks = if view.suggestions_visible() {
        view.suggestions().into_iter().cloned().collect()
    } else {
        Vec::new()
    };
    result = result.with_listed_posts(listed(auth, picks));
    if result.listed_posts.is_empty() {
        result.add_message(CmdMessage::info(EMPTY_FEED));
    }
    Ok(result)
}
