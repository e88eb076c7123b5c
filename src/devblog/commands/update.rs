use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::owned_post;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BlogError, Result};
use crate::model::{PostChanges, PostDraft, PostKey};

/// Applies `changes` on top of the stored post and sends the full form.
pub fn run<B: BlogBackend>(
    backend: &mut B,
    auth: &AuthContext,
    key: &PostKey,
    changes: PostChanges,
) -> Result<CmdResult> {
    let (token, post) = owned_post(backend, auth, key, "edit")?;

    if changes.is_empty() {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info(format!(
            "Nothing to update for: {}",
            post.title
        )));
        return Ok(result);
    }

    let blanked = changes.blanked_fields();
    if !blanked.is_empty() {
        return Err(BlogError::Validation(format!(
            "Fields cannot be empty: {}",
            blanked.join(", ")
        )));
    }

    let mut draft = PostDraft::from_post(&post);
    changes.apply(&mut draft);

    tracing::info!(id = %post.id, "updating post");
    backend.update_post(&token, &post.id, &draft)?;

    // The update has landed; a failed re-read falls back to the local copy.
    let updated = match backend.post_by_id(&post.id, Some(&token)) {
        Ok(fresh) => fresh,
        Err(e) => {
            tracing::warn!(id = %post.id, error = %e, "could not reload updated post");
            let mut local = post;
            local.title = draft.title.clone();
            local.excerpt = draft.excerpt.clone();
            local.content = draft.content.clone();
            local.tags = draft.tags.clone();
            local
        }
    };

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Post updated: {}",
        updated.title
    )));
    Ok(result.with_affected_posts(vec![updated]))
}
