use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::owned_post;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{PostKey, Visibility};

/// Label of the control that flips `current`.
pub fn toggle_label(current: Visibility) -> &'static str {
    match current {
        Visibility::Public => "Make Private",
        Visibility::Private => "Make Public",
    }
}

pub fn run<B: BlogBackend>(
    backend: &mut B,
    auth: &AuthContext,
    key: &PostKey,
) -> Result<CmdResult> {
    let (token, post) = owned_post(backend, auth, key, "change the visibility of")?;

    backend.toggle_visibility(&token, &post.id)?;

    // The toggle has landed; a failed re-read falls back to the flipped local copy.
    let updated = match backend.post_by_id(&post.id, Some(&token)) {
        Ok(fresh) => fresh,
        Err(e) => {
            tracing::warn!(id = %post.id, error = %e, "could not reload toggled post");
            let mut local = post;
            local.visibility = local.visibility.toggled();
            local
        }
    };
    tracing::info!(id = %updated.id, visibility = %updated.visibility, "visibility toggled");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{} is now {}",
        updated.title, updated.visibility
    )));
    Ok(result.with_affected_posts(vec![updated]))
}
