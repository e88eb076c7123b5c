use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BlogError, Result};
use crate::model::{PostDraft, PostStatus};

pub fn run<B: BlogBackend>(
    backend: &mut B,
    auth: &AuthContext,
    draft: &PostDraft,
) -> Result<CmdResult> {
    let session = auth.require()?;

    let missing = draft.missing_fields();
    if !missing.is_empty() {
        return Err(BlogError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    tracing::info!(title = %draft.title, status = %draft.status, "creating post");
    backend.create_post(&session.token, draft)?;

    let mut result = CmdResult::default();
    let verb = match draft.status {
        PostStatus::Published => "published",
        PostStatus::Draft => "saved as draft",
    };
    result.add_message(CmdMessage::success(format!(
        "Post {}: {}",
        verb, draft.title
    )));
    Ok(result)
}
