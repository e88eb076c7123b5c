use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::owned_post;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::PostKey;

pub fn run<B: BlogBackend>(
    backend: &mut B,
    auth: &AuthContext,
    key: &PostKey,
) -> Result<CmdResult> {
    let (token, post) = owned_post(backend, auth, key, "delete")?;

    tracing::info!(id = %post.id, "deleting post");
    backend.delete_post(&token, &post.id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Post deleted: {}",
        post.title
    )));
    Ok(result.with_affected_posts(vec![post]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::backend::memory::fixtures::{BackendFixture, BOB, JANE};
    use crate::error::BlogError;

    fn auth(email: &str) -> AuthContext {
        AuthContext::signed_in(Session::from_login(email, BackendFixture::token_for(email)))
    }

    #[test]
    fn author_deletes_by_slug() {
        let mut fx = BackendFixture::new()
            .with_posts(1)
            .with_post_by("p", "Hello Spring", JANE);
        let result = run(
            &mut fx.backend,
            &auth(JANE),
            &PostKey::Slug("hello-spring".into()),
        )
        .unwrap();
        assert_eq!(result.affected_posts[0].id, "p");
        assert_eq!(fx.backend.posts().len(), 1);
    }

    #[test]
    fn others_cannot_delete() {
        let mut fx = BackendFixture::new().with_post_by("p", "Hello", JANE);
        let err = run(&mut fx.backend, &auth(BOB), &PostKey::Id("p".into())).unwrap_err();
        assert!(matches!(err, BlogError::Forbidden("delete")));
        assert_eq!(fx.backend.posts().len(), 1);
    }

    #[test]
    fn anonymous_cannot_delete() {
        let mut fx = BackendFixture::new().with_post_by("p", "Hello", JANE);
        let err = run(
            &mut fx.backend,
            &AuthContext::anonymous(),
            &PostKey::Id("p".into()),
        )
        .unwrap_err();
        assert!(matches!(err, BlogError::Unauthorized));
    }
}
