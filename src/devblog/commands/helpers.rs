use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::{CmdMessage, CmdResult, ListedPost};
use crate::error::{BlogError, Result};
use crate::feed::{Category, FeedView};
use crate::model::{Post, PostKey};

/// Fetches one post. A slug that the service does not know is retried as an
/// id, since posts without a slug are listed under their id.
pub fn fetch_post<B: BlogBackend>(backend: &B, auth: &AuthContext, key: &PostKey) -> Result<Post> {
    match key {
        PostKey::Id(id) => backend.post_by_id(id, auth.token()),
        PostKey::Slug(slug) => match backend.post_by_slug(slug) {
            Err(BlogError::PostNotFound(_)) => {
                tracing::debug!(%slug, "slug lookup missed, retrying as id");
                backend.post_by_id(slug, auth.token())
            }
            other => other,
        },
    }
}

/// Fetches a post and checks that the signed-in user wrote it.
/// `action` names the attempted operation in the refusal.
pub fn owned_post<B: BlogBackend>(
    backend: &B,
    auth: &AuthContext,
    key: &PostKey,
    action: &'static str,
) -> Result<(String, Post)> {
    let token = auth.require()?.token.clone();
    let post = fetch_post(backend, auth, key)?;
    if !auth.is_author(&post) {
        return Err(BlogError::Forbidden(action));
    }
    Ok((token, post))
}

/// Selects the category named `label`, warning when no loaded post carries it.
pub fn select_category(view: &mut FeedView, label: &str, result: &mut CmdResult) {
    let category = Category::parse(label);
    if !view.categories().contains(&category) {
        result.add_message(CmdMessage::warning(format!(
            "No posts are tagged \"{}\"",
            category
        )));
    }
    view.select_category(category);
}

pub fn listed(auth: &AuthContext, posts: Vec<Post>) -> Vec<ListedPost> {
    posts
        .into_iter()
        .map(|post| ListedPost {
            can_manage: auth.is_author(&post),
            post,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::backend::memory::fixtures::{BackendFixture, BOB, JANE};

    fn signed_in(email: &str) -> AuthContext {
        AuthContext::signed_in(Session::from_login(
            email,
            BackendFixture::token_for(email),
        ))
    }

    #[test]
    fn slug_miss_falls_back_to_id() {
        let fx = BackendFixture::new().with_posts(1);
        let mut post = fx.backend.posts()[0].clone();
        post.slug.clear();
        let mut backend = crate::backend::memory::InMemoryBackend::new();
        backend.insert_post(post);

        let found = fetch_post(
            &backend,
            &AuthContext::anonymous(),
            &PostKey::Slug("p1".into()),
        )
        .unwrap();
        assert_eq!(found.id, "p1");
    }

    #[test]
    fn owned_post_requires_session_then_authorship() {
        let fx = BackendFixture::new().with_post_by("p", "Mine", JANE);
        let key = PostKey::Id("p".into());

        let anon = owned_post(&fx.backend, &AuthContext::anonymous(), &key, "delete");
        assert!(matches!(anon, Err(BlogError::Unauthorized)));

        let other = owned_post(&fx.backend, &signed_in(BOB), &key, "delete");
        assert!(matches!(other, Err(BlogError::Forbidden("delete"))));

        let (_, post) = owned_post(&fx.backend, &signed_in(JANE), &key, "delete").unwrap();
        assert_eq!(post.title, "Mine");
    }
}
