use super::{BlogBackend, Credentials, Registration};
use crate::auth::decode_subject;
use crate::error::{BlogError, Result};
use crate::model::{Author, AuthorProfile, MyPostsFilter, Post, PostDraft, PostStatus, Visibility};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Builds an unsigned `header.payload.signature` token carrying `sub` and,
/// optionally, `name`.
pub fn unsigned_token(subject: &str, name: Option<&str>) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let mut claims = serde_json::json!({ "sub": subject });
    if let Some(name) = name {
        claims["name"] = serde_json::Value::String(name.to_string());
    }
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.unsigned", header, payload)
}

#[derive(Debug, Clone)]
struct Account {
    full_name: String,
    password: String,
}

/// In-memory service for testing and development.
/// Does NOT persist data.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    posts: Vec<Post>,
    accounts: HashMap<String, Account>,
    chat_reply: Option<String>,
    offline: bool,
    offline_after_write: bool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn set_chat_reply(&mut self, reply: impl Into<String>) {
        self.chat_reply = Some(reply.into());
    }

    /// Makes every call fail as if the network were down.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Drops the connection right after the next successful write, so the
    /// write lands but any read that follows fails.
    pub fn set_offline_after_write(&mut self, enabled: bool) {
        self.offline_after_write = enabled;
    }

    fn wrote(&mut self) {
        if self.offline_after_write {
            self.offline = true;
        }
    }

    fn reachable(&self) -> Result<()> {
        if self.offline {
            return Err(BlogError::Api {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn caller(&self, token: &str) -> Result<String> {
        self.reachable()?;
        decode_subject(token).ok_or(BlogError::Api {
            status: 401,
            message: "Invalid token".to_string(),
        })
    }

    fn owned_index(&self, token: &str, id: &str) -> Result<usize> {
        let caller = self.caller(token)?;
        let index = self
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| BlogError::PostNotFound(id.to_string()))?;
        if self.posts[index].author_identity() != caller {
            return Err(BlogError::Api {
                status: 403,
                message: "Not authorized to modify this post".to_string(),
            });
        }
        Ok(index)
    }

    fn find(&self, matches: impl Fn(&Post) -> bool, key: &str) -> Result<Post> {
        self.reachable()?;
        self.posts
            .iter()
            .find(|p| matches(p))
            .cloned()
            .ok_or_else(|| BlogError::PostNotFound(key.to_string()))
    }
}

fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl BlogBackend for InMemoryBackend {
    fn public_posts(&self) -> Result<Vec<Post>> {
        self.reachable()?;
        Ok(self
            .posts
            .iter()
            .filter(|p| p.visibility == Visibility::Public && p.status == PostStatus::Published)
            .cloned()
            .collect())
    }

    fn post_by_id(&self, id: &str, _token: Option<&str>) -> Result<Post> {
        self.find(|p| p.id == id, id)
    }

    fn post_by_slug(&self, slug: &str) -> Result<Post> {
        self.find(|p| p.slug == slug, slug)
    }

    fn my_posts(&self, token: &str, filter: MyPostsFilter) -> Result<Vec<Post>> {
        let caller = self.caller(token)?;
        Ok(self
            .posts
            .iter()
            .filter(|p| p.author_identity() == caller)
            .filter(|p| match filter {
                MyPostsFilter::All => true,
                MyPostsFilter::Published => p.status == PostStatus::Published,
                MyPostsFilter::Draft => p.status == PostStatus::Draft,
            })
            .cloned()
            .collect())
    }

    fn create_post(&mut self, token: &str, draft: &PostDraft) -> Result<()> {
        let caller = self.caller(token)?;
        let mut post = Post::new(Uuid::new_v4().to_string(), draft.title.clone());
        post.slug = slugify(&draft.title);
        post.excerpt = draft.excerpt.clone();
        post.content = draft.content.clone();
        post.tags = draft.tags.clone();
        post.status = draft.status;
        post.created_at = Some(Utc::now());
        post.author = Some(Author::Profile(AuthorProfile {
            name: Some(draft.author_name.clone()),
            email: Some(caller),
            bio: Some(draft.author_bio.clone()),
            ..Default::default()
        }));
        self.posts.push(post);
        self.wrote();
        Ok(())
    }

    fn update_post(&mut self, token: &str, id: &str, draft: &PostDraft) -> Result<()> {
        let index = self.owned_index(token, id)?;
        let post = &mut self.posts[index];
        post.title = draft.title.clone();
        post.excerpt = draft.excerpt.clone();
        post.content = draft.content.clone();
        post.tags = draft.tags.clone();
        if let Some(Author::Profile(profile)) = &mut post.author {
            profile.name = Some(draft.author_name.clone());
            profile.bio = Some(draft.author_bio.clone());
        }
        self.wrote();
        Ok(())
    }

    fn delete_post(&mut self, token: &str, id: &str) -> Result<()> {
        let index = self.owned_index(token, id)?;
        self.posts.remove(index);
        self.wrote();
        Ok(())
    }

    fn toggle_visibility(&mut self, token: &str, id: &str) -> Result<()> {
        let index = self.owned_index(token, id)?;
        let post = &mut self.posts[index];
        post.visibility = post.visibility.toggled();
        self.wrote();
        Ok(())
    }

    fn register(&mut self, registration: &Registration) -> Result<()> {
        self.reachable()?;
        if self.accounts.contains_key(&registration.email) {
            return Err(BlogError::Api {
                status: 409,
                message: "Email already registered".to_string(),
            });
        }
        self.accounts.insert(
            registration.email.clone(),
            Account {
                full_name: registration.full_name.clone(),
                password: registration.password.clone(),
            },
        );
        Ok(())
    }

    fn login(&self, credentials: &Credentials) -> Result<String> {
        self.reachable()?;
        match self.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => Ok(unsigned_token(
                &credentials.email,
                Some(&account.full_name),
            )),
            _ => Err(BlogError::Api {
                status: 401,
                message: "Invalid email or password".to_string(),
            }),
        }
    }

    fn chat(&self, message: &str) -> Result<String> {
        self.reachable()?;
        Ok(self
            .chat_reply
            .clone()
            .unwrap_or_else(|| format!("You said: {}", message)))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub const JANE: &str = "jane@example.com";
    pub const BOB: &str = "bob@example.com";
    pub const PASSWORD: &str = "secret123";

    pub struct BackendFixture {
        pub backend: InMemoryBackend,
    }

    impl Default for BackendFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BackendFixture {
        pub fn new() -> Self {
            Self {
                backend: InMemoryBackend::new(),
            }
        }

        pub fn with_user(mut self, email: &str, full_name: &str) -> Self {
            self.backend
                .register(&Registration {
                    full_name: full_name.to_string(),
                    email: email.to_string(),
                    password: PASSWORD.to_string(),
                })
                .unwrap();
            self
        }

        /// `count` public posts titled "Test Post N", alternating `java`/`rust` tags.
        pub fn with_posts(mut self, count: usize) -> Self {
            for i in 0..count {
                let tag = if i % 2 == 0 { "java" } else { "rust" };
                let post = Post::new(format!("p{}", i + 1), format!("Test Post {}", i + 1))
                    .with_excerpt(format!("Excerpt for post {}", i + 1))
                    .with_slug(format!("test-post-{}", i + 1))
                    .with_tags(&[tag])
                    .with_author(Author::Name("Someone".into()));
                self.backend.insert_post(post);
            }
            self
        }

        pub fn with_post_by(mut self, id: &str, title: &str, email: &str) -> Self {
            let post = Post::new(id, title)
                .with_slug(slugify(title))
                .with_tags(&["java"])
                .with_author(Author::Profile(AuthorProfile {
                    name: Some("Author".into()),
                    email: Some(email.to_string()),
                    ..Default::default()
                }));
            self.backend.insert_post(post);
            self
        }

        pub fn with_private_post_by(mut self, id: &str, title: &str, email: &str) -> Self {
            self = self.with_post_by(id, title, email);
            if let Some(post) = self.backend.posts.last_mut() {
                post.visibility = Visibility::Private;
            }
            self
        }

        pub fn with_draft_by(mut self, id: &str, title: &str, email: &str) -> Self {
            self = self.with_post_by(id, title, email);
            if let Some(post) = self.backend.posts.last_mut() {
                post.status = PostStatus::Draft;
            }
            self
        }

        pub fn token_for(email: &str) -> String {
            unsigned_token(email, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn public_posts_skip_private_and_drafts() {
        let fx = BackendFixture::new()
            .with_posts(2)
            .with_private_post_by("x", "Hidden", JANE)
            .with_draft_by("y", "Draft", JANE);
        assert_eq!(fx.backend.public_posts().unwrap().len(), 2);
    }

    #[test]
    fn enforces_authorship_on_mutation() {
        let mut fx = BackendFixture::new().with_post_by("p", "Mine", JANE);
        let err = fx
            .backend
            .delete_post(&BackendFixture::token_for(BOB), "p")
            .unwrap_err();
        assert!(matches!(err, BlogError::Api { status: 403, .. }));
        fx.backend
            .delete_post(&BackendFixture::token_for(JANE), "p")
            .unwrap();
        assert!(fx.backend.posts().is_empty());
    }

    #[test]
    fn login_issues_decodable_token() {
        let fx = BackendFixture::new().with_user(JANE, "Jane Doe");
        let token = fx
            .backend
            .login(&Credentials {
                email: JANE.into(),
                password: PASSWORD.into(),
            })
            .unwrap();
        assert_eq!(decode_subject(&token).as_deref(), Some(JANE));

        let bad = fx.backend.login(&Credentials {
            email: JANE.into(),
            password: "wrong".into(),
        });
        assert!(matches!(bad, Err(BlogError::Api { status: 401, .. })));
    }

    #[test]
    fn offline_backend_fails_every_call() {
        let mut fx = BackendFixture::new().with_posts(1);
        fx.backend.set_offline(true);
        assert!(fx.backend.public_posts().is_err());
        assert!(fx.backend.chat("hi").is_err());
    }

    #[test]
    fn slugify_joins_words() {
        assert_eq!(slugify("Hello, Java World!"), "hello-java-world");
    }
}
