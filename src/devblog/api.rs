//! # API Facade
//!
//! A **thin facade** over the command layer and the single entry point for
//! every devblog operation, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the matching command function
//! - **Normalizes inputs** (post keys, feed settings from config)
//! - **Carries the auth context**, so commands receive the session explicitly
//!
//! It does no printing and holds no business logic.
//!
//! ## Generic Over BlogBackend
//!
//! `BlogApi<B: BlogBackend>` runs against `HttpBackend` in production and
//! `InMemoryBackend` in tests.

use crate::auth::{AuthContext, Session};
use crate::backend::BlogBackend;
use crate::commands;
use crate::config::BlogConfig;
use crate::error::Result;
use crate::feed::FeedSettings;
use crate::model::{MyPostsFilter, PostChanges, PostDraft, PostKey};

/// Prefix that forces a key to be read as a post id.
pub const ID_PREFIX: &str = "id:";

pub struct BlogApi<B: BlogBackend> {
    backend: B,
    paths: commands::BlogPaths,
    config: BlogConfig,
    auth: AuthContext,
}

impl<B: BlogBackend> BlogApi<B> {
    pub fn new(backend: B, paths: commands::BlogPaths, config: BlogConfig, auth: AuthContext) -> Self {
        Self {
            backend,
            paths,
            config,
            auth,
        }
    }

    pub fn list_posts(&self, request: &commands::list::FeedRequest) -> Result<commands::CmdResult> {
        commands::list::run(&self.backend, &self.auth, self.feed_settings(), request)
    }

    pub fn suggest(&self, query: &str, category: Option<&str>) -> Result<commands::CmdResult> {
        commands::search::run(
            &self.backend,
            &self.auth,
            self.feed_settings(),
            query,
            category,
        )
    }

    pub fn categories(&self) -> Result<commands::CmdResult> {
        commands::tags::run(&self.backend)
    }

    pub fn view_post(&self, key: &str) -> Result<commands::CmdResult> {
        commands::view::run(&self.backend, &self.auth, &parse_key(key))
    }

    pub fn my_posts(&self, filter: MyPostsFilter) -> Result<commands::CmdResult> {
        commands::mine::run(&self.backend, &self.auth, filter)
    }

    pub fn create_post(&mut self, draft: &PostDraft) -> Result<commands::CmdResult> {
        commands::create::run(&mut self.backend, &self.auth, draft)
    }

    pub fn update_post(&mut self, key: &str, changes: PostChanges) -> Result<commands::CmdResult> {
        commands::update::run(&mut self.backend, &self.auth, &parse_key(key), changes)
    }

    pub fn delete_post(&mut self, key: &str) -> Result<commands::CmdResult> {
        commands::delete::run(&mut self.backend, &self.auth, &parse_key(key))
    }

    pub fn toggle_visibility(&mut self, key: &str) -> Result<commands::CmdResult> {
        commands::visibility::run(&mut self.backend, &self.auth, &parse_key(key))
    }

    pub fn register(&mut self, form: &commands::account::SignUp) -> Result<commands::CmdResult> {
        commands::account::register(&mut self.backend, form)
    }

    /// Logs in and switches this API instance to the new session.
    pub fn login(&mut self, email: &str, password: &str) -> Result<commands::CmdResult> {
        let result = commands::account::login(&self.backend, &self.paths, email, password)?;
        if let Some(session) = &result.session {
            self.auth = AuthContext::signed_in(session.clone());
        }
        Ok(result)
    }

    pub fn logout(&mut self) -> Result<commands::CmdResult> {
        let result = commands::account::logout(&self.paths)?;
        self.auth = AuthContext::anonymous();
        Ok(result)
    }

    pub fn whoami(&self) -> Result<commands::CmdResult> {
        commands::account::whoami(&self.auth)
    }

    pub fn chat(&self, message: &str) -> Result<commands::CmdResult> {
        commands::chat::run(&self.backend, message)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn session(&self) -> Option<&Session> {
        self.auth.session()
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn paths(&self) -> &commands::BlogPaths {
        &self.paths
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings::from(&self.config)
    }
}

/// `id:<id>` addresses a post by id; anything else is a slug.
fn parse_key(input: &str) -> PostKey {
    let input = input.trim();
    match input.strip_prefix(ID_PREFIX) {
        Some(id) => PostKey::Id(id.trim().to_string()),
        None => PostKey::Slug(input.to_string()),
    }
}

pub use crate::commands::account::SignUp;
pub use crate::commands::config::ConfigAction;
pub use crate::commands::list::FeedRequest;
pub use crate::commands::{BlogPaths, CmdMessage, CmdResult, FeedPage, ListedPost, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::fixtures::{BackendFixture, JANE, PASSWORD};
    use crate::backend::memory::InMemoryBackend;
    use tempfile::{tempdir, TempDir};

    fn api_with(backend: InMemoryBackend) -> (TempDir, BlogApi<InMemoryBackend>) {
        let dir = tempdir().unwrap();
        let api = BlogApi::new(
            backend,
            BlogPaths::new(dir.path()),
            BlogConfig::default(),
            AuthContext::anonymous(),
        );
        (dir, api)
    }

    #[test]
    fn parses_keys() {
        assert_eq!(parse_key("hello-world"), PostKey::Slug("hello-world".into()));
        assert_eq!(parse_key("id:abc123"), PostKey::Id("abc123".into()));
        assert_eq!(parse_key(" id: abc "), PostKey::Id("abc".into()));
    }

    #[test]
    fn feed_settings_follow_config() {
        let dir = tempdir().unwrap();
        let config = BlogConfig {
            page_size: 2,
            ..BlogConfig::default()
        };
        let api = BlogApi::new(
            BackendFixture::new().with_posts(5).backend,
            BlogPaths::new(dir.path()),
            config,
            AuthContext::anonymous(),
        );
        let result = api.list_posts(&FeedRequest::default()).unwrap();
        assert_eq!(result.listed_posts.len(), 2);
        assert_eq!(result.feed.unwrap().total_pages, 3);
    }

    #[test]
    fn login_switches_auth_and_logout_clears_it() {
        let fx = BackendFixture::new()
            .with_user(JANE, "Jane Doe")
            .with_post_by("p", "Mine", JANE);
        let (_dir, mut api) = api_with(fx.backend);

        assert!(!api.view_post("id:p").unwrap().listed_posts[0].can_manage);
        api.login(JANE, PASSWORD).unwrap();
        assert_eq!(api.session().map(|s| s.email.as_str()), Some(JANE));
        assert!(api.view_post("id:p").unwrap().listed_posts[0].can_manage);

        api.logout().unwrap();
        assert!(api.session().is_none());
        assert!(Session::load(&api.paths().data_dir).unwrap().is_none());
    }

    #[test]
    fn delete_dispatches_with_session() {
        let fx = BackendFixture::new()
            .with_user(JANE, "Jane Doe")
            .with_post_by("p", "Mine", JANE);
        let (_dir, mut api) = api_with(fx.backend);
        api.login(JANE, PASSWORD).unwrap();
        let result = api.delete_post("mine").unwrap();
        assert_eq!(result.affected_posts[0].id, "p");
    }
}
