//! # Backend Layer
//!
//! The remote blog service sits behind the [`BlogBackend`] trait so the rest of
//! the library never talks HTTP directly.
//!
//! ## Implementations
//!
//! - [`http::HttpBackend`]: the real service, JSON and multipart over HTTP(S)
//!   with bearer authentication.
//! - [`memory::InMemoryBackend`]: in-process stand-in for tests. It issues
//!   unsigned tokens and enforces authorship the way the service does.
//!
//! ## Endpoints
//!
//! ```text
//! GET    /api/posts/public            public_posts
//! GET    /api/posts/{id}              post_by_id
//! GET    /api/posts/slug/{slug}       post_by_slug
//! GET    /api/posts/me[/published|/draft]
//! POST   /api/posts                   multipart create
//! PUT    /api/posts/{id}              multipart update
//! DELETE /api/posts/{id}
//! PATCH  /api/posts/{id}/visibility
//! POST   /api/users/register | /api/users/login
//! POST   /api/chat
//! ```

use crate::error::Result;
use crate::model::{MyPostsFilter, Post, PostDraft};
use serde::Serialize;

pub mod http;
pub mod memory;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Abstract interface to the blog service.
///
/// Mutating calls take the bearer token explicitly; implementations never
/// look it up themselves.
pub trait BlogBackend {
    /// All public posts, in the order the service returns them
    fn public_posts(&self) -> Result<Vec<Post>>;

    fn post_by_id(&self, id: &str, token: Option<&str>) -> Result<Post>;

    fn post_by_slug(&self, slug: &str) -> Result<Post>;

    /// Posts owned by the token's user
    fn my_posts(&self, token: &str, filter: MyPostsFilter) -> Result<Vec<Post>>;

    fn create_post(&mut self, token: &str, draft: &PostDraft) -> Result<()>;

    fn update_post(&mut self, token: &str, id: &str, draft: &PostDraft) -> Result<()>;

    fn delete_post(&mut self, token: &str, id: &str) -> Result<()>;

    /// Flips PUBLIC/PRIVATE on the service side
    fn toggle_visibility(&mut self, token: &str, id: &str) -> Result<()>;

    fn register(&mut self, registration: &Registration) -> Result<()>;

    /// Returns the issued token
    fn login(&self, credentials: &Credentials) -> Result<String>;

    /// Sends one chat message and returns the bot's reply
    fn chat(&self, message: &str) -> Result<String>;
}
