use crate::auth::Session;
use crate::config::BlogConfig;
use crate::model::Post;
use std::path::PathBuf;

pub mod account;
pub mod chat;
pub mod config;
pub mod create;
pub mod delete;
pub mod helpers;
pub mod list;
pub mod mine;
pub mod search;
pub mod tags;
pub mod update;
pub mod view;
pub mod visibility;

/// Where devblog keeps its local state: `config.json` and `session.json`.
#[derive(Debug, Clone)]
pub struct BlogPaths {
    pub data_dir: PathBuf,
}

impl BlogPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A post as shown to the current user.
#[derive(Debug, Clone)]
pub struct ListedPost {
    pub post: Post,
    /// Whether the author-only controls (edit, delete, visibility) apply.
    pub can_manage: bool,
}

/// Snapshot of the feed state after a `list` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub heading: &'static str,
    pub category: String,
    pub query: String,
    pub page: usize,
    pub total_pages: usize,
    pub matches: usize,
    pub has_more: bool,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_posts: Vec<Post>,
    pub listed_posts: Vec<ListedPost>,
    pub feed: Option<FeedPage>,
    pub categories: Vec<String>,
    pub session: Option<Session>,
    pub config: Option<BlogConfig>,
    pub reply: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_posts(mut self, posts: Vec<Post>) -> Self {
        self.affected_posts = posts;
        self
    }

    pub fn with_listed_posts(mut self, posts: Vec<ListedPost>) -> Self {
        self.listed_posts = posts;
        self
    }

    pub fn with_config(mut self, config: BlogConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
