use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Treats an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps that fail to parse are dropped instead of failing the whole post.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

/// Keeps the string entries of a tag list and drops everything else.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Reads visibility case-insensitively; unknown values are public.
fn lenient_visibility<'de, D>(deserializer: D) -> Result<Visibility, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if s.eq_ignore_ascii_case("private") => Visibility::Private,
        _ => Visibility::Public,
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<PostStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => PostStatus::default(),
    })
}

/// An author document with odd fields keeps whatever string fields it has.
fn lenient_author<'de, D>(deserializer: D) -> Result<Option<Author>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Ok(author) = serde_json::from_value::<Option<Author>>(value.clone()) {
        return Ok(author);
    }
    let Value::Object(fields) = value else {
        return Ok(None);
    };
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(String::from);
    Ok(Some(Author::Profile(AuthorProfile {
        id: text("_id").or_else(|| text("id")),
        name: text("name"),
        email: text("email"),
        bio: text("bio"),
        avatar: text("avatar"),
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Public => Visibility::Private,
            Visibility::Private => Visibility::Public,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Published,
    Draft,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Published => write!(f, "published"),
            PostStatus::Draft => write!(f, "draft"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "published" => Ok(PostStatus::Published),
            "draft" => Ok(PostStatus::Draft),
            other => Err(format!("Unknown post status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The API returns the author either as a bare name or as a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Profile(AuthorProfile),
}

impl Author {
    pub fn display_name(&self) -> &str {
        match self {
            Author::Profile(profile) => profile
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_AUTHOR),
            Author::Name(name) => name,
        }
    }

    /// The value compared against the token subject: email, then name.
    pub fn identity(&self) -> &str {
        match self {
            Author::Profile(profile) => profile
                .email
                .as_deref()
                .filter(|e| !e.is_empty())
                .or(profile.name.as_deref())
                .unwrap_or(""),
            Author::Name(name) => name,
        }
    }

    pub fn bio(&self) -> &str {
        match self {
            Author::Profile(profile) => profile.bio.as_deref().unwrap_or(""),
            Author::Name(_) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub read_time: String,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_author")]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_visibility")]
    pub visibility: Visibility,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: PostStatus,
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            excerpt: String::new(),
            content: String::new(),
            slug: String::new(),
            image: String::new(),
            read_time: String::new(),
            tags: Vec::new(),
            author: None,
            created_at: Some(Utc::now()),
            visibility: Visibility::Public,
            status: PostStatus::Published,
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = excerpt.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(Author::display_name)
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn author_identity(&self) -> &str {
        self.author.as_ref().map(Author::identity).unwrap_or("")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Key used to address the post in links: the slug, or the id when
    /// the post has no slug.
    pub fn route_key(&self) -> &str {
        if self.slug.is_empty() {
            &self.id
        } else {
            &self.slug
        }
    }
}

/// How a single post is addressed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKey {
    Id(String),
    Slug(String),
}

impl fmt::Display for PostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostKey::Id(id) => write!(f, "id {}", id),
            PostKey::Slug(slug) => write!(f, "\"{}\"", slug),
        }
    }
}

/// Server-side filter for the signed-in user's own posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MyPostsFilter {
    #[default]
    All,
    Published,
    Draft,
}

impl MyPostsFilter {
    pub fn path_suffix(self) -> &'static str {
        match self {
            MyPostsFilter::All => "",
            MyPostsFilter::Published => "/published",
            MyPostsFilter::Draft => "/draft",
        }
    }
}

/// Splits a comma separated tag list, dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Form fields sent when creating or updating a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author_name: String,
    pub author_bio: String,
    pub status: PostStatus,
    /// Existing cover image URL, kept when a post is updated.
    pub image: String,
    pub cover_image: Option<PathBuf>,
    pub author_image: Option<PathBuf>,
}

impl PostDraft {
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            tags: post.tags.clone(),
            author_name: post
                .author
                .as_ref()
                .map(|a| match a {
                    Author::Profile(p) => p.name.clone().unwrap_or_default(),
                    Author::Name(n) => n.clone(),
                })
                .unwrap_or_default(),
            author_bio: post
                .author
                .as_ref()
                .map(|a| a.bio().to_string())
                .unwrap_or_default(),
            status: post.status,
            image: post.image.clone(),
            cover_image: None,
            author_image: None,
        }
    }

    pub fn tags_field(&self) -> String {
        self.tags.join(",")
    }

    /// Names of required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |value: &str| value.trim().is_empty();
        [
            ("title", blank(&self.title)),
            ("excerpt", blank(&self.excerpt)),
            ("tags", self.tags.is_empty()),
            ("content", blank(&self.content)),
            ("author name", blank(&self.author_name)),
            ("author bio", blank(&self.author_bio)),
        ]
        .into_iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Partial edit applied on top of an existing post.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author_name: Option<String>,
    pub author_bio: Option<String>,
    pub author_image: Option<PathBuf>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.author_name.is_none()
            && self.author_bio.is_none()
            && self.author_image.is_none()
    }

    /// Text fields this edit would blank out. Clearing the tag list is allowed.
    pub fn blanked_fields(&self) -> Vec<&'static str> {
        let blank =
            |value: &Option<String>| value.as_deref().is_some_and(|v| v.trim().is_empty());
        [
            ("title", blank(&self.title)),
            ("excerpt", blank(&self.excerpt)),
            ("content", blank(&self.content)),
            ("author name", blank(&self.author_name)),
            ("author bio", blank(&self.author_bio)),
        ]
        .into_iter()
        .filter(|(_, blanked)| *blanked)
        .map(|(name, _)| name)
        .collect()
    }

    pub fn apply(self, draft: &mut PostDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            draft.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(name) = self.author_name {
            draft.author_name = name;
        }
        if let Some(bio) = self.author_bio {
            draft.author_bio = bio;
        }
        if self.author_image.is_some() {
            draft.author_image = self.author_image;
        }
    }
}
