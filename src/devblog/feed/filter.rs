use crate::model::Post;
use std::fmt;

pub const ALL_LABEL: &str = "All";

/// Queries shorter than this (in characters) do not search.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Tag(String),
}

impl Category {
    pub fn parse(label: &str) -> Self {
        if label == ALL_LABEL {
            Category::All
        } else {
            Category::Tag(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::All => ALL_LABEL,
            Category::Tag(tag) => tag,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Category::All => true,
            Category::Tag(tag) => post.has_tag(tag),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `All` followed by every tag seen across `posts`, de-duplicated in
/// first-seen order. A literal "All" tag is folded into the synthetic entry.
pub fn categories(posts: &[Post]) -> Vec<Category> {
    let mut seen: Vec<&str> = Vec::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        if tag != ALL_LABEL && !seen.contains(&tag.as_str()) {
            seen.push(tag);
        }
    }
    std::iter::once(Category::All)
        .chain(seen.into_iter().map(|t| Category::Tag(t.to_string())))
        .collect()
}

pub fn is_search_query(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_LEN
}

/// Derives the visible subset from the full list, the selected category and
/// the normalized query. Keeps the original order.
pub fn filter_posts<'a>(posts: &'a [Post], category: &Category, query: &str) -> Vec<&'a Post> {
    let base = posts.iter().filter(|p| category.matches(p));
    if !is_search_query(query) {
        return base.collect();
    }

    let needle = query.to_lowercase();
    base.filter(|p| {
        p.title.to_lowercase().contains(&needle) || p.excerpt.to_lowercase().contains(&needle)
    })
    .collect()
}
