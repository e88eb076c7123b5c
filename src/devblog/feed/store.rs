use crate::error::BlogError;
use crate::model::Post;

/// Handle for one issued load. Only the most recently issued ticket may
/// commit its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub enum LoadOutcome {
    /// The posts replaced the store's contents.
    Applied(usize),
    /// A newer load was issued after this one; the result was discarded.
    Stale,
    /// The load failed; the previously loaded posts are kept.
    Failed(String),
}

/// Holds the full post list for a mounted view.
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
    issued: u64,
    loading: bool,
    loaded: bool,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True once any load has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.loading = true;
        LoadTicket(self.issued)
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<Post>, BlogError>,
    ) -> LoadOutcome {
        if ticket.0 != self.issued {
            tracing::debug!(ticket = ticket.0, latest = self.issued, "discarding stale post load");
            return LoadOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(posts) => {
                let count = posts.len();
                self.posts = posts;
                self.loaded = true;
                LoadOutcome::Applied(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "post load failed, keeping previous list");
                LoadOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts(titles: &[&str]) -> Vec<Post> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| Post::new(i.to_string(), *t))
            .collect()
    }

    #[test]
    fn applies_current_load() {
        let mut store = PostStore::new();
        let ticket = store.begin_load();
        assert!(store.is_loading());
        assert!(matches!(
            store.complete_load(ticket, Ok(posts(&["a", "b"]))),
            LoadOutcome::Applied(2)
        ));
        assert!(!store.is_loading());
        assert!(store.is_loaded());
        assert_eq!(store.posts().len(), 2);
    }

    #[test]
    fn last_issued_load_wins() {
        let mut store = PostStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        assert!(matches!(
            store.complete_load(second, Ok(posts(&["new"]))),
            LoadOutcome::Applied(1)
        ));
        // The earlier request resolves late and must not overwrite.
        assert!(matches!(
            store.complete_load(first, Ok(posts(&["old", "older"]))),
            LoadOutcome::Stale
        ));
        assert_eq!(store.posts()[0].title, "new");
    }

    #[test]
    fn failure_keeps_previous_posts() {
        let mut store = PostStore::new();
        let t = store.begin_load();
        store.complete_load(t, Ok(posts(&["kept"])));

        let t = store.begin_load();
        let outcome = store.complete_load(t, Err(BlogError::PostNotFound("x".into())));
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert!(!store.is_loading());
        assert_eq!(store.posts()[0].title, "kept");
    }
}
