use crate::config::DEFAULT_PAGE_SIZE;

/// Reveals a growing prefix of a list, one page at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Whether the "load more" sentinel is rendered.
    pub fn has_more(&self, count: usize) -> bool {
        self.page < self.total_pages(count)
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = (self.page * self.page_size).min(items.len());
        &items[..end]
    }

    /// The sentinel came into view. Advances by one page if there is one.
    pub fn on_sentinel_visible(&mut self, count: usize) -> bool {
        if self.has_more(count) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Scrolls forward until `target` is reached or the list runs out.
    pub fn advance_to(&mut self, target: usize, count: usize) {
        while self.page < target && self.on_sentinel_visible(count) {}
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}
