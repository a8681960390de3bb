use serde::{Deserialize, Serialize};

/// Fixed-size page cursor. Pages are numbered from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u32,
    pub page_size: u32,
}

impl PageLink {
    pub fn new(page_size: u32) -> Self {
        Self { page: 0, page_size }
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            page_size: self.page_size,
        }
    }

    pub fn offset(&self) -> usize {
        self.page as usize * self.page_size as usize
    }
}

/// Page cursor restricted to a time window. Both bounds are inclusive epoch
/// milliseconds, matching the partition intervals produced by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePageLink {
    pub page_link: PageLink,
    pub start_ts: i64,
    pub end_ts: i64,
}

impl TimePageLink {
    pub fn new(page_link: PageLink, start_ts: i64, end_ts: i64) -> Self {
        Self {
            page_link,
            start_ts,
            end_ts,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            page_link: self.page_link.next(),
            ..*self
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start_ts && ts <= self.end_ts
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

impl<T> PageData<T> {
    pub fn new(items: Vec<T>, has_next: bool) -> Self {
        Self { items, has_next }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next: false,
        }
    }
}

/// Slice one page out of a full result set, the way the in-memory fixtures
/// answer paginated queries.
pub fn paginate<T: Clone>(items: &[T], link: &PageLink) -> PageData<T> {
    let offset = link.offset();
    if offset >= items.len() {
        return PageData::empty();
    }
    let end = (offset + link.page_size as usize).min(items.len());
    PageData::new(items[offset..end].to_vec(), end < items.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_walks_all_items_without_overlap() {
        let items: Vec<u32> = (0..250).collect();
        let mut link = PageLink::new(100);
        let mut seen = Vec::new();
        loop {
            let page = paginate(&items, &link);
            seen.extend(page.items);
            if !page.has_next {
                break;
            }
            link = link.next();
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn paginate_empty_input() {
        let page = paginate::<u32>(&[], &PageLink::new(100));
        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn exact_multiple_has_no_next() {
        let items: Vec<u32> = (0..200).collect();
        let second = paginate(&items, &PageLink::new(100).next());
        assert_eq!(second.items.len(), 100);
        assert!(!second.has_next);
    }

    #[test]
    fn time_page_link_keeps_window() {
        let link = TimePageLink::new(PageLink::new(512), 100, 199);
        let next = link.next();
        assert_eq!(next.page_link.page, 1);
        assert_eq!(next.start_ts, 100);
        assert_eq!(next.end_ts, 199);
        assert!(link.contains(100));
        assert!(link.contains(199));
        assert!(!link.contains(200));
    }
}
