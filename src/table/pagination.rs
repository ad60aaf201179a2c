//! Page-number pagination over a server-reported total.
//!
//! The server's `count` is authoritative. The stored page number may go
//! stale (e.g. the result set shrank); the derived `current_page` silently
//! corrects it instead of failing.

/// Display bounds for the current page. Absent entirely when there are no
/// items, so callers hide the pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    /// 1-based index of the first row on this page.
    pub start_index: u64,
    /// 1-based index of the last row on this page.
    pub end_index: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone)]
pub struct PaginationState {
    page: u32,
    page_size: u32,
    total_items: u64,
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Requested page clamped into the known range:
    /// `min(page, max(1, total_pages))`.
    pub fn current_page(&self) -> u32 {
        self.page.min(self.total_pages().max(1))
    }

    pub fn total_pages(&self) -> u32 {
        if self.total_items == 0 {
            return 0;
        }
        let pages = (self.total_items + self.page_size as u64 - 1) / self.page_size as u64;
        pages.min(u32::MAX as u64) as u32
    }

    /// Lower-clamps to 1; the upper clamp is deferred to `current_page` so a
    /// stale page number is tolerated until the next total arrives.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Changing the page size always returns to page 1, so an out-of-range
    /// page can never survive the change.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn set_total_items(&mut self, total_items: u64) {
        self.total_items = total_items;
    }

    pub fn page_info(&self) -> Option<PageInfo> {
        if self.total_items == 0 {
            return None;
        }

        let page = self.current_page();
        let total_pages = self.total_pages();
        let start_index = (page as u64 - 1) * self.page_size as u64 + 1;
        let end_index = (page as u64 * self.page_size as u64).min(self.total_items);

        Some(PageInfo {
            page,
            total_pages,
            total_items: self.total_items,
            start_index,
            end_index,
            has_next: page < total_pages,
            has_previous: page > 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_total_yields_no_page_info() {
        let mut pagination = PaginationState::new(25);
        assert_eq!(pagination.page_info(), None);
        pagination.set_page(7);
        pagination.set_page_size(10);
        assert_eq!(pagination.page_info(), None);
    }

    #[test]
    fn forty_two_items_at_twenty_five_per_page_is_two_pages() {
        let mut pagination = PaginationState::new(25);
        pagination.set_total_items(42);
        let info = pagination.page_info().unwrap();
        assert_eq!(info.total_pages, 2);
        assert_eq!(info.start_index, 1);
        assert_eq!(info.end_index, 25);
        assert!(info.has_next);
        assert!(!info.has_previous);
    }

    #[test]
    fn page_size_change_resets_to_page_one() {
        let mut pagination = PaginationState::new(25);
        pagination.set_total_items(100);
        pagination.set_page(3);
        pagination.set_page_size(10);
        assert_eq!(pagination.current_page(), 1);
    }

    #[test]
    fn stale_page_is_corrected_once_total_is_known() {
        let mut pagination = PaginationState::new(10);
        pagination.set_page(9);
        pagination.set_total_items(15);
        assert_eq!(pagination.current_page(), 2);

        let info = pagination.page_info().unwrap();
        assert_eq!(info.start_index, 11);
        assert_eq!(info.end_index, 15);
    }

    #[test]
    fn set_page_lower_clamps_to_one() {
        let mut pagination = PaginationState::new(10);
        pagination.set_total_items(30);
        pagination.set_page(0);
        assert_eq!(pagination.current_page(), 1);
    }

    #[test]
    fn last_page_bounds() {
        let mut pagination = PaginationState::new(25);
        pagination.set_total_items(42);
        pagination.set_page(2);
        let info = pagination.page_info().unwrap();
        assert_eq!(info.start_index, 26);
        assert_eq!(info.end_index, 42);
        assert!(!info.has_next);
        assert!(info.has_previous);
    }
}
