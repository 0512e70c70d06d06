//! List pagination across slides.

use std::ops::Range;

/// Splits an ordered item list into page-sized chunks from a fixed
/// per-item height estimate.
///
/// Always yields at least one page, so a section with no items still gets
/// its title slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPlan {
    total: usize,
    items_per_page: usize,
}

impl PaginationPlan {
    /// Plan pages for `total` items given the available height and a
    /// per-item height estimate, both in the same length unit.
    pub fn new(total: usize, available_height: f64, per_item_height: f64) -> Self {
        let items_per_page = if per_item_height > 0.0 {
            ((available_height / per_item_height).floor() as usize).max(1)
        } else {
            1
        };
        Self {
            total,
            items_per_page,
        }
    }

    /// Plan with an explicit page capacity.
    pub fn with_capacity(total: usize, items_per_page: usize) -> Self {
        Self {
            total,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.items_per_page).max(1)
    }

    /// Index range of the items on 0-indexed page `page`.
    pub fn page_range(&self, page: usize) -> Range<usize> {
        let start = (page * self.items_per_page).min(self.total);
        let end = ((page + 1) * self.items_per_page).min(self.total);
        start..end
    }

    /// Iterate `(page_index, item_range)` over all pages.
    pub fn pages(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.page_count()).map(|page| (page, self.page_range(page)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_per_page_floor() {
        let plan = PaginationPlan::new(50, 4.3, 0.4);
        assert_eq!(plan.items_per_page(), 10);
        assert_eq!(plan.page_count(), 5);
        assert_eq!(plan.page_range(4), 40..50);
    }

    #[test]
    fn test_empty_list_still_one_page() {
        let plan = PaginationPlan::new(0, 5.0, 0.5);
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.page_range(0), 0..0);
    }

    #[test]
    fn test_tiny_available_height_fits_one_item() {
        let plan = PaginationPlan::new(7, 0.1, 0.5);
        assert_eq!(plan.items_per_page(), 1);
        assert_eq!(plan.page_count(), 7);
    }

    #[test]
    fn test_pages_reconstruct_list() {
        for total in [0usize, 1, 9, 10, 11, 50, 137] {
            let plan = PaginationPlan::new(total, 4.0, 0.45);
            let mut covered = Vec::new();
            for (_, range) in plan.pages() {
                covered.extend(range);
            }
            let expected: Vec<usize> = (0..total).collect();
            assert_eq!(covered, expected, "total={total}");
        }
    }

    #[test]
    fn test_with_capacity() {
        let plan = PaginationPlan::with_capacity(12, 5);
        assert_eq!(plan.page_count(), 3);
        assert_eq!(plan.page_range(2), 10..12);
        // Capacity never drops below one item per page.
        assert_eq!(PaginationPlan::with_capacity(3, 0).items_per_page(), 1);
    }
}
