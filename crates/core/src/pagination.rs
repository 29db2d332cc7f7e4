//! Paginated responses and page-window computation.

use serde::{Deserialize, Serialize};

/// A page of items from a paginated endpoint.
///
/// Matches the remote API's flat pagination shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u32,
    /// Requested page size.
    pub per_page: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Whether a previous page exists.
    pub has_prev: bool,
}

/// One entry in a page-control window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMark {
    /// A selectable page number.
    Page(u32),
    /// A run of at least two hidden pages.
    Gap,
}

/// Compute the window of page numbers worth showing around `current`.
///
/// With seven or fewer pages every page is listed. Otherwise the window
/// always includes the first and last page plus a block around `current`,
/// with [`PageMark::Gap`] standing in for the hidden runs. A gap never
/// hides a single page: the block boundaries guarantee at least two pages
/// behind every gap.
#[must_use]
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageMark> {
    if total_pages <= 7 {
        return (1..=total_pages).map(PageMark::Page).collect();
    }

    let mut marks = Vec::with_capacity(9);
    if current <= 4 {
        marks.extend((1..=5).map(PageMark::Page));
        marks.push(PageMark::Gap);
        marks.push(PageMark::Page(total_pages));
    } else if current >= total_pages - 3 {
        marks.push(PageMark::Page(1));
        marks.push(PageMark::Gap);
        marks.extend((total_pages - 4..=total_pages).map(PageMark::Page));
    } else {
        marks.push(PageMark::Page(1));
        marks.push(PageMark::Gap);
        marks.extend((current - 1..=current + 1).map(PageMark::Page));
        marks.push(PageMark::Gap);
        marks.push(PageMark::Page(total_pages));
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(marks: &[PageMark]) -> Vec<u32> {
        marks
            .iter()
            .filter_map(|m| match m {
                PageMark::Page(p) => Some(*p),
                PageMark::Gap => None,
            })
            .collect()
    }

    #[test]
    fn small_page_counts_show_everything() {
        assert_eq!(pages(&page_window(3, 7)), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn near_the_start_shows_a_head_block() {
        let window = page_window(2, 20);
        assert_eq!(pages(&window), vec![1, 2, 3, 4, 5, 20]);
        assert_eq!(window.iter().filter(|m| **m == PageMark::Gap).count(), 1);
    }

    #[test]
    fn near_the_end_shows_a_tail_block() {
        let window = page_window(19, 20);
        assert_eq!(pages(&window), vec![1, 16, 17, 18, 19, 20]);
    }

    #[test]
    fn middle_shows_both_gaps() {
        let window = page_window(10, 20);
        assert_eq!(pages(&window), vec![1, 9, 10, 11, 20]);
        assert_eq!(window.iter().filter(|m| **m == PageMark::Gap).count(), 2);
    }

    #[test]
    fn first_and_last_pages_are_always_visible() {
        for total in 8..40 {
            for current in 1..=total {
                let shown = pages(&page_window(current, total));
                assert!(shown.contains(&1), "page 1 missing at {current}/{total}");
                assert!(
                    shown.contains(&total),
                    "last page missing at {current}/{total}"
                );
                assert!(
                    shown.contains(&current),
                    "current page missing at {current}/{total}"
                );
            }
        }
    }

    #[test]
    fn gaps_never_hide_a_single_page() {
        for total in 8..40 {
            for current in 1..=total {
                let window = page_window(current, total);
                for pair in window.windows(2) {
                    if let [PageMark::Page(a), PageMark::Gap] = pair {
                        // Find the page that follows the gap.
                        let after = window
                            .iter()
                            .skip_while(|m| **m != PageMark::Page(*a))
                            .skip(2)
                            .find_map(|m| match m {
                                PageMark::Page(p) => Some(*p),
                                PageMark::Gap => None,
                            })
                            .expect("gap must be followed by a page");
                        assert!(
                            after - a >= 3,
                            "gap hides fewer than two pages at {current}/{total}"
                        );
                    }
                }
            }
        }
    }
}
