//! Pager window computation.

/// Maximum number of page links shown at once.
pub const WINDOW: u32 = 5;

/// Page numbers to display for `page` out of `total_pages`.
///
/// Shows up to five consecutive pages centred on the current one, pinned to
/// the first five near the start and the last five near the end. Returns an
/// empty list when there are no pages.
pub fn page_window(page: u32, total_pages: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let page = i64::from(page);
    let total = i64::from(total_pages);
    let half = i64::from(WINDOW / 2);

    let mut start = (page - half).max(1);
    let mut end = (page + half).min(total);

    if page <= half {
        end = i64::from(WINDOW).min(total);
    }
    if page >= total - 1 {
        start = (total - i64::from(WINDOW) + 1).max(1);
    }

    if end < start {
        return Vec::new();
    }
    (start..=end).map(|p| p as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_totals_show_everything() {
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
        assert_eq!(page_window(3, 3), vec![1, 2, 3]);
        assert_eq!(page_window(3, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_start_is_pinned() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_middle_is_centred() {
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(3, 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_end_is_pinned() {
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(9, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_no_pages() {
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_window_always_contains_current_page() {
        for total in 1..=30 {
            for page in 1..=total {
                let window = page_window(page, total);
                assert!(window.contains(&page), "page {page} of {total}: {window:?}");
                assert!(window.len() <= WINDOW as usize);
                assert!(window.windows(2).all(|w| w[1] == w[0] + 1));
                assert!(window.iter().all(|p| (1..=total).contains(p)));
            }
        }
    }
}
