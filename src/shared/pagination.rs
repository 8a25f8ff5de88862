//! Page-number markers for paginated listings.
//!
//! Produces the compact sequence a pager renders: page numbers with a single
//! ellipsis standing in for each collapsed gap. First and last pages are
//! always present.

use serde::{Serialize, Serializer};

/// Up to this many pages are listed without collapsing.
pub const MAX_UNCOLLAPSED_PAGES: i64 = 7;

/// Pages shown on each side of the current page by default.
pub const DEFAULT_SIBLING_COUNT: i64 = 1;

const ELLIPSIS: &str = "...";

/// A single entry in a pager: either a page number or a collapsed gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(i64),
    Ellipsis,
}

impl Serialize for PageMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageMarker::Page(n) => serializer.serialize_i64(*n),
            PageMarker::Ellipsis => serializer.serialize_str(ELLIPSIS),
        }
    }
}

fn range(from: i64, to: i64) -> impl Iterator<Item = PageMarker> {
    (from..=to).map(PageMarker::Page)
}

/// Build the pager markers for `current` out of `total` pages.
///
/// `current` is clamped into `1..=total` and a negative `sibling_count` is
/// treated as zero. An empty list is returned when there are no pages.
pub fn page_markers(current: i64, total: i64, sibling_count: i64) -> Vec<PageMarker> {
    if total <= 0 {
        return Vec::new();
    }
    if total <= MAX_UNCOLLAPSED_PAGES {
        return range(1, total).collect();
    }

    let current = current.clamp(1, total);
    let siblings = sibling_count.max(0);
    let left = (current - siblings).max(1);
    let right = (current + siblings).min(total);

    let show_left_gap = left > 2;
    let show_right_gap = right < total - 1;

    let mut markers = Vec::with_capacity((right - left + 5) as usize);
    match (show_left_gap, show_right_gap) {
        (true, true) => {
            markers.push(PageMarker::Page(1));
            markers.push(PageMarker::Ellipsis);
            markers.extend(range(left, right));
            markers.push(PageMarker::Ellipsis);
            markers.push(PageMarker::Page(total));
        }
        (true, false) => {
            markers.push(PageMarker::Page(1));
            markers.push(PageMarker::Ellipsis);
            markers.extend(range(left, total));
        }
        (false, true) => {
            markers.extend(range(1, right));
            markers.push(PageMarker::Ellipsis);
            markers.push(PageMarker::Page(total));
        }
        // The window already touches both ends, nothing to collapse.
        (false, false) => markers.extend(range(1, total)),
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageMarker::{Ellipsis, Page};

    fn pages(ns: &[i64]) -> Vec<PageMarker> {
        ns.iter().copied().map(Page).collect()
    }

    #[test]
    fn test_small_totals_list_every_page() {
        for total in 1..=MAX_UNCOLLAPSED_PAGES {
            let markers = page_markers(1, total, 1);
            assert_eq!(markers.len() as i64, total);
            assert!(!markers.contains(&Ellipsis));
        }
    }

    #[test]
    fn test_middle_page_collapses_both_sides() {
        assert_eq!(
            page_markers(5, 10, 1),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_first_page_only_collapses_right() {
        assert_eq!(page_markers(1, 10, 1), vec![Page(1), Page(2), Ellipsis, Page(10)]);
    }

    #[test]
    fn test_last_page_only_collapses_left() {
        assert_eq!(page_markers(10, 10, 1), vec![Page(1), Ellipsis, Page(9), Page(10)]);
    }

    #[test]
    fn test_window_adjacent_to_first_page() {
        // left sibling index is 2, so no left gap
        assert_eq!(
            page_markers(3, 10, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_wide_window_returns_full_range() {
        assert_eq!(page_markers(5, 8, 5), pages(&[1, 2, 3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        assert_eq!(page_markers(0, 10, 1), page_markers(1, 10, 1));
        assert_eq!(page_markers(99, 10, 1), page_markers(10, 10, 1));
    }

    #[test]
    fn test_zero_total_is_empty() {
        assert!(page_markers(1, 0, 1).is_empty());
    }

    #[test]
    fn test_markers_serialize_as_numbers_and_ellipsis() {
        let json = serde_json::to_string(&page_markers(5, 10, 1)).unwrap();
        assert_eq!(json, r#"[1,"...",4,5,6,"...",10]"#);
    }
}
