#![forbid(unsafe_code)]

use serde::Serialize;

pub const PAGE_SIZE: usize = 20;

/// Pages used to switch from a full strip to a windowed one.
const FULL_STRIP_MAX: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, already clamped.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 0-based index of `items[0]` within the full set.
    pub offset: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Clamps into `[1, max(total_pages, 1)]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

pub fn paginate<T>(items: &[T], requested: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let number = clamp_page(requested, total_pages);
    let start = ((number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        number,
        total_pages,
        total_items: items.len(),
        offset: start,
        has_prev: number > 1,
        has_next: number < total_pages,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSlot {
    Number(usize),
    Ellipsis,
}

/// Numbered-button strip: everything up to seven pages, otherwise
/// first, `current-1..=current+1`, last, with ellipses over the gaps.
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageSlot> {
    if total_pages <= FULL_STRIP_MAX {
        return (1..=total_pages).map(PageSlot::Number).collect();
    }
    let current = clamp_page(current, total_pages);
    let mut out = vec![PageSlot::Number(1)];
    if current > 3 {
        out.push(PageSlot::Ellipsis);
    }
    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total_pages - 1);
    out.extend((start..=end).map(PageSlot::Number));
    if current + 2 < total_pages {
        out.push(PageSlot::Ellipsis);
    }
    out.push(PageSlot::Number(total_pages));
    out
}
