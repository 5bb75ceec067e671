use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PageSize {
    #[default]
    Fifty,
    Hundred,
    TwoHundred,
}

impl PageSize {
    pub fn rows(self) -> usize {
        match self {
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
            PageSize::TwoHundred => 200,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows())
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "50" => Ok(PageSize::Fifty),
            "100" => Ok(PageSize::Hundred),
            "200" => Ok(PageSize::TwoHundred),
            other => Err(format!("page size must be 50, 100 or 200, got {:?}", other)),
        }
    }
}

/// One page of an ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Offset of the first item on this page within the full collection.
    pub fn first_offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// `ceil(total / size)`; an empty collection still has one (empty) page.
pub fn total_pages(total_items: usize, size: PageSize) -> usize {
    total_items.div_ceil(size.rows()).max(1)
}

/// Pull a requested page number into `1..=total_pages`.
pub fn clamp_page(page: usize, total_items: usize, size: PageSize) -> usize {
    page.clamp(1, total_pages(total_items, size))
}

pub fn paginate<T: Clone>(items: &[T], size: PageSize, page: usize) -> Page<T> {
    let page = clamp_page(page, items.len(), size);
    let start = (page - 1) * size.rows();
    let end = (start + size.rows()).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        page_size: size.rows(),
        total_items: items.len(),
        total_pages: total_pages(items.len(), size),
    }
}

pub fn next_page(page: usize, total_items: usize, size: PageSize) -> usize {
    clamp_page(page.saturating_add(1), total_items, size)
}

pub fn previous_page(page: usize, total_items: usize, size: PageSize) -> usize {
    clamp_page(page.saturating_sub(1), total_items, size)
}
