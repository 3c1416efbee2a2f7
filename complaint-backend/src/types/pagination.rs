// src/types/pagination.rs

use serde::{Deserialize, Serialize};

/// 前後ページへのリンク情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl PageLinks {
    /// 1始まりのページ番号と件数、総件数からリンクを組み立てる
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let start = page.saturating_sub(1) * limit;
        let end = page * limit;

        Self {
            next: (end < total).then_some(PageLink {
                page: page + 1,
                limit,
            }),
            prev: (start > 0).then_some(PageLink {
                page: page - 1,
                limit,
            }),
        }
    }
}

/// ページ単位の取得結果
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            items,
            total,
            page,
            limit,
        }
    }

    pub fn links(&self) -> PageLinks {
        PageLinks::new(self.page, self.limit, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_only_next() {
        let links = PageLinks::new(1, 25, 30);
        assert_eq!(links.next, Some(PageLink { page: 2, limit: 25 }));
        assert!(links.prev.is_none());
    }

    #[test]
    fn test_last_page_has_only_prev() {
        let links = PageLinks::new(2, 25, 30);
        assert!(links.next.is_none());
        assert_eq!(links.prev, Some(PageLink { page: 1, limit: 25 }));
    }

    #[test]
    fn test_exact_fit_has_no_next() {
        let links = PageLinks::new(1, 25, 25);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
    }
}
