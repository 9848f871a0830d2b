// src/models/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

// Página de resultados (recortada em memória ou pelo banco)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Página pedida, já normalizada (começa em 1, tamanho entre 1 e MAX_PER_PAGE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(self) -> usize {
        (self.page as usize - 1).saturating_mul(self.per_page as usize)
    }

    pub fn limit(self) -> usize {
        self.per_page as usize
    }
}

impl<T> Page<T> {
    /// Recorta `items` na página pedida. Página começa em 1.
    pub fn paginate(items: Vec<T>, page: Option<u32>, per_page: Option<u32>) -> Self {
        let request = PageRequest::new(page, per_page);
        let total = items.len();
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.limit())
            .collect();

        Self::from_parts(items, total, request)
    }

    /// Página já recortada pelo banco (LIMIT/OFFSET) com o total da consulta.
    pub fn from_parts(items: Vec<T>, total: usize, request: PageRequest) -> Self {
        let total_pages = total.div_ceil(request.limit()) as u32;
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_the_requested_page() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), Some(3), Some(10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn defaults_and_limits() {
        let page = Page::paginate((1..=15).collect::<Vec<_>>(), None, Some(1000));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.items.len(), 15);

        let page = Page::paginate((1..=15).collect::<Vec<_>>(), Some(0), None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::paginate(vec![1, 2, 3], Some(5), Some(2));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn request_offset_follows_page_and_size() {
        let request = PageRequest::new(Some(120), Some(10));
        assert_eq!(request.offset(), 1190);
        assert_eq!(request.limit(), 10);
        assert_eq!(PageRequest::new(None, None).offset(), 0);
    }

    #[test]
    fn totals_come_from_the_query_not_the_slice() {
        let request = PageRequest::new(Some(120), Some(10));
        let page = Page::from_parts((1191..=1200).collect::<Vec<_>>(), 1505, request);
        assert_eq!(page.total, 1505);
        assert_eq!(page.total_pages, 151);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.page, 120);
    }
}
