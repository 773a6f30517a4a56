//! JSON sub-API under `/api`.
//!
//! List endpoints are paginated with `?page=` (one-based) and answer
//! `{count, next, previous, results}`. `next` and `previous` are absolute
//! links built from `site.base_url` and keep the other query parameters.

mod catalog;
mod community;
pub mod serializers;

use crate::app_config;
use crate::error::Error;
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(
        actix_web::web::scope("/api")
            .configure(catalog::configure)
            .configure(community::configure),
    );
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiPage<T: Serialize> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Position of one requested page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// One-based.
    pub page: usize,
    pub size: usize,
    pub count: usize,
}

impl PageWindow {
    /// Fails with 404 for pages past the end. The first page of an empty
    /// result set always exists.
    pub fn new(page: Option<usize>, size: usize, count: usize) -> Result<Self, Error> {
        let size = size.max(1);
        let page = page.unwrap_or(1);
        let last = ((count + size - 1) / size).max(1);

        if page == 0 || page > last {
            return Err(Error::NotFound("Page"));
        }
        Ok(Self { page, size, count })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.size
    }

    pub fn has_next(&self) -> bool {
        self.page * self.size < self.count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Rebuilds `path?query` with `page` replaced. Page 1 drops the parameter.
fn page_link(path: &str, query: &str, page: usize) -> String {
    let mut params: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("page=") && *pair != "page")
        .map(str::to_owned)
        .collect();
    if page > 1 {
        params.push(format!("page={}", page));
    }

    let base_url = app_config::site().base_url;
    let base_url = base_url.trim_end_matches('/');
    if params.is_empty() {
        format!("{}{}", base_url, path)
    } else {
        format!("{}{}?{}", base_url, path, params.join("&"))
    }
}

impl<T: Serialize> ApiPage<T> {
    pub fn new(req: &HttpRequest, window: PageWindow, results: Vec<T>) -> Self {
        let path = req.path();
        let query = req.query_string();

        Self {
            count: window.count,
            next: window
                .has_next()
                .then(|| page_link(path, query, window.page + 1)),
            previous: window
                .has_previous()
                .then(|| page_link(path, query, window.page - 1)),
            results,
        }
    }

    /// Pages through rows that are already in memory.
    pub fn from_vec(req: &HttpRequest, page: Option<usize>, rows: Vec<T>) -> Result<Self, Error> {
        let window = PageWindow::new(page, app_config::limits().api_page_size as usize, rows.len())?;
        let results = rows
            .into_iter()
            .skip(window.offset())
            .take(window.size)
            .collect();
        Ok(Self::new(req, window, results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window() {
        let w = PageWindow::new(None, 20, 45).unwrap();
        assert_eq!(w.page, 1);
        assert_eq!(w.offset(), 0);
        assert!(w.has_next());
        assert!(!w.has_previous());

        let w = PageWindow::new(Some(3), 20, 45).unwrap();
        assert_eq!(w.offset(), 40);
        assert!(!w.has_next());
        assert!(w.has_previous());

        assert!(PageWindow::new(Some(4), 20, 45).is_err());
        assert!(PageWindow::new(Some(0), 20, 45).is_err());
        assert!(PageWindow::new(Some(1), 20, 0).is_ok());
    }

    #[test]
    fn test_page_link_keeps_other_parameters() {
        let base = app_config::site().base_url;
        let base = base.trim_end_matches('/');
        assert_eq!(
            page_link("/api/actors/", "sex=F&page=2", 3),
            format!("{}/api/actors/?sex=F&page=3", base)
        );
        assert_eq!(
            page_link("/api/actors/", "page=2", 1),
            format!("{}/api/actors/", base)
        );
    }
}
