use askama_actix::Template;

const PAGINATOR_LOOK_AHEAD: usize = 2;

/// [1] 2 3 ... 13
/// 1 2 [3] 4 5 ... 13
/// 1 2 3 4 [5] 6 7 ... 13
/// 1 ... 4 5 [6] 7 8 ... 13
/// 1 ... 7 8 [9] 10 11 12 13
/// 1 ... 9 10 [11] 12 13
/// 1 ... 11 12 [13]
///
/// Pages are one-based. Links are `{base_url}?page={n}`.
#[derive(Debug)]
pub struct Paginator {
    pub base_url: String,
    pub this_page: usize,
    pub page_count: usize,
}

#[derive(Template)]
#[template(path = "util/paginator.html")]
struct PaginatorTemplate<'a> {
    paginator: &'a Paginator,
}

impl Paginator {
    pub fn new<S: Into<String>>(base_url: S, this_page: usize, page_count: usize) -> Self {
        Self {
            base_url: base_url.into(),
            this_page,
            page_count,
        }
    }

    pub fn has_pages(&self) -> bool {
        self.page_count > 1
    }

    pub fn is_current_page(&self, page: &usize) -> bool {
        *page == self.this_page
    }

    pub fn has_previous(&self) -> bool {
        self.this_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.this_page < self.page_count
    }

    pub fn page_url(&self, page: &usize) -> String {
        format!("{}?page={}", self.base_url, page)
    }

    pub fn previous_url(&self) -> String {
        self.page_url(&(self.this_page - 1))
    }

    pub fn next_url(&self) -> String {
        self.page_url(&(self.this_page + 1))
    }

    /// Few enough pages to list every one.
    fn fits(&self) -> bool {
        self.page_count <= 2 * PAGINATOR_LOOK_AHEAD + 5
    }

    fn near_start(&self) -> bool {
        self.this_page <= PAGINATOR_LOOK_AHEAD + 3
    }

    fn near_end(&self) -> bool {
        self.this_page + PAGINATOR_LOOK_AHEAD + 2 >= self.page_count
    }

    pub fn get_first_pages(&self) -> Vec<usize> {
        if self.fits() {
            (1..=self.page_count).collect()
        } else if self.near_start() {
            (1..=self.this_page + PAGINATOR_LOOK_AHEAD).collect()
        } else {
            vec![1]
        }
    }

    pub fn get_inner_pages(&self) -> Option<Vec<usize>> {
        if self.fits() || self.near_start() || self.near_end() {
            None
        } else {
            Some(
                ((self.this_page - PAGINATOR_LOOK_AHEAD)..=(self.this_page + PAGINATOR_LOOK_AHEAD))
                    .collect(),
            )
        }
    }

    pub fn get_last_pages(&self) -> Option<Vec<usize>> {
        if self.fits() {
            None
        } else if self.near_end() {
            Some(((self.this_page - PAGINATOR_LOOK_AHEAD)..=self.page_count).collect())
        } else {
            Some(vec![self.page_count])
        }
    }

    pub fn as_html(&self) -> String {
        if self.has_pages() {
            let mut buffer = String::new();
            let template = PaginatorTemplate { paginator: self };
            if template.render_into(&mut buffer).is_err() {
                "[Paginator Util Error]".to_owned()
            } else {
                buffer
            }
        } else {
            String::new()
        }
    }
}
