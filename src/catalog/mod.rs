//! Read and write access to the catalogue: movies, actors, directors, genres.

pub mod actors;
pub mod directors;
pub mod genres;
pub mod movies;

/// Zero-based page index from a one-based `?page=` value.
pub fn page_index(page: Option<usize>) -> usize {
    page.unwrap_or(1).max(1) - 1
}

#[cfg(test)]
mod tests {
    use super::page_index;

    #[test]
    fn test_page_index() {
        assert_eq!(page_index(None), 0);
        assert_eq!(page_index(Some(0)), 0);
        assert_eq!(page_index(Some(1)), 0);
        assert_eq!(page_index(Some(4)), 3);
    }
}
