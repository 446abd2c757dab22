//! Slug generation for public URLs.

/// Derive a URL slug from a title.
///
/// Lowercases, keeps ASCII alphanumerics, collapses everything else into
/// single hyphens, and trims leading/trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(slugify("Annual General Meeting 2025"), "annual-general-meeting-2025");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("News — flash: update!"), "news-flash-update");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(slugify("  ...Hello...  "), "hello");
    }

    #[test]
    fn empty_input() {
        assert_eq!(slugify("!!!"), "");
    }
}
