//! Image references attached to health logs
//!
//! Older records store paths relative to the upload bucket
//! (`uploads/2024/leaf.jpg`); API responses always carry absolute URLs.

/// Whether a stored reference still needs a base URL
pub fn is_relative(reference: &str) -> bool {
    let lower = reference.trim().to_ascii_lowercase();
    !(lower.starts_with("http://") || lower.starts_with("https://"))
}

/// Join a relative reference to `base_url` with exactly one `/`.
/// Absolute `http(s)` URLs are returned unchanged.
pub fn absolutize_image_url(base_url: &str, reference: &str) -> String {
    let reference = reference.trim();
    if !is_relative(reference) {
        return reference.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}

/// Absolutize every reference, returning `None` when nothing changed
pub fn absolutize_all(base_url: &str, references: &[String]) -> Option<Vec<String>> {
    if !references.iter().any(|r| is_relative(r)) {
        return None;
    }
    Some(
        references
            .iter()
            .map(|r| absolutize_image_url(base_url, r))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cdn.farm.example/media";

    #[test]
    fn test_absolute_url_unchanged() {
        let url = "https://other.example/a.jpg";
        assert_eq!(absolutize_image_url(BASE, url), url);
        assert_eq!(absolutize_image_url(BASE, "HTTP://x.example/b.png"), "HTTP://x.example/b.png");
    }

    #[test]
    fn test_single_slash_join() {
        let expected = "https://cdn.farm.example/media/uploads/leaf.jpg";
        assert_eq!(absolutize_image_url(BASE, "uploads/leaf.jpg"), expected);
        assert_eq!(absolutize_image_url(BASE, "/uploads/leaf.jpg"), expected);
        assert_eq!(absolutize_image_url("https://cdn.farm.example/media/", "/uploads/leaf.jpg"), expected);
    }

    #[test]
    fn test_absolutize_all_is_idempotent() {
        let refs = vec!["a.jpg".to_string(), "https://x.example/b.jpg".to_string()];
        let fixed = absolutize_all(BASE, &refs).unwrap();
        assert_eq!(fixed[0], "https://cdn.farm.example/media/a.jpg");
        assert_eq!(absolutize_all(BASE, &fixed), None);
        assert_eq!(absolutize_all(BASE, &[]), None);
    }
}
