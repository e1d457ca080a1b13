//! Slug normalization.

/// Convert arbitrary text into a URL/filesystem-safe token.
///
/// Lowercase ASCII alphanumerics only, with runs of anything else collapsed
/// to a single `-` and no leading or trailing separator. Empty input yields
/// empty output. Idempotent.
///
/// # Example
///
/// ```
/// use clipserve_av::slugify;
///
/// assert_eq!(slugify("Rust & FFmpeg: Part 2!"), "rust-ffmpeg-part-2");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
