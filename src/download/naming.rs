//! File names for downloaded resources

use url::Url;

/// Name used when a URL has no usable last path segment
pub const FALLBACK_NAME: &str = "download";

/// Extension of the last path segment, including the dot
///
/// Leading dots do not start an extension, so `/.profile` has none.
///
/// # Examples
///
/// ```
/// use link_sieve::download::extension_of;
///
/// assert_eq!(extension_of("/images/photo.jpg"), ".jpg");
/// assert_eq!(extension_of("/archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("/dir.d/README"), "");
/// ```
pub fn extension_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or_default();
    let stem = name.trim_start_matches('.');

    match stem.rfind('.') {
        Some(i) => &stem[i..],
        None => "",
    }
}

/// `<counter><extension>`, as in `1.jpg`, `2.pdf` or `3`
pub fn numbered_name(counter: usize, url: &Url) -> String {
    format!("{}{}", counter, sanitize(extension_of(url.path())))
}

/// The last non-empty path segment, made safe for the file system
pub fn original_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or_default();

    let name = sanitize(segment);
    if name.is_empty() || name.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// Replaces characters that are invalid in Windows or Unix file names
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
