use crate::config::DefaultScheme;
use crate::{UrlError, UrlResult};
use url::Url;

/// Prefixes `default_scheme://` to a target that was given without a scheme
///
/// This is a best-effort guess, not validation: `example.com/page` becomes
/// `https://example.com/page`, scheme-relative `//example.com` gets the
/// scheme prepended, and anything that already names a scheme is returned
/// unchanged (even if that scheme is not a web scheme; [`validate_target`]
/// rejects those).
///
/// A `host:port` prefix such as `localhost:8080` is not mistaken for a
/// scheme.
///
/// # Examples
///
/// ```
/// use link_sieve::config::DefaultScheme;
/// use link_sieve::url::add_scheme_if_missing;
///
/// assert_eq!(
///     add_scheme_if_missing("example.com/docs", DefaultScheme::Https),
///     "https://example.com/docs"
/// );
/// assert_eq!(
///     add_scheme_if_missing("http://example.com", DefaultScheme::Https),
///     "http://example.com"
/// );
/// ```
pub fn add_scheme_if_missing(target: &str, default_scheme: DefaultScheme) -> String {
    let target = target.trim();

    if let Some(rest) = target.strip_prefix("//") {
        return format!("{}://{}", default_scheme.as_str(), rest);
    }

    if has_scheme(target) {
        target.to_string()
    } else {
        format!("{}://{}", default_scheme.as_str(), target)
    }
}

/// Returns true if `target` starts with an RFC 3986 scheme followed by `:`
fn has_scheme(target: &str) -> bool {
    let Some((scheme, rest)) = target.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let valid_scheme = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    // `host:8080/...` is a port, not a scheme
    valid_scheme && !rest.starts_with(|c: char| c.is_ascii_digit())
}

/// Parses a target URL and checks that it can be fetched
///
/// The URL must parse, use the `http` or `https` scheme, and carry a
/// non-empty host.
///
/// # Examples
///
/// ```
/// use link_sieve::url::validate_target;
///
/// assert!(validate_target("https://example.com/").is_ok());
/// assert!(validate_target("ftp://example.com/").is_err());
/// assert!(validate_target("not a url").is_err());
/// ```
pub fn validate_target(target: &str) -> UrlResult<Url> {
    let url = Url::parse(target).map_err(|e| UrlError::Parse(format!("'{}': {}", target, e)))?;

    if !is_web_scheme(url.scheme()) {
        return Err(UrlError::InvalidScheme(format!(
            "only http and https are supported, got '{}'",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Returns true for the schemes the extractor keeps
pub fn is_web_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Appends a trailing `/` to a directory URL whose path lacks one
///
/// Directory listings resolve their relative entries against the directory
/// itself, so `https://host/pub` must become `https://host/pub/`. Paths whose
/// last segment looks like a file name (contains a `.`) are left alone.
pub fn ensure_directory_slash(url: &mut Url) -> bool {
    let path = url.path();
    if path.ends_with('/') {
        return false;
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') {
        return false;
    }

    let new_path = format!("{}/", path);
    url.set_path(&new_path);
    true
}

/// Returns true if both URLs address the same resource path
///
/// Scheme, host, port and path are compared; a trailing `/` on the path,
/// the query and the fragment are ignored.
pub fn same_resource_path(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
}
