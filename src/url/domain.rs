use url::Url;

/// Turns a URL's host into a string that is safe inside a file name
///
/// The host is lower-cased; an explicit port is appended with `_` instead of
/// `:`. URLs without a host yield `"unknown-host"`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_sieve::url::host_label;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(host_label(&url), "example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_label(&url), "127.0.0.1_8080");
/// ```
pub fn host_label(url: &Url) -> String {
    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return "unknown-host".to_string(),
    };

    // IPv6 literals come back bracketed
    let host = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .replace(':', "_");

    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    }
}

/// Replaces every non-alphanumeric character with `_`
///
/// Used to embed a filter pattern in a default output file name.
pub fn safe_file_component(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(host_label(&url), "example.com");
    }

    #[test]
    fn test_subdomain_and_case() {
        let url = Url::parse("https://Blog.Example.com/post").unwrap();
        assert_eq!(host_label(&url), "blog.example.com");
    }

    #[test]
    fn test_default_port_is_dropped() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_label(&url), "example.com");
    }

    #[test]
    fn test_explicit_port() {
        let url = Url::parse("http://localhost:3000/").unwrap();
        assert_eq!(host_label(&url), "localhost_3000");
    }

    #[test]
    fn test_ipv6_host() {
        let url = Url::parse("http://[::1]:8080/").unwrap();
        assert_eq!(host_label(&url), "__1_8080");
    }

    #[test]
    fn test_safe_file_component() {
        assert_eq!(safe_file_component("docs/v2"), "docs_v2");
        assert_eq!(safe_file_component(r"\.pdf$"), "__pdf_");
        assert_eq!(safe_file_component("plain"), "plain");
    }
}
