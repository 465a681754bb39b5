//! HTML parser for extracting links
//!
//! This module turns raw page markup into a [`LinkSet`]:
//! - Links from `<a href>` tags, or image links from `<img src>` tags
//! - Directory-listing entries from "Index of" pages
//! - Page title (used to recognise directory listings)
//!
//! Every function here is pure: the same markup, base URL and pattern always
//! give the same set.

use crate::crawler::links::LinkSet;
use crate::url::{is_web_scheme, same_resource_path, MatchPattern};
use crate::SieveError;
use scraper::{Html, Selector};
use url::Url;

/// Reference schemes that never lead to a fetchable network resource
const NON_NETWORK_SCHEMES: &[&str] = &["javascript", "mailto", "tel"];

/// Title phrases that mark a server-generated directory listing
const INDEX_TITLE_PHRASES: &[&str] = &["index of", "directory listing for"];

/// Column headers and navigation entries of directory listings
const INDEX_COLUMN_LABELS: &[&str] = &[
    "Name",
    "Last modified",
    "Size",
    "Description",
    "Parent Directory",
];

/// Element family a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `<a href="...">`
    Anchor,
    /// `<img src="...">`
    Image,
}

/// What a page is scraped for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Hyperlinks
    Links,
    /// Image sources
    Images,
    /// Entries of an "Index of" directory listing
    DirectoryListing,
}

impl ExtractMode {
    pub fn link_kind(&self) -> LinkKind {
        match self {
            Self::Images => LinkKind::Image,
            Self::Links | Self::DirectoryListing => LinkKind::Anchor,
        }
    }

    /// Human-readable name used in reports and file headers
    pub fn label(&self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::Images => "image links",
            Self::DirectoryListing => "index links",
        }
    }
}

/// A raw reference pulled out of the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Attribute value, whitespace-trimmed
    pub href: String,
    /// Text content of the element, whitespace-trimmed
    pub text: String,
    pub kind: LinkKind,
}

/// Link extractor bound to a mode, an optional pattern and filter knobs
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    mode: ExtractMode,
    pattern: Option<MatchPattern>,
    exclude_data_uris: bool,
}

impl LinkExtractor {
    pub fn new(mode: ExtractMode) -> Self {
        Self {
            mode,
            pattern: None,
            exclude_data_uris: true,
        }
    }

    pub fn with_pattern(mut self, pattern: Option<MatchPattern>) -> Self {
        self.pattern = pattern;
        self
    }

    /// Whether `data:` references are dropped before resolution
    pub fn exclude_data_uris(mut self, exclude: bool) -> Self {
        self.exclude_data_uris = exclude;
        self
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    pub fn pattern(&self) -> Option<&MatchPattern> {
        self.pattern.as_ref()
    }

    /// Extracts the links of one page
    ///
    /// `base_url` must be the URL the page was finally served from (after
    /// redirects) so relative references resolve the way a browser would.
    ///
    /// # Returns
    ///
    /// * `Ok(LinkSet)` - Matching links, possibly empty
    /// * `Err(SieveError::NotAnIndexPage)` - Directory-listing mode only: the
    ///   page title does not look like a listing
    pub fn extract(&self, markup: &str, base_url: &Url) -> Result<LinkSet, SieveError> {
        let document = Html::parse_document(markup);

        if self.mode == ExtractMode::DirectoryListing && !is_index_page(&document) {
            return Err(SieveError::NotAnIndexPage {
                url: base_url.to_string(),
            });
        }

        let mut links = LinkSet::new();
        for candidate in collect_candidates(&document, self.mode.link_kind()) {
            if self.mode == ExtractMode::DirectoryListing && is_listing_chrome(&candidate) {
                continue;
            }

            let Some(resolved) = resolve_link(&candidate.href, base_url, self.exclude_data_uris)
            else {
                continue;
            };

            if self.mode == ExtractMode::DirectoryListing
                && same_resource_path(&resolved, base_url)
            {
                continue;
            }

            let link = String::from(resolved);
            if let Some(pattern) = &self.pattern {
                if !pattern.matches(&link) {
                    continue;
                }
            }

            links.insert(link);
        }

        tracing::debug!(
            "Extracted {} {} from {}",
            links.len(),
            self.mode.label(),
            base_url
        );

        Ok(links)
    }
}

/// Extracts hyperlinks or image links from a page
///
/// Malformed markup never fails: whatever the HTML parser recovers is
/// scanned, and a page without qualifying elements gives an empty set.
///
/// # Example
///
/// ```
/// use link_sieve::crawler::{extract_links, LinkKind};
/// use url::Url;
///
/// let base = Url::parse("http://a.test/x/y").unwrap();
/// let links = extract_links(r#"<a href="/p">x</a>"#, &base, LinkKind::Anchor, None);
/// assert_eq!(links.into_vec(), vec!["http://a.test/p"]);
/// ```
pub fn extract_links(
    markup: &str,
    base_url: &Url,
    kind: LinkKind,
    pattern: Option<&MatchPattern>,
) -> LinkSet {
    let mode = match kind {
        LinkKind::Anchor => ExtractMode::Links,
        LinkKind::Image => ExtractMode::Images,
    };

    LinkExtractor::new(mode)
        .with_pattern(pattern.cloned())
        .extract(markup, base_url)
        .unwrap_or_default()
}

/// Extracts the entries of an "Index of" directory listing
///
/// Sort-column links (anything with a query), the column header labels,
/// parent-directory links and links back to the listing itself are dropped.
pub fn extract_index_links(
    markup: &str,
    base_url: &Url,
    pattern: Option<&MatchPattern>,
) -> Result<LinkSet, SieveError> {
    LinkExtractor::new(ExtractMode::DirectoryListing)
        .with_pattern(pattern.cloned())
        .extract(markup, base_url)
}

/// Extracts the page title from the HTML document
pub fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Checks the title for one of the directory-listing phrases
fn is_index_page(document: &Html) -> bool {
    extract_title(document)
        .map(|title| {
            let title = title.to_lowercase();
            INDEX_TITLE_PHRASES
                .iter()
                .any(|phrase| title.contains(phrase))
        })
        .unwrap_or(false)
}

/// Collects raw references of the requested kind in document order
fn collect_candidates(document: &Html, kind: LinkKind) -> Vec<LinkCandidate> {
    let (selector, attribute) = match kind {
        LinkKind::Anchor => ("a[href]", "href"),
        LinkKind::Image => ("img[src]", "src"),
    };

    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let value = element.value().attr(attribute)?;
            Some(LinkCandidate {
                href: value.trim().to_string(),
                text: element.text().collect::<String>().trim().to_string(),
                kind,
            })
        })
        .collect()
}

/// Directory-listing entries that are navigation rather than content
fn is_listing_chrome(candidate: &LinkCandidate) -> bool {
    let href = candidate.href.as_str();

    href.contains('?')
        || href == "../"
        || href == "/"
        || INDEX_COLUMN_LABELS.contains(&href)
        || INDEX_COLUMN_LABELS.contains(&candidate.text.as_str())
}

/// Resolves a reference to an absolute http(s) URL
///
/// Returns None if the reference should be excluded:
/// - empty, or a same-page `#fragment`
/// - `javascript:`, `mailto:`, `tel:` (and `data:` when requested)
/// - not resolvable against the base
/// - any scheme other than http/https after resolution
fn resolve_link(href: &str, base_url: &Url, exclude_data_uris: bool) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if let Some(scheme) = reference_scheme(href) {
        if NON_NETWORK_SCHEMES.contains(&scheme.as_str())
            || (exclude_data_uris && scheme == "data")
        {
            return None;
        }
    }

    match base_url.join(href) {
        Ok(absolute_url) if is_web_scheme(absolute_url.scheme()) => Some(absolute_url),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("Could not resolve '{}' against {}: {}", href, base_url, e);
            None
        }
    }
}

/// Lower-cased scheme of a reference, if it has one
fn reference_scheme(href: &str) -> Option<String> {
    let (scheme, _) = href.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}
