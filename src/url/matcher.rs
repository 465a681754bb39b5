use regex::{Regex, RegexBuilder};

/// Filter applied to resolved links
///
/// Both forms are case-insensitive. A regular expression that fails to
/// compile does not abort anything: it becomes [`MatchPattern::InvalidRegex`],
/// which matches no link at all.
#[derive(Debug, Clone)]
pub enum MatchPattern {
    /// Keep links whose case-folded form contains the (case-folded) needle
    Substring(String),
    /// Keep links the expression finds a match in
    Regex(Regex),
    /// An unparseable expression; nothing matches
    InvalidRegex { pattern: String, reason: String },
}

impl MatchPattern {
    /// Builds a pattern from user input
    ///
    /// Returns `None` for blank input, which means "keep every link".
    ///
    /// # Examples
    ///
    /// ```
    /// use link_sieve::url::MatchPattern;
    ///
    /// let pattern = MatchPattern::parse("Docs", false).unwrap();
    /// assert!(pattern.matches("http://a.test/docs/file"));
    ///
    /// let pattern = MatchPattern::parse(r"\.pdf$", true).unwrap();
    /// assert!(pattern.matches("http://a.test/REPORT.PDF"));
    /// assert!(!pattern.matches("http://a.test/report.pdf.html"));
    ///
    /// assert!(MatchPattern::parse("   ", false).is_none());
    /// ```
    pub fn parse(text: &str, use_regex: bool) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if !use_regex {
            return Some(Self::Substring(text.to_lowercase()));
        }

        let pattern = match RegexBuilder::new(text).case_insensitive(true).build() {
            Ok(regex) => Self::Regex(regex),
            Err(e) => {
                tracing::warn!("Invalid regular expression '{}': {}", text, e);
                Self::InvalidRegex {
                    pattern: text.to_string(),
                    reason: e.to_string(),
                }
            }
        };
        Some(pattern)
    }

    /// Checks a resolved link against the pattern
    pub fn matches(&self, link: &str) -> bool {
        match self {
            Self::Substring(needle) => link.to_lowercase().contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(link),
            Self::InvalidRegex { .. } => false,
        }
    }

    /// The pattern text as given (lower-cased for substrings)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Substring(needle) => needle,
            Self::Regex(regex) => regex.as_str(),
            Self::InvalidRegex { pattern, .. } => pattern,
        }
    }

    pub fn is_regex(&self) -> bool {
        !matches!(self, Self::Substring(_))
    }
}
