//! The addressable location of the preview page.
//!
//! A [`PageLocation`] is the fragment/path/query triple the preview's router
//! uses to identify page state. It is the sync channel between the page and
//! the agent: the locator reads the slide index out of it, and the navigation
//! planner produces a mutated copy of it to move the preview.
//!
//! Only the structure matters here — this type never touches a browser or a
//! socket. The host page implementation decides how a `PageLocation` maps to
//! whatever location mechanism it actually has.

use std::fmt;

/// The fragment/path/query triple identifying preview page state.
///
/// Invariants maintained by every constructor:
///
/// - `path` is non-empty and starts with `/`.
/// - `query` and `fragment` are stored without their `?`/`#` delimiters, and
///   an empty string normalizes to `None` (a bare trailing `#` or `?` carries
///   no state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl PageLocation {
    /// The location of a preview that has not navigated anywhere: path `/`,
    /// no query, no fragment.
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: None,
            fragment: None,
        }
    }

    /// Parses a location from a full URL or a bare href.
    ///
    /// Accepts `http://localhost:3030/12#5`, `/12#5`, `?slide=4`, or any
    /// suffix of those shapes. A scheme-and-authority prefix (`scheme://host`)
    /// is stripped; everything else splits on the first `#` (fragment) and
    /// then the first `?` (query). Parsing never fails — an empty input is
    /// the root location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slidesync_core::PageLocation;
    ///
    /// let loc = PageLocation::parse("http://localhost:3030/deck?slide=4#9");
    /// assert_eq!(loc.path(), "/deck");
    /// assert_eq!(loc.query(), Some("slide=4"));
    /// assert_eq!(loc.fragment(), Some("9"));
    /// ```
    pub fn parse(input: &str) -> Self {
        // Strip "scheme://authority" when present; the location proper starts
        // at the first of `/`, `?`, or `#` after the authority.
        let rest = match input.find("://") {
            Some(idx) => {
                let after_scheme = &input[idx + 3..];
                match after_scheme.find(['/', '?', '#']) {
                    Some(start) => &after_scheme[start..],
                    None => "",
                }
            }
            None => input,
        };

        // The fragment is everything after the first `#`, including any
        // further `#` characters.
        let (rest, fragment) = match rest.split_once('#') {
            Some((before, frag)) => (before, Some(frag)),
            None => (rest, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((before, q)) => (before, Some(q)),
            None => (rest, None),
        };

        Self::root()
            .with_path(path)
            .with_query(query.unwrap_or_default())
            .with_fragment(fragment.unwrap_or_default())
    }

    /// The path component. Always non-empty, always `/`-prefixed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query string without its leading `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The fragment without its leading `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The raw value of the first query parameter named `name`.
    ///
    /// No percent-decoding is applied; the sync protocol only ever reads
    /// digit runs out of the value.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }

    /// Returns the location with `path` replaced (normalized to be non-empty
    /// and `/`-prefixed). Query and fragment are kept.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// Returns the location with `query` replaced; an empty string clears it.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    /// Returns the location with `fragment` replaced; an empty string clears
    /// it.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        self.fragment = (!fragment.is_empty()).then_some(fragment);
        self
    }

    /// The href form: `path[?query][#fragment]`.
    pub fn href(&self) -> String {
        let mut href = self.path.clone();
        if let Some(query) = &self.query {
            href.push('?');
            href.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            href.push('#');
            href.push_str(fragment);
        }
        href
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
