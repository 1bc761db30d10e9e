//! Helpers to assemble the URLs your client under test should call.
//!
//! [`build_url`] and [`UrlBuilder`] join a base URL, an optional base path and a list of path
//! segments with exactly one `/` between each of them, then append the query parameters.
//!
//! ```rust
//! use http_expect::urls::{build_url, UrlBuilder};
//!
//! let url = build_url("http://x.test", &["/a/", "/b", "c/"]).unwrap();
//! assert_eq!(url, "http://x.test/a/b/c/");
//!
//! let url = UrlBuilder::new("http://x.test")
//!     .query_param("q", "1")
//!     .part("search")
//!     .build()
//!     .unwrap();
//! assert_eq!(url, "http://x.test/search?q=1");
//! ```
use std::fmt::Display;
use url::Url;

/// The assembled string is not a structurally valid URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("`{url}` is not a valid URL: {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Join `base_url` and `parts` into a single URL.
///
/// If `parts` is empty `base_url` is returned verbatim, without any validation.
///
/// If the first part already starts with `base_url` (i.e. it is an absolute URL pointing to the
/// same server) the base URL is not repeated.
pub fn build_url<S: AsRef<str>>(base_url: &str, parts: &[S]) -> Result<String, UrlError> {
    UrlBuilder::new(base_url).parts(parts).build()
}

/// Wrap the string representation of `value` in percent-encoded double quotes (`%22`).
///
/// This is *not* a general purpose percent-encoder: the rest of the value is left untouched.
///
/// ```rust
/// use http_expect::urls::string_query_parameter;
///
/// assert_eq!(string_query_parameter("foo"), "%22foo%22");
/// assert_eq!(string_query_parameter(42), "%2242%22");
/// ```
pub fn string_query_parameter<T: Display>(value: T) -> String {
    format!("%22{}%22", value)
}

/// A fluent API to assemble a URL step-by-step.
///
/// Query parameters are serialised in the order they were added. Values are not
/// percent-encoded: pre-encode them if needed (see [`string_query_parameter`]).
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
    base_path: Option<String>,
    query_params: Vec<(String, String)>,
    parts: Vec<String>,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_path: None,
            query_params: Vec::new(),
            parts: Vec::new(),
        }
    }

    /// A base path, appended as a segment only when it is blank or a lone `/`.
    ///
    /// Such a base path never adds anything to the URL: any other value is ignored too.
    /// Prefix the path parts instead to insert a path between the base URL and the parts.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Append every `(key, value)` pair, in iteration order.
    ///
    /// Pass a `BTreeMap` (or a slice) if you need a stable order across calls.
    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn part(mut self, part: impl Into<String>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn parts<S: AsRef<str>>(mut self, parts: &[S]) -> Self {
        self.parts
            .extend(parts.iter().map(|part| part.as_ref().to_owned()));
        self
    }

    /// Assemble and validate the URL.
    pub fn build(self) -> Result<String, UrlError> {
        let Some(first_part) = self.parts.first() else {
            return Ok(self.base_url);
        };

        let mut url = String::new();
        if !first_part.starts_with(&self.base_url) {
            url.push_str(&self.base_url);
        }
        if let Some(base_path) = self.base_path.as_deref().filter(|p| is_root_segment(p)) {
            append_segment(&mut url, base_path);
        }
        for part in &self.parts {
            append_segment(&mut url, part);
        }

        if !self.query_params.is_empty() {
            url.push('?');
            let query = self
                .query_params
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("&");
            url.push_str(&query);
        }

        match Url::parse(&url) {
            Ok(_) => Ok(url),
            Err(source) => Err(UrlError::Malformed { url, source }),
        }
    }
}

fn is_root_segment(segment: &str) -> bool {
    let trimmed = segment.trim();
    trimmed.is_empty() || trimmed == "/"
}

/// Append `segment` to `buffer`, making sure exactly one `/` separates them.
///
/// Blank segments and a lone `/` are skipped altogether.
pub(crate) fn append_segment(buffer: &mut String, segment: &str) {
    if is_root_segment(segment) {
        return;
    }

    let segment = segment.strip_prefix('/').unwrap_or(segment);
    if !buffer.is_empty() && !buffer.ends_with('/') {
        buffer.push('/');
    }
    buffer.push_str(segment);
}
