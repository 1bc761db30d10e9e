use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::DispatchError;

pub const BODY_PRINT_LIMIT: usize = 10_000;

/// Specifies limitations on printing request bodies when logging requests. For some servers
/// the bodies may be too large to reasonably print and it may be desirable to limit them.
#[derive(Debug, Copy, Clone)]
pub enum BodyPrintLimit {
    /// Maximum length of a body to print in bytes.
    Limited(usize),
    /// There is no limit to the size of a body that may be printed.
    Unlimited,
}

/// An incoming request, as seen by an [`ExpectationRouter`].
///
/// Handlers registered with [`expect_handler`] get an immutable reference to the `Request`
/// that triggered them.
///
/// The request target is kept as it arrived on the wire: it is only parsed when the router
/// derives the access key, so that a malformed target surfaces as a [`DispatchError`].
///
/// [`ExpectationRouter`]: crate::ExpectationRouter
/// [`expect_handler`]: crate::ExpectationRouter::expect_handler
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// The raw request-target, e.g. `/widgets?colour=red`.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request by hand, e.g. to drive an [`ExpectationRouter`] without a server.
    ///
    /// [`ExpectationRouter`]: crate::ExpectationRouter
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The absolute path of the request target, including its leading `/`.
    ///
    /// Fails if the target cannot be parsed as a URI.
    pub fn path(&self) -> Result<String, DispatchError> {
        let uri = self
            .target
            .parse::<Uri>()
            .map_err(|source| DispatchError::InvalidTarget {
                target: self.target.clone(),
                source,
            })?;
        Ok(uri.path().to_owned())
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub(crate) async fn from_hyper(
        request: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Request, hyper::Error> {
        let (parts, body) = request.into_parts();
        let body = body.collect().await?.to_bytes();

        Ok(Self {
            method: parts.method,
            target: parts.uri.to_string(),
            headers: parts.headers,
            body: body.to_vec(),
        })
    }

    pub(crate) fn print_with_limit(
        &self,
        mut buffer: impl fmt::Write,
        body_print_limit: BodyPrintLimit,
    ) -> fmt::Result {
        writeln!(buffer, "{} {}", self.method, self.target)?;
        for name in self.headers.keys() {
            let values = self
                .headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect::<Vec<_>>();
            let values = values.join(",");
            writeln!(buffer, "{}: {}", name, values)?;
        }

        match body_print_limit {
            BodyPrintLimit::Limited(limit) if self.body.len() > limit => {
                // Back off a few bytes at most to avoid cutting a multi-byte character in half.
                let truncated = (limit.saturating_sub(3)..=limit)
                    .rev()
                    .find_map(|end_byte| std::str::from_utf8(&self.body[..end_byte]).ok());
                match truncated {
                    Some(truncated) => {
                        writeln!(buffer, "{}", truncated)?;
                        writeln!(
                            buffer,
                            "We truncated the body because it was too large: {} bytes (limit: {} bytes)",
                            self.body.len(),
                            limit
                        )?;
                        writeln!(
                            buffer,
                            "Increase this limit by setting `HTTP_EXPECT_BODY_PRINT_LIMIT`, or calling `ExpectationServerBuilder::body_print_limit` when building your ExpectationServer instance"
                        )
                    }
                    None => writeln!(
                        buffer,
                        "Body is likely binary (invalid utf-8) size is {} bytes",
                        self.body.len()
                    ),
                }
            }
            _ => {
                if let Ok(body) = std::str::from_utf8(&self.body) {
                    writeln!(buffer, "{}", body)
                } else {
                    writeln!(
                        buffer,
                        "Body is likely binary (invalid utf-8) size is {} bytes",
                        self.body.len()
                    )
                }
            }
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print_with_limit(f, BodyPrintLimit::Unlimited)
    }
}
