use std::collections::HashMap;
use std::convert::TryInto;
use std::fmt;
use std::io::Read;

use http::StatusCode;
use log::{debug, info};
use url::Url;

use crate::{AccessKey, ContentResponse, ExpectationHandler, Request, Response};

/// An inbound request could not be turned into a response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Cannot parse request target `{target}`")]
    InvalidTarget {
        target: String,
        #[source]
        source: http::uri::InvalidUri,
    },
    #[error("Failed to copy the body registered for `{key}` into the response")]
    BodyCopy {
        key: AccessKey,
        #[source]
        source: std::io::Error,
    },
}

/// An in-memory table of expected requests and the responses to send back for them.
///
/// Expectations and simulated errors are keyed by [`AccessKey`] - the uppercased method and the
/// absolute path. For every dispatched request the router:
/// 1. increments the access count for the request's key, whatever happens next;
/// 2. replies with the registered error for that key, if any;
/// 3. otherwise replies with the registered expectation, if any;
/// 4. otherwise replies with an empty `404 Not Found`.
///
/// Registering twice for the same key replaces the previous entry.
///
/// `ExpectationRouter` performs no synchronisation of its own: registration and dispatch take
/// `&mut self`. [`ExpectationServer`] wraps it in a lock to serve concurrent connections.
///
/// ```rust
/// use http_expect::{ExpectationRouter, Method, Request};
///
/// let mut router = ExpectationRouter::new();
/// router.expect("GET", "http://localhost:8080/widgets", 200, "[]");
/// router.register_error("GET", "/gadgets", 500, "boom");
///
/// let response = router.dispatch(&Request::new(Method::GET, "/widgets")).unwrap();
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body_string(), "[]");
///
/// let response = router.dispatch(&Request::new(Method::GET, "/gadgets")).unwrap();
/// assert_eq!(response.status(), 500);
/// assert_eq!(response.body_string(), "boom");
///
/// let response = router.dispatch(&Request::new(Method::GET, "/missing")).unwrap();
/// assert_eq!(response.status(), 404);
///
/// assert_eq!(router.accesses_for("/widgets"), Some(1));
/// assert_eq!(router.accesses_for("/never-called"), None);
/// ```
///
/// [`ExpectationServer`]: crate::ExpectationServer
pub struct ExpectationRouter {
    base_resource: String,
    expectations: HashMap<AccessKey, ContentResponse>,
    errors: HashMap<AccessKey, ContentResponse>,
    accesses_by_path: HashMap<AccessKey, u64>,
}

impl Default for ExpectationRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpectationRouter {
    /// A router whose base resource is `/`.
    pub fn new() -> Self {
        Self::with_base_resource("/")
    }

    /// A router serving under `base_resource`. A leading `/` is added if missing.
    pub fn with_base_resource(base_resource: impl Into<String>) -> Self {
        let mut base_resource = base_resource.into();
        if !base_resource.starts_with('/') {
            base_resource.insert(0, '/');
        }
        Self {
            base_resource,
            expectations: HashMap::new(),
            errors: HashMap::new(),
            accesses_by_path: HashMap::new(),
        }
    }

    pub fn base_resource(&self) -> &str {
        &self.base_resource
    }

    pub fn access_key(method: impl AsRef<str>, path: impl AsRef<str>) -> AccessKey {
        AccessKey::new(method, path)
    }

    /// How many requests were dispatched for each key so far.
    pub fn accesses_by_path(&self) -> &HashMap<AccessKey, u64> {
        &self.accesses_by_path
    }

    pub fn registered_errors(&self) -> &HashMap<AccessKey, ContentResponse> {
        &self.errors
    }

    pub fn expectations(&self) -> &HashMap<AccessKey, ContentResponse> {
        &self.expectations
    }

    /// Number of `GET` requests dispatched for `path`.
    ///
    /// `None` if no such request was ever dispatched.
    pub fn accesses_for(&self, path: &str) -> Option<u64> {
        self.accesses_for_method("GET", path)
    }

    pub fn accesses_for_method(&self, method: impl AsRef<str>, path: &str) -> Option<u64> {
        self.accesses_by_path
            .get(&AccessKey::new(method, path))
            .copied()
    }

    /// Simulate a server-side failure: requests matching `method` and `url` get `status` back,
    /// with `body` as error message.
    ///
    /// `url` can either be an absolute URL - only its path is used - or a path, used as-is.
    pub fn register_error<S>(
        &mut self,
        method: impl AsRef<str>,
        url: &str,
        status: S,
        body: impl Into<String>,
    ) where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let path = registration_path(url);
        self.register_error_response(ContentResponse::text(method, path, status, body));
    }

    /// Same as [`register_error`](Self::register_error), without an error message.
    pub fn register_error_status<S>(&mut self, method: impl AsRef<str>, url: &str, status: S)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let path = registration_path(url);
        self.register_error_response(ContentResponse::status(method, path, status));
    }

    /// Register a prepared error reply under its own method and path.
    pub fn register_error_response(&mut self, error: ContentResponse) {
        let key = AccessKey::new(error.method(), error.path());
        info!("Registering error: {}", error);
        self.errors.insert(key, error);
    }

    /// Reply to requests matching `method` and `url` with `status` and a text `body`.
    ///
    /// `url` can either be an absolute URL - only its path is used - or a path, used as-is.
    pub fn expect<S>(
        &mut self,
        method: impl AsRef<str>,
        url: &str,
        status: S,
        body: impl Into<String>,
    ) where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let path = registration_path(url);
        self.expect_response(ContentResponse::text(method, path, status, body));
    }

    /// Reply to requests matching `method` and `url` with `status` and a body read from `body`.
    ///
    /// See [`BodyStream`](crate::BodyStream) for how the reader is consumed.
    pub fn expect_stream<S, R>(&mut self, method: impl AsRef<str>, url: &str, status: S, body: R)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
        R: Read + Send + 'static,
    {
        let path = registration_path(url);
        self.expect_response(ContentResponse::stream(method, path, status, body));
    }

    /// Reply to requests matching `method` and `url` with a bare `status`.
    pub fn expect_status<S>(&mut self, method: impl AsRef<str>, url: &str, status: S)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let path = registration_path(url);
        self.expect_response(ContentResponse::status(method, path, status));
    }

    /// Let `handler` build the response for requests matching `method` and `url`.
    pub fn expect_handler<H>(&mut self, method: impl AsRef<str>, url: &str, handler: H)
    where
        H: ExpectationHandler + 'static,
    {
        let path = registration_path(url);
        self.expect_response(ContentResponse::handler(method, path, handler));
    }

    /// Register a prepared reply under its own method and path.
    pub fn expect_response(&mut self, expectation: ContentResponse) {
        let key = AccessKey::new(expectation.method(), expectation.path());
        info!("Registering expectation: {}", expectation);
        self.expectations.insert(key, expectation);
    }

    /// Forget every expectation, error and access count.
    pub fn reset(&mut self) {
        self.expectations.clear();
        self.errors.clear();
        self.accesses_by_path.clear();
    }

    /// Build the response for an inbound request.
    ///
    /// Fails if the request target cannot be parsed, or if copying a registered body stream
    /// fails midway.
    pub fn dispatch(&mut self, request: &Request) -> Result<Response, DispatchError> {
        let path = request.path()?;
        let key = AccessKey::new(&request.method, &path);
        debug!("Looking up expectation for: {}", key);

        *self.accesses_by_path.entry(key.clone()).or_insert(0) += 1;

        let mut response = Response::default();
        if let Some(registered_error) = self.errors.get(&key) {
            info!("Returning registered error: {}", registered_error);
            registered_error
                .respond_with_error(request, &mut response)
                .map_err(|source| DispatchError::BodyCopy { key, source })?;
        } else if let Some(expectation) = self.expectations.get(&key) {
            info!("Responding via registered expectation: {}", expectation);
            expectation
                .respond(request, &mut response)
                .map_err(|source| DispatchError::BodyCopy { key, source })?;
        } else {
            debug!("No expectation registered for: {}", key);
            response.set_status(StatusCode::NOT_FOUND);
        }
        Ok(response)
    }
}

/// Where a registered URL's path came from.
enum RegistrationPath<'a> {
    /// The input parsed as an absolute URL with a host: this is its path component, with dot
    /// segments resolved.
    Parsed(String),
    /// The input is not an absolute URL with a host (e.g. `/foo/bar`) and is used as the path,
    /// as typed.
    Verbatim(&'a str),
}

impl<'a> RegistrationPath<'a> {
    fn parse(url: &'a str) -> Self {
        match Url::parse(url) {
            // `localhost:8080/widgets` parses with a `localhost` scheme and no host.
            Ok(parsed) if parsed.has_host() => RegistrationPath::Parsed(parsed.path().to_owned()),
            _ => RegistrationPath::Verbatim(url),
        }
    }

    fn into_path(self) -> String {
        match self {
            RegistrationPath::Parsed(path) => path,
            RegistrationPath::Verbatim(path) => path.to_owned(),
        }
    }
}

pub(crate) fn registration_path(url: &str) -> String {
    RegistrationPath::parse(url).into_path()
}
