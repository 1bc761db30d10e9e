use crate::router::registration_path;
use crate::server::bare_server::BareExpectationServer;
use crate::server::pool::{get_pooled_server, PooledExpectationServer};
use crate::server::ExpectationServerBuilder;
use crate::urls::{append_segment, UrlBuilder, UrlError};
use crate::{AccessKey, ContentResponse, ExpectationHandler, Request};
use http::StatusCode;
use std::collections::HashMap;
use std::convert::TryInto;
use std::fmt;
use std::io::Read;
use std::net::SocketAddr;
use std::ops::Deref;

/// An HTTP web-server running in the background, replying to your client under test with the
/// responses - or the errors - you registered, and counting how many times each path was hit.
///
/// Each instance of `ExpectationServer` is fully isolated: [`ExpectationServer::start`] takes
/// care of finding a random port available on your local machine which is assigned to the new
/// `ExpectationServer`.
///
/// You can use [`ExpectationServer::builder`] if you need to specify custom configuration - e.g.
/// run on a specific port, under a base resource, or disable request recording.
///
/// ## Best practices
///
/// You should use one instance of `ExpectationServer` for each HTTP API that your application
/// interacts with and needs faking for testing purposes.
///
/// To ensure full isolation and no cross-test interference, servers shouldn't be
/// shared between tests. Instead, they should be created in the test where they are used.
///
/// ### Example:
/// ```rust
/// use http_expect::ExpectationServer;
///
/// #[async_std::main]
/// async fn main() {
///     // Arrange
///     let server = ExpectationServer::start().await;
///     let url = server.format_url(&["widgets", "42"]).unwrap();
///     server.expect("GET", &url, 200, r#"{"id": 42}"#).await;
///
///     // Act
///     let response = reqwest::get(&url).await.unwrap();
///
///     // Assert
///     assert_eq!(response.status(), 200);
///     assert_eq!(response.text().await.unwrap(), r#"{"id": 42}"#);
///     assert_eq!(server.accesses_for("/widgets/42").await, Some(1));
/// }
/// ```
pub struct ExpectationServer(InnerServer);

/// `ExpectationServer` is either a wrapper around a `BareExpectationServer` retrieved from an
/// object pool or a wrapper around an exclusive `BareExpectationServer`.
/// We use the pool when the user does not care about the configuration of the server, while
/// we provision a dedicated one if they customise it through the builder.
///
/// `InnerServer` implements `Deref<Target=BareExpectationServer>`, so we never actually have to
/// match on `InnerServer` in `ExpectationServer`.
pub(super) enum InnerServer {
    Bare(BareExpectationServer),
    Pooled(PooledExpectationServer),
}

impl Deref for InnerServer {
    type Target = BareExpectationServer;

    fn deref(&self) -> &Self::Target {
        match self {
            InnerServer::Bare(b) => b,
            InnerServer::Pooled(p) => p.deref(),
        }
    }
}

impl ExpectationServer {
    pub(super) fn new(server: InnerServer) -> Self {
        Self(server)
    }

    /// You can use `ExpectationServer::builder` if you need to specify custom configuration -
    /// e.g. run on a specific port or under a base resource.
    ///
    /// If this is not your case, use [`ExpectationServer::start`].
    pub fn builder() -> ExpectationServerBuilder {
        ExpectationServerBuilder::new()
    }

    /// Start a new instance of an `ExpectationServer` listening on a random port, with `/` as
    /// base resource.
    pub async fn start() -> Self {
        Self(InnerServer::Pooled(get_pooled_server().await))
    }

    /// Reply to `method` requests for `url` with `status` and a text `body`.
    ///
    /// `url` can be an absolute URL (e.g. built with [`format_url`](Self::format_url)) or a path.
    pub async fn expect<S>(
        &self,
        method: impl AsRef<str>,
        url: &str,
        status: S,
        body: impl Into<String>,
    ) where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let expectation = ContentResponse::text(method, registration_path(url), status, body);
        self.expect_response(expectation).await
    }

    /// Reply to `method` requests for `url` with `status` and a body copied from `body`.
    pub async fn expect_stream<S, R>(&self, method: impl AsRef<str>, url: &str, status: S, body: R)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
        R: Read + Send + 'static,
    {
        let expectation = ContentResponse::stream(method, registration_path(url), status, body);
        self.expect_response(expectation).await
    }

    /// Reply to `method` requests for `url` with a bare `status`.
    pub async fn expect_status<S>(&self, method: impl AsRef<str>, url: &str, status: S)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let expectation = ContentResponse::status(method, registration_path(url), status);
        self.expect_response(expectation).await
    }

    /// Let `handler` build the response for `method` requests to `url`.
    pub async fn expect_handler<H>(&self, method: impl AsRef<str>, url: &str, handler: H)
    where
        H: ExpectationHandler + 'static,
    {
        let expectation = ContentResponse::handler(method, registration_path(url), handler);
        self.expect_response(expectation).await
    }

    pub async fn expect_response(&self, expectation: ContentResponse) {
        self.0
            .with_router(|router| router.expect_response(expectation))
            .await
    }

    /// Simulate a server-side failure for `method` requests to `url`.
    pub async fn register_error<S>(
        &self,
        method: impl AsRef<str>,
        url: &str,
        status: S,
        body: impl Into<String>,
    ) where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let error = ContentResponse::text(method, registration_path(url), status, body);
        self.register_error_response(error).await
    }

    pub async fn register_error_status<S>(&self, method: impl AsRef<str>, url: &str, status: S)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let error = ContentResponse::status(method, registration_path(url), status);
        self.register_error_response(error).await
    }

    pub async fn register_error_response(&self, error: ContentResponse) {
        self.0
            .with_router(|router| router.register_error_response(error))
            .await
    }

    /// Number of `GET` requests received for `path`, `None` if there was none.
    pub async fn accesses_for(&self, path: &str) -> Option<u64> {
        self.0
            .inspect_router(|router| router.accesses_for(path))
            .await
    }

    pub async fn accesses_for_method(&self, method: impl AsRef<str>, path: &str) -> Option<u64> {
        self.0
            .inspect_router(|router| router.accesses_for_method(method, path))
            .await
    }

    /// A snapshot of the access counts, by [`AccessKey`].
    pub async fn accesses_by_path(&self) -> HashMap<AccessKey, u64> {
        self.0
            .inspect_router(|router| router.accesses_by_path().clone())
            .await
    }

    /// A snapshot of the registered errors, by [`AccessKey`].
    pub async fn registered_errors(&self) -> HashMap<AccessKey, ContentResponse> {
        self.0
            .inspect_router(|router| router.registered_errors().clone())
            .await
    }

    /// Drop all expectations, errors and access counts from this server.
    /// It also deletes all recorded requests.
    pub async fn reset(&self) {
        self.0.reset().await
    }

    /// Return a vector with all the requests received by the `ExpectationServer` since it
    /// started (or since the last [`reset`](Self::reset)).
    ///
    /// If request recording has been disabled using
    /// [`ExpectationServerBuilder::disable_request_recording`], it returns `None`.
    pub async fn received_requests(&self) -> Option<Vec<Request>> {
        self.0.received_requests().await
    }

    pub fn base_resource(&self) -> &str {
        self.0.base_resource()
    }

    /// Return the base uri of this running instance of `ExpectationServer`, e.g.
    /// `http://127.0.0.1:4372`.
    pub fn uri(&self) -> String {
        self.0.uri()
    }

    /// Return the socket address of this running instance of `ExpectationServer`, e.g.
    /// `127.0.0.1:4372`.
    pub fn address(&self) -> &SocketAddr {
        self.0.address()
    }

    pub fn port(&self) -> u16 {
        self.0.address().port()
    }

    /// The absolute URL of `parts` on this server, under its base resource.
    pub fn format_url<S: AsRef<str>>(&self, parts: &[S]) -> Result<String, UrlError> {
        let uri = self.uri();
        let builder = match parts.first() {
            // An absolute first part pointing to this server already carries the base resource.
            Some(first) if !first.as_ref().starts_with(&uri) => {
                UrlBuilder::new(&uri).part(self.base_resource())
            }
            _ => UrlBuilder::new(&uri),
        };
        builder.parts(parts).build()
    }

    /// The absolute path of `parts` on this server, under its base resource.
    pub fn format_path<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let mut path = String::from("/");
        append_segment(&mut path, self.base_resource());
        for part in parts {
            append_segment(&mut path, part.as_ref());
        }
        path
    }
}
