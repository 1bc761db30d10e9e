use crate::request::{BodyPrintLimit, BODY_PRINT_LIMIT};
use crate::server::bare_server::{BareExpectationServer, RequestRecording};
use crate::server::exposed_server::InnerServer;
use crate::{ExpectationRouter, ExpectationServer};
use std::env;
use std::net::TcpListener;

/// A builder providing a fluent API to assemble an [`ExpectationServer`] step-by-step.
/// Use [`ExpectationServer::builder`] to get started.
pub struct ExpectationServerBuilder {
    listener: Option<TcpListener>,
    base_resource: Option<String>,
    record_incoming_requests: bool,
    body_print_limit: BodyPrintLimit,
}

impl ExpectationServerBuilder {
    pub(super) fn new() -> Self {
        let body_print_limit = match env::var("HTTP_EXPECT_BODY_PRINT_LIMIT")
            .ok()
            .and_then(|x| x.parse::<usize>().ok())
        {
            Some(limit) => BodyPrintLimit::Limited(limit),
            None => BodyPrintLimit::Limited(BODY_PRINT_LIMIT),
        };
        Self {
            listener: None,
            base_resource: None,
            record_incoming_requests: true,
            body_print_limit,
        }
    }

    /// Each instance of [`ExpectationServer`] is, by default, running on a random
    /// port available on your local machine.
    /// With `ExpectationServerBuilder::listener` you can choose to start the server
    /// on a specific port you have already bound.
    ///
    /// ### Example:
    /// ```rust
    /// use http_expect::ExpectationServer;
    ///
    /// #[async_std::main]
    /// async fn main() {
    ///     // Arrange
    ///     let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    ///     let expected_server_address = listener
    ///         .local_addr()
    ///         .expect("Failed to get server address.");
    ///
    ///     // Act
    ///     let server = ExpectationServer::builder().listener(listener).start().await;
    ///
    ///     // Assert
    ///     assert_eq!(&expected_server_address, server.address());
    /// }
    /// ```
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The root path the server is meant to be reached under, e.g. `/api`.
    ///
    /// A leading `/` is added if missing; it defaults to `/`. The base resource is used by
    /// [`ExpectationServer::format_url`] and [`ExpectationServer::format_path`]: requests are
    /// routed regardless of it.
    pub fn base_resource(mut self, base_resource: impl Into<String>) -> Self {
        self.base_resource = Some(base_resource.into());
        self
    }

    /// By default, [`ExpectationServer`] records all incoming requests - see
    /// [`ExpectationServer::received_requests`].
    ///
    /// This can sometimes be undesirable (e.g. a long-lived server serving
    /// high volumes of traffic) - you can disable request recording using
    /// `ExpectationServerBuilder::disable_request_recording`.
    ///
    /// ### Example (Request recording disabled):
    ///
    /// ```rust
    /// use http_expect::ExpectationServer;
    ///
    /// #[async_std::main]
    /// async fn main() {
    ///     // Arrange
    ///     let server = ExpectationServer::builder().disable_request_recording().start().await;
    ///
    ///     // Act
    ///     let received_requests = server.received_requests().await;
    ///
    ///     // Assert
    ///     assert!(received_requests.is_none());
    /// }
    /// ```
    pub fn disable_request_recording(mut self) -> Self {
        self.record_incoming_requests = false;
        self
    }

    /// The server logs every request it receives, at `debug` level.
    /// By default, the size of the printed body is limited.
    ///
    /// You may want to change this if you're working with services with very large
    /// bodies. You can configure this limit with `ExpectationServerBuilder::body_print_limit`,
    /// or with the `HTTP_EXPECT_BODY_PRINT_LIMIT` environment variable.
    pub fn body_print_limit(mut self, limit: BodyPrintLimit) -> Self {
        self.body_print_limit = limit;
        self
    }

    /// Finalise the builder to get an instance of a [`BareExpectationServer`].
    pub(super) async fn build_bare(self) -> BareExpectationServer {
        let listener = if let Some(listener) = self.listener {
            listener
        } else {
            TcpListener::bind("127.0.0.1:0").expect("Failed to bind an OS port for a server.")
        };
        let router = match self.base_resource {
            Some(base_resource) => ExpectationRouter::with_base_resource(base_resource),
            None => ExpectationRouter::new(),
        };
        let recording = if self.record_incoming_requests {
            RequestRecording::Enabled
        } else {
            RequestRecording::Disabled
        };
        BareExpectationServer::start(listener, router, recording, self.body_print_limit).await
    }

    /// Finalise the builder and launch the [`ExpectationServer`] instance!
    pub async fn start(self) -> ExpectationServer {
        ExpectationServer::new(InnerServer::Bare(self.build_bare().await))
    }
}
