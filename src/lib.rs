//! `http_expect` is a lightweight test double for HTTP interactions: register the responses
//! (or the errors) your client under test should get back for a method and a path, serve them,
//! then check how many times each endpoint was hit.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Dispatch rules](#dispatch-rules)
//! 3. [Simulating failures](#simulating-failures)
//! 4. [Building URLs](#building-urls)
//! 5. [Without a server](#without-a-server)
//! 6. [Runtime compatibility](#runtime-compatibility)
//!
//! ## Getting started
//! ```rust
//! use http_expect::ExpectationServer;
//!
//! #[async_std::main]
//! async fn main() {
//!     // Start a background HTTP server on a random local port
//!     let server = ExpectationServer::start().await;
//!
//!     // Arrange the behaviour of the server: when it receives a GET request on '/hello'
//!     // it will respond with a 200 and a greeting.
//!     server.expect("GET", "/hello", 200, "world").await;
//!
//!     // If we probe the server using any HTTP client it behaves as expected.
//!     let response = reqwest::get(format!("{}/hello", &server.uri())).await.unwrap();
//!     assert_eq!(response.status(), 200);
//!     assert_eq!(response.text().await.unwrap(), "world");
//!
//!     // If the request doesn't match any expectation a 404 is returned.
//!     let status = reqwest::get(format!("{}/missing", &server.uri()))
//!         .await
//!         .unwrap()
//!         .status();
//!     assert_eq!(status, 404);
//!
//!     // Every request is counted, whatever it was answered with.
//!     assert_eq!(server.accesses_for("/hello").await, Some(1));
//!     assert_eq!(server.accesses_for("/missing").await, Some(1));
//!     assert_eq!(server.accesses_for("/never-called").await, None);
//! }
//! ```
//!
//! ## Dispatch rules
//!
//! Expectations are keyed by [`AccessKey`]: the uppercased method and the absolute path of the
//! request (`GET /hello`). Registering twice for the same key replaces the previous entry.
//!
//! For each request:
//! 1. the access count for its key is incremented;
//! 2. a registered error for the key, if any, is returned;
//! 3. otherwise a registered expectation for the key, if any, is returned;
//! 4. otherwise the server replies `404 Not Found` with an empty body.
//!
//! An expectation can be a text body, a byte stream, a bare status code or a custom
//! [`ExpectationHandler`] taking full control of the [`Response`].
//!
//! ## Simulating failures
//!
//! Registered errors take priority over expectations for the same key:
//! ```rust
//! use http_expect::ExpectationServer;
//!
//! #[async_std::main]
//! async fn main() {
//!     let server = ExpectationServer::start().await;
//!     server.expect("GET", "/widgets", 200, "[]").await;
//!     server.register_error("GET", "/widgets", 503, "try again later").await;
//!
//!     let response = reqwest::get(format!("{}/widgets", &server.uri())).await.unwrap();
//!     assert_eq!(response.status(), 503);
//!     assert_eq!(response.text().await.unwrap(), "try again later");
//! }
//! ```
//!
//! ## Building URLs
//!
//! The [`urls`] module assembles base URLs, base paths, path segments and query parameters
//! without doubled or missing slashes. [`ExpectationServer::format_url`] uses it to point at
//! the running server.
//!
//! ## Without a server
//!
//! [`ExpectationRouter`] holds all the bookkeeping and can be driven directly, e.g. from an HTTP
//! server of your own, by passing it a [`Request`] for each inbound request.
//!
//! ## Runtime compatibility
//!
//! The server runs on its own thread, with its own `tokio` runtime: `http_expect` can be used
//! (and it is tested to work) with `async_std`, `tokio` and `actix-rt` as futures runtimes.
mod access_key;
mod content_response;
mod handler;
pub mod http;
mod request;
mod response;
mod router;
mod server;
pub mod urls;

pub use crate::http::Method;
pub use access_key::AccessKey;
pub use content_response::{BodyStream, ContentResponse, Reply};
pub use handler::ExpectationHandler;
pub use request::{BodyPrintLimit, Request};
pub use response::Response;
pub use router::{DispatchError, ExpectationRouter};
pub use server::{ExpectationServer, ExpectationServerBuilder};
