use crate::{Request, Response};

/// Anything that implements `ExpectationHandler` can take full control of the response sent
/// back for a registered path.
///
/// The router does not interpret what the handler does: status, headers and body are entirely
/// up to it.
///
/// ## Closures
///
/// Closures taking a reference to the [`Request`] and a mutable reference to the [`Response`]
/// implement `ExpectationHandler` out of the box - e.g. to echo the request body back:
///
/// ```rust
/// use http_expect::{ExpectationRouter, Method, Request, Response};
///
/// let mut router = ExpectationRouter::new();
/// router.expect_handler("POST", "/echo", |request: &Request, response: &mut Response| {
///     response.set_status(201);
///     response.write_bytes(&request.body);
/// });
///
/// let request = Request::new(Method::POST, "/echo").with_body("ping");
/// let response = router.dispatch(&request).unwrap();
///
/// assert_eq!(response.status(), 201);
/// assert_eq!(response.body_string(), "ping");
/// ```
///
/// ## Stateful handlers
///
/// You can also implement the trait on your own types, e.g. to answer differently depending on
/// a request header:
///
/// ```rust
/// use http_expect::{ExpectationHandler, ExpectationRouter, Method, Request, Response};
/// use http_expect::http::{HeaderName, HeaderValue, StatusCode};
///
/// struct Authenticated(&'static str);
///
/// impl ExpectationHandler for Authenticated {
///     fn handle(&self, request: &Request, response: &mut Response) {
///         match request.headers.get("authorization") {
///             Some(token) if token == self.0 => response.write_str("welcome"),
///             _ => response.send_error(StatusCode::UNAUTHORIZED, None),
///         }
///     }
/// }
///
/// let mut router = ExpectationRouter::new();
/// router.expect_handler("GET", "/private", Authenticated("secret"));
///
/// let anonymous = Request::new(Method::GET, "/private");
/// assert_eq!(router.dispatch(&anonymous).unwrap().status(), 401);
///
/// let known = Request::new(Method::GET, "/private")
///     .with_header(HeaderName::from_static("authorization"), HeaderValue::from_static("secret"));
/// assert_eq!(router.dispatch(&known).unwrap().body_string(), "welcome");
/// ```
pub trait ExpectationHandler: Send + Sync {
    /// Shape `response` for the given `request`.
    fn handle(&self, request: &Request, response: &mut Response);
}

impl<F> ExpectationHandler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    fn handle(&self, request: &Request, response: &mut Response) {
        self(request, response)
    }
}
