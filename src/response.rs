use std::convert::TryInto;
use std::io::{self, Read};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;

/// The response an [`ExpectationRouter`] sends back for a dispatched request.
///
/// It starts as an empty `200 OK` and is shaped by the router - or by your own
/// [`ExpectationHandler`] - through a small, servlet-like API: set a status, send an error,
/// write text or copy bytes from a reader.
///
/// [`ExpectationRouter`]: crate::ExpectationRouter
/// [`ExpectationHandler`]: crate::ExpectationHandler
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

// Like registration, shaping a response is test code: a status code that cannot be represented
// is a mistake in the test, so we panic with a clear message instead of returning a `Result`.
impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn set_status<S>(&mut self, status: S)
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: std::fmt::Debug,
    {
        self.status = status
            .try_into()
            .expect("Failed to convert into status code.");
    }

    /// Insert a header `value` with `key` as header name, overriding previous values.
    pub fn insert_header<K, V>(&mut self, key: K, value: V)
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.insert(key, value);
    }

    /// Reply with an error status, replacing anything written so far.
    ///
    /// The message, if any, becomes a `text/plain` body.
    pub fn send_error(&mut self, status: StatusCode, message: Option<&str>) {
        self.status = status;
        self.body.clear();
        if let Some(message) = message {
            self.headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            self.body.extend_from_slice(message.as_bytes());
        }
    }

    pub fn write_str(&mut self, text: &str) {
        self.body.extend_from_slice(text.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Copy everything `reader` yields into the body, returning the number of bytes copied.
    pub fn copy_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<u64> {
        io::copy(reader, &mut self.body)
    }

    pub(crate) fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut response = hyper::Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
