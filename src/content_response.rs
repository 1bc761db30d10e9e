use std::convert::TryInto;
use std::fmt;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use http::StatusCode;

use crate::{ExpectationHandler, Request, Response};

/// A registered reply for a method and path - either a successful expectation or a simulated
/// error, depending on where it has been registered.
#[derive(Clone)]
pub struct ContentResponse {
    method: String,
    path: String,
    reply: Reply,
}

/// What to send back: exactly one of these shapes is active for a [`ContentResponse`].
#[derive(Clone)]
pub enum Reply {
    /// Hand over the whole response to a custom handler.
    Handler(Arc<dyn ExpectationHandler>),
    /// A status code with a text body.
    Text { status: StatusCode, body: String },
    /// A status code with a body copied from a byte source.
    Stream { status: StatusCode, body: BodyStream },
    /// A bare status code, without a body.
    Status(StatusCode),
}

// Registering expectations happens in test code - a status code that cannot be converted is
// a mistake in the test itself, hence we panic with an explicit message instead of pushing a
// `Result` onto every registration call.
fn status_code<S>(status: S) -> StatusCode
where
    S: TryInto<StatusCode>,
    <S as TryInto<StatusCode>>::Error: fmt::Debug,
{
    status
        .try_into()
        .expect("Failed to convert into status code.")
}

impl ContentResponse {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>, reply: Reply) -> Self {
        Self {
            method: method.as_ref().to_uppercase(),
            path: path.into(),
            reply,
        }
    }

    pub fn text<S>(
        method: impl AsRef<str>,
        path: impl Into<String>,
        status: S,
        body: impl Into<String>,
    ) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        let reply = Reply::Text {
            status: status_code(status),
            body: body.into(),
        };
        Self::new(method, path, reply)
    }

    pub fn stream<S, R>(method: impl AsRef<str>, path: impl Into<String>, status: S, body: R) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
        R: Read + Send + 'static,
    {
        let reply = Reply::Stream {
            status: status_code(status),
            body: BodyStream::new(body),
        };
        Self::new(method, path, reply)
    }

    pub fn status<S>(method: impl AsRef<str>, path: impl Into<String>, status: S) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: fmt::Debug,
    {
        Self::new(method, path, Reply::Status(status_code(status)))
    }

    pub fn handler<H>(method: impl AsRef<str>, path: impl Into<String>, handler: H) -> Self
    where
        H: ExpectationHandler + 'static,
    {
        Self::new(method, path, Reply::Handler(Arc::new(handler)))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    /// The status code this reply is registered with, `None` for handlers.
    pub fn code(&self) -> Option<StatusCode> {
        match &self.reply {
            Reply::Handler(_) => None,
            Reply::Text { status, .. } | Reply::Stream { status, .. } | Reply::Status(status) => {
                Some(*status)
            }
        }
    }

    /// Shape `response` as a successful reply.
    pub(crate) fn respond(&self, request: &Request, response: &mut Response) -> io::Result<()> {
        match &self.reply {
            Reply::Handler(handler) => handler.handle(request, response),
            Reply::Text { status, body } => {
                response.set_status(*status);
                response.write_str(body);
            }
            Reply::Stream { status, body } => {
                response.set_status(*status);
                body.copy_into(response)?;
            }
            Reply::Status(status) => response.set_status(*status),
        }
        Ok(())
    }

    /// Shape `response` as a simulated failure: text bodies and bare statuses are sent as
    /// error replies, handlers and streams behave as they do for successful replies.
    pub(crate) fn respond_with_error(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> io::Result<()> {
        match &self.reply {
            Reply::Text { status, body } => response.send_error(*status, Some(body)),
            Reply::Status(status) => response.send_error(*status, None),
            Reply::Handler(_) | Reply::Stream { .. } => self.respond(request, response)?,
        }
        Ok(())
    }
}

impl fmt::Debug for ContentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentResponse")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("reply", &self.reply)
            .finish()
    }
}

impl fmt::Display for ContentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> ", self.method, self.path)?;
        match &self.reply {
            Reply::Handler(_) => write!(f, "custom handler"),
            Reply::Text { status, body } => write!(f, "{} with body:\n{}", status, body),
            Reply::Stream { status, .. } => write!(f, "{} with body stream", status),
            Reply::Status(status) => write!(f, "{} with no body", status),
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Handlers are usually closures, which do not implement `Debug`.
            Reply::Handler(_) => f.write_str("Handler(..)"),
            Reply::Text { status, body } => f
                .debug_struct("Text")
                .field("status", status)
                .field("body", body)
                .finish(),
            Reply::Stream { status, .. } => f
                .debug_struct("Stream")
                .field("status", status)
                .finish_non_exhaustive(),
            Reply::Status(status) => f.debug_tuple("Status").field(status).finish(),
        }
    }
}

/// A byte source used as response body.
///
/// The source is drained by the first response it is copied into: later responses for the
/// same registration get whatever is left, usually nothing. Register the expectation again,
/// or use a text body, if the same bytes must be served more than once.
#[derive(Clone)]
pub struct BodyStream(Arc<Mutex<Box<dyn Read + Send>>>);

impl BodyStream {
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self(Arc::new(Mutex::new(Box::new(reader))))
    }

    pub(crate) fn copy_into(&self, response: &mut Response) -> io::Result<u64> {
        let mut reader = self.0.lock().expect("Poisoned lock!");
        response.copy_from(&mut *reader)
    }
}
