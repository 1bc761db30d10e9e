use crate::request::BodyPrintLimit;
use crate::server::hyper::run_server;
use crate::{DispatchError, ExpectationRouter, Request, Response};
use log::debug;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An HTTP web-server running in the background, replying to requests according to the
/// expectations registered on its `ExpectationRouter`.
///
/// `BareExpectationServer` is the actual server behind the publicly-exposed `ExpectationServer`,
/// which is instead a thin facade over a `BareExpectationServer`, possibly retrieved from a pool.
pub(crate) struct BareExpectationServer {
    state: Arc<RwLock<ServerState>>,
    server_address: SocketAddr,
    base_resource: String,
    // When `_shutdown_trigger` gets dropped the listening server terminates gracefully.
    _shutdown_trigger: tokio::sync::oneshot::Sender<()>,
}

/// Everything the background server mutates while handling requests.
pub(super) struct ServerState {
    pub(super) router: ExpectationRouter,
    received_requests: Option<Vec<Request>>,
    body_print_limit: BodyPrintLimit,
}

impl ServerState {
    pub(super) fn handle_request(&mut self, request: Request) -> Result<Response, DispatchError> {
        let mut logged = String::new();
        if request
            .print_with_limit(&mut logged, self.body_print_limit)
            .is_ok()
        {
            debug!("Handling request:\n{}", logged);
        }

        let response = self.router.dispatch(&request);
        if let Some(received_requests) = &mut self.received_requests {
            received_requests.push(request);
        }
        response
    }

    pub(super) fn received_requests(&self) -> Option<Vec<Request>> {
        self.received_requests.clone()
    }

    pub(super) fn reset(&mut self) {
        self.router.reset();
        if let Some(received_requests) = &mut self.received_requests {
            received_requests.clear();
        }
    }
}

/// Whether incoming requests are kept around, for inspection with `received_requests`.
pub(super) enum RequestRecording {
    Enabled,
    Disabled,
}

impl BareExpectationServer {
    /// Start a new instance of a `BareExpectationServer` listening on the specified
    /// [`TcpListener`].
    pub(super) async fn start(
        listener: TcpListener,
        router: ExpectationRouter,
        request_recording: RequestRecording,
        body_print_limit: BodyPrintLimit,
    ) -> Self {
        let (shutdown_trigger, shutdown_receiver) = tokio::sync::oneshot::channel();
        let received_requests = match request_recording {
            RequestRecording::Enabled => Some(Vec::new()),
            RequestRecording::Disabled => None,
        };
        let base_resource = router.base_resource().to_owned();
        let state = Arc::new(RwLock::new(ServerState {
            router,
            received_requests,
            body_print_limit,
        }));
        let server_address = listener
            .local_addr()
            .expect("Failed to get server address.");

        let server_state = state.clone();
        std::thread::spawn(move || {
            let server_future = run_server(listener, server_state, shutdown_receiver);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Cannot build local tokio runtime");

            runtime.block_on(server_future)
        });

        debug!(
            "Expectation server listening on {} (base resource: {})",
            server_address, base_resource
        );
        Self {
            state,
            server_address,
            base_resource,
            _shutdown_trigger: shutdown_trigger,
        }
    }

    /// Run `f` against the router, holding the write side of the state lock.
    pub(crate) async fn with_router<T>(&self, f: impl FnOnce(&mut ExpectationRouter) -> T) -> T {
        f(&mut self.state.write().await.router)
    }

    /// Run `f` against the router, holding the read side of the state lock.
    pub(crate) async fn inspect_router<T>(&self, f: impl FnOnce(&ExpectationRouter) -> T) -> T {
        f(&self.state.read().await.router)
    }

    /// Drop all expectations, errors, access counts and recorded requests.
    ///
    /// It *must* be called if you plan to reuse a `BareExpectationServer` instance (i.e. in our
    /// `ServerPoolManager`).
    pub(crate) async fn reset(&self) {
        self.state.write().await.reset();
    }

    pub(crate) async fn received_requests(&self) -> Option<Vec<Request>> {
        self.state.read().await.received_requests()
    }

    pub(crate) fn base_resource(&self) -> &str {
        &self.base_resource
    }

    /// Return the base uri of this running instance, e.g. `http://127.0.0.1:4372`.
    pub(crate) fn uri(&self) -> String {
        format!("http://{}", self.server_address)
    }

    /// Return the socket address of this running instance, e.g. `127.0.0.1:4372`.
    pub(crate) fn address(&self) -> &SocketAddr {
        &self.server_address
    }
}
