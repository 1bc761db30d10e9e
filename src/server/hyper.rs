use crate::server::bare_server::ServerState;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use log::{debug, error, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The actual HTTP server dispatching incoming requests to the router in `server_state`.
pub(super) async fn run_server(
    listener: std::net::TcpListener,
    server_state: Arc<RwLock<ServerState>>,
    mut shutdown_signal: tokio::sync::oneshot::Receiver<()>,
) {
    listener
        .set_nonblocking(true)
        .expect("Cannot set non-blocking mode on TcpListener");
    let listener = tokio::net::TcpListener::from_std(listener)
        .expect("Cannot upgrade TcpListener from std");

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept a connection: {}", e);
                    continue;
                }
            },
            // This future resolves when either:
            // - the sender half of the channel gets dropped (i.e. the server is dropped)
            // - the sender is used, therefore sending a poison pill willingly as a shutdown signal
            _ = &mut shutdown_signal => break,
        };
        debug!("Accepted connection from {}", peer);

        let server_state = server_state.clone();
        tokio::task::spawn(async move {
            let service = service_fn(move |request: hyper::Request<hyper::body::Incoming>| {
                let server_state = server_state.clone();
                async move {
                    let request = crate::Request::from_hyper(request).await?;
                    // The write guard is released at the end of this statement: dispatch is
                    // synchronous, nothing is awaited while holding it.
                    let outcome = server_state.write().await.handle_request(request);
                    Ok::<_, hyper::Error>(into_hyper_response(outcome))
                }
            });

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Error while serving connection from {}: {}", peer, e);
            }
        });
    }
}

fn into_hyper_response(
    outcome: Result<crate::Response, crate::DispatchError>,
) -> hyper::Response<Full<Bytes>> {
    match outcome {
        Ok(response) => response.into_hyper(),
        Err(e) => {
            error!("Failed to dispatch request: {}", e);
            let mut response = crate::Response::new(http::StatusCode::INTERNAL_SERVER_ERROR);
            response.write_str(&e.to_string());
            response.into_hyper()
        }
    }
}
