use crate::server::bare_server::BareExpectationServer;
use crate::ExpectationServer;
use deadpool::managed::{Metrics, Object, Pool};
use once_cell::sync::Lazy;
use std::convert::Infallible;

/// A pool of `BareExpectationServer`s.
///
/// Pooling is an invisible optimisation: it reduces the number of `TcpListener`s being opened and
/// closed over a test suite, mitigating the risk of hitting OS limits on open connections.
///
/// Only servers with the default configuration (base resource `/`, request recording enabled)
/// are pooled - see `ExpectationServer::start`.
static SERVER_POOL: Lazy<Pool<ServerPoolManager>> = Lazy::new(|| {
    // We are choosing an arbitrarily high max_size because we never want a test to "wait" for
    // a `BareExpectationServer` instance to become available.
    Pool::builder(ServerPoolManager)
        .max_size(1000)
        .build()
        .expect("Building a server pool is not expected to fail. Please report an issue")
});

pub(crate) type PooledExpectationServer = Object<ServerPoolManager>;

/// Retrieve a `BareExpectationServer` from the pool.
/// The operation should never fail.
pub(crate) async fn get_pooled_server() -> PooledExpectationServer {
    SERVER_POOL
        .get()
        .await
        .expect("Failed to get an ExpectationServer from the pool")
}

/// The `BareExpectationServer` pool manager.
///
/// It:
/// - creates a new `BareExpectationServer` if there is none to borrow from the pool;
/// - "cleans up" used `BareExpectationServer`s before making them available again for other
///   tests to use.
#[derive(Debug)]
pub(crate) struct ServerPoolManager;

impl deadpool::managed::Manager for ServerPoolManager {
    type Error = Infallible;
    type Type = BareExpectationServer;

    async fn create(&self) -> Result<BareExpectationServer, Infallible> {
        Ok(ExpectationServer::builder().build_bare().await)
    }

    async fn recycle(
        &self,
        server: &mut BareExpectationServer,
        _metrics: &Metrics,
    ) -> deadpool::managed::RecycleResult<Infallible> {
        // Forget expectations, errors and access counts - we want to start clean when the
        // server is picked up again from the pool.
        server.reset().await;
        Ok(())
    }
}
