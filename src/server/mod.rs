//! All bits and pieces concerning the HTTP server hosting an `ExpectationRouter` live in this
//! module.
//!
//! `bare_server::BareExpectationServer` is the "front-end" to drive behaviour for the `hyper`
//! HTTP server running in the background, defined in the `hyper` sub-module.
//!
//! `bare_server::BareExpectationServer` is not exposed directly: crate users only get to interact
//! with `exposed_server::ExpectationServer`, which wraps either a dedicated `BareExpectationServer`
//! or one retrieved from an object pool - see the `pool` submodule.
mod bare_server;
mod builder;
mod exposed_server;
mod hyper;
mod pool;

pub use builder::ExpectationServerBuilder;
pub use exposed_server::ExpectationServer;
