use std::net::SocketAddr;

pub mod httpd;
pub mod rpc;

pub use httpd::HttpService;
pub use rpc::RpcService;

/// A long running unit registered with a [Server](crate::run::Server).
pub trait Service: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stop accepting new work. Does not wait for in-flight connections to drain.
    fn close(&self);

    /// Capability query for services that serve HTTP on a bound listener.
    fn as_bound_http_addr(&self) -> Option<&dyn BoundHttpAddr> {
        None
    }
}

/// Implemented by services that can report the address their HTTP listener ended up bound to.
pub trait BoundHttpAddr {
    /// The resolved listen address, never port 0.
    fn bound_http_addr(&self) -> SocketAddr;
}
