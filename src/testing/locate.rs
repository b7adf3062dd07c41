use crate::{
    client::{ClientConfig, HttpClient},
    run::Command,
    services::{BoundHttpAddr, Service},
};
use std::net::SocketAddr;

/// Find the first registered service exposing a bound HTTP address and return it as `host:port`.
///
/// Takes [Command::server_lock] and then [Server::services_lock](crate::run::Server::services_lock),
/// and releases both before panicking if no such service is registered. Does not wait for one to
/// appear.
pub async fn bound_http_addr(command: &Command) -> String {
    let addr: Option<SocketAddr> = {
        let server = command.server_lock().lock().await;
        match server.as_ref() {
            Some(server) => {
                let services = server.services_lock().lock().await;
                services
                    .iter()
                    .find_map(|service| service.as_bound_http_addr())
                    .map(|httpd| httpd.bound_http_addr())
            }
            None => None,
        }
    };

    match addr {
        Some(addr) => addr.to_string(),
        None => panic!("did not find HTTPD service"),
    }
}

/// Client targeting `http://<addr>`. Panics if `addr` is not a `host:port` pair.
pub fn http_client_for(addr: &str) -> HttpClient {
    ClientConfig::for_host_port(addr)
        .and_then(HttpClient::new)
        .unwrap_or_else(|err| panic!("invalid http address {addr:?}: {err:#}"))
}
