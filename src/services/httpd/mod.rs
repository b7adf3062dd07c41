use super::{BoundHttpAddr, Service};
use handler::handle_request;
use hyper::service::service_fn;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub mod handler;

/// Serves the HTTP API on its own listener until closed.
pub struct HttpService {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl HttpService {
    /// Bind `bind_address` and spawn the accept loop. The address may request an ephemeral port.
    pub async fn open(bind_address: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(bind_address).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "http service now listening");

        let shutdown = CancellationToken::new();
        tokio::spawn(serve(listener, shutdown.clone()));

        Ok(Self { addr, shutdown })
    }
}

async fn serve(listener: TcpListener, shutdown: CancellationToken) {
    loop {
        let stream = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(err) => {
                    error!(%err, "http accept error");
                    continue;
                }
            },
        };
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = Builder::new(TokioExecutor::new())
                .serve_connection(io, service_fn(handle_request))
                .await
            {
                error!(%err, "server error");
            }
        });
    }
    debug!("http accept loop stopped");
}

impl Service for HttpService {
    fn name(&self) -> &'static str {
        "httpd"
    }

    fn close(&self) {
        info!(addr=%self.addr, "closing http service");
        self.shutdown.cancel();
    }

    fn as_bound_http_addr(&self) -> Option<&dyn BoundHttpAddr> {
        Some(self)
    }
}

impl BoundHttpAddr for HttpService {
    fn bound_http_addr(&self) -> SocketAddr {
        self.addr
    }
}
