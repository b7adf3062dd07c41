//! Listener on the general bind address. Greets every connection with a version banner.
use super::Service;
use crate::VERSION;
use std::net::SocketAddr;
use tokio::{io::AsyncWriteExt, net::TcpListener};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub struct RpcService {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl RpcService {
    pub async fn open(bind_address: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(bind_address).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "rpc service now listening");

        let shutdown = CancellationToken::new();
        tokio::spawn(serve(listener, shutdown.clone()));

        Ok(Self { addr, shutdown })
    }
}

async fn serve(listener: TcpListener, shutdown: CancellationToken) {
    loop {
        let mut stream = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(err) => {
                    error!(%err, "rpc accept error");
                    continue;
                }
            },
        };

        tokio::spawn(async move {
            let banner = format!("testrun {VERSION}\n");
            if let Err(err) = stream.write_all(banner.as_bytes()).await {
                error!(%err, "rpc write error");
            }
            let _ = stream.shutdown().await;
        });
    }
    debug!("rpc accept loop stopped");
}

impl Service for RpcService {
    fn name(&self) -> &'static str {
        "rpc"
    }

    fn close(&self) {
        info!(addr=%self.addr, "closing rpc service");
        self.shutdown.cancel();
    }
}
