//! Startup and shutdown of the embedded server.
use anyhow::bail;
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod config;
pub mod env;
mod server;

pub use config::{Config, DataConfig, HttpConfig, MetaConfig, RpcConfig};
pub use env::{ConfigSource, ProcessEnv};
pub use server::Server;

/// Starts a [Server] from a config file plus overrides read through a [ConfigSource].
pub struct Command {
    getenv: Arc<dyn ConfigSource>,
    server: Mutex<Option<Arc<Server>>>,
}

impl Command {
    pub fn new(getenv: impl ConfigSource + 'static) -> Self {
        Self::with_source(Arc::new(getenv))
    }

    pub fn with_source(getenv: Arc<dyn ConfigSource>) -> Self {
        Self {
            getenv,
            server: Mutex::new(None),
        }
    }

    /// Guards whether a server is running and which one.
    ///
    /// Lock order: this lock is always taken before [Server::services_lock].
    pub fn server_lock(&self) -> &Mutex<Option<Arc<Server>>> {
        &self.server
    }

    /// Load the configuration, open the server and return once its services are listening.
    ///
    /// `config` of `None` means no config file: defaults plus overrides only. Cancelling `ctx`
    /// closes the server in the background. Fails if a server is already published; call
    /// [Command::close] before running again.
    pub async fn run(&self, ctx: CancellationToken, config: Option<&Path>) -> anyhow::Result<()> {
        let mut cfg = match config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        cfg.apply_env(self.getenv.as_ref())?;
        cfg.validate()?;

        let server = Arc::new(Server::new(cfg));
        {
            let mut slot = self.server.lock().await;
            if slot.is_some() {
                bail!("server is already running");
            }
            *slot = Some(server.clone());
        }

        if let Err(err) = server.open().await {
            self.close().await;
            return Err(err);
        }
        info!("server started");

        tokio::spawn(async move {
            ctx.cancelled().await;
            info!("shutdown requested");
            server.close().await;
        });

        Ok(())
    }

    /// Close the running server, if any.
    pub async fn close(&self) {
        let mut guard = self.server.lock().await;
        if let Some(server) = guard.take() {
            server.close().await;
        }
    }
}
