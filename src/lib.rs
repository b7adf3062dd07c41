use run::{Command, ProcessEnv};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod client;
pub mod run;
pub mod services;
pub mod testing;

/// Version string reported by the HTTP and RPC services.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// An embeddable server exposing an HTTP and an RPC service.
#[derive(Debug, clap::Parser)]
#[clap(about, name = "testrun", long_about = None)]
pub struct Args {
    /// Path to the config file that should be used to configure the server
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Start the server configured from the process environment and the optional config file,
    /// then block until ctrl-c is received.
    pub async fn run(self) -> anyhow::Result<()> {
        let command = Command::new(ProcessEnv);
        let cancel = CancellationToken::new();

        match &self.config {
            Some(path) => info!(path=%path.display(), "loading and parsing config file"),
            None => info!("using default config"),
        }
        command.run(cancel.clone(), self.config.as_deref()).await?;

        tokio::signal::ctrl_c().await?;
        info!("received shutdown signal");
        cancel.cancel();
        command.close().await;

        Ok(())
    }
}
