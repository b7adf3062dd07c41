//! In-process test harness: runs a [Command] against a private temporary directory on ephemeral
//! ports and hands out clients for it.
//!
//! Every unexpected condition panics, failing the test that hit it.
use crate::{client::HttpClient, run::Command};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub mod locate;
mod overrides;

pub use locate::{bound_http_addr, http_client_for};
pub use overrides::Overrides;

pub struct TestRunCommand {
    command: Command,
    overrides: Arc<Overrides>,
    cancel: CancellationToken,

    /// Temporary directory used for default data, meta, and wal dirs.
    dir: PathBuf,
}

impl TestRunCommand {
    /// Allocate a fresh `testrun-*` directory and prepare a command that resolves its
    /// configuration from `env`, falling back to test defaults.
    pub fn new(env: HashMap<String, String>) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("testrun-")
            .tempdir()
            .unwrap_or_else(|err| panic!("unable to create test directory: {err}"))
            .keep();
        debug!(dir=%dir.display(), "allocated test directory");

        let overrides = Arc::new(Overrides::new(env, &dir));
        Self {
            command: Command::with_source(overrides.clone()),
            overrides,
            cancel: CancellationToken::new(),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The value the server sees for `key`.
    pub fn getenv(&self, key: &str) -> String {
        self.overrides.getenv(key)
    }

    /// Start the server without a config file. Panics if it fails to start.
    pub async fn must_run(&self) {
        if let Err(err) = self.command.run(self.cancel.clone(), None).await {
            panic!("server failed to start: {err:#}");
        }
    }

    /// Signal the server to shut down. Does not wait for it to finish.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// The bind address of the HTTP service, e.g. `127.0.0.1:65432`.
    pub async fn bound_http_addr(&self) -> String {
        bound_http_addr(&self.command).await
    }

    pub async fn http_client(&self) -> HttpClient {
        http_client_for(&self.bound_http_addr().await)
    }

    /// Remove the test directory. Safe to call more than once; failures are only logged.
    pub fn cleanup(&self) {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir=%self.dir.display(), "removed test directory"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(dir=%self.dir.display(), %err, "unable to remove test directory"),
        }
    }
}
