#![allow(dead_code)]

use std::{collections::HashMap, net::SocketAddr, net::TcpListener};
use testrun::testing::TestRunCommand;
use tracing_subscriber::EnvFilter;

/// Route server logs through the test writer. Run with RUST_LOG=debug to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Build a harness over `pairs` and start it.
pub async fn started(pairs: &[(&str, &str)]) -> TestRunCommand {
    init_tracing();
    let cmd = TestRunCommand::new(env(pairs));
    cmd.must_run().await;
    cmd
}

/// Removes the harness directory when dropped, so tests that are expected to panic still clean up.
pub struct CleanupGuard<'a>(pub &'a TestRunCommand);

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        self.0.shutdown();
        self.0.cleanup();
    }
}

/// Returns a loopback address that was free a moment ago.
pub fn allocate_bind_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
