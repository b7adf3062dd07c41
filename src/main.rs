use clap::Parser;
use std::panic::set_hook;
use testrun::{Args, VERSION};
use tracing::{error, info};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    log_panics();

    info!(version = VERSION, "starting testrun");
    Args::parse().run().await
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Route panics from server tasks through tracing so they land next to the rest of the logs.
fn log_panics() {
    set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => error!(
            message=%panic,
            panic.file=loc.file(),
            panic.line=loc.line(),
            panic.column=loc.column()
        ),
        None => error!(message=%panic),
    }));
}
