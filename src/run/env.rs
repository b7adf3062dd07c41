//! Environment-style configuration keys and the sources that resolve them.
use std::env::VarError;
use tracing::warn;

pub const DATA_DIR: &str = "DATA_DIR";
pub const META_DIR: &str = "META_DIR";
pub const DATA_WAL_DIR: &str = "DATA_WAL_DIR";
pub const HTTP_BIND_ADDRESS: &str = "HTTP_BIND_ADDRESS";
pub const HTTP_ENABLED: &str = "HTTP_ENABLED";
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const RPC_ENABLED: &str = "RPC_ENABLED";
pub const REPORTING_DISABLED: &str = "REPORTING_DISABLED";

/// Prefix applied to every key when reading from the process environment.
pub const ENV_PREFIX: &str = "TESTRUN_";

/// A source of configuration values keyed by the constants in this module.
///
/// An empty string means "not set": the value from the config file (or its default) is kept.
pub trait ConfigSource: Send + Sync {
    fn getenv(&self, key: &str) -> String;
}

/// Reads `TESTRUN_<KEY>` from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn getenv(&self, key: &str) -> String {
        let name = format!("{ENV_PREFIX}{key}");
        match std::env::var(&name) {
            Ok(value) => value,
            Err(VarError::NotPresent) => String::new(),
            Err(VarError::NotUnicode(value)) => {
                warn!(%name, value=?value, "ignoring environment variable that is not valid UTF-8");
                String::new()
            }
        }
    }
}
