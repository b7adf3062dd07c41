use super::env::{
    BIND_ADDRESS, ConfigSource, DATA_DIR, DATA_WAL_DIR, HTTP_BIND_ADDRESS, HTTP_ENABLED,
    META_DIR, REPORTING_DISABLED, RPC_ENABLED,
};
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reporting_disabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    #[serde(default = "default_meta_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_wal_dir")]
    pub wal_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_http_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

pub fn default_bind_address() -> String {
    "127.0.0.1:8088".to_owned()
}

pub fn default_http_bind_address() -> String {
    "127.0.0.1:8086".to_owned()
}

fn default_enabled() -> bool {
    true
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".testrun")
}

fn default_meta_dir() -> PathBuf {
    home_dir().join("meta")
}

fn default_data_dir() -> PathBuf {
    home_dir().join("data")
}

fn default_wal_dir() -> PathBuf {
    home_dir().join("wal")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reporting_disabled: false,
            bind_address: default_bind_address(),
            meta: Default::default(),
            data: Default::default(),
            http: Default::default(),
            rpc: Default::default(),
        }
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            dir: default_meta_dir(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            wal_dir: default_wal_dir(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            bind_address: default_http_bind_address(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

impl Config {
    /// Parses a YAML config file. Missing fields fall back to their defaults.
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse_yaml(&bytes)
    }

    /// An empty document is treated as an empty mapping so that `/dev/null` yields the defaults.
    pub fn parse_yaml(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Overrides every field for which `source` returns a non-empty value.
    pub fn apply_env(&mut self, source: &dyn ConfigSource) -> anyhow::Result<()> {
        override_with(source, DATA_DIR, &mut self.data.dir)?;
        override_with(source, DATA_WAL_DIR, &mut self.data.wal_dir)?;
        override_with(source, META_DIR, &mut self.meta.dir)?;
        override_with(source, HTTP_BIND_ADDRESS, &mut self.http.bind_address)?;
        override_with(source, HTTP_ENABLED, &mut self.http.enabled)?;
        override_with(source, BIND_ADDRESS, &mut self.bind_address)?;
        override_with(source, RPC_ENABLED, &mut self.rpc.enabled)?;
        override_with(source, REPORTING_DISABLED, &mut self.reporting_disabled)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, dir) in [
            ("meta.dir", &self.meta.dir),
            ("data.dir", &self.data.dir),
            ("data.wal_dir", &self.data.wal_dir),
        ] {
            if dir.as_os_str().is_empty() {
                bail!("{name} must be specified");
            }
        }
        if self.http.enabled && self.http.bind_address.is_empty() {
            bail!("http.bind_address must be specified when the http service is enabled");
        }
        if self.rpc.enabled && self.bind_address.is_empty() {
            bail!("bind_address must be specified when the rpc service is enabled");
        }
        Ok(())
    }
}

fn override_with<T>(source: &dyn ConfigSource, key: &str, field: &mut T) -> anyhow::Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = source.getenv(key);
    if value.is_empty() {
        return Ok(());
    }

    debug!(%key, %value, "applying environment override");
    *field = value
        .parse()
        .with_context(|| format!("invalid value {value:?} for {key}"))?;
    Ok(())
}
