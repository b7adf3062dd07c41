//! HTTP client for the server's HTTP service.
use crate::services::httpd::handler::{Health, VERSION_HEADER};
use anyhow::{Context, bail, ensure};
use reqwest::{StatusCode, Url};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. `http://127.0.0.1:8086`.
    pub addr: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config targeting `http://<host:port>`. Rejects anything that is not a bare host:port pair.
    pub fn for_host_port(host_port: &str) -> anyhow::Result<Self> {
        let Some((host, port)) = host_port.rsplit_once(':') else {
            bail!("{host_port:?} is missing a port");
        };
        ensure!(!host.is_empty(), "{host_port:?} is missing a host");
        ensure!(
            !host.contains(['/', '@', '?', '#']),
            "{host_port:?} is not a host:port pair"
        );
        port.parse::<u16>()
            .with_context(|| format!("{host_port:?} has an invalid port"))?;

        Ok(Self {
            addr: format!("http://{host_port}"),
            ..Default::default()
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&config.addr).with_context(|| format!("parsing {}", config.addr))?;
        ensure!(
            base.scheme() == "http" || base.scheme() == "https",
            "unsupported protocol scheme {}",
            base.scheme()
        );
        ensure!(base.host_str().is_some(), "{} has no host", config.addr);

        let inner = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { base, inner })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Issue a GET against `path`, relative to the base URL.
    pub async fn get(&self, path: &str) -> anyhow::Result<reqwest::Response> {
        let url = self.base.join(path)?;
        Ok(self.inner.get(url).send().await?)
    }

    /// Round-trip time and the server version reported by `/ping`.
    pub async fn ping(&self) -> anyhow::Result<(Duration, String)> {
        let start = Instant::now();
        let resp = self.get("/ping").await?;
        let elapsed = start.elapsed();

        ensure!(
            resp.status() == StatusCode::NO_CONTENT,
            "unexpected ping status {}",
            resp.status()
        );
        let version = resp
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        Ok((elapsed, version))
    }

    pub async fn health(&self) -> anyhow::Result<Health> {
        let resp = self.get("/health").await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}
