use super::Config;
use crate::services::{HttpService, RpcService, Service};
use anyhow::Context;
use std::sync::Arc;
use tokio::{fs, sync::Mutex};
use tracing::info;

/// The running server: its configuration and the services it has registered.
pub struct Server {
    config: Config,
    services: Mutex<Vec<Arc<dyn Service>>>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            services: Mutex::new(Vec::new()),
        }
    }

    /// Guards the collection of running services, in registration order.
    ///
    /// Callers that also hold [Command::server_lock](super::Command::server_lock) must acquire it
    /// first.
    pub fn services_lock(&self) -> &Mutex<Vec<Arc<dyn Service>>> {
        &self.services
    }

    /// Create the storage directories and start every enabled service.
    ///
    /// Services that were opened before a failure stay registered; call [Server::close] to stop
    /// them.
    pub async fn open(&self) -> anyhow::Result<()> {
        for dir in [
            &self.config.meta.dir,
            &self.config.data.dir,
            &self.config.data.wal_dir,
        ] {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        info!(
            meta=%self.config.meta.dir.display(),
            data=%self.config.data.dir.display(),
            wal=%self.config.data.wal_dir.display(),
            "storage directories ready"
        );

        if self.config.rpc.enabled {
            let rpc = RpcService::open(&self.config.bind_address)
                .await
                .with_context(|| format!("opening rpc service on {}", self.config.bind_address))?;
            self.register(Arc::new(rpc)).await;
        }

        if self.config.http.enabled {
            let bind_address = &self.config.http.bind_address;
            let httpd = HttpService::open(bind_address)
                .await
                .with_context(|| format!("opening http service on {bind_address}"))?;
            self.register(Arc::new(httpd)).await;
        }

        if self.config.reporting_disabled {
            info!("usage reporting is disabled");
        } else {
            info!("usage reporting is enabled but has no reporting endpoint configured");
        }

        Ok(())
    }

    async fn register(&self, service: Arc<dyn Service>) {
        info!(service = service.name(), "registered service");
        self.services.lock().await.push(service);
    }

    /// Deregister and close every service.
    pub async fn close(&self) {
        let services: Vec<_> = self.services.lock().await.drain(..).collect();
        for service in services {
            service.close();
        }
    }
}
