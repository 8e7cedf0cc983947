use crate::cache::Pool;
use crate::config::Config;
use crate::server::handler::handle_client;
use crate::server::ticker::spawn_ticker;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct CacheServer {
    config: Arc<Config>,
    pool: Pool,
    ticker_handle: JoinHandle<()>,
}

impl CacheServer {
    pub async fn new(config: Config) -> Result<Self> {
        let pool = Pool::new();
        let config = Arc::new(config);

        let ticker_handle = spawn_ticker(pool.clone(), config.clone());
        info!("Ticker started, memory limit {} MiB", config.cache.memorylimit);

        Ok(Self {
            config,
            pool,
            ticker_handle,
        })
    }

    pub async fn run(&self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.server.host, self.config.server.port);

        let listener = TcpListener::bind(&bind_addr).await?;

        info!("ephemcache listening on {}", bind_addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);

                    let pool = self.pool.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, pool, addr).await {
                            error!("Client error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    pub async fn shutdown(&self) {
        self.ticker_handle.abort();
    }
}
