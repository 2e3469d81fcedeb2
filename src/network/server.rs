// HTTP server: accept loop with a connection limit

use crate::executor::QueryBackend;
use crate::service::AdsService;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use super::{connection::Connection, Result, DEFAULT_PORT};

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

pub struct Server<B> {
    service: Arc<AdsService<B>>,
    max_connections: usize,
}

impl<B: QueryBackend + 'static> Server<B> {
    pub fn new(service: Arc<AdsService<B>>, max_connections: usize) -> Self {
        Self {
            service,
            max_connections,
        }
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub async fn run(&self, addr: Option<SocketAddr>) -> Result<()> {
        let addr = addr.unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        log::info!("adstats listening on http://{}", listener.local_addr()?);

        // Connection limiter
        let connection_semaphore = Arc::new(Semaphore::new(self.max_connections));

        loop {
            let (stream, peer_addr) = accept_with_retry(|| listener.accept()).await;

            let service = self.service.clone();
            let semaphore = connection_semaphore.clone();

            tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        log::error!("Failed to acquire connection permit");
                        return;
                    }
                };

                log::debug!("New connection from {}", peer_addr);

                if let Err(e) = handle_connection(stream, service).await {
                    log::warn!("Connection error from {}: {}", peer_addr, e);
                }
            });
        }
    }
}

/// Keep accepting until a connection arrives. Accept failures such as
/// running out of file descriptors affect one attempt, not the listener.
async fn accept_with_retry<F, Fut, T>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn handle_connection<B: QueryBackend + 'static>(
    stream: TcpStream,
    service: Arc<AdsService<B>>,
) -> Result<()> {
    let mut connection = Connection::new(stream, service);
    connection.run().await
}
