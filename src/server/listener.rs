use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::resource::ResourceResolver;
use crate::server::tls;

/// Accept loop. Every connection is served on its own task.
pub struct Listener {
    listener: TcpListener,
    resolver: Arc<ResourceResolver>,
    tls: Option<TlsAcceptor>,
}

impl Listener {
    /// Sets up TLS (if configured) and binds the listen address.
    ///
    /// TLS misconfiguration is reported before anything is bound.
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let tls = tls::acceptor(cfg)?;
        let listener = TcpListener::bind(&cfg.listen_addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            resolver: Arc::new(ResourceResolver::from_config(cfg)),
            tls,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            info!("Accepted connection from {}", peer);

            let resolver = Arc::clone(&self.resolver);
            let tls = self.tls.clone();
            tokio::spawn(async move {
                if let Err(e) = handle(socket, tls, resolver).await {
                    tracing::error!("Connection error from {}: {:#}", peer, e);
                }
            });
        }
    }
}

async fn handle(
    socket: TcpStream,
    tls: Option<TlsAcceptor>,
    resolver: Arc<ResourceResolver>,
) -> anyhow::Result<()> {
    match tls {
        Some(acceptor) => {
            let stream = acceptor.accept(socket).await?;
            Connection::new(stream, resolver).run().await
        }
        None => Connection::new(socket, resolver).run().await,
    }
}
