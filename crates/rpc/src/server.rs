//! gRPC-Server fuer den Torwache Auth-Dienst

use std::net::SocketAddr;

use anyhow::Result;
use tonic::transport::Server;

use torwache_auth::SessionCache;
use torwache_db::{CodeRepository, UserRepository};

use crate::service::{proto::auth_server::AuthServer, AuthDienst};

/// gRPC-Server-Konfiguration
#[derive(Debug, Clone)]
pub struct GrpcServerKonfig {
    pub bind_addr: SocketAddr,
}

impl Default for GrpcServerKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9400)),
        }
    }
}

/// gRPC-Server des Auth-Dienstes
pub struct GrpcServer {
    konfig: GrpcServerKonfig,
}

impl GrpcServer {
    pub fn neu(konfig: GrpcServerKonfig) -> Self {
        Self { konfig }
    }

    /// Startet den Server; laeuft bis SIGINT (Ctrl+C)
    pub async fn starten<U, C>(self, dienst: AuthDienst<U, C>) -> Result<()>
    where
        U: UserRepository + CodeRepository + 'static,
        C: SessionCache + 'static,
    {
        tracing::info!(addr = %self.konfig.bind_addr, "gRPC-Auth-Server gestartet");

        Server::builder()
            .add_service(AuthServer::new(dienst))
            .serve_with_shutdown(self.konfig.bind_addr, async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutdown-Signal empfangen");
            })
            .await?;

        Ok(())
    }
}
