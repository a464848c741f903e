//! torwache-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Session-Cache, Auth-Kern, Mail-Versand und
//! gRPC-Schnittstelle zu einem lauffaehigen Dienst.

pub mod config;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::Duration;
use rand::RngCore;

use config::ServerConfig;
use torwache_auth::{AuthService, MemoryCache, PasswortHasher, SpeicherFassade, TokenManager};
use torwache_db::sqlite::DatenbankKonfig;
use torwache_db::SqliteDb;
use torwache_mail::{LogNotifier, MailopostClient, Notifier};
use torwache_rpc::{AuthDienst, GrpcServer, GrpcServerKonfig};

/// Haelt die Server-Konfiguration und startet alle Subsysteme
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Dienst und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbankverbindung herstellen und migrieren
    /// 2. Session-Cache mit Aufraeum-Task starten
    /// 3. Auth-Kern verdrahten
    /// 4. gRPC-Server starten (blockiert bis Ctrl-C)
    pub async fn starten(self) -> Result<()> {
        let cfg = &self.config;

        let db = SqliteDb::oeffnen(&DatenbankKonfig {
            url: cfg.datenbank.url.clone(),
            max_verbindungen: cfg.datenbank.max_verbindungen,
            wal: cfg.datenbank.wal,
        })
        .await
        .context("Datenbankverbindung fehlgeschlagen")?;

        let cache = MemoryCache::neu_mit_aufraeumer();

        let refresh_ttl = Duration::hours(cfg.token.refresh_ttl_stunden);
        let fassade = SpeicherFassade::neu(
            Arc::new(db),
            cache,
            StdDuration::from_secs(cfg.cache.projektion_ttl_minuten * 60),
            StdDuration::from_secs(cfg.token.refresh_ttl_stunden as u64 * 3600),
        );

        let token_manager = TokenManager::neu(
            &token_geheimnis(&cfg.token.geheimnis),
            Duration::minutes(cfg.token.access_ttl_minuten),
            refresh_ttl,
        );

        let service = Arc::new(AuthService::neu(
            fassade,
            PasswortHasher::neu(),
            token_manager,
            Duration::hours(cfg.verifizierung.code_ttl_stunden),
        ));

        let notifier: Arc<dyn Notifier> = if cfg.mail.aktiviert {
            Arc::new(MailopostClient::neu(
                cfg.mail.api_url.clone(),
                cfg.mail.api_key.clone(),
            ))
        } else {
            tracing::warn!("Mail-Versand deaktiviert; Codes landen nur im Log");
            Arc::new(LogNotifier::neu())
        };

        let bind_addr = cfg
            .grpc_bind_adresse()
            .parse()
            .context("Ungueltige gRPC-Bind-Adresse")?;

        tracing::info!(server_name = %cfg.server.name, addr = %bind_addr, "Server startet");

        GrpcServer::neu(GrpcServerKonfig { bind_addr })
            .starten(AuthDienst::neu(service, notifier))
            .await?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Liefert das HMAC-Geheimnis aus der Konfiguration oder, falls leer, ein
/// fluechtiges Zufallsgeheimnis
///
/// Mit fluechtigem Geheimnis ueberleben ausgegebene Tokens keinen Neustart;
/// fuer den Produktivbetrieb gehoert ein festes Geheimnis in die Konfiguration.
fn token_geheimnis(konfiguriert: &str) -> Vec<u8> {
    if !konfiguriert.is_empty() {
        return konfiguriert.as_bytes().to_vec();
    }

    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    tracing::warn!(
        "Kein Token-Geheimnis konfiguriert; fluechtiges Geheimnis generiert \
         (Tokens ueberleben keinen Neustart)"
    );
    bytes.to_vec()
}
