//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Token-Einstellungen
    pub token: TokenEinstellungen,
    /// Verifizierungs-Einstellungen
    pub verifizierung: VerifizierungsEinstellungen,
    /// Cache-Einstellungen
    pub cache: CacheEinstellungen,
    /// Mail-Einstellungen
    pub mail: MailEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Torwache".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den gRPC-Server
    pub bind_adresse: String,
    /// Port fuer gRPC
    pub grpc_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            grpc_port: 9400,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus
    pub wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://torwache.db".into(),
            max_verbindungen: 5,
            wal: true,
        }
    }
}

/// Token-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenEinstellungen {
    /// HMAC-Geheimnis (leer = fluechtiges Zufallsgeheimnis beim Start)
    pub geheimnis: String,
    /// Laufzeit der Access-Tokens in Minuten
    pub access_ttl_minuten: i64,
    /// Laufzeit der Refresh-Tokens in Stunden
    pub refresh_ttl_stunden: i64,
}

impl Default for TokenEinstellungen {
    fn default() -> Self {
        Self {
            geheimnis: String::new(),
            access_ttl_minuten: 15,
            refresh_ttl_stunden: 24,
        }
    }
}

/// Verifizierungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifizierungsEinstellungen {
    /// Lebensdauer der Verifizierungscodes in Stunden
    pub code_ttl_stunden: i64,
}

impl Default for VerifizierungsEinstellungen {
    fn default() -> Self {
        Self { code_ttl_stunden: 24 }
    }
}

/// Cache-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEinstellungen {
    /// Lebensdauer gecachter Benutzer-Projektionen in Minuten
    pub projektion_ttl_minuten: u64,
}

impl Default for CacheEinstellungen {
    fn default() -> Self {
        Self {
            projektion_ttl_minuten: 60,
        }
    }
}

/// Mail-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailEinstellungen {
    /// Aktiviert den echten Versand; sonst landen Codes nur im Log
    pub aktiviert: bool,
    /// Basis-URL der Mailopost-API
    pub api_url: String,
    /// API-Schluessel
    pub api_key: String,
}

impl Default for MailEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: false,
            api_url: "https://api.mailopost.ru/v1".into(),
            api_key: String::new(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die Bind-Adresse fuer den gRPC-Server zurueck
    pub fn grpc_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.grpc_port)
    }
}
