//! Notifier-Trait und Log-Implementierung
//!
//! Der Trait entkoppelt den Auth-Ablauf vom konkreten Versandweg. Fuer
//! lokale Entwicklung ohne Mail-Anbieter schreibt der [`LogNotifier`]
//! den Code ins Log statt ihn zu verschicken.

use async_trait::async_trait;

use crate::error::MailResult;

/// Versandweg fuer Benachrichtigungen an Benutzer
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Stellt dem Empfaenger seinen Verifizierungscode zu
    async fn verifizierungscode_senden(&self, empfaenger: &str, code: &str) -> MailResult<()>;
}

/// Schreibt Codes ins Log statt sie zu versenden (nur Entwicklung)
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn neu() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn verifizierungscode_senden(&self, empfaenger: &str, code: &str) -> MailResult<()> {
        tracing::info!(empfaenger, code, "Verifizierungscode (Versand deaktiviert)");
        Ok(())
    }
}
