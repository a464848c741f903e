//! Mailopost-HTTP-Client
//!
//! Mailopost ist ein transaktionaler Mail-Anbieter mit einer simplen
//! JSON-API: `POST {basis_url}/messages` mit Bearer-Token. Antworten
//! ausserhalb von 2xx gelten als Ablehnung; deren Rumpf landet im Fehler
//! und damit im Log, nie beim Endbenutzer.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{MailFehler, MailResult};
use crate::notifier::Notifier;

/// Ausgehende Nachricht im Format der Mailopost-API
#[derive(Debug, Serialize)]
struct Nachricht<'a> {
    to: &'a str,
    subject: &'a str,
    body: String,
}

/// Client fuer die Mailopost-API
pub struct MailopostClient {
    http: reqwest::Client,
    basis_url: String,
    api_key: String,
}

impl MailopostClient {
    /// Erstellt einen Client; `basis_url` ohne abschliessenden Schraegstrich
    pub fn neu(basis_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            basis_url: basis_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn senden(&self, nachricht: &Nachricht<'_>) -> MailResult<()> {
        let url = format!("{}/messages", self.basis_url);
        let antwort = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(nachricht)
            .send()
            .await?;

        let status = antwort.status();
        if !status.is_success() {
            let rumpf = antwort.text().await.unwrap_or_default();
            return Err(MailFehler::Abgelehnt {
                status: status.as_u16(),
                nachricht: rumpf,
            });
        }
        Ok(())
    }
}

/// Betreff und Rumpf der Verifizierungs-Mail
fn verifizierungs_nachricht<'a>(empfaenger: &'a str, code: &str) -> Nachricht<'a> {
    Nachricht {
        to: empfaenger,
        subject: "Ihr Verifizierungscode",
        body: format!(
            "Ihr Verifizierungscode lautet: {code}\n\n\
             Der Code ist zeitlich begrenzt gueltig. Falls Sie sich nicht \
             registriert haben, ignorieren Sie diese Nachricht."
        ),
    }
}

#[async_trait]
impl Notifier for MailopostClient {
    async fn verifizierungscode_senden(&self, empfaenger: &str, code: &str) -> MailResult<()> {
        let nachricht = verifizierungs_nachricht(empfaenger, code);
        self.senden(&nachricht).await?;
        tracing::debug!(empfaenger, "Verifizierungscode versandt");
        Ok(())
    }
}
