//! Fehlertypen fuer den Mail-Versand

use thiserror::Error;

/// Result-Alias fuer den Mail-Versand
pub type MailResult<T> = Result<T, MailFehler>;

/// Fehler beim Versand einer Nachricht
#[derive(Debug, Error)]
pub enum MailFehler {
    #[error("HTTP-Anfrage fehlgeschlagen: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail-Anbieter lehnt ab (Status {status}): {nachricht}")]
    Abgelehnt { status: u16, nachricht: String },
}
