//! Fehlertypen fuer den Auth-Kern

use thiserror::Error;
use torwache_core::Fehlerkategorie;

/// Alle moeglichen Fehler im Auth-Kern
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingabe ---
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Verifizierungscode falsch oder abgelaufen")]
    FalscherCode,

    // --- Authentifizierung ---
    #[error("E-Mail oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Token ungueltig, abgelaufen oder bereits rotiert")]
    TokenUngueltig,

    // --- Lookups ---
    #[error("Signatur unbekannt")]
    SignaturUnbekannt,

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    // --- Registrierung ---
    #[error("E-Mail bereits vergeben: {0}")]
    EmailVergeben(String),

    // --- Intern (Details bleiben serverseitig) ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] torwache_db::DbError),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Kategorie fuer die Transportgrenze
    ///
    /// Store- und Hashing-Fehler kollabieren zu `Intern`; "abgelaufen" und
    /// "bereits rotiert" sind fuer den Aufrufer absichtlich ununterscheidbar.
    pub fn kategorie(&self) -> Fehlerkategorie {
        match self {
            Self::UngueltigeEingabe(_) | Self::FalscherCode => {
                Fehlerkategorie::UngueltigesArgument
            }
            Self::UngueltigeAnmeldedaten | Self::TokenUngueltig => {
                Fehlerkategorie::NichtAuthentifiziert
            }
            Self::SignaturUnbekannt | Self::BenutzerNichtGefunden(_) => {
                Fehlerkategorie::NichtGefunden
            }
            Self::EmailVergeben(_) => Fehlerkategorie::BereitsVorhanden,
            Self::PasswortHashing(_) | Self::Datenbank(_) | Self::Intern(_) => {
                Fehlerkategorie::Intern
            }
        }
    }
}

/// Result-Alias fuer den Auth-Kern
pub type AuthResult<T> = Result<T, AuthError>;
