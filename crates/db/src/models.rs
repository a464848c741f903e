//! Datenbankmodelle fuer Torwache
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank. Die
//! [`BenutzerProjektion`] ist die nach aussen sichtbare Sicht ohne
//! Passwort-Hash und wird auch im Session-Cache abgelegt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use torwache_core::UserId;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    /// Korrelations-Signatur aus der Registrierung (None vor Registrierung
    /// alter Bestandskonten)
    pub signatur: Option<Uuid>,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Zeitpunkt der weichen Loeschung (None = aktiv)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BenutzerRecord {
    /// Gibt true zurueck wenn das Konto nicht geloescht ist
    pub fn ist_aktiv(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Daten zum Aktualisieren eines Benutzers (nur gesetzte Felder aendern)
#[derive(Debug, Clone, Default)]
pub struct BenutzerUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_confirmed: Option<bool>,
}

/// Oeffentliche Sicht auf einen Benutzer (ohne Passwort-Hash)
///
/// Wird als JSON im Session-Cache abgelegt und ueber die RPC-Schnittstelle
/// zurueckgegeben.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerProjektion {
    pub id: UserId,
    pub email: String,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&BenutzerRecord> for BenutzerProjektion {
    fn from(record: &BenutzerRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            is_confirmed: record.is_confirmed,
            created_at: record.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Verifizierungscodes
// ---------------------------------------------------------------------------

/// Verifizierungscode-Datensatz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub code: String,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CodeRecord {
    /// Gibt true zurueck wenn der Code weder benutzt noch abgelaufen ist
    pub fn ist_einloesbar(&self) -> bool {
        !self.is_used && Utc::now() < self.expires_at
    }
}
