//! Repository-Trait-Definitionen
//!
//! Die Traits entkoppeln die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Alle Methoden liefern Send-Futures
//! (async-trait), damit sie hinter dem tonic-Server nutzbar sind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use torwache_core::UserId;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{BenutzerRecord, BenutzerUpdate, CodeRecord, NeuerBenutzer};

/// Repository fuer Benutzerkonten
///
/// `get_by_email` und `get_by_id` liefern nur nicht geloeschte Konten;
/// weiche Loeschung via [`UserRepository::soft_delete`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Legt einen neuen, unbestaetigten Benutzer an
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    /// Laedt einen Benutzer anhand seiner ID
    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>>;

    /// Laedt einen Benutzer anhand seiner E-Mail-Adresse
    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Aktualisiert die gesetzten Felder und gibt den neuen Stand zurueck
    async fn update(&self, id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord>;

    /// Markiert einen Benutzer als geloescht; gibt false zurueck wenn er
    /// nicht (mehr) existiert
    async fn soft_delete(&self, id: UserId) -> DbResult<bool>;

    /// Loest eine Korrelations-Signatur zur E-Mail des Kontos auf
    async fn get_email_by_signature(&self, signatur: Uuid) -> DbResult<Option<String>>;

    /// Hinterlegt die Korrelations-Signatur am Benutzerkonto
    async fn set_signature(&self, id: UserId, signatur: Uuid) -> DbResult<()>;
}

/// Repository fuer Verifizierungscodes
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Speichert einen neuen Code und ersetzt dabei alle offenen Codes des
    /// Benutzers (Invariante: hoechstens ein einloesbarer Code pro Konto)
    async fn store_verification_code(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<CodeRecord>;

    /// Laedt den unbenutzten, nicht abgelaufenen Code des Benutzers
    async fn get_valid_code(&self, user_id: UserId) -> DbResult<Option<CodeRecord>>;

    /// Markiert die offenen Codes des Benutzers als benutzt (nie geloescht)
    async fn mark_code_used(&self, user_id: UserId) -> DbResult<()>;
}
