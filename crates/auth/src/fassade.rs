//! Speicher-Fassade: einheitlicher Zugriff auf Datenbank und Session-Cache
//!
//! Frueher verstreute sich das Read-Through/Write-Through ueber die
//! einzelnen Service-Methoden; hier ist es an einer Stelle gebuendelt,
//! damit keine Aufrufstelle das Cache-Auffrischen oder -Invalidieren
//! vergessen kann. Der AuthService spricht ausschliesslich mit dieser
//! Fassade, nie direkt mit den Stores.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use torwache_core::UserId;
use torwache_db::{
    BenutzerProjektion, BenutzerRecord, BenutzerUpdate, CodeRecord, CodeRepository,
    NeuerBenutzer, UserRepository,
};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::error::AuthResult;

/// Buendelt dauerhaften Speicher und Session-Cache hinter einer Schnittstelle
pub struct SpeicherFassade<U, C> {
    db: Arc<U>,
    cache: Arc<C>,
    /// TTL fuer gecachte Benutzer-Projektionen
    projektion_ttl: Duration,
    /// TTL fuer hinterlegte Refresh-Tokens
    refresh_ttl: Duration,
}

impl<U, C> SpeicherFassade<U, C>
where
    U: UserRepository + CodeRepository,
    C: SessionCache,
{
    pub fn neu(db: Arc<U>, cache: Arc<C>, projektion_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            db,
            cache,
            projektion_ttl,
            refresh_ttl,
        }
    }

    // --- Benutzer ---

    /// Legt einen neuen Benutzer an (nur dauerhafter Speicher; der Cache
    /// wird erst beim ersten Login befuellt)
    pub async fn benutzer_anlegen(&self, data: NeuerBenutzer<'_>) -> AuthResult<BenutzerRecord> {
        Ok(self.db.create(data).await?)
    }

    pub async fn benutzer_nach_email(&self, email: &str) -> AuthResult<Option<BenutzerRecord>> {
        Ok(self.db.get_by_email(email).await?)
    }

    /// Laedt die Benutzer-Projektion: Cache zuerst, bei Miss aus der
    /// Datenbank mit anschliessendem Cache-Fill (Read-Through)
    pub async fn benutzer_projektion(
        &self,
        user_id: UserId,
    ) -> AuthResult<Option<BenutzerProjektion>> {
        if let Some(projektion) = self.cache.projektion_laden(user_id).await? {
            return Ok(Some(projektion));
        }

        let Some(benutzer) = self.db.get_by_id(user_id).await? else {
            return Ok(None);
        };

        let projektion = BenutzerProjektion::from(&benutzer);
        self.cache
            .projektion_setzen(user_id, &projektion, self.projektion_ttl)
            .await?;
        tracing::debug!(user_id = %user_id, "Projektion aus DB nachgeladen und gecacht");
        Ok(Some(projektion))
    }

    /// Aktualisiert den Benutzer und frischt die gecachte Projektion im
    /// selben Zug auf (Write-Through)
    pub async fn benutzer_aktualisieren(
        &self,
        user_id: UserId,
        update: BenutzerUpdate,
    ) -> AuthResult<BenutzerRecord> {
        let benutzer = self.db.update(user_id, update).await?;
        self.projektion_auffrischen(&benutzer).await?;
        Ok(benutzer)
    }

    /// Cacht die Projektion aus einem bereits geladenen Datensatz
    pub async fn projektion_auffrischen(&self, benutzer: &BenutzerRecord) -> AuthResult<()> {
        let projektion = BenutzerProjektion::from(benutzer);
        self.cache
            .projektion_setzen(benutzer.id, &projektion, self.projektion_ttl)
            .await
    }

    /// Loescht den Benutzer weich und raeumt beide Cache-Eintraege ab
    pub async fn benutzer_loeschen(&self, user_id: UserId) -> AuthResult<bool> {
        let geloescht = self.db.soft_delete(user_id).await?;
        self.cache.projektion_loeschen(user_id).await?;
        self.cache.refresh_token_loeschen(user_id).await?;
        Ok(geloescht)
    }

    // --- Signaturen ---

    pub async fn signatur_setzen(&self, user_id: UserId, signatur: Uuid) -> AuthResult<()> {
        Ok(self.db.set_signature(user_id, signatur).await?)
    }

    pub async fn email_zu_signatur(&self, signatur: Uuid) -> AuthResult<Option<String>> {
        Ok(self.db.get_email_by_signature(signatur).await?)
    }

    // --- Verifizierungscodes ---

    pub async fn code_hinterlegen(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<CodeRecord> {
        Ok(self
            .db
            .store_verification_code(user_id, code, expires_at)
            .await?)
    }

    pub async fn code_laden(&self, user_id: UserId) -> AuthResult<Option<CodeRecord>> {
        Ok(self.db.get_valid_code(user_id).await?)
    }

    pub async fn code_verbrauchen(&self, user_id: UserId) -> AuthResult<()> {
        Ok(self.db.mark_code_used(user_id).await?)
    }

    // --- Refresh-Tokens ---

    /// Hinterlegt den neuen Refresh-Token; der vorherige Wert ist damit
    /// endgueltig ungueltig (Rotation)
    pub async fn refresh_token_hinterlegen(
        &self,
        user_id: UserId,
        token: &str,
    ) -> AuthResult<()> {
        self.cache
            .refresh_token_setzen(user_id, token, self.refresh_ttl)
            .await
    }

    pub async fn refresh_token_laden(&self, user_id: UserId) -> AuthResult<Option<String>> {
        self.cache.refresh_token_laden(user_id).await
    }

    pub async fn refresh_token_loeschen(&self, user_id: UserId) -> AuthResult<()> {
        self.cache.refresh_token_loeschen(user_id).await
    }
}
