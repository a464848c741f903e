//! Auth-Service: Orchestrierung von Registrierung, Login und Token-Rotation
//!
//! Der Service kennt nur die [`SpeicherFassade`], nie die Stores direkt.
//! Jede Operation haelt die Reihenfolge-Invarianten ein (erst Benutzer,
//! dann Code, dann Signatur) und entscheidet, welche Fehlerdetails den
//! Aufrufer erreichen duerfen.

use chrono::{Duration, Utc};
use torwache_db::{
    BenutzerProjektion, BenutzerRecord, BenutzerUpdate, CodeRepository, NeuerBenutzer,
    UserRepository,
};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::code::{signatur_generieren, verifizierungscode_generieren};
use crate::error::{AuthError, AuthResult};
use crate::fassade::SpeicherFassade;
use crate::password::PasswortHasher;
use crate::token::{TokenManager, TokenPaar};

/// Ergebnis einer erfolgreichen Registrierung
///
/// Die Signatur geht an den Aufrufer zurueck; der Code verlaesst den
/// Server nur ueber den Mail-Versand.
#[derive(Debug, Clone)]
pub struct Registrierung {
    pub signatur: Uuid,
    pub code: String,
}

/// Geschaeftslogik des Authentifizierungsdienstes
pub struct AuthService<U, C> {
    fassade: SpeicherFassade<U, C>,
    hasher: PasswortHasher,
    token_manager: TokenManager,
    /// Lebensdauer frisch ausgestellter Verifizierungscodes
    code_ttl: Duration,
}

impl<U, C> AuthService<U, C>
where
    U: UserRepository + CodeRepository,
    C: SessionCache,
{
    pub fn neu(
        fassade: SpeicherFassade<U, C>,
        hasher: PasswortHasher,
        token_manager: TokenManager,
        code_ttl: Duration,
    ) -> Self {
        Self {
            fassade,
            hasher,
            token_manager,
            code_ttl,
        }
    }

    /// Registriert ein neues, unbestaetigtes Konto
    ///
    /// Reihenfolge: Eingaben pruefen, Passwort hashen, Benutzer anlegen,
    /// Code hinterlegen, Signatur setzen. Schlaegt ein spaeter Schritt
    /// fehl, bleibt ein unbestaetigtes Konto ohne Signatur zurueck; das
    /// ist harmlos, weil es weder einloggen noch verifiziert werden kann.
    pub async fn registrieren(&self, email: &str, passwort: &str) -> AuthResult<Registrierung> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::UngueltigeEingabe(
                "E-Mail-Adresse fehlt oder ist ungueltig".into(),
            ));
        }
        if passwort.is_empty() {
            return Err(AuthError::UngueltigeEingabe("Passwort fehlt".into()));
        }

        if self.fassade.benutzer_nach_email(email).await?.is_some() {
            return Err(AuthError::EmailVergeben(email.to_string()));
        }

        let password_hash = self.hasher.hashen(passwort)?;
        let benutzer = self
            .fassade
            .benutzer_anlegen(NeuerBenutzer {
                email,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                // Rennen zwischen Vorpruefung und INSERT
                AuthError::Datenbank(torwache_db::DbError::Eindeutigkeit(_)) => {
                    AuthError::EmailVergeben(email.to_string())
                }
                andere => andere,
            })?;

        let code = verifizierungscode_generieren();
        let ablauf = Utc::now() + self.code_ttl;
        self.fassade
            .code_hinterlegen(benutzer.id, &code, ablauf)
            .await?;

        let signatur = signatur_generieren();
        self.fassade.signatur_setzen(benutzer.id, signatur).await?;

        tracing::info!(user_id = %benutzer.id, "Neues Konto registriert");
        Ok(Registrierung { signatur, code })
    }

    /// Loest Signatur und Code ein und bestaetigt das Konto
    ///
    /// Ein falscher Code verbraucht den hinterlegten Code nicht; der
    /// Aufrufer darf es mit dem richtigen Code erneut versuchen.
    pub async fn code_verifizieren(&self, signatur: Uuid, code: &str) -> AuthResult<()> {
        let email = self
            .fassade
            .email_zu_signatur(signatur)
            .await?
            .ok_or(AuthError::SignaturUnbekannt)?;

        let benutzer = self
            .fassade
            .benutzer_nach_email(&email)
            .await?
            .ok_or_else(|| AuthError::BenutzerNichtGefunden(email.clone()))?;

        let hinterlegt = self
            .fassade
            .code_laden(benutzer.id)
            .await?
            .ok_or(AuthError::FalscherCode)?;

        if hinterlegt.code != code {
            tracing::warn!(user_id = %benutzer.id, "Verifizierung mit falschem Code");
            return Err(AuthError::FalscherCode);
        }

        self.fassade.code_verbrauchen(benutzer.id).await?;
        self.fassade
            .benutzer_aktualisieren(
                benutzer.id,
                BenutzerUpdate {
                    is_confirmed: Some(true),
                    ..BenutzerUpdate::default()
                },
            )
            .await?;

        tracing::info!(user_id = %benutzer.id, "Konto bestaetigt");
        Ok(())
    }

    /// Meldet einen bestaetigten Benutzer an und stellt ein Token-Paar aus
    ///
    /// Unbekannte E-Mail, unbestaetigtes Konto und falsches Passwort sind
    /// fuer den Aufrufer absichtlich ununterscheidbar; die Unterscheidung
    /// landet nur im Log.
    pub async fn anmelden(
        &self,
        email: &str,
        passwort: &str,
    ) -> AuthResult<(TokenPaar, BenutzerProjektion)> {
        let Some(benutzer) = self.fassade.benutzer_nach_email(email.trim()).await? else {
            tracing::warn!("Login mit unbekannter E-Mail");
            return Err(AuthError::UngueltigeAnmeldedaten);
        };

        if !benutzer.is_confirmed {
            tracing::warn!(user_id = %benutzer.id, "Login auf unbestaetigtem Konto");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        if !self.hasher.verifizieren(passwort, &benutzer.password_hash)? {
            tracing::warn!(user_id = %benutzer.id, "Login mit falschem Passwort");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let paar = self.token_paar_ausstellen(&benutzer).await?;
        tracing::info!(user_id = %benutzer.id, "Benutzer angemeldet");
        Ok((paar, BenutzerProjektion::from(&benutzer)))
    }

    /// Tauscht ein gueltiges Refresh-Token gegen ein frisches Paar
    ///
    /// Zwei Pruefungen muessen beide bestehen: die Signatur des Tokens und
    /// die Gleichheit mit dem hinterlegten Wert. Nach dem Tausch ist das
    /// alte Token endgueltig verbraucht (Rotation).
    pub async fn tokens_erneuern(&self, refresh_token: &str) -> AuthResult<TokenPaar> {
        let user_id = self.token_manager.refresh_validieren(refresh_token)?;

        match self.fassade.refresh_token_laden(user_id).await? {
            Some(hinterlegt) if hinterlegt == refresh_token => {}
            Some(_) => {
                tracing::warn!(user_id = %user_id, "Wiederverwendung eines rotierten Refresh-Tokens");
                return Err(AuthError::TokenUngueltig);
            }
            None => return Err(AuthError::TokenUngueltig),
        }

        // Geloeschte Konten bekommen kein neues Paar mehr
        let projektion = self
            .fassade
            .benutzer_projektion(user_id)
            .await?
            .ok_or(AuthError::TokenUngueltig)?;

        let paar = self.token_manager.token_paar_erzeugen(user_id)?;
        self.fassade
            .refresh_token_hinterlegen(user_id, &paar.refresh_token)
            .await?;

        tracing::debug!(user_id = %projektion.id, "Token-Paar rotiert");
        Ok(paar)
    }

    /// Laedt die Benutzer-Projektion zum Access-Token
    pub async fn session_abrufen(&self, access_token: &str) -> AuthResult<BenutzerProjektion> {
        let user_id = self.token_manager.access_validieren(access_token)?;
        self.fassade
            .benutzer_projektion(user_id)
            .await?
            .ok_or_else(|| AuthError::BenutzerNichtGefunden(user_id.to_string()))
    }

    /// Meldet den Benutzer ab, indem das hinterlegte Refresh-Token geloescht
    /// wird; wiederholtes Abmelden ist kein Fehler
    pub async fn abmelden(&self, access_token: &str) -> AuthResult<()> {
        let user_id = self.token_manager.access_validieren(access_token)?;
        self.fassade.refresh_token_loeschen(user_id).await?;
        tracing::info!(user_id = %user_id, "Benutzer abgemeldet");
        Ok(())
    }

    /// Loescht das eigene Konto weich; die E-Mail wird fuer neue
    /// Registrierungen wieder frei
    pub async fn konto_loeschen(&self, access_token: &str) -> AuthResult<()> {
        let user_id = self.token_manager.access_validieren(access_token)?;
        if !self.fassade.benutzer_loeschen(user_id).await? {
            return Err(AuthError::BenutzerNichtGefunden(user_id.to_string()));
        }
        tracing::info!(user_id = %user_id, "Konto geloescht");
        Ok(())
    }

    async fn token_paar_ausstellen(&self, benutzer: &BenutzerRecord) -> AuthResult<TokenPaar> {
        let paar = self.token_manager.token_paar_erzeugen(benutzer.id)?;
        self.fassade
            .refresh_token_hinterlegen(benutzer.id, &paar.refresh_token)
            .await?;
        self.fassade.projektion_auffrischen(benutzer).await?;
        Ok(paar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Arc;
    use std::time::Duration as StdDuration;
    use tokio::sync::Mutex;
    use torwache_core::UserId;
    use torwache_db::{CodeRecord, DbError, DbResult};

    /// In-Memory-Implementierung beider Repository-Traits fuer die Tests
    #[derive(Default)]
    struct TestRepo {
        benutzer: Mutex<Vec<BenutzerRecord>>,
        codes: Mutex<Vec<CodeRecord>>,
    }

    #[async_trait]
    impl UserRepository for TestRepo {
        async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
            let mut benutzer = self.benutzer.lock().await;
            if benutzer
                .iter()
                .any(|b| b.email == data.email && b.deleted_at.is_none())
            {
                return Err(DbError::Eindeutigkeit(data.email.to_string()));
            }
            let jetzt = Utc::now();
            let record = BenutzerRecord {
                id: UserId::new(),
                email: data.email.to_string(),
                password_hash: data.password_hash.to_string(),
                signatur: None,
                is_confirmed: false,
                created_at: jetzt,
                updated_at: jetzt,
                deleted_at: None,
            };
            benutzer.push(record.clone());
            Ok(record)
        }

        async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>> {
            let benutzer = self.benutzer.lock().await;
            Ok(benutzer
                .iter()
                .find(|b| b.id == id && b.deleted_at.is_none())
                .cloned())
        }

        async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
            let benutzer = self.benutzer.lock().await;
            Ok(benutzer
                .iter()
                .find(|b| b.email == email && b.deleted_at.is_none())
                .cloned())
        }

        async fn update(&self, id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
            let mut benutzer = self.benutzer.lock().await;
            let record = benutzer
                .iter_mut()
                .find(|b| b.id == id && b.deleted_at.is_none())
                .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))?;
            if let Some(email) = data.email {
                record.email = email;
            }
            if let Some(hash) = data.password_hash {
                record.password_hash = hash;
            }
            if let Some(confirmed) = data.is_confirmed {
                record.is_confirmed = confirmed;
            }
            record.updated_at = Utc::now();
            Ok(record.clone())
        }

        async fn soft_delete(&self, id: UserId) -> DbResult<bool> {
            let mut benutzer = self.benutzer.lock().await;
            match benutzer
                .iter_mut()
                .find(|b| b.id == id && b.deleted_at.is_none())
            {
                Some(record) => {
                    record.deleted_at = Some(Utc::now());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn get_email_by_signature(&self, signatur: Uuid) -> DbResult<Option<String>> {
            let benutzer = self.benutzer.lock().await;
            Ok(benutzer
                .iter()
                .find(|b| b.signatur == Some(signatur) && b.deleted_at.is_none())
                .map(|b| b.email.clone()))
        }

        async fn set_signature(&self, id: UserId, signatur: Uuid) -> DbResult<()> {
            let mut benutzer = self.benutzer.lock().await;
            let record = benutzer
                .iter_mut()
                .find(|b| b.id == id && b.deleted_at.is_none())
                .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))?;
            record.signatur = Some(signatur);
            Ok(())
        }
    }

    #[async_trait]
    impl CodeRepository for TestRepo {
        async fn store_verification_code(
            &self,
            user_id: UserId,
            code: &str,
            expires_at: DateTime<Utc>,
        ) -> DbResult<CodeRecord> {
            let mut codes = self.codes.lock().await;
            for alt in codes.iter_mut().filter(|c| c.user_id == user_id) {
                alt.is_used = true;
            }
            let record = CodeRecord {
                id: Uuid::new_v4(),
                user_id,
                code: code.to_string(),
                is_used: false,
                expires_at,
                created_at: Utc::now(),
            };
            codes.push(record.clone());
            Ok(record)
        }

        async fn get_valid_code(&self, user_id: UserId) -> DbResult<Option<CodeRecord>> {
            let codes = self.codes.lock().await;
            Ok(codes
                .iter()
                .filter(|c| c.user_id == user_id && c.ist_einloesbar())
                .max_by_key(|c| c.created_at)
                .cloned())
        }

        async fn mark_code_used(&self, user_id: UserId) -> DbResult<()> {
            let mut codes = self.codes.lock().await;
            for code in codes.iter_mut().filter(|c| c.user_id == user_id) {
                code.is_used = true;
            }
            Ok(())
        }
    }

    fn service_mit_code_ttl(code_ttl: Duration) -> AuthService<TestRepo, MemoryCache> {
        let fassade = SpeicherFassade::neu(
            Arc::new(TestRepo::default()),
            MemoryCache::neu(),
            StdDuration::from_secs(3600),
            StdDuration::from_secs(24 * 3600),
        );
        AuthService::neu(
            fassade,
            PasswortHasher::mit_arbeitsfaktor(8 * 1024, 1, 1),
            TokenManager::neu(b"test-geheimnis", Duration::minutes(15), Duration::hours(24)),
            code_ttl,
        )
    }

    fn service() -> AuthService<TestRepo, MemoryCache> {
        service_mit_code_ttl(Duration::hours(24))
    }

    /// Registriert und bestaetigt ein Konto
    async fn konto_anlegen(
        svc: &AuthService<TestRepo, MemoryCache>,
        email: &str,
        passwort: &str,
    ) {
        let reg = svc.registrieren(email, passwort).await.unwrap();
        svc.code_verifizieren(reg.signatur, &reg.code).await.unwrap();
    }

    #[tokio::test]
    async fn registrieren_und_verifizieren() {
        let svc = service();
        let reg = svc.registrieren("a@example.com", "pw1").await.unwrap();
        assert_eq!(reg.code.len(), 6);

        svc.code_verifizieren(reg.signatur, &reg.code).await.unwrap();

        let (_, benutzer) = svc.anmelden("a@example.com", "pw1").await.unwrap();
        assert!(benutzer.is_confirmed);
        assert_eq!(benutzer.email, "a@example.com");
    }

    #[tokio::test]
    async fn leere_eingaben_abgelehnt() {
        let svc = service();
        assert!(matches!(
            svc.registrieren("", "pw").await,
            Err(AuthError::UngueltigeEingabe(_))
        ));
        assert!(matches!(
            svc.registrieren("keine-email", "pw").await,
            Err(AuthError::UngueltigeEingabe(_))
        ));
        assert!(matches!(
            svc.registrieren("a@example.com", "").await,
            Err(AuthError::UngueltigeEingabe(_))
        ));
    }

    #[tokio::test]
    async fn doppelte_registrierung_abgelehnt() {
        let svc = service();
        svc.registrieren("a@example.com", "pw1").await.unwrap();

        let zweite = svc.registrieren("a@example.com", "anderes").await;
        assert!(matches!(zweite, Err(AuthError::EmailVergeben(_))));
    }

    #[tokio::test]
    async fn unbekannte_signatur_abgelehnt() {
        let svc = service();
        let ergebnis = svc.code_verifizieren(Uuid::new_v4(), "123456").await;
        assert!(matches!(ergebnis, Err(AuthError::SignaturUnbekannt)));
    }

    #[tokio::test]
    async fn falscher_code_verbraucht_nichts() {
        let svc = service();
        let reg = svc.registrieren("a@example.com", "pw1").await.unwrap();

        let falsch = svc.code_verifizieren(reg.signatur, "000000").await;
        assert!(matches!(falsch, Err(AuthError::FalscherCode)));

        // Konto weiterhin unbestaetigt, Login verwehrt
        assert!(matches!(
            svc.anmelden("a@example.com", "pw1").await,
            Err(AuthError::UngueltigeAnmeldedaten)
        ));

        // Der richtige Code funktioniert danach noch
        svc.code_verifizieren(reg.signatur, &reg.code).await.unwrap();
    }

    #[tokio::test]
    async fn code_nicht_wiederverwendbar() {
        let svc = service();
        let reg = svc.registrieren("a@example.com", "pw1").await.unwrap();

        svc.code_verifizieren(reg.signatur, &reg.code).await.unwrap();
        let zweite = svc.code_verifizieren(reg.signatur, &reg.code).await;
        assert!(matches!(zweite, Err(AuthError::FalscherCode)));
    }

    #[tokio::test]
    async fn abgelaufener_code_abgelehnt() {
        let svc = service_mit_code_ttl(Duration::seconds(-1));
        let reg = svc.registrieren("a@example.com", "pw1").await.unwrap();

        let ergebnis = svc.code_verifizieren(reg.signatur, &reg.code).await;
        assert!(matches!(ergebnis, Err(AuthError::FalscherCode)));
    }

    #[tokio::test]
    async fn neuer_code_ersetzt_alten() {
        let svc = service();
        let erste = svc.registrieren("a@example.com", "pw1").await.unwrap();
        // Zweite Registrierung schlaegt fehl (Konto existiert), der alte
        // Code bleibt der gueltige
        assert!(svc.registrieren("a@example.com", "pw1").await.is_err());
        svc.code_verifizieren(erste.signatur, &erste.code)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_sammelt_fehlschlaege_in_einem_fehler() {
        let svc = service();
        let reg = svc.registrieren("a@example.com", "pw1").await.unwrap();

        // Unbestaetigtes Konto
        assert!(matches!(
            svc.anmelden("a@example.com", "pw1").await,
            Err(AuthError::UngueltigeAnmeldedaten)
        ));

        svc.code_verifizieren(reg.signatur, &reg.code).await.unwrap();

        // Falsches Passwort
        assert!(matches!(
            svc.anmelden("a@example.com", "falsch").await,
            Err(AuthError::UngueltigeAnmeldedaten)
        ));

        // Unbekannte E-Mail
        assert!(matches!(
            svc.anmelden("unbekannt@example.com", "pw1").await,
            Err(AuthError::UngueltigeAnmeldedaten)
        ));
    }

    #[tokio::test]
    async fn rotation_verbraucht_altes_token() {
        let svc = service();
        konto_anlegen(&svc, "a@example.com", "pw1").await;
        let (paar, _) = svc.anmelden("a@example.com", "pw1").await.unwrap();

        let neues = svc.tokens_erneuern(&paar.refresh_token).await.unwrap();
        assert_ne!(neues.refresh_token, paar.refresh_token);

        // Replay des alten Tokens wird abgewiesen
        let replay = svc.tokens_erneuern(&paar.refresh_token).await;
        assert!(matches!(replay, Err(AuthError::TokenUngueltig)));

        // Das neue Token funktioniert weiterhin
        svc.tokens_erneuern(&neues.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn access_token_kann_nicht_erneuern() {
        let svc = service();
        konto_anlegen(&svc, "a@example.com", "pw1").await;
        let (paar, _) = svc.anmelden("a@example.com", "pw1").await.unwrap();

        let ergebnis = svc.tokens_erneuern(&paar.access_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[tokio::test]
    async fn session_abrufen_liefert_projektion() {
        let svc = service();
        konto_anlegen(&svc, "a@example.com", "pw1").await;
        let (paar, _) = svc.anmelden("a@example.com", "pw1").await.unwrap();

        let projektion = svc.session_abrufen(&paar.access_token).await.unwrap();
        assert_eq!(projektion.email, "a@example.com");
        assert!(projektion.is_confirmed);
    }

    #[tokio::test]
    async fn abmelden_macht_refresh_unbrauchbar() {
        let svc = service();
        konto_anlegen(&svc, "a@example.com", "pw1").await;
        let (paar, _) = svc.anmelden("a@example.com", "pw1").await.unwrap();

        svc.abmelden(&paar.access_token).await.unwrap();
        // Wiederholtes Abmelden ist kein Fehler
        svc.abmelden(&paar.access_token).await.unwrap();

        let ergebnis = svc.tokens_erneuern(&paar.refresh_token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[tokio::test]
    async fn konto_loeschen_gibt_email_frei() {
        let svc = service();
        konto_anlegen(&svc, "a@example.com", "pw1").await;
        let (paar, _) = svc.anmelden("a@example.com", "pw1").await.unwrap();

        svc.konto_loeschen(&paar.access_token).await.unwrap();

        // Refresh des geloeschten Kontos wird abgewiesen
        assert!(matches!(
            svc.tokens_erneuern(&paar.refresh_token).await,
            Err(AuthError::TokenUngueltig)
        ));

        // Die E-Mail ist wieder registrierbar
        svc.registrieren("a@example.com", "pw2").await.unwrap();
    }

    #[tokio::test]
    async fn kompletter_lebenszyklus() {
        let svc = service();

        // Registrierung liefert Signatur, Code bleibt serverseitig
        let reg = svc.registrieren("ada@example.com", "sehr-geheim").await.unwrap();

        // Falscher Code aendert nichts
        assert!(svc.code_verifizieren(reg.signatur, "000000").await.is_err());
        assert!(svc.anmelden("ada@example.com", "sehr-geheim").await.is_err());

        // Richtiger Code bestaetigt das Konto
        svc.code_verifizieren(reg.signatur, &reg.code).await.unwrap();

        // Login liefert Paar plus Projektion
        let (paar1, benutzer) = svc.anmelden("ada@example.com", "sehr-geheim").await.unwrap();
        assert!(benutzer.is_confirmed);

        // Rotation: neues Paar, altes Refresh-Token tot
        let paar2 = svc.tokens_erneuern(&paar1.refresh_token).await.unwrap();
        assert!(svc.tokens_erneuern(&paar1.refresh_token).await.is_err());

        // Beide Access-Tokens bleiben bis zu ihrem Ablauf gueltig
        assert!(svc.session_abrufen(&paar1.access_token).await.is_ok());
        let projektion = svc.session_abrufen(&paar2.access_token).await.unwrap();
        assert_eq!(projektion.id, benutzer.id);

        // Logout, danach ist auch das frische Refresh-Token wertlos
        svc.abmelden(&paar2.access_token).await.unwrap();
        assert!(svc.tokens_erneuern(&paar2.refresh_token).await.is_err());
    }
}
