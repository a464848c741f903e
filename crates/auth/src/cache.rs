//! Session-Cache: Refresh-Tokens und Benutzer-Projektionen mit TTL
//!
//! Der Cache ist die einzige Quelle der Wahrheit dafuer, welcher
//! Refresh-Token eines Benutzers aktuell gueltig ist. Eintraege verfallen
//! ausschliesslich ueber ihre TTL; ein Hintergrund-Task raeumt verfallene
//! Eintraege aus dem Speicher. Das Trait ist die Andockstelle fuer ein
//! Redis-Backend; die In-Memory-Implementierung traegt den
//! Single-Instance-Betrieb und die Tests.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use torwache_core::UserId;
use torwache_db::BenutzerProjektion;

use crate::error::{AuthError, AuthResult};

/// Intervall fuer den automatischen Aufraeum-Task: 15 Minuten
const AUFRAEUM_INTERVALL: Duration = Duration::from_secs(15 * 60);

/// Schluessel-Schema wie im Redis-Vorbild: "refresh:<id>" und "user:<id>"
fn refresh_schluessel(user_id: UserId) -> String {
    format!("refresh:{user_id}")
}

fn projektion_schluessel(user_id: UserId) -> String {
    format!("user:{user_id}")
}

/// Schneller Key-Value-Store fuer Session-Zustand
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Hinterlegt den aktuell gueltigen Refresh-Token (ueberschreibt)
    async fn refresh_token_setzen(
        &self,
        user_id: UserId,
        token: &str,
        ttl: Duration,
    ) -> AuthResult<()>;

    /// Laedt den hinterlegten Refresh-Token (None = abwesend/verfallen)
    async fn refresh_token_laden(&self, user_id: UserId) -> AuthResult<Option<String>>;

    /// Loescht den Refresh-Token; Loeschen eines abwesenden Schluessels
    /// ist kein Fehler
    async fn refresh_token_loeschen(&self, user_id: UserId) -> AuthResult<()>;

    /// Cacht die Benutzer-Projektion
    async fn projektion_setzen(
        &self,
        user_id: UserId,
        projektion: &BenutzerProjektion,
        ttl: Duration,
    ) -> AuthResult<()>;

    /// Laedt die gecachte Benutzer-Projektion
    async fn projektion_laden(&self, user_id: UserId) -> AuthResult<Option<BenutzerProjektion>>;

    /// Loescht die gecachte Benutzer-Projektion (idempotent)
    async fn projektion_loeschen(&self, user_id: UserId) -> AuthResult<()>;
}

#[derive(Debug, Clone)]
struct Eintrag {
    wert: String,
    laeuft_ab_am: DateTime<Utc>,
}

impl Eintrag {
    fn ist_gueltig(&self) -> bool {
        Utc::now() < self.laeuft_ab_am
    }
}

/// In-Memory Session-Cache mit TTL-Unterstuetzung
#[derive(Debug, Default)]
pub struct MemoryCache {
    eintraege: RwLock<HashMap<String, Eintrag>>,
}

impl MemoryCache {
    /// Erstellt einen neuen leeren Cache
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Erstellt einen Cache und startet den Aufraeum-Task
    pub fn neu_mit_aufraeumer() -> Arc<Self> {
        let cache = Self::neu();
        let cache_klon = Arc::clone(&cache);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(AUFRAEUM_INTERVALL).await;
                let entfernt = cache_klon.verfallene_aufraeumen().await;
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Verfallene Cache-Eintraege entfernt");
                }
            }
        });
        cache
    }

    async fn setzen(&self, schluessel: String, wert: String, ttl: Duration) -> AuthResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::intern(format!("TTL ausserhalb des Wertebereichs: {e}")))?;
        let eintrag = Eintrag {
            wert,
            laeuft_ab_am: Utc::now() + ttl,
        };
        self.eintraege.write().await.insert(schluessel, eintrag);
        Ok(())
    }

    async fn laden(&self, schluessel: &str) -> Option<String> {
        let eintraege = self.eintraege.read().await;
        eintraege
            .get(schluessel)
            .filter(|e| e.ist_gueltig())
            .map(|e| e.wert.clone())
    }

    async fn loeschen(&self, schluessel: &str) {
        self.eintraege.write().await.remove(schluessel);
    }

    /// Entfernt verfallene Eintraege und gibt deren Anzahl zurueck
    pub async fn verfallene_aufraeumen(&self) -> usize {
        let jetzt = Utc::now();
        let mut eintraege = self.eintraege.write().await;
        let vorher = eintraege.len();
        eintraege.retain(|_, e| e.laeuft_ab_am > jetzt);
        vorher - eintraege.len()
    }

    /// Anzahl der noch gueltigen Eintraege (fuer Tests)
    pub async fn anzahl_gueltige(&self) -> usize {
        let jetzt = Utc::now();
        let eintraege = self.eintraege.read().await;
        eintraege.values().filter(|e| e.laeuft_ab_am > jetzt).count()
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn refresh_token_setzen(
        &self,
        user_id: UserId,
        token: &str,
        ttl: Duration,
    ) -> AuthResult<()> {
        self.setzen(refresh_schluessel(user_id), token.to_string(), ttl)
            .await
    }

    async fn refresh_token_laden(&self, user_id: UserId) -> AuthResult<Option<String>> {
        Ok(self.laden(&refresh_schluessel(user_id)).await)
    }

    async fn refresh_token_loeschen(&self, user_id: UserId) -> AuthResult<()> {
        self.loeschen(&refresh_schluessel(user_id)).await;
        Ok(())
    }

    async fn projektion_setzen(
        &self,
        user_id: UserId,
        projektion: &BenutzerProjektion,
        ttl: Duration,
    ) -> AuthResult<()> {
        let json = serde_json::to_string(projektion)
            .map_err(|e| AuthError::intern(format!("Projektion nicht serialisierbar: {e}")))?;
        self.setzen(projektion_schluessel(user_id), json, ttl).await
    }

    async fn projektion_laden(&self, user_id: UserId) -> AuthResult<Option<BenutzerProjektion>> {
        match self.laden(&projektion_schluessel(user_id)).await {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| AuthError::intern(format!("Projektion nicht dekodierbar: {e}"))),
        }
    }

    async fn projektion_loeschen(&self, user_id: UserId) -> AuthResult<()> {
        self.loeschen(&projektion_schluessel(user_id)).await;
        Ok(())
    }
}
