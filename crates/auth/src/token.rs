//! Token-Manager: HMAC-signierte Access-/Refresh-Token-Paare
//!
//! Beide Token sind JWTs mit unabhaengigen Laufzeiten und einem
//! `typ`-Claim, der Access- von Refresh-Token trennt: ein Access-Token
//! besteht die Refresh-Validierung nie und umgekehrt. Access-Token sind
//! zustandslos pruefbar; Refresh-Token werden zusaetzlich gegen den
//! Session-Cache verglichen (Rotation, siehe AuthService).

use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use torwache_core::UserId;

use crate::error::{AuthError, AuthResult};

/// Token-Art im `typ`-Claim
const TYP_ACCESS: &str = "access";
const TYP_REFRESH: &str = "refresh";

/// Ein frisch ausgestelltes Token-Paar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPaar {
    pub access_token: String,
    pub refresh_token: String,
    pub access_laeuft_ab: DateTime<Utc>,
    pub refresh_laeuft_ab: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Benutzer-ID
    sub: String,
    /// "access" oder "refresh"
    typ: String,
    /// Ablauf als Unix-Sekunden
    exp: i64,
    /// Ausstellungszeitpunkt als Unix-Sekunden
    iat: i64,
    /// Zufalls-ID: zwei Ausstellungen kollidieren nie
    jti: String,
}

/// Stellt Token-Paare aus und validiert sie
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    /// Erstellt einen Manager mit gegebenem Geheimnis und Laufzeiten
    pub fn neu(geheimnis: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(geheimnis),
            decoding: DecodingKey::from_secret(geheimnis),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Stellt ein neues Token-Paar fuer den Benutzer aus
    pub fn token_paar_erzeugen(&self, user_id: UserId) -> AuthResult<TokenPaar> {
        let jetzt = Utc::now();
        let access_ablauf = jetzt + self.access_ttl;
        let refresh_ablauf = jetzt + self.refresh_ttl;

        let access_token = self.signieren(user_id, TYP_ACCESS, jetzt, access_ablauf)?;
        let refresh_token = self.signieren(user_id, TYP_REFRESH, jetzt, refresh_ablauf)?;

        Ok(TokenPaar {
            access_token,
            refresh_token,
            access_laeuft_ab: access_ablauf,
            refresh_laeuft_ab: refresh_ablauf,
        })
    }

    /// Validiert ein Access-Token und gibt die Benutzer-ID zurueck
    pub fn access_validieren(&self, token: &str) -> AuthResult<UserId> {
        self.validieren(token, TYP_ACCESS)
    }

    /// Validiert ein Refresh-Token und gibt die Benutzer-ID zurueck
    ///
    /// Nur die kryptografische Haelfte der Pruefung; der Cache-Vergleich
    /// passiert im AuthService.
    pub fn refresh_validieren(&self, token: &str) -> AuthResult<UserId> {
        self.validieren(token, TYP_REFRESH)
    }

    fn signieren(
        &self,
        user_id: UserId,
        typ: &str,
        jetzt: DateTime<Utc>,
        ablauf: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            typ: typ.to_string(),
            exp: ablauf.timestamp(),
            iat: jetzt.timestamp(),
            jti: jti_generieren(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::intern(format!("Token-Signierung fehlgeschlagen: {e}")))
    }

    fn validieren(&self, token: &str, erwarteter_typ: &str) -> AuthResult<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let daten = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AuthError::TokenUngueltig)?;

        if daten.claims.typ != erwarteter_typ {
            return Err(AuthError::TokenUngueltig);
        }

        UserId::parse(&daten.claims.sub).map_err(|_| AuthError::TokenUngueltig)
    }
}

/// Zufalls-jti: 16 Bytes aus dem OS-CSPRNG, URL-sicheres Base64
fn jti_generieren() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
