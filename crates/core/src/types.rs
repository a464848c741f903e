//! Gemeinsame Identifikationstypen fuer Torwache
//!
//! Die Benutzer-ID verwendet das Newtype-Pattern um Verwechslungen mit
//! anderen UUID-Werten (Signaturen, Code-IDs) zur Compilezeit
//! auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Benutzer-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Erstellt eine neue zufaellige UserId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }

    /// Parst eine UserId aus ihrer String-Darstellung
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_eindeutig() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b, "Zwei neue UserIds muessen verschieden sein");
    }

    #[test]
    fn user_id_parse_roundtrip() {
        let id = UserId::new();
        let geparst = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, geparst);
    }

    #[test]
    fn user_id_parse_ungueltig() {
        assert!(UserId::parse("keine-uuid").is_err());
    }

    #[test]
    fn user_id_serde_transparent() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        // Transparente Serialisierung: nur der UUID-String, kein Wrapper
        assert_eq!(json, format!("\"{}\"", id.inner()));
        let zurueck: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, zurueck);
    }
}
