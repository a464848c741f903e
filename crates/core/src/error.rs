//! Fehlerkategorien der RPC-Schnittstelle
//!
//! Jeder Domain-Fehler wird an der Transportgrenze auf genau eine dieser
//! Kategorien abgebildet. Interne Details (Datenbank, Hashing) duerfen die
//! Vertrauensgrenze nicht verlassen.

use serde::{Deserialize, Serialize};

/// Kategorisierte Fehler wie sie der Aufrufer sieht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fehlerkategorie {
    /// Fehlende oder fehlerhafte Eingabe, falscher Verifizierungscode
    UngueltigesArgument,
    /// Falsche Anmeldedaten, ungueltiger/abgelaufener/rotierter Token
    NichtAuthentifiziert,
    /// Unbekannter Benutzer oder unbekannte Signatur
    NichtGefunden,
    /// Doppelte Registrierung
    BereitsVorhanden,
    /// Store-, Hash- oder Transportfehler (Details nur serverseitig)
    Intern,
}

impl std::fmt::Display for Fehlerkategorie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::UngueltigesArgument => "invalid_argument",
            Self::NichtAuthentifiziert => "unauthenticated",
            Self::NichtGefunden => "not_found",
            Self::BereitsVorhanden => "already_exists",
            Self::Intern => "internal",
        };
        write!(f, "{name}")
    }
}
