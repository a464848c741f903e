//! Passwort-Hashing mit Argon2id
//!
//! Argon2id ist der empfohlene Algorithmus gemaess OWASP-Richtlinien.
//! Der Arbeitsfaktor ist konfigurierbar; Klartext-Passwoerter werden nie
//! gespeichert oder geloggt, und der Vergleich laeuft immer ueber den
//! Hash (nie ueber Klartext-Gleichheit).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Hasht und verifiziert Passwoerter mit Argon2id
#[derive(Debug, Clone)]
pub struct PasswortHasher {
    speicher_kib: u32,
    iterationen: u32,
    parallelismus: u32,
}

impl Default for PasswortHasher {
    /// OWASP-Empfehlung (Stand 2024): 64 MiB, 3 Iterationen, 1 Thread
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelismus: 1,
        }
    }
}

impl PasswortHasher {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt einen Hasher mit eigenem Arbeitsfaktor (z.B. fuer Tests)
    pub fn mit_arbeitsfaktor(speicher_kib: u32, iterationen: u32, parallelismus: u32) -> Self {
        Self {
            speicher_kib,
            iterationen,
            parallelismus,
        }
    }

    fn instanz(&self) -> AuthResult<Argon2<'static>> {
        let params = Params::new(self.speicher_kib, self.iterationen, self.parallelismus, None)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltige Parameter: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hasht ein Passwort mit zufaelligem Salt; gibt den PHC-String zurueck
    pub fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.instanz()?
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    /// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
    ///
    /// Falsches Passwort ist `Ok(false)`; nur ein kaputter Hash ist ein
    /// Fehler.
    pub fn verifizieren(&self, passwort: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

        match self.instanz()?.verify_password(passwort.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Kleiner Arbeitsfaktor, damit die Tests schnell bleiben
    fn hasher() -> PasswortHasher {
        PasswortHasher::mit_arbeitsfaktor(8 * 1024, 1, 1)
    }

    #[test]
    fn hashen_und_verifizieren() {
        let h = hasher();
        let hash = h.hashen("pw1").expect("Hashing fehlgeschlagen");

        assert!(hash.starts_with("$argon2id$"), "PHC-Format erwartet");
        assert!(h.verifizieren("pw1", &hash).unwrap());
    }

    #[test]
    fn falsches_passwort_ist_ok_false() {
        let h = hasher();
        let hash = h.hashen("richtig").unwrap();
        assert!(!h.verifizieren("falsch", &hash).unwrap());
    }

    #[test]
    fn gleiches_passwort_verschiedene_hashes() {
        let h = hasher();
        let hash1 = h.hashen("gleich").unwrap();
        let hash2 = h.hashen("gleich").unwrap();
        assert_ne!(hash1, hash2, "Salt muss die Hashes unterscheiden");
    }

    #[test]
    fn kaputter_hash_ist_fehler() {
        let h = hasher();
        let ergebnis = h.verifizieren("pw", "kein_phc_string");
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }
}
