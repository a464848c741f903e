//! Verifizierungscodes und Korrelations-Signaturen
//!
//! Beide Werte kommen direkt aus dem OS-CSPRNG. Pro-Aufruf-Seeding aus der
//! Wanduhr (wie in aelteren Implementierungen ueblich) ist zu schwach und
//! hier bewusst ausgeschlossen.

use rand::{rngs::OsRng, Rng};
use uuid::Uuid;

/// Laenge der numerischen Verifizierungscodes
pub const CODE_LAENGE: usize = 6;

/// Generiert einen sechsstelligen numerischen Code (fuehrende Nullen
/// moeglich, daher als String)
pub fn verifizierungscode_generieren() -> String {
    let n: u32 = OsRng.gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Generiert eine Korrelations-Signatur (UUID v4, 122 Bit Entropie)
///
/// Die Signatur wird dem Aufrufer bei der Registrierung zurueckgegeben und
/// erlaubt dem spaeteren Verify-Aufruf das Konto ohne erneute E-Mail zu
/// finden. Sie wird nie ueber Benutzer hinweg wiederverwendet.
pub fn signatur_generieren() -> Uuid {
    Uuid::new_v4()
}
