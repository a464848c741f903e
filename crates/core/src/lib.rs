//! torwache-core – Gemeinsame Typen und Fehlerkategorien
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Torwache-Crates gemeinsam genutzt werden: die `UserId` als
//! Newtype und die Fehlerkategorien der RPC-Schnittstelle.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::Fehlerkategorie;
pub use types::UserId;
