//! torwache-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit: die Traits
//! [`UserRepository`] und [`CodeRepository`] definieren den dauerhaften
//! Speicher fuer Konten und Verifizierungscodes, [`SqliteDb`] ist die
//! SQLite-Implementierung (sqlx, WAL-Modus, eingebettete Migrationen).
//! Weitere Backends (z.B. PostgreSQL) docken am selben Trait an.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::{DbError, DbResult};
pub use models::{
    BenutzerProjektion, BenutzerRecord, BenutzerUpdate, CodeRecord, NeuerBenutzer,
};
pub use repository::{CodeRepository, UserRepository};
pub use sqlite::SqliteDb;
