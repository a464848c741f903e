//! SQLite-Backend-Implementierungen der Repository-Traits

pub mod codes;
pub mod pool;
pub mod users;

pub use pool::{DatenbankKonfig, SqliteDb};
