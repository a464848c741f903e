//! torwache-auth – Authentifizierungs- und Session-Kern
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Verifizierungscodes und Korrelations-Signaturen (CSPRNG)
//! - Token-Manager (HMAC-signierte Access-/Refresh-Token-Paare)
//! - Session-Cache (Trait + In-Memory-Implementierung mit TTL)
//! - Speicher-Fassade (Read-Through/Write-Through ueber beide Stores)
//! - AuthService (Registrierung, Verifizierung, Login, Rotation, Logout)

pub mod cache;
pub mod code;
pub mod error;
pub mod fassade;
pub mod password;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use cache::{MemoryCache, SessionCache};
pub use code::{signatur_generieren, verifizierungscode_generieren};
pub use error::{AuthError, AuthResult};
pub use fassade::SpeicherFassade;
pub use password::PasswortHasher;
pub use service::{AuthService, Registrierung};
pub use token::{TokenManager, TokenPaar};
