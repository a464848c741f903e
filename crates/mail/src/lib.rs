//! torwache-mail – Versand von Verifizierungscodes
//!
//! Stellt das [`Notifier`]-Trait bereit sowie zwei Implementierungen:
//! den [`MailopostClient`] fuer den echten Versand und den
//! [`LogNotifier`] fuer lokale Entwicklung.

pub mod error;
pub mod mailopost;
pub mod notifier;

pub use error::{MailFehler, MailResult};
pub use mailopost::MailopostClient;
pub use notifier::{LogNotifier, Notifier};
