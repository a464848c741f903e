//! gRPC-Service-Implementierung fuer den Auth-Dienst
//!
//! Die Handler uebersetzen nur zwischen Wire-Format und AuthService;
//! Geschaeftslogik gehoert nicht hierher. Interne Fehlerdetails bleiben
//! im Log und erreichen den Aufrufer nie.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use uuid::Uuid;

use torwache_auth::{AuthError, AuthService, SessionCache, TokenPaar};
use torwache_core::Fehlerkategorie;
use torwache_db::{BenutzerProjektion, CodeRepository, UserRepository};
use torwache_mail::Notifier;

// Generierter Code aus tonic-build
pub mod proto {
    tonic::include_proto!("torwache.v1");
}

use proto::*;

/// gRPC-Fassade um den AuthService
pub struct AuthDienst<U, C> {
    service: Arc<AuthService<U, C>>,
    notifier: Arc<dyn Notifier>,
}

impl<U, C> AuthDienst<U, C> {
    pub fn neu(service: Arc<AuthService<U, C>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { service, notifier }
    }
}

#[tonic::async_trait]
impl<U, C> proto::auth_server::Auth for AuthDienst<U, C>
where
    U: UserRepository + CodeRepository + 'static,
    C: SessionCache + 'static,
{
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let body = request.into_inner();

        let registrierung = self
            .service
            .registrieren(&body.email, &body.password)
            .await
            .map_err(auth_error_zu_status)?;

        // Mail-Fehler sind nicht fatal: das Konto existiert bereits und
        // kann spaeter erneut angestossen werden
        if let Err(e) = self
            .notifier
            .verifizierungscode_senden(&body.email, &registrierung.code)
            .await
        {
            tracing::warn!(fehler = %e, "Verifizierungscode konnte nicht versandt werden");
        }

        Ok(Response::new(RegisterResponse {
            signature: registrierung.signatur.to_string(),
        }))
    }

    async fn verify_code(
        &self,
        request: Request<VerifyCodeRequest>,
    ) -> Result<Response<VerifyCodeResponse>, Status> {
        let body = request.into_inner();
        let signatur = Uuid::parse_str(&body.signature)
            .map_err(|_| Status::invalid_argument("Signatur ist keine gueltige UUID"))?;

        self.service
            .code_verifizieren(signatur, &body.code)
            .await
            .map_err(auth_error_zu_status)?;

        Ok(Response::new(VerifyCodeResponse { success: true }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let body = request.into_inner();

        let (paar, benutzer) = self
            .service
            .anmelden(&body.email, &body.password)
            .await
            .map_err(auth_error_zu_status)?;

        Ok(Response::new(LoginResponse {
            tokens: Some(token_paar_zu_proto(&paar)),
            user: Some(benutzer_zu_proto(&benutzer)),
        }))
    }

    async fn refresh_tokens(
        &self,
        request: Request<RefreshTokensRequest>,
    ) -> Result<Response<TokenPairResponse>, Status> {
        let body = request.into_inner();

        let paar = self
            .service
            .tokens_erneuern(&body.refresh_token)
            .await
            .map_err(auth_error_zu_status)?;

        Ok(Response::new(TokenPairResponse {
            tokens: Some(token_paar_zu_proto(&paar)),
        }))
    }

    async fn get_me(
        &self,
        request: Request<GetMeRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let body = request.into_inner();

        let benutzer = self
            .service
            .session_abrufen(&body.access_token)
            .await
            .map_err(auth_error_zu_status)?;

        Ok(Response::new(UserResponse {
            user: Some(benutzer_zu_proto(&benutzer)),
        }))
    }

    async fn log_out(
        &self,
        request: Request<LogOutRequest>,
    ) -> Result<Response<LogOutResponse>, Status> {
        let body = request.into_inner();

        self.service
            .abmelden(&body.access_token)
            .await
            .map_err(auth_error_zu_status)?;

        Ok(Response::new(LogOutResponse { success: true }))
    }
}

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

fn auth_error_zu_status(e: AuthError) -> Status {
    match e.kategorie() {
        Fehlerkategorie::UngueltigesArgument => Status::invalid_argument(e.to_string()),
        Fehlerkategorie::NichtAuthentifiziert => Status::unauthenticated(e.to_string()),
        Fehlerkategorie::NichtGefunden => Status::not_found(e.to_string()),
        Fehlerkategorie::BereitsVorhanden => Status::already_exists(e.to_string()),
        Fehlerkategorie::Intern => {
            tracing::error!(fehler = %e, "Interner Fehler im Auth-Dienst");
            Status::internal("Interner Fehler")
        }
    }
}

fn token_paar_zu_proto(paar: &TokenPaar) -> TokenPair {
    TokenPair {
        access_token: paar.access_token.clone(),
        refresh_token: paar.refresh_token.clone(),
        access_expires_at: paar.access_laeuft_ab.timestamp(),
        refresh_expires_at: paar.refresh_laeuft_ab.timestamp(),
    }
}

fn benutzer_zu_proto(benutzer: &BenutzerProjektion) -> User {
    User {
        id: benutzer.id.to_string(),
        email: benutzer.email.clone(),
        is_confirmed: benutzer.is_confirmed,
        created_at: benutzer.created_at.timestamp(),
    }
}
