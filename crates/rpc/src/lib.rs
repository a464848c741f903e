//! torwache-rpc – gRPC-Schnittstelle
//!
//! Enthaelt den aus dem Proto-Schema generierten Code, die
//! Service-Implementierung [`AuthDienst`] und den [`GrpcServer`].

pub mod server;
pub mod service;

pub use server::{GrpcServer, GrpcServerKonfig};
pub use service::AuthDienst;
