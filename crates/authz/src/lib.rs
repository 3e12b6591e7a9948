//! Authentication for SHELF: who may log in, and the signed tokens that
//! prove it on later requests.

pub mod authenticator;
pub mod token;

pub use authenticator::{
    Authenticator, AuthenticatorArc, Credentials, Principal, StaticAuthenticator,
};
pub use token::{Claims, TokenService};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
