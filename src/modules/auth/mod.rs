//! Token issuance: `POST /token` trades a username/password pair for a
//! signed bearer token.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};
use serde::Serialize;
use serde_json::json;
use shelf_authz::{AuthError, AuthenticatorArc, Credentials, TokenService};
use shelf_http::{decode_json, respond, ApiResponse, AppError};
use shelf_kernel::{InitCtx, Module};

#[derive(Clone)]
struct AuthState {
    authenticator: AuthenticatorArc,
    tokens: Arc<TokenService>,
}

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub token: String,
}

pub struct AuthModule {
    state: AuthState,
}

impl AuthModule {
    pub fn new(authenticator: AuthenticatorArc, tokens: Arc<TokenService>) -> Self {
        Self {
            state: AuthState {
                authenticator,
                tokens,
            },
        }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            authenticator = ?self.state.authenticator,
            token_ttl_hours = self.state.tokens.ttl().num_hours(),
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/token", post(issue_token))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let failure = |description: &str| {
            json!({
                "description": description,
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Envelope"}}}
            })
        };

        Some(json!({
            "paths": {
                "/token": {
                    "post": {
                        "summary": "Issue a bearer token",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Credentials"}}}
                        },
                        "responses": {
                            "200": {
                                "description": "Token generated successfully",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "allOf": [
                                                {"$ref": "#/components/schemas/Envelope"},
                                                {"type": "object", "properties": {"data": {"$ref": "#/components/schemas/IssuedToken"}}}
                                            ]
                                        }
                                    }
                                }
                            },
                            "400": failure("Invalid request body"),
                            "401": failure("Invalid credentials"),
                            "500": failure("Failed to generate token")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "username": {"type": "string"},
                            "password": {"type": "string", "format": "password"}
                        },
                        "required": ["username", "password"]
                    },
                    "IssuedToken": {
                        "type": "object",
                        "properties": {"token": {"type": "string"}},
                        "required": ["token"]
                    }
                }
            }
        }))
    }
}

async fn issue_token(
    State(state): State<AuthState>,
    body: Bytes,
) -> Result<ApiResponse<IssuedToken>, AppError> {
    let credentials: Credentials = decode_json(&body)?;

    let principal = state
        .authenticator
        .authenticate(&credentials)
        .ok_or(AuthError::InvalidCredentials)
        .map_err(auth_error)?;

    let token = state.tokens.issue(&principal.username).map_err(auth_error)?;

    tracing::info!(username = %principal.username, "token issued");
    Ok(respond(
        StatusCode::OK,
        "Token generated successfully",
        Some(IssuedToken { token }),
    ))
}

fn auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::InvalidCredentials => {
            tracing::warn!("login rejected");
            AppError::unauthorized("Invalid credentials")
        }
        AuthError::InvalidToken(_) => AppError::unauthorized("Invalid token"),
        err @ AuthError::Signing(_) => AppError::internal("Failed to generate token", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_envelope_statuses() {
        assert_eq!(
            auth_error(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );

        let signing = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidKeyFormat,
        );
        let err = auth_error(AuthError::Signing(signing));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, AppError::Internal { ref message, .. } if message == "Failed to generate token"));
    }
}
