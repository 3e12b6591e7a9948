//! The `{status, message, data}` wrapper every response is written in.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize, Serializer};

use crate::error::AppError;

/// Uniform JSON body: HTTP status, a human-readable message and an optional
/// payload. `data` is left out of the JSON entirely when absent.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

/// Build an envelope. The same status is used for the HTTP response.
pub fn respond<T>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
) -> ApiResponse<T> {
    ApiResponse {
        status,
        message: message.into(),
        data,
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Parse a raw request body, mapping any failure to the 400 envelope.
///
/// Handlers take the body as bytes and decode it themselves so that they
/// control when parsing happens relative to their other checks.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::invalid_input("Invalid request body")
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::{json, Value};

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn envelope_carries_status_message_and_data() {
        let response =
            respond(StatusCode::CREATED, "created", Some(json!({"id": 1}))).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"status": 201, "message": "created", "data": {"id": 1}})
        );
    }

    #[tokio::test]
    async fn absent_data_is_omitted() {
        let response = respond::<()>(StatusCode::OK, "gone", None).into_response();
        let body = body_json(response).await;
        assert_eq!(body, json!({"status": 200, "message": "gone"}));
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn empty_collection_is_kept() {
        let response =
            respond(StatusCode::OK, "none yet", Some(Vec::<u8>::new())).into_response();
        assert_eq!(body_json(response).await["data"], json!([]));
    }

    #[derive(Debug, Deserialize)]
    struct Login {
        #[allow(dead_code)]
        username: String,
    }

    #[test]
    fn decode_rejects_malformed_and_mistyped_bodies() {
        assert!(decode_json::<Login>(br#"{"username":"admin"}"#).is_ok());
        let bodies: [&[u8]; 4] = [b"{", b"", b"[]", br#"{"username":7}"#];
        for body in bodies {
            assert!(matches!(
                decode_json::<Login>(body),
                Err(AppError::InvalidInput(_))
            ));
        }
    }
}
