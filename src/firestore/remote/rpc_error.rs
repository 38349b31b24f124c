use reqwest::StatusCode;
use serde::Deserialize;

use crate::firestore::error::{
    deadline_exceeded, internal_error, invalid_argument, not_found, permission_denied,
    resource_exhausted, transport_error, unauthenticated, unavailable, FirestoreError,
};

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Maps a non-2xx reply to a transport-category error.
pub fn map_http_error(status: StatusCode, body: &str) -> FirestoreError {
    let payload = extract_error_payload(body);
    let message = payload
        .as_ref()
        .and_then(|payload| payload.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            )
        });

    match status {
        StatusCode::BAD_REQUEST => invalid_argument(message),
        StatusCode::UNAUTHORIZED => unauthenticated(message),
        StatusCode::FORBIDDEN => permission_denied(message),
        StatusCode::NOT_FOUND => not_found(message),
        StatusCode::TOO_MANY_REQUESTS => resource_exhausted(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => unavailable(message),
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => deadline_exceeded(message),
        StatusCode::INTERNAL_SERVER_ERROR => internal_error(message),
        _ => match payload.and_then(|payload| payload.status) {
            Some(status_string) => map_status_code(&status_string, message),
            None => transport_error(message),
        },
    }
}

fn map_status_code(status: &str, message: String) -> FirestoreError {
    match status {
        "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" | "ALREADY_EXISTS" => {
            invalid_argument(message)
        }
        "UNAUTHENTICATED" => unauthenticated(message),
        "PERMISSION_DENIED" => permission_denied(message),
        "NOT_FOUND" => not_found(message),
        "RESOURCE_EXHAUSTED" => resource_exhausted(message),
        "UNAVAILABLE" => unavailable(message),
        "DEADLINE_EXCEEDED" => deadline_exceeded(message),
        "INTERNAL" | "DATA_LOSS" | "UNKNOWN" => internal_error(message),
        _ => transport_error(message),
    }
}

fn extract_error_payload(body: &str) -> Option<GoogleError> {
    serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
}
