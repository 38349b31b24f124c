use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value as JsonValue;

use crate::firestore::constants::{
    FIRESTORE_API_HOST, FIRESTORE_API_VERSION, FIRESTORE_EMULATOR_HOST_ENV,
};
use crate::firestore::error::{decode_error, internal_error, transport_error, FirestoreResult};
use crate::firestore::model::DatabaseId;

use super::rpc_error::map_http_error;

/// HTTP access to one Firestore database's REST root.
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    base_url: String,
    request_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct ConnectionBuilder {
    database_id: DatabaseId,
    client: Option<Client>,
    emulator_host: Option<String>,
    request_timeout: Option<Duration>,
}

#[derive(Default, Clone, Debug)]
pub struct RequestContext {
    pub auth_token: Option<String>,
}

impl ConnectionBuilder {
    pub fn new(database_id: DatabaseId) -> Self {
        Self {
            database_id,
            client: None,
            emulator_host: std::env::var(FIRESTORE_EMULATOR_HOST_ENV)
                .ok()
                .filter(|host| !host.trim().is_empty()),
            request_timeout: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> FirestoreResult<Connection> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .build()
                .map_err(|err| internal_error(err.to_string()))?,
        };
        let base_url = build_base_url(&self.database_id, self.emulator_host.as_deref());
        Ok(Connection {
            client,
            base_url,
            request_timeout: self.request_timeout,
        })
    }
}

impl Connection {
    pub fn builder(database_id: DatabaseId) -> ConnectionBuilder {
        ConnectionBuilder::new(database_id)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and parses the JSON reply. An empty success body is `null`.
    pub async fn invoke_json(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&JsonValue>,
        context: &RequestContext,
    ) -> FirestoreResult<JsonValue> {
        let (status, text) = self.send(method, path, query, body, context).await?;
        if status.is_success() {
            parse_body(&text)
        } else {
            Err(map_http_error(status, &text))
        }
    }

    /// Like [`Connection::invoke_json`] but maps HTTP 404 to `Ok(None)`.
    pub async fn invoke_json_optional(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&JsonValue>,
        context: &RequestContext,
    ) -> FirestoreResult<Option<JsonValue>> {
        let (status, text) = self.send(method, path, query, body, context).await?;
        if status.is_success() {
            parse_body(&text).map(Some)
        } else if status == StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            Err(map_http_error(status, &text))
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&JsonValue>,
        context: &RequestContext,
    ) -> FirestoreResult<(StatusCode, String)> {
        log::debug!("firestore {method} {path}");
        let mut request = self.build_request(method, path, context);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| transport_error(err.to_string()))?;
        if !status.is_success() {
            log::debug!("firestore request to {path} failed with {status}");
        }
        Ok((status, text))
    }

    fn build_request(&self, method: Method, path: &str, context: &RequestContext) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut builder = self.client.request(method, url);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = context.auth_token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder.header("Content-Type", "application/json")
    }
}

fn parse_body(text: &str) -> FirestoreResult<JsonValue> {
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(text)
        .map_err(|err| decode_error(format!("Response body is not valid JSON: {err}")))
}

fn build_base_url(database_id: &DatabaseId, emulator_host: Option<&str>) -> String {
    match emulator_host {
        Some(host) => format!(
            "http://{host}/{api_version}/{}",
            database_id.resource_name(),
            api_version = FIRESTORE_API_VERSION
        ),
        None => format!(
            "{host}/{api_version}/{}",
            database_id.resource_name(),
            host = FIRESTORE_API_HOST,
            api_version = FIRESTORE_API_VERSION
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    fn connection_for(server: &MockServer) -> Connection {
        Connection::builder(DatabaseId::default("demo"))
            .with_emulator_host(server.address().to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn production_base_url() {
        let url = build_base_url(&DatabaseId::new("demo", "orders"), None);
        assert_eq!(
            url,
            "https://firestore.googleapis.com/v1/projects/demo/databases/orders"
        );
    }

    #[test]
    fn emulator_base_url_uses_http() {
        let url = build_base_url(&DatabaseId::default("demo"), Some("localhost:8080"));
        assert_eq!(
            url,
            "http://localhost:8080/v1/projects/demo/databases/(default)"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sends_bearer_token_and_query_params() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/v1/projects/demo/databases/(default)/documents/users/ada")
                    .query_param("currentDocument.exists", "true")
                    .header("authorization", "Bearer token-123");
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let connection = connection_for(&server);
        let context = RequestContext {
            auth_token: Some("token-123".into()),
        };
        let response = connection
            .invoke_json(
                Method::PATCH,
                "documents/users/ada",
                &[("currentDocument.exists".into(), "true".into())],
                Some(&json!({ "fields": {} })),
                &context,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response, json!({ "ok": true }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn not_found_is_none_for_optional_requests() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(404)
                    .json_body(json!({ "error": { "message": "missing", "status": "NOT_FOUND" } }));
            })
            .await;

        let connection = connection_for(&server);
        let response = connection
            .invoke_json_optional(
                Method::GET,
                "documents/users/nobody",
                &[],
                None,
                &RequestContext::default(),
            )
            .await
            .unwrap();
        assert!(response.is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let connection = connection_for(&server);
        let err = connection
            .invoke_json(Method::GET, "documents/users", &[], None, &RequestContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code_str(), "firestore/decode");
    }
}
