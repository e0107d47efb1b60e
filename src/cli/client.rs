use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::cli::config::{save_session, Session};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} ({status}, {code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("not signed in, run `notes auth sign-in` first")]
    NotSignedIn,

    #[error("server response is missing {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    fn is_token_expired(&self) -> bool {
        matches!(self, ClientError::Api { code, .. } if code == "TOKEN_EXPIRED")
    }
}

/// Unwrap the `{"success": .., "data": ..}` envelope
pub fn parse_envelope(status: StatusCode, body: Value) -> Result<Value, ClientError> {
    if status.is_success() && body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        code: body
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string(),
        message: body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
    })
}

/// Pull both tokens out of a sign-in or update-token payload
pub fn token_pair_from(data: &Value) -> Result<(String, String), ClientError> {
    let access = data["access_token"]
        .as_str()
        .ok_or(ClientError::MissingField("access_token"))?;
    let refresh = data["refresh_token"]
        .as_str()
        .ok_or(ClientError::MissingField("refresh_token"))?;
    Ok((access.to_string(), refresh.to_string()))
}

/// Thin HTTP client for the notes API
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        access_token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let mut request = self.http.request(method, format!("{}{}", self.base_url, path));

        if let Some(token) = access_token {
            request = request.header("access_token", token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        parse_envelope(status, body)
    }

    /// Raw health payload; a degraded server still answers with JSON
    pub async fn health(&self) -> Result<(StatusCode, Value), ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json::<Value>().await.unwrap_or(Value::Null)))
    }

    /// Exchange the stored refresh token for a new pair and persist it
    pub async fn refresh(&self, session: &mut Session) -> Result<(), ClientError> {
        let (access, refresh) = match (&session.access_token, &session.refresh_token) {
            (Some(a), Some(r)) => (a.clone(), r.clone()),
            _ => return Err(ClientError::NotSignedIn),
        };

        let data = self
            .call(
                Method::POST,
                "/update-token",
                Some(&json!({ "access_token": access, "refresh_token": refresh })),
                None,
            )
            .await?;

        let (access_token, refresh_token) = token_pair_from(&data)?;
        session.set_tokens(access_token, refresh_token);

        if let Err(e) = save_session(session) {
            tracing::warn!("Could not persist refreshed tokens: {}", e);
        }
        Ok(())
    }

    /// Call a protected endpoint, rotating tokens once if the access token has expired
    pub async fn call_authed(
        &self,
        session: &mut Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let token = session.access_token.clone().ok_or(ClientError::NotSignedIn)?;

        match self.call(method.clone(), path, body, Some(&token)).await {
            Err(e) if e.is_token_expired() => {
                tracing::debug!("Access token expired, refreshing");
                self.refresh(session).await?;
                let token = session.access_token.clone().ok_or(ClientError::NotSignedIn)?;
                self.call(method, path, body, Some(&token)).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_yields_data() {
        let data = parse_envelope(StatusCode::OK, json!({"success": true, "data": {"note_id": 4}})).unwrap();
        assert_eq!(data["note_id"], 4);
    }

    #[test]
    fn error_envelope_keeps_code_and_message() {
        let err = parse_envelope(
            StatusCode::UNAUTHORIZED,
            json!({"success": false, "error": "access token expired", "code": "TOKEN_EXPIRED"}),
        )
        .unwrap_err();
        assert!(err.is_token_expired());
        assert_eq!(err.to_string(), "access token expired (401, TOKEN_EXPIRED)");
    }

    #[test]
    fn non_json_error_falls_back_to_reason() {
        let err = parse_envelope(StatusCode::METHOD_NOT_ALLOWED, Value::Null).unwrap_err();
        match err {
            ClientError::Api { status, code, message } => {
                assert_eq!(status, 405);
                assert_eq!(code, "UNKNOWN");
                assert_eq!(message, "Method Not Allowed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn token_pair_requires_both_tokens() {
        let (access, refresh) =
            token_pair_from(&json!({"access_token": "a.b.c", "refresh_token": "d.e.f"})).unwrap();
        assert_eq!(access, "a.b.c");
        assert_eq!(refresh, "d.e.f");

        let err = token_pair_from(&json!({"access_token": "a.b.c"})).unwrap_err();
        assert!(matches!(err, ClientError::MissingField("refresh_token")));

        let err = token_pair_from(&Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "server response is missing access_token");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
