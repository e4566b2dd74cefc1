//! The configured HTTP channel to the clusterizer backend, and the conversion
//! of any failure on it into a message that is safe to show to a user.
//!
//! Callers only ever get the message; the distinction between failure kinds
//! is reported to operators through `tracing`, tagged by [`DiagnosticCase`].

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method, Response,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use shared::error::ErrorBody;
use tracing::{debug, error, Level};
use url::Url;

use crate::{
    config::TransportConfig,
    error::{ClientError, RequestSummary},
};

pub const FALLBACK_ERROR_MESSAGE: &str =
    "Unexpected error. Please, reload the page and try again.";

#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: Url,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                ClientError::RequestSetup(format!("invalid default header name '{name}': {err}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                ClientError::RequestSetup(format!("invalid value for header '{name}': {err}"))
            })?;
            headers.insert(header_name, header_value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|err| {
            ClientError::RequestSetup(format!("failed to build http client: {err}"))
        })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    pub async fn post_json<T>(&self, route: &str, body: &T) -> Result<Response, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url(route);
        debug!(%url, "transport: POST");
        let request = RequestSummary::new(&Method::POST, &url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(err, request))?;
        ensure_success(response).await
    }

    pub async fn get(&self, route: &str) -> Result<Response, ClientError> {
        let url = self.url(route);
        debug!(%url, "transport: GET");
        let request = RequestSummary::new(&Method::GET, &url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(err, request))?;
        ensure_success(response).await
    }
}

/// Non-2xx replies become [`ClientError::Response`] with the body attached.
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            debug!(%status, error = %err, "transport: failed to read error body");
            String::new()
        }
    };
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Err(ClientError::Response {
        status,
        headers,
        body,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCase {
    ResponseReceived,
    NoResponse,
    UnexpectedError,
}

impl DiagnosticCase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResponseReceived => "response_received",
            Self::NoResponse => "no_response",
            Self::UnexpectedError => "unexpected_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub case: DiagnosticCase,
    pub payload: Value,
}

pub fn diagnose(err: &ClientError) -> Diagnostic {
    let (case, payload) = match err {
        ClientError::Response {
            status,
            headers,
            body,
        } => (
            DiagnosticCase::ResponseReceived,
            json!({
                "body": body,
                "status": status.as_u16(),
                "headers": headers_to_json(headers),
            }),
        ),
        ClientError::NoResponse { request, .. } => {
            (DiagnosticCase::NoResponse, json!({ "request": request }))
        }
        ClientError::RequestSetup(message) | ClientError::NonTransport(message) => (
            DiagnosticCase::UnexpectedError,
            json!({ "message": message }),
        ),
    };

    Diagnostic {
        level: Level::ERROR,
        case,
        payload,
    }
}

/// Message to show the user for `err`: the backend's `detail` when it sent one.
pub fn user_message(err: &ClientError) -> String {
    match err {
        ClientError::Response { body, .. } => ErrorBody::detail_from(body),
        _ => None,
    }
    .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Reports `err` to the diagnostic log and returns the user-facing message.
pub fn log_error(err: &ClientError) -> String {
    let diagnostic = diagnose(err);
    error!(
        case = diagnostic.case.as_str(),
        payload = %diagnostic.payload,
        "transport: request failed"
    );
    user_message(err)
}

fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        map.insert(
            name.as_str().to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }
    Value::Object(map)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
