use std::{error::Error as StdError, fmt};

use reqwest::{header::HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The request as it was dispatched, kept for diagnostics when no reply arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub method: String,
    pub url: String,
}

impl RequestSummary {
    pub fn new(method: &Method, url: impl Into<String>) -> Self {
        Self {
            method: method.as_str().to_string(),
            url: url.into(),
        }
    }
}

impl fmt::Display for RequestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Every failure a call to the backend can end in, classified where it is caught.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server replied with a non-2xx status.
    #[error("server responded with {status}")]
    Response {
        status: StatusCode,
        headers: HeaderMap,
        body: Value,
    },
    /// The request was sent but no reply arrived.
    #[error("no response for {request}: {message}")]
    NoResponse {
        request: RequestSummary,
        message: String,
    },
    /// The request could not be built or dispatched.
    #[error("failed to set up request: {0}")]
    RequestSetup(String),
    #[error("{0}")]
    NonTransport(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error, request: RequestSummary) -> Self {
        if err.is_builder() {
            return Self::RequestSetup(error_chain(&err));
        }
        if err.is_decode() {
            return Self::NonTransport(error_chain(&err));
        }
        if let Some(status) = err.status() {
            return Self::Response {
                status,
                headers: HeaderMap::new(),
                body: Value::Null,
            };
        }
        Self::NoResponse {
            request,
            message: error_chain(&err),
        }
    }

    /// Recovers the transport classification from an erased error.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ClientError>() {
            Ok(client_err) => return client_err,
            Err(err) => err,
        };
        match err.downcast::<reqwest::Error>() {
            Ok(reqwest_err) => reqwest_err.into(),
            Err(err) => Self::NonTransport(format!("{err:#}")),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // Body reads and decoding happen after dispatch and carry no url.
        let url = match err.url() {
            Some(url) => url.to_string(),
            None if err.is_decode() || err.is_body() || err.status().is_some() => String::new(),
            None => return Self::RequestSetup(error_chain(&err)),
        };
        Self::from_reqwest(err, RequestSummary { method: "UNKNOWN".into(), url })
    }
}

/// Joins an error with its sources, e.g. "error sending request: connection refused".
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
