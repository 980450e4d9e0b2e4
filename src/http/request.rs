//! Request descriptors.
//!
//! A [`RequestOptions`] is built once per logical call and replayed for every
//! attempt, so the JSON body is serialized up front.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Request ID header, stable across the attempts of one logical call.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Method, headers, body, and cancellation for one logical call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub cancel: Option<CancellationToken>,
    /// Overrides the client's retry budget for this call.
    pub max_retries: Option<u32>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            cancel: None,
            max_retries: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query pair only when `value` is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let token = CancellationToken::new();
        let options = RequestOptions::post()
            .json(&json!({ "force": true }))
            .unwrap()
            .query("days", 7)
            .query_opt("status", None::<&str>)
            .cancel_on(token)
            .max_retries(0);

        assert_eq!(options.method, Method::POST);
        assert_eq!(options.body.as_deref(), Some(br#"{"force":true}"#.as_slice()));
        assert_eq!(options.query, vec![("days".to_string(), "7".to_string())]);
        assert!(options.cancel.is_some());
        assert_eq!(options.max_retries, Some(0));
    }
}
