use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::constants::*;
use crate::errors::*;
use crate::rate_limiter::*;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const ACCEPT_HEADER: &str = "Accept";
const JSON_CONTENT_TYPE: &str = "application/json";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// A failure below the HTTP layer (connection refused, DNS, TLS...).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportError(pub String);

pub trait Transport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

pub struct YnabApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
    rate_limiter: Arc<RateLimiter>,
    retry_delay: Duration,
    dev_mode: bool,
}

impl ReqwestTransport {
    pub fn new() -> ReqwestTransport {
        ReqwestTransport {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> ReqwestTransport {
        ReqwestTransport::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|err| TransportError(err.to_string()))?;
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let response = builder
            .send()
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| TransportError(err.to_string()))?;
        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestOptions {
    pub fn get() -> RequestOptions {
        RequestOptions::default()
    }

    pub fn with_header(mut self, name: &str, value: &str) -> RequestOptions {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl YnabApiClient {
    pub fn new(dev_mode: bool) -> YnabApiClient {
        YnabApiClient::with_transport(
            Box::new(ReqwestTransport::new()),
            RateLimiter::shared(),
            dev_mode,
        )
    }

    pub fn with_transport(
        transport: Box<dyn Transport>,
        rate_limiter: Arc<RateLimiter>,
        dev_mode: bool,
    ) -> YnabApiClient {
        YnabApiClient {
            base_url: YNAB_API_BASE_URL.to_string(),
            transport,
            rate_limiter,
            retry_delay: NETWORK_RETRY_DELAY,
            dev_mode,
        }
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> YnabApiClient {
        self.retry_delay = retry_delay;
        self
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        credential: Option<&str>,
    ) -> Result<T> {
        let headers = build_headers(credential, options.headers);
        check_authorization(&headers)?;
        self.rate_limiter.check_and_consume()?;

        let request = HttpRequest {
            method: options.method.unwrap_or_else(|| "GET".to_string()),
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body: options.body,
        };
        if self.dev_mode {
            info!(
                "[YNAB API] Request: {} {} headers={:?} body={:?}",
                request.method,
                request.url,
                redacted_headers(&request.headers),
                request.body
            );
        }

        let response = self.send_with_retry(&request)?;
        if self.dev_mode {
            info!(
                "[YNAB API] Response: {} {} body={}",
                response.status, response.status_text, response.body
            );
        }
        if !response.is_success() {
            let error = Error::from(ErrorKind::ApiError(
                Some(response.status),
                format_status_message(&response),
            ));
            self.log_error(&error);
            return Err(error);
        }
        serde_json::from_str(&response.body).map_err(|err| {
            let error = Error::from(ErrorKind::DecodeError(err.to_string()));
            self.log_error(&error);
            error
        })
    }

    fn send_with_retry(&self, request: &HttpRequest) -> Result<HttpResponse> {
        match self.transport.send(request) {
            Ok(response) => Ok(response),
            Err(first_err) => {
                debug!(
                    "Request to {} failed ({}), retrying in {:?}",
                    request.url, first_err, self.retry_delay
                );
                thread::sleep(self.retry_delay);
                self.transport.send(request).map_err(|err| {
                    let error = Error::from(ErrorKind::NetworkError(err.0));
                    self.log_error(&error);
                    error
                })
            }
        }
    }

    fn log_error(&self, error: &Error) {
        if self.dev_mode {
            warn!("[YNAB API] Error: {}", error);
        }
    }
}

fn build_headers(
    credential: Option<&str>,
    overrides: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut headers = vec![
        (CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string()),
        (ACCEPT_HEADER.to_string(), JSON_CONTENT_TYPE.to_string()),
    ];
    if let Some(credential) = credential {
        headers.push((
            AUTHORIZATION_HEADER.to_string(),
            format!("{}{}", BEARER_PREFIX, credential),
        ));
    }
    for (name, value) in overrides {
        headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }
    headers
}

// Guards against a budget id ending up where the access token belongs.
fn check_authorization(headers: &[(String, String)]) -> Result<()> {
    let authorization = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(AUTHORIZATION_HEADER))
        .map(|(_, value)| value.as_str());
    if let Some(value) = authorization {
        let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
        if BUDGET_ID_LIKE_REGEX.is_match(token) {
            bail!(ErrorKind::InvalidCredential(
                "Authorization header contains a budget identifier instead of an access token"
                    .to_string()
            ));
        }
    }
    Ok(())
}

fn redacted_headers(headers: &[(String, String)]) -> Vec<(&str, &str)> {
    headers
        .iter()
        .map(|(key, value)| {
            if key.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                (key.as_str(), "Bearer <redacted>")
            } else {
                (key.as_str(), value.as_str())
            }
        })
        .collect()
}

fn format_status_message(response: &HttpResponse) -> String {
    let status_line = format!("{} {}", response.status, response.status_text);
    if response.body.is_empty() {
        status_line
    } else {
        format!("{} - {}", status_line, response.body)
    }
}
