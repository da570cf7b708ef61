// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Transport abstraction for the annotate endpoint.
//!
//! The client issues exactly one [`Transport::post`] per annotate call. The
//! default [`HttpTransport`] talks to the service over HTTPS with `reqwest`;
//! implement the trait to route calls elsewhere, for example through a proxy
//! or an in-memory fake in tests.
//!
//! # Custom Transport
//!
//! ```rust,ignore
//! use vision_client::{Error, Transport, TransportResponse};
//!
//! struct Canned(Vec<u8>);
//!
//! #[async_trait::async_trait]
//! impl Transport for Canned {
//!     async fn post(&self, _path: &str, _body: Vec<u8>) -> Result<TransportResponse, Error> {
//!         Ok(TransportResponse::new(200, self.0.clone()))
//!     }
//! }
//! ```

use crate::{Error, VisionConfig};
use async_trait::async_trait;
use log::{Level, debug, log_enabled, trace};
use std::{collections::HashMap, time::Duration};
use url::Url;

/// Status, headers and body of a completed HTTP exchange.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response with a JSON content type header.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends serialized requests to the annotation service.
///
/// Implementations must be thread-safe (`Send + Sync`). A transport reports
/// network failures as errors; non-success status codes are returned as a
/// normal [`TransportResponse`] for the client to interpret. Transports must
/// not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts `body` (JSON) to `path` relative to the service endpoint.
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<TransportResponse, Error>;
}

/// How requests are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Unauthenticated requests, e.g. against a local emulator.
    None,
    /// API key sent as the `key` query parameter.
    ApiKey(String),
    /// OAuth access token sent as a bearer authorization header.
    Token(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => write!(f, "None"),
            Credentials::ApiKey(_) => write!(f, "ApiKey(***)"),
            Credentials::Token(_) => write!(f, "Token(***)"),
        }
    }
}

/// HTTPS transport built on `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl HttpTransport {
    /// Creates a transport for the endpoint, credentials and timeouts in
    /// `config`. API keys take precedence over tokens.
    pub fn new(config: &VisionConfig) -> Result<Self, Error> {
        let endpoint = config.endpoint_url()?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.timeout))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        let credentials = match (&config.key, &config.token) {
            (Some(key), _) if !key.is_empty() => Credentials::ApiKey(key.clone()),
            (_, Some(token)) if !token.is_empty() => Credentials::Token(token.clone()),
            _ => Credentials::None,
        };

        debug!(
            "HTTP transport for {} using {:?} (timeout={}s)",
            endpoint, credentials, config.timeout
        );

        Ok(Self {
            http,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Joins `path` onto the endpoint, keeping any base path the endpoint
    /// carries (e.g. a proxy prefix).
    pub(crate) fn url_for(&self, path: &str) -> Result<Url, Error> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?;
        if let Credentials::ApiKey(key) = &self.credentials {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<TransportResponse, Error> {
        let url = self.url_for(path)?;

        if log_enabled!(Level::Trace) {
            trace!("POST {}: {}", path, String::from_utf8_lossy(&body));
        }

        let mut req = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header(
                "User-Agent",
                concat!("vision-client/", env!("CARGO_PKG_VERSION")),
            );
        if let Credentials::Token(token) = &self.credentials {
            req = req.bearer_auth(token);
        }

        let resp = req.body(body).send().await?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = resp.bytes().await?.to_vec();

        if log_enabled!(Level::Trace) {
            trace!("Response {}: {}", status, String::from_utf8_lossy(&body));
        }

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
