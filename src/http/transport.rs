// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport seam between request assembly and the network
//!
//! A transport sends one [`PreparedRequest`] and returns the raw response
//! text: status line, headers and body concatenated, uninterpreted.

use reqwest::blocking::Client;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Method;
use tracing::trace;

use super::client::ClientConfig;
use super::request::PreparedRequest;
use crate::error::{Error, Result};

/// Sends a request and returns the raw response blob
pub trait Transport: Send + Sync {
    /// Perform exactly one blocking round trip
    fn send(&self, request: &PreparedRequest) -> Result<String>;
}

/// Blocking reqwest transport
///
/// Redirects are never followed and reqwest's own cookie store is off.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport from client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .http1_title_case_headers();

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &PreparedRequest) -> Result<String> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::invalid_request(format!("invalid method '{}'", request.method)))?;

        let mut builder = self.client.request(method, request.url.clone());

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::invalid_request(format!("invalid header name '{}'", name)))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                Error::invalid_request(format!("invalid value for header '{}'", name))
            })?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(ref body) = request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send()?;
        let status = response.status();

        let mut raw = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        for (name, value) in response.headers() {
            raw.push_str(&canonical_header_name(name.as_str()));
            raw.push_str(": ");
            raw.push_str(&String::from_utf8_lossy(value.as_bytes()));
            raw.push_str("\r\n");
        }
        raw.push_str("\r\n");

        let body = response.bytes()?;
        raw.push_str(&String::from_utf8_lossy(&body));

        trace!(len = raw.len(), "Received raw response");
        Ok(raw)
    }
}

/// Names whose conventional casing is not plain title case
const IRREGULAR_NAMES: &[&str] = &[
    "WWW-Authenticate",
    "ETag",
    "TE",
    "DNT",
    "Content-MD5",
    "Content-ID",
    "X-XSS-Protection",
    "X-UA-Compatible",
    "Sec-WebSocket-Accept",
    "Sec-WebSocket-Extensions",
    "Sec-WebSocket-Protocol",
    "Sec-WebSocket-Version",
    "Expect-CT",
];

/// `set-cookie` -> `Set-Cookie`, `etag` -> `ETag`
///
/// reqwest hands back lower-cased names; the raw blob uses the
/// conventional wire casing.
pub fn canonical_header_name(name: &str) -> String {
    if let Some(known) = IRREGULAR_NAMES.iter().find(|known| known.eq_ignore_ascii_case(name)) {
        return known.to_string();
    }

    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
