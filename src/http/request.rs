// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request options and the prepared request handed to a transport

use std::path::PathBuf;

use bytes::Bytes;
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use super::cookie::CookieRecord;

/// Characters left untouched in encoded values: ASCII alphanumerics and `-_.~`
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Optional settings for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Cookies sent as the `Cookie` header
    pub cookies: Vec<CookieRecord>,
    /// Headers sent verbatim, in insertion order
    pub headers: IndexMap<String, String>,
    /// Form fields, URL-encoded into the body
    pub post_fields: IndexMap<String, String>,
    /// Raw body; wins over `post_fields`
    pub post_body: Option<String>,
    /// Netscape jar file read before and rewritten after the request
    pub cookie_jar: Option<PathBuf>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie
    pub fn cookie(mut self, cookie: CookieRecord) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Set all cookies
    pub fn cookies(mut self, cookies: Vec<CookieRecord>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a form field
    pub fn post_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_fields.insert(name.into(), value.into());
        self
    }

    /// Set a raw body
    pub fn post_body(mut self, body: impl Into<String>) -> Self {
        self.post_body = Some(body.into());
        self
    }

    /// Persist cookies through a jar file
    pub fn cookie_jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_jar = Some(path.into());
        self
    }

    /// Check if a header was supplied (case-insensitive)
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }
}

/// Fully assembled request, ready for a transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Method token, case as given
    pub method: String,
    /// Target URL
    pub url: Url,
    /// Headers in send order, names as given
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Option<Bytes>,
}

impl PreparedRequest {
    /// Create a request with no headers or body
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Get the first header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the host
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

/// Join `key=value` pairs with `separator`. Values are percent-encoded, keys are not.
pub fn encode_params<'a, I>(params: I, separator: &str) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    params
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, VALUE_ENCODE_SET)))
        .collect::<Vec<_>>()
        .join(separator)
}
