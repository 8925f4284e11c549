// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types and raw response parsing
//!
//! A raw response is the uninterpreted text a transport hands back: one or
//! more header blocks, each terminated by CRLF-CRLF, followed by the body.
//! Extra leading blocks appear when a proxy answers a CONNECT or the server
//! sends `100 Continue` first. Only the last block describes the response.

use chrono::Utc;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::cookie::{parse_set_cookie, parse_set_cookie_pair, CookieRecord};
use super::headers::SET_COOKIE;
use crate::error::{Error, Result};

const BLOCK_SEPARATOR: &str = "\r\n\r\n";

lazy_static! {
    static ref STATUS_LINE: Regex = Regex::new(r"^HTTP/\d(?:\.\d)?\s+(\d+)").unwrap();
    static ref HEADER_LINE: Regex = Regex::new(r"^([^\r\n:]+):\s+(.+)$").unwrap();
}

/// Header value that upgrades to a list when the header repeats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Append another occurrence, upgrading `Single` to `Multiple`
    pub fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(first) => {
                let first = std::mem::take(first);
                *self = HeaderValue::Multiple(vec![first, value]);
            }
            HeaderValue::Multiple(values) => values.push(value),
        }
    }

    /// All values in arrival order
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(value) => vec![value.as_str()],
            HeaderValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// First value received
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(value) => Some(value.as_str()),
            HeaderValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// Number of occurrences
    pub fn len(&self) -> usize {
        match self {
            HeaderValue::Single(_) => 1,
            HeaderValue::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalized result of a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseResult {
    /// Status code of the final response
    pub status_code: u16,
    /// Body exactly as received after the final header block
    pub body: String,
    /// Headers of the final block, in arrival order. Key casing is whatever
    /// the transport produced; use [`header`](Self::header) and
    /// [`header_all`](Self::header_all) for case-insensitive lookup.
    pub headers: IndexMap<String, HeaderValue>,
    /// `name -> value` from Set-Cookie headers; `None` when there were none
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cookies: Option<IndexMap<String, String>>,
}

impl ResponseResult {
    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Get the first value of a header (name is case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.first())
    }

    /// Get all values for a header across every casing it arrived with
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .flat_map(|(_, value)| value.values())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::from)
    }

    /// Jar records for every well-formed Set-Cookie, scoped to `host`
    pub fn cookie_records(&self, host: &str) -> Vec<CookieRecord> {
        self.cookie_records_at(host, Utc::now().timestamp())
    }

    /// Like [`cookie_records`](Self::cookie_records) with an explicit clock
    pub fn cookie_records_at(&self, host: &str, now: i64) -> Vec<CookieRecord> {
        self.header_all(SET_COOKIE)
            .into_iter()
            .filter_map(|header| parse_set_cookie(header, host, now))
            .collect()
    }
}

/// Parse a raw response blob into status, headers, body and cookies
pub fn parse_raw_response(raw: &str) -> Result<ResponseResult> {
    trace!(len = raw.len(), "Parsing raw response");

    let (block, body) = final_block(raw)?;
    let status_code = status_code(block)?;
    let headers = parse_headers(block);
    let cookies = collect_cookies(&headers);

    debug!(status = status_code, headers = headers.len(), "Parsed response");

    Ok(ResponseResult {
        status_code,
        body: body.to_string(),
        headers,
        cookies,
    })
}

/// Consume header blocks from the front while the remainder still opens
/// with a status line. Returns the last block and the body after it.
fn final_block(raw: &str) -> Result<(&str, &str)> {
    if !STATUS_LINE.is_match(raw) {
        return Err(Error::malformed_response(format!(
            "no status line in response starting with {:?}",
            raw.chars().take(32).collect::<String>()
        )));
    }

    let mut rest = raw;
    loop {
        let Some(end) = rest.find(BLOCK_SEPARATOR) else {
            return Ok((rest, ""));
        };
        let block = &rest[..end];
        let after = &rest[end + BLOCK_SEPARATOR.len()..];

        if STATUS_LINE.is_match(after) {
            trace!(skipped = block.lines().next().unwrap_or(""), "Skipping intermediate header block");
            rest = after;
        } else {
            return Ok((block, after));
        }
    }
}

fn status_code(block: &str) -> Result<u16> {
    let caps = STATUS_LINE
        .captures(block)
        .ok_or_else(|| Error::malformed_response("final header block has no status line"))?;

    caps[1]
        .parse::<u16>()
        .map_err(|_| Error::malformed_response(format!("status code '{}' out of range", &caps[1])))
}

fn parse_headers(block: &str) -> IndexMap<String, HeaderValue> {
    let mut headers: IndexMap<String, HeaderValue> = IndexMap::new();

    for line in block.split("\r\n").skip(1) {
        let Some(caps) = HEADER_LINE.captures(line) else {
            continue;
        };
        let name = caps[1].to_string();
        let value = caps[2].to_string();

        match headers.get_mut(&name) {
            Some(existing) => existing.push(value),
            None => {
                headers.insert(name, HeaderValue::Single(value));
            }
        }
    }

    headers
}

fn collect_cookies(headers: &IndexMap<String, HeaderValue>) -> Option<IndexMap<String, String>> {
    let mut set_cookies = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(SET_COOKIE))
        .flat_map(|(_, value)| value.values())
        .peekable();

    set_cookies.peek()?;

    let mut cookies = IndexMap::new();
    for header in set_cookies {
        match parse_set_cookie_pair(header) {
            Some((name, value)) => {
                cookies.insert(name, value);
            }
            None => debug!(header, "Skipping malformed Set-Cookie"),
        }
    }
    Some(cookies)
}
