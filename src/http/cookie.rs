// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie records and request/response cookie helpers

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cookie as stored in a Netscape cookie jar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Domain the cookie belongs to
    pub domain: String,
    /// true = exact host only, false = domain and subdomains
    pub domain_only: bool,
    /// Path the cookie is valid for
    pub path: String,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// Expiration as Unix seconds (0 = session cookie)
    pub expires: i64,
    /// Cookie name
    pub key: String,
    /// Cookie value
    pub value: String,
}

impl CookieRecord {
    /// Create a session cookie valid for the whole domain and its subdomains
    pub fn new(domain: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            domain_only: false,
            path: "/".to_string(),
            secure: false,
            expires: 0,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Set the domain_only flag
    pub fn domain_only(mut self, domain_only: bool) -> Self {
        self.domain_only = domain_only;
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration (Unix seconds)
    pub fn expires(mut self, expires: i64) -> Self {
        self.expires = expires;
        self
    }

    /// Session cookies carry no expiry
    pub fn is_session(&self) -> bool {
        self.expires == 0
    }

    /// Check expiry against the given Unix timestamp
    pub fn is_expired_at(&self, now: i64) -> bool {
        !self.is_session() && self.expires <= now
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Check if the cookie should be sent to `host`
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        if self.domain_only {
            return host.eq_ignore_ascii_case(domain);
        }
        domain_match(host, domain)
    }

    /// RFC 6265 path-match: `/secure` covers `/secure` and `/secure/x`,
    /// not `/secure-admin`
    pub fn matches_path(&self, request_path: &str) -> bool {
        let cookie_path = self.path.as_str();
        if request_path == cookie_path {
            return true;
        }

        request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Build a `Cookie` request header value; values are sent verbatim
pub fn cookie_header<'a, I>(records: I) -> Option<String>
where
    I: IntoIterator<Item = &'a CookieRecord>,
{
    let header = records
        .into_iter()
        .map(CookieRecord::to_header_value)
        .collect::<Vec<_>>()
        .join("; ");

    if header.is_empty() {
        None
    } else {
        Some(header)
    }
}

/// Extract the `name=value` pair from a Set-Cookie header value.
///
/// Only the text before the first unescaped `;` counts. A `;` preceded by a
/// backslash or inside double quotes does not terminate the pair. Returns
/// `None` when there is no `=` or the name is empty.
pub fn parse_set_cookie_pair(header: &str) -> Option<(String, String)> {
    let (pair, _) = split_set_cookie(header);
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some((name.to_string(), value.trim().to_string()))
}

/// Turn a Set-Cookie header received from `host` into a jar record.
///
/// `Path`, `Domain`, `Secure`, `Max-Age` and `Expires` are applied; `Max-Age`
/// takes precedence over `Expires`. An expiry at or before `now` yields a
/// record that is already expired, which the jar treats as a deletion.
/// Returns `None` for a malformed pair or a `Domain` the host does not
/// belong to.
pub fn parse_set_cookie(header: &str, host: &str, now: i64) -> Option<CookieRecord> {
    let (key, value) = parse_set_cookie_pair(header)?;
    let (_, attributes) = split_set_cookie(header);

    let mut record = CookieRecord::new(host, key, value);
    let mut max_age = None;
    let mut expires = None;

    for attribute in attributes.split(';') {
        let (name, value) = match attribute.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (attribute.trim(), ""),
        };

        if name.eq_ignore_ascii_case("path") {
            if value.starts_with('/') {
                record.path = value.to_string();
            }
        } else if name.eq_ignore_ascii_case("domain") {
            let domain = value.trim_start_matches('.');
            if domain.is_empty() {
                continue;
            }
            if !domain_match(host, domain) {
                return None;
            }
            record.domain = domain.to_string();
        } else if name.eq_ignore_ascii_case("secure") {
            record.secure = true;
        } else if name.eq_ignore_ascii_case("max-age") {
            max_age = value.parse::<i64>().ok();
        } else if name.eq_ignore_ascii_case("expires") {
            expires = parse_cookie_date(value);
        }
    }

    // 0 means session in the jar, so past dates clamp to 1
    if let Some(expiry) = max_age.map(|secs| now.saturating_add(secs)).or(expires) {
        record.expires = expiry.max(1);
    }

    Some(record)
}

/// `host` equals `domain` or is a subdomain of it
fn domain_match(host: &str, domain: &str) -> bool {
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }

    let host = host.to_ascii_lowercase();
    host.ends_with(&format!(".{}", domain.to_ascii_lowercase()))
}

/// RFC 1123 dates, plus the dashed `Thu, 01-Jan-1970 ...` variant
fn parse_cookie_date(value: &str) -> Option<i64> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.timestamp());
    }

    NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|date| date.and_utc().timestamp())
}

/// Split at the first `;` that is neither escaped nor quoted:
/// `(pair, attributes)`
fn split_set_cookie(header: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut quoted = false;
    let mut end = header.len();

    for (idx, c) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                end = idx;
                break;
            }
            _ => {}
        }
    }

    match header.get(end + 1..) {
        Some(attributes) => (&header[..end], attributes),
        None => (header, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_preserves_quotes() {
        let records = vec![CookieRecord::new("x", "foo", "\"bar\"")];
        assert_eq!(cookie_header(&records).as_deref(), Some("foo=\"bar\""));
    }

    #[test]
    fn test_cookie_header_join() {
        let records = vec![
            CookieRecord::new("example.com", "a", "1"),
            CookieRecord::new("example.com", "b", "2"),
        ];
        assert_eq!(cookie_header(&records).as_deref(), Some("a=1; b=2"));
        assert_eq!(cookie_header(&Vec::<CookieRecord>::new()), None);
    }

    #[test]
    fn test_set_cookie_pair() {
        assert_eq!(
            parse_set_cookie_pair("session=abc123; Path=/; HttpOnly"),
            Some(("session".to_string(), "abc123".to_string()))
        );
        assert_eq!(
            parse_set_cookie_pair("token=a=b=c"),
            Some(("token".to_string(), "a=b=c".to_string()))
        );
        assert_eq!(
            parse_set_cookie_pair("empty=; Max-Age=0"),
            Some(("empty".to_string(), String::new()))
        );
    }

    #[test]
    fn test_set_cookie_pair_escaped_semicolon() {
        assert_eq!(
            parse_set_cookie_pair(r"list=a\;b; Path=/"),
            Some(("list".to_string(), r"a\;b".to_string()))
        );
        assert_eq!(
            parse_set_cookie_pair("q=\"x;y\"; Secure"),
            Some(("q".to_string(), "\"x;y\"".to_string()))
        );
    }

    #[test]
    fn test_set_cookie_pair_malformed() {
        assert_eq!(parse_set_cookie_pair("HttpOnly; Secure"), None);
        assert_eq!(parse_set_cookie_pair("=orphan"), None);
        assert_eq!(parse_set_cookie_pair("noequals"), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let now = 1_700_000_000;
        let record = parse_set_cookie(
            "pref=dark; Path=/app; Max-Age=3600; Secure; HttpOnly",
            "www.example.com",
            now,
        )
        .unwrap();

        assert_eq!(record.domain, "www.example.com");
        assert_eq!(record.path, "/app");
        assert!(record.secure);
        assert_eq!(record.expires, now + 3600);
        assert!(!record.is_expired_at(now));

        let dated = parse_set_cookie(
            "id=7; Expires=Wed, 21 Oct 2026 07:28:00 GMT; Domain=.example.com",
            "www.example.com",
            now,
        )
        .unwrap();
        assert_eq!(dated.expires, 1_792_567_680);
        assert_eq!(dated.domain, "example.com");
        assert_eq!(dated.path, "/");
    }

    #[test]
    fn test_set_cookie_max_age_wins_over_expires() {
        let record = parse_set_cookie(
            "id=7; Max-Age=60; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            "example.com",
            1_000,
        )
        .unwrap();
        assert_eq!(record.expires, 1_060);
    }

    #[test]
    fn test_set_cookie_deletion_is_expired() {
        let now = 1_700_000_000;
        let by_max_age = parse_set_cookie("session=; Max-Age=0", "localhost", now).unwrap();
        assert!(by_max_age.is_expired_at(now));

        let by_epoch =
            parse_set_cookie("session=; Expires=Thu, 01-Jan-1970 00:00:00 GMT", "localhost", now)
                .unwrap();
        assert_eq!(by_epoch.expires, 1);
        assert!(by_epoch.is_expired_at(now));
    }

    #[test]
    fn test_set_cookie_foreign_domain_rejected() {
        assert_eq!(parse_set_cookie("a=1; Domain=evil.org", "example.com", 0), None);
        assert_eq!(parse_set_cookie("Secure; a=1", "example.com", 0), None);
    }

    #[test]
    fn test_path_matching() {
        let cookie = CookieRecord::new("example.com", "a", "1").path("/secure");
        assert!(cookie.matches_path("/secure"));
        assert!(cookie.matches_path("/secure/page"));
        assert!(!cookie.matches_path("/secure-admin"));
        assert!(!cookie.matches_path("/"));

        let dir = CookieRecord::new("example.com", "a", "1").path("/docs/");
        assert!(dir.matches_path("/docs/intro"));
        assert!(CookieRecord::new("example.com", "a", "1").matches_path("/anything"));
    }

    #[test]
    fn test_host_matching() {
        let wide = CookieRecord::new("example.com", "a", "1");
        assert!(wide.matches_host("example.com"));
        assert!(wide.matches_host("www.example.com"));
        assert!(!wide.matches_host("badexample.com"));

        let exact = CookieRecord::new("example.com", "a", "1").domain_only(true);
        assert!(exact.matches_host("EXAMPLE.com"));
        assert!(!exact.matches_host("www.example.com"));
    }

    #[test]
    fn test_expiry() {
        let session = CookieRecord::new("example.com", "a", "1");
        assert!(session.is_session());
        assert!(!session.is_expired_at(i64::MAX));

        let dated = CookieRecord::new("example.com", "a", "1").expires(1_000);
        assert!(dated.is_expired_at(1_000));
        assert!(!dated.is_expired_at(999));
        assert!(dated.is_expired());
    }
}
