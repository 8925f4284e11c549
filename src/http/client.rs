// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use indexmap::IndexMap;
use reqwest::Method;
use tracing::debug;
use url::Url;

use super::cookie::{cookie_header, CookieRecord};
use super::jar::{merge_cookies, read_cookie_file, write_cookie_file};
use super::request::{encode_params, PreparedRequest, RequestOptions};
use super::response::{parse_raw_response, ResponseResult};
use super::transport::{ReqwestTransport, Transport};
use super::{headers, DEFAULT_USER_AGENT, FORM_CONTENT_TYPE};
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Whole-request timeout; `None` leaves the transport unbounded
    pub timeout: Option<Duration>,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            accept_invalid_certs: false,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Single-shot HTTP client.
///
/// Holds no per-request state, so one client can serve concurrent callers
/// as long as its transport is thread-safe.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: ClientConfig::default(),
        }
    }

    /// Get client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request
    pub fn get(&self, url: &str) -> Result<ResponseResult> {
        self.execute(url, None, &RequestOptions::default())
    }

    /// Execute a form POST
    pub fn post_form(&self, url: &str, fields: IndexMap<String, String>) -> Result<ResponseResult> {
        let options = RequestOptions {
            post_fields: fields,
            ..RequestOptions::default()
        };
        self.execute(url, Some("POST"), &options)
    }

    /// Execute a request. `method` defaults to GET.
    pub fn execute(
        &self,
        url: &str,
        method: Option<&str>,
        options: &RequestOptions,
    ) -> Result<ResponseResult> {
        let mut jar = match options.cookie_jar {
            Some(ref path) => Some(load_jar(path)?),
            None => None,
        };

        let request = self.prepare(url, method, options, jar.as_deref())?;
        debug!(method = %request.method, url = %request.url, "Sending request");

        let raw = self.transport.send(&request)?;
        let result = parse_raw_response(&raw)?;
        debug!(
            url = %request.url,
            status = result.status_code,
            body_len = result.body.len(),
            "Received response"
        );

        if let (Some(path), Some(records)) = (options.cookie_jar.as_ref(), jar.as_mut()) {
            if let Some(host) = request.host() {
                merge_cookies(records, result.cookie_records(host));
            }
            write_cookie_file(records, path)?;
        }

        Ok(result)
    }

    /// Assemble the request a transport will send
    pub fn prepare(
        &self,
        url: &str,
        method: Option<&str>,
        options: &RequestOptions,
        jar: Option<&[CookieRecord]>,
    ) -> Result<PreparedRequest> {
        let method = method.unwrap_or("GET");
        if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
            return Err(Error::invalid_request(format!("invalid method '{}'", method)));
        }

        let url = Url::parse(url)?;
        let mut request = PreparedRequest::new(method, url);

        let jar_cookies = jar
            .unwrap_or_default()
            .iter()
            .filter(|c| sendable(c, &request.url));
        let mut cookies = cookie_header(options.cookies.iter().chain(jar_cookies));

        // A caller-supplied Cookie header absorbs the generated pairs
        if !options.has_header(headers::COOKIE) {
            if let Some(cookie) = cookies.take() {
                request.headers.push((headers::COOKIE.to_string(), cookie));
            }
        }

        for (name, value) in &options.headers {
            let value = match cookies.take() {
                Some(generated) if name.eq_ignore_ascii_case(headers::COOKIE) => {
                    format!("{}; {}", value, generated)
                }
                generated => {
                    cookies = generated;
                    value.clone()
                }
            };
            request.headers.push((name.clone(), value));
        }

        if let Some(ref body) = options.post_body {
            request.body = Some(Bytes::from(body.clone()));
        } else if !options.post_fields.is_empty() {
            request.body = Some(Bytes::from(encode_params(&options.post_fields, "&")));
            if !options.has_header(headers::CONTENT_TYPE) {
                request
                    .headers
                    .push((headers::CONTENT_TYPE.to_string(), FORM_CONTENT_TYPE.to_string()));
            }
        }

        Ok(request)
    }
}

/// Execute one request with a default client
pub fn make_request(
    url: &str,
    method: Option<&str>,
    options: &RequestOptions,
) -> Result<ResponseResult> {
    HttpClient::new()?.execute(url, method, options)
}

/// Jar cookies go out only to matching, unexpired, scheme-appropriate targets
fn sendable(cookie: &CookieRecord, url: &Url) -> bool {
    let host = url.host_str().unwrap_or("");
    cookie.matches_host(host)
        && cookie.matches_path(url.path())
        && (!cookie.secure || url.scheme() == "https")
        && !cookie.is_expired()
}

fn load_jar(path: &Path) -> Result<Vec<CookieRecord>> {
    match read_cookie_file(path) {
        Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedTransport {
        raw: String,
        seen: Mutex<Vec<PreparedRequest>>,
    }

    impl CannedTransport {
        fn new(raw: &str) -> Arc<Self> {
            Arc::new(Self {
                raw: raw.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> PreparedRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for CannedTransport {
        fn send(&self, request: &PreparedRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.raw.clone())
        }
    }

    const OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nok";

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
        assert!(client.config().timeout.is_none());
    }

    #[test]
    fn test_default_method_is_get() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());

        let resp = client.get("http://localhost:8800/echo").unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, "ok");

        let sent = transport.last();
        assert_eq!(sent.method, "GET");
        assert!(sent.body.is_none());
        assert!(sent.headers.is_empty());
    }

    #[test]
    fn test_method_is_sent_as_given() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());

        client
            .execute("http://localhost/", Some("DELETE"), &RequestOptions::new())
            .unwrap();
        assert_eq!(transport.last().method, "DELETE");

        client
            .execute("http://localhost/", Some("Purge"), &RequestOptions::new())
            .unwrap();
        assert_eq!(transport.last().method, "Purge");

        let err = client
            .execute("http://localhost/", Some("BAD METHOD"), &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_cookie_header_is_verbatim() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new().cookie(CookieRecord::new("x", "foo", "\"bar\""));

        client.execute("http://localhost/", None, &options).unwrap();
        assert_eq!(transport.last().header("Cookie"), Some("foo=\"bar\""));
    }

    #[test]
    fn test_explicit_cookie_header_is_merged() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new()
            .header("X-Foo", "Bar")
            .header("cookie", "manual=1")
            .cookie(CookieRecord::new("localhost", "foo", "bar"));

        client.execute("http://localhost/", None, &options).unwrap();
        assert_eq!(
            transport.last().headers,
            vec![
                ("X-Foo".to_string(), "Bar".to_string()),
                ("cookie".to_string(), "manual=1; foo=bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_explicit_cookie_header_alone() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new().header("Cookie", "manual=1");

        client.execute("http://localhost/", None, &options).unwrap();
        assert_eq!(
            transport.last().headers,
            vec![("Cookie".to_string(), "manual=1".to_string())]
        );
    }

    #[test]
    fn test_custom_headers_keep_order_and_case() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new()
            .header("X-Foo", "Bar")
            .header("Content-Length", "0");

        client.execute("http://localhost/", Some("PUT"), &options).unwrap();
        let sent = transport.last();
        assert_eq!(
            sent.headers,
            vec![
                ("X-Foo".to_string(), "Bar".to_string()),
                ("Content-Length".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_post_fields_are_form_encoded() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let mut fields = IndexMap::new();
        fields.insert("foo".to_string(), "bar baz".to_string());

        client.post_form("http://localhost/", fields).unwrap();
        let sent = transport.last();
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.body.as_deref(), Some(&b"foo=bar%20baz"[..]));
        assert_eq!(sent.header("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_post_body_wins_over_fields() {
        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new()
            .post_field("foo", "bar")
            .post_body("{\"raw\":true}")
            .header("Content-Type", "application/json");

        client.execute("http://localhost/", Some("POST"), &options).unwrap();
        let sent = transport.last();
        assert_eq!(sent.body.as_deref(), Some(&b"{\"raw\":true}"[..]));
        assert_eq!(sent.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_malformed_response_propagates() {
        let client = HttpClient::with_transport(CannedTransport::new("garbage"));
        let err = client.get("http://localhost/").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::with_transport(CannedTransport::new(OK));
        assert!(matches!(client.get("not a url").unwrap_err(), Error::Url(_)));
    }

    #[test]
    fn test_cookie_jar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("cookies.txt");
        write_cookie_file(
            &[
                CookieRecord::new("localhost", "stored", "1"),
                CookieRecord::new("elsewhere.org", "foreign", "2"),
                CookieRecord::new("localhost", "locked", "3").secure(true),
            ],
            &jar_path,
        )
        .unwrap();

        let transport = CannedTransport::new(
            "HTTP/1.1 200 OK\r\nSet-Cookie: stored=updated\r\nSet-Cookie: fresh=new; Path=/\r\n\r\n",
        );
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new()
            .cookie(CookieRecord::new("localhost", "explicit", "x"))
            .cookie_jar(&jar_path);

        client.execute("http://localhost/app", None, &options).unwrap();
        assert_eq!(transport.last().header("cookie"), Some("explicit=x; stored=1"));

        let jar = read_cookie_file(&jar_path).unwrap();
        let pairs: Vec<(&str, &str)> = jar.iter().map(|c| (c.key.as_str(), c.value.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("stored", "updated"), ("foreign", "2"), ("locked", "3"), ("fresh", "new")]
        );
    }

    #[test]
    fn test_jar_cookie_path_match() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("cookies.txt");
        write_cookie_file(
            &[
                CookieRecord::new("localhost", "admin", "1").path("/secure"),
                CookieRecord::new("localhost", "root", "2"),
            ],
            &jar_path,
        )
        .unwrap();

        let transport = CannedTransport::new(OK);
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new().cookie_jar(&jar_path);

        client.execute("http://localhost/secure-admin", None, &options).unwrap();
        assert_eq!(transport.last().header("cookie"), Some("root=2"));

        client.execute("http://localhost/secure/panel", None, &options).unwrap();
        assert_eq!(transport.last().header("cookie"), Some("admin=1; root=2"));
    }

    #[test]
    fn test_deleted_cookie_leaves_jar() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("cookies.txt");
        write_cookie_file(
            &[
                CookieRecord::new("localhost", "session", "abc"),
                CookieRecord::new("localhost", "theme", "dark"),
            ],
            &jar_path,
        )
        .unwrap();

        let transport = CannedTransport::new(
            "HTTP/1.1 200 OK\r\n\
Set-Cookie: session=; Max-Age=0; Path=/app; Expires=Thu, 01 Jan 1970 00:00:00 GMT\r\n\
Set-Cookie: pref=compact; Path=/app; Max-Age=3600\r\n\r\n",
        );
        let client = HttpClient::with_transport(transport.clone());
        let options = RequestOptions::new().cookie_jar(&jar_path);

        client.execute("http://localhost/app", None, &options).unwrap();
        assert_eq!(transport.last().header("cookie"), Some("session=abc; theme=dark"));

        let jar = read_cookie_file(&jar_path).unwrap();
        assert_eq!(jar.len(), 2);
        assert_eq!(jar[0].key, "theme");
        assert_eq!(jar[1].key, "pref");
        assert_eq!(jar[1].path, "/app");
        assert!(!jar[1].is_session());

        client.execute("http://localhost/app", None, &options).unwrap();
        assert_eq!(transport.last().header("cookie"), Some("theme=dark; pref=compact"));
    }

    #[test]
    fn test_missing_jar_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("new-jar.txt");
        let client = HttpClient::with_transport(CannedTransport::new(
            "HTTP/1.1 200 OK\r\nSet-Cookie: example=test\r\n\r\n",
        ));

        client
            .execute("http://localhost/", None, &RequestOptions::new().cookie_jar(&jar_path))
            .unwrap();
        assert_eq!(
            read_cookie_file(&jar_path).unwrap(),
            vec![CookieRecord::new("localhost", "example", "test")]
        );
    }
}
