// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for cookiefetch
//!
//! Request assembly, raw response parsing, and Netscape cookie-jar files.

mod client;
mod cookie;
mod jar;
mod request;
mod response;
mod transport;

pub use client::{make_request, ClientConfig, HttpClient};
pub use cookie::{cookie_header, parse_set_cookie, parse_set_cookie_pair, CookieRecord};
pub use jar::{
    decode_cookie_jar, encode_cookie_jar, merge_cookies, read_cookie_file, write_cookie_file,
    JAR_HEADER,
};
pub use request::{encode_params, PreparedRequest, RequestOptions};
pub use response::{parse_raw_response, HeaderValue, ResponseResult};
pub use transport::{canonical_header_name, ReqwestTransport, Transport};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("cookiefetch/", env!("CARGO_PKG_VERSION"));

/// Content type sent with URL-encoded form fields
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const COOKIE: &str = "Cookie";
    pub const SET_COOKIE: &str = "Set-Cookie";
}
