// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # cookiefetch - Single-shot HTTP requests with cookie jars
//!
//! Issues one blocking HTTP request and returns a normalized result:
//! status code, body, headers (repeated headers collected in order) and the
//! cookies set by the response. Cookies can be persisted in Netscape
//! cookie-jar files readable by curl and friends.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cookiefetch::{make_request, read_cookie_file, CookieRecord, RequestOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RequestOptions::new()
//!         .header("X-Foo", "Bar")
//!         .cookie(CookieRecord::new("example.com", "session", "abc"))
//!         .post_field("q", "hello world");
//!
//!     let response = make_request("https://example.com/search", Some("POST"), &options)?;
//!     println!("{} {:?}", response.status_code, response.cookies);
//!
//!     for cookie in read_cookie_file("cookies.txt")? {
//!         println!("{}={}", cookie.key, cookie.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{
    decode_cookie_jar, encode_cookie_jar, encode_params, make_request, parse_raw_response,
    read_cookie_file, write_cookie_file,
};
pub use http::{ClientConfig, CookieRecord, HeaderValue, HttpClient, RequestOptions, ResponseResult};
pub use http::{PreparedRequest, ReqwestTransport, Transport};

/// cookiefetch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
