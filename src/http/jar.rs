// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Netscape cookie-jar file codec
//!
//! The on-disk format is the plain-text, tab-separated layout written by
//! curl and read by most cookie-jar consumers. Encoding is byte-exact:
//!
//! ```text
//! # Netscape HTTP Cookie File
//! # http://curl.haxx.se/rfc/cookie_spec.html
//! # This file was generated by cookiefetch! Edit at your own risk.
//!
//! example.com	TRUE	/	FALSE	123456789	my_test	my_value
//!
//! ```
//!
//! Reads and writes are not synchronized. Concurrent writers to the same
//! path race and the last one wins.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use tracing::debug;

use super::cookie::CookieRecord;
use crate::error::{Error, Result};

/// Fixed header written at the top of every jar file
pub const JAR_HEADER: &str = "# Netscape HTTP Cookie File\n\
# http://curl.haxx.se/rfc/cookie_spec.html\n\
# This file was generated by cookiefetch! Edit at your own risk.\n";

const FIELD_COUNT: usize = 7;

/// Read a cookie-jar file into records, in file order
pub fn read_cookie_file(path: impl AsRef<Path>) -> Result<Vec<CookieRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let records = decode_cookie_jar(&text)?;
    debug!(path = %path.display(), count = records.len(), "Read cookie jar");
    Ok(records)
}

/// Write records to a cookie-jar file, replacing any existing content.
///
/// Records that could not be read back fail with `ErrorKind::InvalidInput`
/// before the file is touched.
pub fn write_cookie_file(records: &[CookieRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = encode_cookie_jar(records)?;
    fs::write(path, text)?;
    debug!(path = %path.display(), count = records.len(), "Wrote cookie jar");
    Ok(())
}

/// Decode jar text. Comment (`#`) and blank lines are skipped.
pub fn decode_cookie_jar(text: &str) -> Result<Vec<CookieRecord>> {
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        records.push(decode_line(idx + 1, line)?);
    }

    Ok(records)
}

fn decode_line(number: usize, line: &str) -> Result<CookieRecord> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, '\t').collect();
    if fields.len() < FIELD_COUNT {
        return Err(Error::malformed_cookie_file(
            number,
            line,
            format!("expected {} tab-separated fields, found {}", FIELD_COUNT, fields.len()),
        ));
    }

    let domain_only = parse_flag(number, line, fields[1])?;
    let secure = parse_flag(number, line, fields[3])?;
    let expires = fields[4].parse::<i64>().map_err(|_| {
        Error::malformed_cookie_file(number, line, format!("invalid expires '{}'", fields[4]))
    })?;

    if fields[0].is_empty() {
        return Err(Error::malformed_cookie_file(number, line, "empty domain"));
    }
    if fields[5].is_empty() {
        return Err(Error::malformed_cookie_file(number, line, "empty cookie name"));
    }

    Ok(CookieRecord {
        domain: fields[0].to_string(),
        domain_only,
        path: fields[2].to_string(),
        secure,
        expires,
        key: fields[5].to_string(),
        value: fields[6].to_string(),
    })
}

fn parse_flag(number: usize, line: &str, field: &str) -> Result<bool> {
    match field {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        other => Err(Error::malformed_cookie_file(
            number,
            line,
            format!("invalid flag '{}', expected TRUE or FALSE", other),
        )),
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Encode records as jar text: header, blank line, records, trailing blank line
pub fn encode_cookie_jar(records: &[CookieRecord]) -> Result<String> {
    let mut out = String::from(JAR_HEADER);
    out.push('\n');

    for record in records {
        check_encodable(record)?;
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            record.domain,
            flag(record.domain_only),
            record.path,
            flag(record.secure),
            record.expires,
            record.key,
            record.value,
        ));
    }

    out.push('\n');
    Ok(out)
}

/// Reject records whose line would not decode back to the same record
fn check_encodable(record: &CookieRecord) -> Result<()> {
    let breaks_line = |field: &str| field.contains(|c: char| c == '\n' || c == '\r');
    let breaks_field = |field: &str| breaks_line(field) || field.contains('\t');

    let reason = if record.domain.is_empty() {
        "empty domain"
    } else if record.key.is_empty() {
        "empty cookie name"
    } else if record.domain.starts_with('#') {
        "domain would read as a comment"
    } else if breaks_field(&record.domain) || breaks_field(&record.path) || breaks_field(&record.key) {
        "tab or line break in domain, path or name"
    } else if breaks_line(&record.value) {
        "line break in value"
    } else {
        return Ok(());
    };

    Err(Error::Io(io::Error::new(
        ErrorKind::InvalidInput,
        format!("cannot encode cookie '{}' for '{}': {}", record.key, record.domain, reason),
    )))
}

/// Merge `incoming` into `existing`.
///
/// A record with the same domain, path and name replaces the stored one in
/// place; anything else is appended. An already expired incoming record is
/// a deletion: every stored cookie with its domain and name is removed.
pub fn merge_cookies(existing: &mut Vec<CookieRecord>, incoming: impl IntoIterator<Item = CookieRecord>) {
    for cookie in incoming {
        if cookie.is_expired() {
            existing.retain(|c| !(c.key == cookie.key && c.domain.eq_ignore_ascii_case(&cookie.domain)));
            debug!(key = %cookie.key, domain = %cookie.domain, "Removed expired cookie");
            continue;
        }

        match existing.iter_mut().find(|c| {
            c.key == cookie.key && c.path == cookie.path && c.domain.eq_ignore_ascii_case(&cookie.domain)
        }) {
            Some(slot) => *slot = cookie,
            None => existing.push(cookie),
        }
    }
}
