// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! cookiefetch CLI - single HTTP requests and cookie-jar inspection

use std::env;
use std::process::ExitCode;

use chrono::{TimeZone, Utc};
use url::Url;

use cookiefetch::{read_cookie_file, CookieRecord, HeaderValue, HttpClient, RequestOptions};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cookiefetch=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "request" => {
            if args.len() < 3 {
                eprintln!("Usage: cookiefetch request <url> [OPTIONS]");
                return ExitCode::from(1);
            }
            run_request(&args[2], &args[3..])
        }
        "cookies" => {
            if args.len() < 3 {
                eprintln!("Usage: cookiefetch cookies <jarfile>");
                return ExitCode::from(1);
            }
            list_cookies(&args[2])
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("cookiefetch {}", cookiefetch::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"cookiefetch - Single-shot HTTP requests with Netscape cookie jars

USAGE:
    cookiefetch <COMMAND> [OPTIONS]

COMMANDS:
    request <url>       Send one request and print the parsed response
    cookies <jarfile>   List the records in a cookie-jar file
    help                Show this help message
    version             Show version information

REQUEST OPTIONS:
    -X <method>         Request method (default GET)
    -H <name: value>    Add a request header (repeatable)
    -d <body>           Raw request body
    -F <key=value>      Form field, URL-encoded into the body (repeatable)
    -b <key=value>      Send a cookie (repeatable)
    -j <jarfile>        Read cookies from and save cookies to a jar file
    --json              Print the whole result as JSON

EXAMPLES:
    cookiefetch request https://example.com
    cookiefetch request https://example.com/login -X POST -F user=me -j cookies.txt
    cookiefetch cookies cookies.txt
"#
    );
}

struct RequestArgs {
    method: Option<String>,
    options: RequestOptions,
    json: bool,
}

fn parse_request_args(url: &str, args: &[String]) -> Result<RequestArgs, String> {
    let host = Url::parse(url)
        .map_err(|e| format!("Invalid URL '{}': {}", url, e))?
        .host_str()
        .unwrap_or_default()
        .to_string();

    let mut parsed = RequestArgs {
        method: None,
        options: RequestOptions::new(),
        json: false,
    };

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if flag == "--json" {
            parsed.json = true;
            continue;
        }

        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for {}", flag))?;

        match flag.as_str() {
            "-X" => parsed.method = Some(value.clone()),
            "-H" => {
                let (name, val) = value
                    .split_once(':')
                    .ok_or_else(|| format!("Header must be 'Name: value', got '{}'", value))?;
                parsed.options = parsed.options.header(name.trim(), val.trim());
            }
            "-d" => parsed.options = parsed.options.post_body(value.as_str()),
            "-F" => {
                let (key, val) = value
                    .split_once('=')
                    .ok_or_else(|| format!("Field must be 'key=value', got '{}'", value))?;
                parsed.options = parsed.options.post_field(key, val);
            }
            "-b" => {
                let (key, val) = value
                    .split_once('=')
                    .ok_or_else(|| format!("Cookie must be 'key=value', got '{}'", value))?;
                parsed.options = parsed.options.cookie(CookieRecord::new(host.as_str(), key, val));
            }
            "-j" => parsed.options = parsed.options.cookie_jar(value.as_str()),
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(parsed)
}

fn run_request(url: &str, args: &[String]) -> ExitCode {
    let parsed = match parse_request_args(url, args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let client = match HttpClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return ExitCode::from(1);
        }
    };

    let response = match client.execute(url, parsed.method.as_deref(), &parsed.options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Request failed: {}", e);
            return ExitCode::from(1);
        }
    };

    if parsed.json {
        return match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize response: {}", e);
                ExitCode::from(1)
            }
        };
    }

    println!("=== Response ===");
    println!("Status: {}", response.status_code);

    println!("\n=== Headers ({}) ===", response.headers.len());
    for (name, value) in &response.headers {
        match value {
            HeaderValue::Single(v) => println!("  {}: {}", name, v),
            HeaderValue::Multiple(values) => {
                for v in values {
                    println!("  {}: {}", name, v);
                }
            }
        }
    }

    if let Some(ref cookies) = response.cookies {
        println!("\n=== Cookies ({}) ===", cookies.len());
        for (key, value) in cookies {
            println!("  {} = {}", key, value);
        }
    }

    println!("\n=== Body ({} bytes) ===", response.body.len());
    println!("{}", response.body);

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn list_cookies(path: &str) -> ExitCode {
    let records = match read_cookie_file(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to read cookie jar: {}", e);
            return ExitCode::from(1);
        }
    };

    println!("=== Cookies ({}) ===", records.len());
    for record in &records {
        let expires = if record.is_session() {
            "session".to_string()
        } else {
            Utc.timestamp_opt(record.expires, 0)
                .single()
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| record.expires.to_string())
        };
        let status = if record.is_expired() { " (expired)" } else { "" };

        println!(
            "  {}{} {} {}={} [{}{}]{}",
            record.domain,
            if record.domain_only { "" } else { " (+subdomains)" },
            record.path,
            record.key,
            record.value,
            expires,
            if record.secure { ", secure" } else { "" },
            status
        );
    }

    ExitCode::SUCCESS
}
