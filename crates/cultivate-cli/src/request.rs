//! # Request Subcommand
//!
//! Raw authenticated call to any endpoint, e.g.
//! `cultivate request GET /inventory --param category=flower`.
//! Context headers, classification and token refresh all apply.

use anyhow::{bail, Context, Result};
use clap::Args;
use cultivate_client::{CultivateClient, Method};
use serde_json::Value;

use crate::{print_json, EXIT_OK};

/// Arguments for `cultivate request`.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE).
    pub method: String,

    /// Path relative to the API base URL, e.g. `/compliance/status`.
    pub path: String,

    /// JSON request body.
    #[arg(long)]
    pub body: Option<String>,

    /// Query parameter as `key=value`. Repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

/// Parse a `key=value` pair. The value may itself contain `=`.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

pub fn parse_method(raw: &str) -> Result<Method> {
    let method = Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method {raw:?}"))?;
    match method {
        Method::GET | Method::POST | Method::PUT | Method::PATCH | Method::DELETE => Ok(method),
        other => bail!("unsupported HTTP method {other}"),
    }
}

pub async fn run_request(args: &RequestArgs, client: &CultivateClient) -> Result<u8> {
    let method = parse_method(&args.method)?;
    let body: Option<Value> = args
        .body
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--body is not valid JSON")?;
    let params: Vec<(&str, &str)> = args
        .params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let resp: Value = client
        .api()
        .request(method.clone(), &args.path, body.as_ref(), &params)
        .await
        .with_context(|| format!("{method} {} failed", args.path))?;
    if !resp.is_null() {
        print_json(&resp)?;
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_splits_on_first_equals() {
        assert_eq!(
            parse_param("search=a=b").unwrap(),
            ("search".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_param("category=").unwrap(),
            ("category".to_string(), String::new())
        );
    }

    #[test]
    fn param_without_key_is_rejected() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=flower").is_err());
    }

    #[test]
    fn method_is_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Patch").unwrap(), Method::PATCH);
    }

    #[test]
    fn unsupported_method_is_rejected() {
        assert!(parse_method("TRACE").is_err());
        assert!(parse_method("NOT A METHOD").is_err());
    }
}
