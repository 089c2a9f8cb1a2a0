//! Retrieval of the roster document.
//!
//! `http` and `https` URLs go through a blocking `reqwest` client; `file`
//! URLs are read from the local filesystem.

use std::{fs, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use reqwest::blocking::Client;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn parse_source(source: &str) -> Result<Url> {
    Url::parse(source.trim()).with_context(|| format!("Invalid URL '{source}'"))
}

/// Downloads the raw bytes behind `source`.
pub fn download(source: &str, timeout: Duration) -> Result<Vec<u8>> {
    let url = parse_source(source)?;
    let bytes = match url.scheme() {
        "http" | "https" => download_http(&url, timeout)?,
        "file" => read_file(&url)?,
        other => bail!("Unsupported URL scheme '{other}'"),
    };
    info!("Fetched {} byte(s) from {url}", bytes.len());
    Ok(bytes)
}

fn download_http(url: &Url, timeout: Duration) -> Result<Vec<u8>> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Building HTTP client")?;
    debug!("GET {url} (timeout {timeout:?})");
    let response = client
        .get(url.clone())
        .send()
        .with_context(|| format!("Requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("Server rejected request for {url}"))?;
    let body = response
        .bytes()
        .with_context(|| format!("Reading response body from {url}"))?;
    Ok(body.to_vec())
}

fn read_file(url: &Url) -> Result<Vec<u8>> {
    let path = url
        .to_file_path()
        .map_err(|_| anyhow!("URL {url} does not name a local file"))?;
    debug!("Reading {path:?}");
    fs::read(&path).with_context(|| format!("Reading {path:?}"))
}
