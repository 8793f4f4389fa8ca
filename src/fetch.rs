//! HTTP downloads.
use anyhow::{Context as _, Result};
use std::path::Path;

/// Largest body accepted from a download.
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Abstraction over HTTP GET so tests can avoid the network.
pub trait Downloader: Send + Sync + std::fmt::Debug {
    /// Download `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`Downloader`] backed by `ureq`.
#[derive(Debug, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = ureq::get(url)
            .call()
            .with_context(|| format!("requesting {url}"))?;
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_BYTES)
            .read_to_vec()
            .with_context(|| format!("reading body of {url}"))?;
        crate::sync::fs::ensure_parent_dir(dest)?;
        std::fs::write(dest, bytes).with_context(|| format!("writing {}", dest.display()))
    }
}

/// File name for a download of `url`: its last path segment, without any
/// query string, or `fallback` when the URL has none.
#[must_use]
pub fn file_name_from_url<'a>(url: &'a str, fallback: &'a str) -> &'a str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    match path.split_once('/') {
        Some((_, tail)) => tail
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback),
        None => fallback,
    }
}
