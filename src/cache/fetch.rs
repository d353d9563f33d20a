//! Remote archive fetching
//!
//! The cache only needs "stream the body at this URL into a writer", so that
//! is the whole trait. Tests substitute in-process fetchers.

use crate::error::{FixturesError, FixturesResult};
use crate::ui::DownloadProgress;
use std::io::{self, Write};
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Source of archive bytes
pub trait ArchiveFetcher: Send + Sync {
    /// Stream the response body for `url` into `sink`, returning the byte count.
    ///
    /// Runs on a blocking thread. Any error (transport, non-success status,
    /// truncated body) must be returned rather than a short count.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> FixturesResult<u64>;
}

/// HTTP(S) fetcher following redirects
pub struct HttpFetcher {
    agent: Agent,
    show_progress: bool,
}

impl HttpFetcher {
    /// Maximum redirect hops (archive hosts redirect to a CDN)
    pub const MAX_REDIRECTS: u32 = 10;

    /// Create a fetcher; `timeout` bounds the whole request including body
    pub fn new(timeout: Option<Duration>, show_progress: bool) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(timeout)
            .max_redirects(Self::MAX_REDIRECTS)
            .user_agent(concat!("fixtures/", env!("CARGO_PKG_VERSION")))
            .build()
            .into();

        Self {
            agent,
            show_progress,
        }
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> FixturesResult<u64> {
        debug!("GET {}", url);

        // Non-2xx statuses surface as errors here
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FixturesError::fetch(url, e))?;

        let length = response.body().content_length();
        debug!("Response {} ({:?} bytes)", response.status(), length);

        let progress = DownloadProgress::new(self.show_progress, "Downloading", length);
        let mut reader = progress.wrap(response.body_mut().as_reader());
        let written = io::copy(&mut reader, sink).map_err(|e| FixturesError::fetch(url, e))?;
        progress.finish();

        if let Some(expected) = length {
            if written != expected {
                return Err(FixturesError::fetch(
                    url,
                    format!("body truncated: got {} of {} bytes", written, expected),
                ));
            }
        }

        Ok(written)
    }
}
