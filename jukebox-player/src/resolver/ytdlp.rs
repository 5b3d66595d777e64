//! yt-dlp backed resolver
//!
//! Runs the extractor once per query in flat-playlist mode and maps its JSON
//! dump into a [`Resolution`].

use super::{MediaResolver, Resolution, TrackInfo};
use crate::error::ResolveError;
use async_trait::async_trait;
use jukebox_common::config::ResolverConfig;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

pub struct YtDlpResolver {
    config: ResolverConfig,
}

impl YtDlpResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("--flat-playlist")
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg("--default-search")
            .arg(&self.config.default_search);
        if let Some(cookies) = &self.config.cookie_file {
            cmd.arg("--cookies").arg(cookies);
        }
        cmd.arg("--")
            .arg(query)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> Result<Resolution, ResolveError> {
        debug!("Running {} for '{}'", self.config.program, query);
        let output = self.command(query).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
                .unwrap_or_else(|| format!("extractor exited with {}", output.status));
            return Err(ResolveError::Extractor(message));
        }

        parse_extraction(&output.stdout)
    }
}

/// One info dict from the extractor; playlists nest entries of the same shape
#[derive(Debug, Deserialize)]
struct RawInfo {
    id: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    url: Option<String>,
    webpage_url: Option<String>,
    playlist_count: Option<u64>,
    /// Unavailable entries come through as `null`
    entries: Option<Vec<Option<RawInfo>>>,
}

impl RawInfo {
    fn into_info(self, locator: Option<String>) -> Option<TrackInfo> {
        let mut info = TrackInfo::new(locator.filter(|s| !s.trim().is_empty())?);
        if let Some(title) = self.title {
            info = info.with_title(title);
        }
        if let Some(uploader) = self.uploader {
            info = info.with_uploader(uploader);
        }
        if let Some(secs) = self.duration.filter(|d| d.is_finite() && *d >= 0.0) {
            info = info.with_duration(secs.round() as u64);
        }
        Some(info)
    }

    fn single_locator(&self) -> Option<String> {
        self.webpage_url
            .clone()
            .or_else(|| self.url.clone())
            .or_else(|| self.id.clone())
    }

    fn entry_locator(&self) -> Option<String> {
        self.url
            .clone()
            .or_else(|| self.webpage_url.clone())
            .or_else(|| self.id.clone())
    }
}

/// Map the extractor's JSON dump into a [`Resolution`]
pub fn parse_extraction(json: &[u8]) -> Result<Resolution, ResolveError> {
    let mut raw: RawInfo = serde_json::from_slice(json)?;

    match raw.entries.take() {
        Some(entries) => {
            let reported = raw.playlist_count.unwrap_or(0) as usize;
            let entries: Vec<TrackInfo> = entries
                .into_iter()
                .flatten()
                .filter_map(|entry| {
                    let locator = entry.entry_locator();
                    entry.into_info(locator)
                })
                .collect();
            let total_count = reported.max(entries.len());
            Ok(Resolution::Playlist {
                entries,
                total_count,
            })
        }
        None => {
            let locator = raw.single_locator();
            raw.into_info(locator)
                .map(Resolution::Single)
                .ok_or_else(|| ResolveError::Extractor("result has no playable locator".into()))
        }
    }
}
