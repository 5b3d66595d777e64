//! Canned resolver
//!
//! Unknown queries resolve to a single track whose locator and title are the
//! query itself.

use async_trait::async_trait;
use jukebox_player::resolver::{MediaResolver, Resolution, TrackInfo};
use jukebox_player::ResolveError;
use std::collections::HashMap;

#[derive(Default)]
pub struct StaticResolver {
    results: HashMap<String, Resolution>,
    failures: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, resolution: Resolution) -> Self {
        self.results.insert(query.to_string(), resolution);
        self
    }

    pub fn failing(mut self, query: &str, message: &str) -> Self {
        self.failures.insert(query.to_string(), message.to_string());
        self
    }
}

#[async_trait]
impl MediaResolver for StaticResolver {
    async fn resolve(&self, query: &str) -> Result<Resolution, ResolveError> {
        if let Some(message) = self.failures.get(query) {
            return Err(ResolveError::Extractor(message.clone()));
        }
        Ok(self
            .results
            .get(query)
            .cloned()
            .unwrap_or_else(|| Resolution::Single(TrackInfo::new(query).with_title(query))))
    }
}
