//! Tracing setup
//!
//! The subscriber is installed before configuration loads so config warnings
//! are visible. The configured level is applied afterwards through a reload
//! handle. `RUST_LOG`, when set, wins over the configured level.

use crate::error::{Error, Result};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Level used until the configuration has been read
pub const BOOT_LEVEL: &str = "info";

/// Handle to the installed filter
#[derive(Clone)]
pub struct LogFilterHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LogFilterHandle {
    /// Switch to the configured level unless `RUST_LOG` is in charge
    pub fn apply_level(&self, level: &str) -> Result<()> {
        if self.env_override {
            return Ok(());
        }
        let filter = filter_for_level(level)?;
        self.handle
            .reload(filter)
            .map_err(|e| Error::Logging(format!("failed to apply log level: {}", e)))
    }
}

/// Install the global fmt subscriber
pub fn init() -> Result<LogFilterHandle> {
    let (filter, handle) = filter_layer(std::env::var("RUST_LOG").ok())?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;
    Ok(handle)
}

fn filter_layer(
    env_directives: Option<String>,
) -> Result<(reload::Layer<EnvFilter, Registry>, LogFilterHandle)> {
    let (filter, env_override) = match env_directives.filter(|d| !d.trim().is_empty()) {
        Some(directives) => (
            EnvFilter::try_new(&directives)
                .map_err(|e| Error::Logging(format!("invalid RUST_LOG '{}': {}", directives, e)))?,
            true,
        ),
        None => (filter_for_level(BOOT_LEVEL)?, false),
    };
    let (layer, handle) = reload::Layer::new(filter);
    Ok((
        layer,
        LogFilterHandle {
            handle,
            env_override,
        },
    ))
}

fn filter_for_level(level: &str) -> Result<EnvFilter> {
    let directives = format!(
        "jukebox_player={level},jukebox_common={level},tower_http=info",
        level = level
    );
    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Logging(format!("invalid log level '{}': {}", level, e)))
}
