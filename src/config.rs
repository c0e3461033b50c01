//! Server configuration parsed from environment variables.
//!
//! Every setting has a default; malformed values fall back to the default
//! with a warning rather than refusing to start.

use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BROADCAST_BUFFER: usize = 256;
pub const DEFAULT_SSE_KEEPALIVE_SECS: u64 = 15;
pub const DEFAULT_MOCK_INITIAL: usize = 5;
pub const DEFAULT_MOCK_TICK_MS: u64 = 1_200;
pub const DEFAULT_MOCK_WARMUP_MS: u64 = 300;

/// Mock marker generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockConfig {
    pub enabled: bool,
    /// Markers created before the first tick.
    pub initial: usize,
    pub tick_ms: u64,
    /// Delay before the first tick.
    pub warmup_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Capacity of each broadcast channel; slower subscribers lag and skip.
    pub broadcast_buffer: usize,
    pub sse_keepalive_secs: u64,
    pub mock: MockConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DMAP_BROADCAST_BUFFER`: default 256
    /// - `DMAP_SSE_KEEPALIVE_SECS`: default 15
    /// - `DMAP_MOCK`: `1`/`true` to run the mock generator
    /// - `DMAP_MOCK_INITIAL`: default 5
    /// - `DMAP_MOCK_TICK_MS`: default 1200
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            broadcast_buffer: env_parse(&lookup, "DMAP_BROADCAST_BUFFER", DEFAULT_BROADCAST_BUFFER).max(1),
            sse_keepalive_secs: env_parse(&lookup, "DMAP_SSE_KEEPALIVE_SECS", DEFAULT_SSE_KEEPALIVE_SECS).max(1),
            mock: MockConfig {
                enabled: env_flag(&lookup, "DMAP_MOCK"),
                initial: env_parse(&lookup, "DMAP_MOCK_INITIAL", DEFAULT_MOCK_INITIAL),
                tick_ms: env_parse(&lookup, "DMAP_MOCK_TICK_MS", DEFAULT_MOCK_TICK_MS).max(1),
                warmup_ms: DEFAULT_MOCK_WARMUP_MS,
            },
        }
    }
}

fn env_parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    if let Ok(value) = raw.trim().parse::<T>() {
        value
    } else {
        warn!(key, value = %raw, "unparseable config value; using default");
        default
    }
}

fn env_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key).is_some_and(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
