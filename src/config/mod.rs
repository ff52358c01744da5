//! Configuration system
//!
//! Loads the optional ~/.config/refollow/config.yaml with support for:
//! - Server port, bind address, and production mode
//! - Upstream provider URL, credential, and timeout
//! - Result cache TTL
//! - Creator follow gate handles
//! - Log filter
//!
//! Environment variables override file values.

mod refollow_config;

pub use refollow_config::{
    CacheSettings, GateSettings, LogSettings, RefollowConfig, ServerSettings, UpstreamSettings,
};
