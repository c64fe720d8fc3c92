//! Shared configuration types for the Wicket database admin.
//!
//! Every crate in the workspace reads its settings from a single
//! [`WicketConfig`], usually loaded from `wicket.yaml`.

pub mod config;

pub use config::{
    AggregateInsertConfig, AutoIncrementException, ConfigError, DashboardConfig, EngineConfig,
    ObservabilityConfig, PoolConfig, UpstreamConfig, WicketConfig,
};
