//! adserve - targeted ad delivery service
//!
//! Ads carry an active window and audience conditions (age range, gender,
//! countries, platforms). They are kept in a Redis-compatible key-value
//! store with a fixed TTL, and a shared counter caps how many can be created
//! per day.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `storage`: Key-value backends and the ad store
//! - `services`: Quota-gated creation and the audience query engine
//! - `api`: HTTP services, validation and middleware
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
