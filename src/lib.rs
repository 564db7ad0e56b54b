//! tlogview - A telemetry log reader for UAV flight controllers
//!
//! This library parses the line-oriented `.tlog` format written by the
//! flight controller into per-device, per-measurement time series, and
//! provides windowed queries, export and chart rendering on top of them.
//!
//! ## Module Structure
//!
//! - [`parsers`] - Tokenizer, cursor and statement dispatcher for `.tlog` files
//! - [`store`] - Reading store and time-series queries
//! - [`state`] - Loaded-file wrapper, series keys and constants
//! - [`loader`] - Memory-mapped file loading
//! - [`settings`] - User settings persistence
//! - [`export`] - CSV and JSON series export
//! - [`render`] - PNG chart rendering

pub mod export;
pub mod loader;
pub mod parsers;
pub mod render;
pub mod settings;
pub mod state;
pub mod store;
