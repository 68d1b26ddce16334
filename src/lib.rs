//! mp4dash - MPEG-DASH packaging of MP4 files and capture devices
//!
//! This library crate backs the `mp4-to-dash` and `mp4-to-dash-cam`
//! binaries and exposes the commands for integration testing.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use error::{CommandError, Conflict};
