//! audiod - audio routing and feedback daemon.
//!
//! Exposes volume, mute, call-mode routing and short feedback sounds as
//! D-Bus operations, backed by a PulseAudio client connection:
//!
//! - Call-mode routing cascade over cards, sinks and sources
//! - Upload-once feedback sample pipeline
//! - Confirmed device state with change notifications
//! - TOML configuration and structured logging
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use audiod::{config::Config, services::{AudioService, PulsePort}};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let service = Arc::new(AudioService::new(&config.feedback.sample_dir));
//! let port = PulsePort::connect(&config.pulse).await?;
//! service.attach_port(Arc::new(port)).await?;
//! println!("{:?}", service.status()?);
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and validation.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Daemon lifecycle.
pub mod daemon;

/// Command-line interface.
pub mod cli;

/// Audio service, PulseAudio port and D-Bus surface.
pub mod services;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{AudiodError, Result};
