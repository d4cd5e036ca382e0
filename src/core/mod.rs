//! Core module - shared infrastructure for Datachat
//!
//! This module contains foundational types, configuration, logging, and error
//! handling used throughout the application.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::Config;
pub use error::{DatachatError, Result};
pub use types::*;
