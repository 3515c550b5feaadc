//! Infrastructure layer providing external service integrations.
//!
//! This module contains file access, options persistence, the preview
//! renderer and runtime configuration.

pub mod config;
pub mod files;
pub mod persistence;
pub mod preview;

pub use config::*;
pub use files::*;
pub use persistence::*;
pub use preview::*;
