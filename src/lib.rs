//! qrform - Terminal QR Code Styling Library
//!
//! Binds a form of styling controls to a nested options document and keeps
//! a QR renderer in sync with it as the form changes.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
