//! Application layer managing state and business workflows.
//!
//! This module binds the form document to a nested options state, reacts
//! to changes through the controller and holds the interactive app state.

pub mod binder;
pub mod controller;
pub mod form;
pub mod renderer;
pub mod state;

pub use binder::*;
pub use controller::*;
pub use form::*;
pub use renderer::*;
pub use state::*;
