pub mod models;
pub mod path;
pub mod validation;
pub mod styling;
pub mod errors;

pub use models::*;
pub use path::*;
pub use validation::*;
pub use styling::*;
pub use errors::*;
