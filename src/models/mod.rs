// Re-export all models organized by layer
pub mod conflicts;
pub mod domain;
pub mod errors;
pub mod request;
pub mod response;

pub use conflicts::*;
pub use domain::*;
pub use errors::*;
pub use request::*;
pub use response::*;
