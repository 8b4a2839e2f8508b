//! # PassVault Core
//!
//! Authentication token lifecycle core for the PassVault backend.
//! This crate contains the domain entities, the token lifecycle state
//! machine, the storage interface and error types. The HTTP/GraphQL layer
//! consumes this crate through [`services::token::TokenLifecycle`] and
//! [`services::session::SessionBinder`].

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
