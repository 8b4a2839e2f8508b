//! Service layer: signing, token lifecycle, session metadata binding

pub mod session;
pub mod token;

pub use session::SessionBinder;
pub use token::{Signer, TokenCleanupConfig, TokenCleanupService, TokenLifecycle};
