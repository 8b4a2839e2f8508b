//! Session metadata services

mod binder;

pub use binder::SessionBinder;
