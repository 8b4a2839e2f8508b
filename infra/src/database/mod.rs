//! Database-backed store implementations

pub mod mysql;
