//! Domain entities

pub mod token;

pub use token::{Claims, IssuedTokens, RefreshTokenRecord, TokenState, BEARER_TOKEN_TYPE};
