//! `pasar-auth` — the identity gate (accounts, credentials, tokens).
//!
//! This crate is intentionally decoupled from HTTP and storage: it models
//! accounts and token claims, hashes/verifies credentials, and issues/verifies
//! bearer tokens. Where the token comes from is the transport layer's concern.

pub mod account;
pub mod claims;
pub mod jwt;
pub mod password;

pub use account::{Account, AccountKind, NewAccount};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator, TokenError};
