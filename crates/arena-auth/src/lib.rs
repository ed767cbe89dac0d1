//! Session tokens for the arena API
//!
//! The arena trusts an external identity provider. A session token carries
//! the principal's id and display name; the API validates it on every
//! protected request and mirrors the principal into the local `users` table.

pub mod jwt;

pub use jwt::{JwtError, JwtValidator, SessionClaims, SESSION_TOKEN_TYPE};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, Validation};
