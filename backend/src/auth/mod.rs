//! Authentication module
//!
//! Verifies bearer JWTs issued by the identity provider. Accounts are never
//! created or logged in here.

mod jwt;
mod middleware;

pub use jwt::{Claims, JwtService};
pub use middleware::AuthUser;
