//! Bearer-token authentication
//!
//! Tokens are issued by the external identity provider and verified
//! locally with a shared HMAC secret.

mod middleware;
mod token;

pub use middleware::{AuthUser, CurrentUser, require_auth};
pub use token::{Claims, create_access_token, verify_access_token};
