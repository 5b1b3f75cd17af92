//! Authentication: JWT issuing/verification, password hashing and strength
//! rules, and the extractor that turns a bearer token into an acting user.

pub mod claims;
pub mod extract;
pub mod jwt;
pub mod password;

pub use claims::{AccessClaims, RefreshClaims};
pub use extract::CurrentUser;
