//! Authentication
//!
//! - [`JwtService`] - bearer token validation
//! - [`Actor`] - optional acting user extractor

pub mod extractor;
pub mod jwt;

pub use extractor::Actor;
pub use jwt::{ActorUser, Claims, JwtConfig, JwtError, JwtService};
