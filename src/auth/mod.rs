//! Bearer-token lifecycle for the orchestration API.

pub mod error;
pub mod manager;
pub mod token;

pub use error::AuthError;
pub use manager::{TokenManager, DEFAULT_IDENTITY_TIMEOUT, DEFAULT_IDENTITY_URL};
pub use token::{Credential, DEFAULT_LIFETIME_SECS, SAFETY_MARGIN_SECS};
