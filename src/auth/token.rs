use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Seconds shaved off the provider's stated lifetime.
pub const SAFETY_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the identity provider omits `expires_in`.
pub const DEFAULT_LIFETIME_SECS: u64 = 3600;

const PREVIEW_CHARS: usize = 12;

/// A bearer token together with its effective expiry.
///
/// The stored expiry already has the safety margin subtracted, so a
/// credential is usable exactly while `now < expires_at`.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use wxo_bridge::auth::Credential;
///
/// let credential = Credential::from_lifetime("eyJraWQiOi", 3600, Utc::now());
/// assert!(credential.is_valid());
/// assert_eq!(credential.token(), "eyJraWQiOi");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Build a credential from a provider lifetime, applying the safety margin.
    pub fn from_lifetime(
        token: impl Into<String>,
        lifetime_secs: u64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let lifetime = i64::try_from(lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::days(365));
        let expires_at = issued_at
            .checked_add_signed(lifetime - Duration::seconds(SAFETY_MARGIN_SECS))
            .unwrap_or(issued_at);
        Self::new(token, expires_at)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn len(&self) -> usize {
        self.token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }

    /// Masked prefix safe to print in diagnostics.
    pub fn preview(&self) -> String {
        let prefix: String = self.token.chars().take(PREVIEW_CHARS).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
