//! Authentication types for JWT tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Token response returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Bearer access token.
    pub access_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_new() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + chrono::Duration::minutes(15);
        let claims = Claims::new(user_id, expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.exp, expires_at.timestamp());
        assert!(claims.iat <= claims.exp);
    }
}
