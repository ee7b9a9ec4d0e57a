use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Payload of a session token.
///
/// Field names match the tokens issued by earlier deployments (`userId`, `iat`, `exp`),
/// so a token signed with the same secret stays valid across the switch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Identifier of the authenticated user
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for a user, issued now.
    ///
    /// # Arguments
    /// * `user_id` - User identifier
    /// * `ttl` - Lifetime of the token
    pub fn for_user(user_id: impl ToString, ttl: Duration) -> Self {
        Self::issued_at(user_id, Utc::now(), ttl)
    }

    /// Create claims for a user with an explicit issue instant.
    pub fn issued_at(user_id: impl ToString, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Expiry instant, if the timestamp is representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check whether the token is expired at the given Unix timestamp.
    ///
    /// A token is still valid at exactly its expiry second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user_spans_ttl() {
        let claims = SessionClaims::for_user("65f1c0ffee0000000000beef", Duration::hours(24));

        assert_eq!(claims.user_id, "65f1c0ffee0000000000beef");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_is_expired() {
        let issued = DateTime::from_timestamp(1_000, 0).unwrap();
        let claims = SessionClaims::issued_at("user", issued, Duration::seconds(100));

        assert!(!claims.is_expired(1_099));
        assert!(!claims.is_expired(1_100));
        assert!(claims.is_expired(1_101));
    }

    #[test]
    fn test_wire_format_uses_user_id_key() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = SessionClaims::issued_at("abc", issued, Duration::hours(1));

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], "abc");
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_003_600);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_003_600);
    }
}
