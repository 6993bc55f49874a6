use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// One link in a rotation chain. A token is usable iff `revoked_at` is null
/// and `expires_at` lies in the future; rotation revokes the old row and
/// records its successor in `replaced_by_token`. Rows are kept forever for
/// audit; garbage collection is external housekeeping.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
    pub replaced_by_token: Option<String>,
    pub created_at: OffsetDateTime,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn token_expiring_at(expires_at: OffsetDateTime) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4(),
            expires_at,
            revoked_at: None,
            replaced_by_token: None,
            created_at: datetime!(2025-06-01 00:00 UTC),
        }
    }

    #[test]
    fn expiry_is_inclusive_at_the_boundary() {
        let at = datetime!(2025-06-02 10:00 UTC);
        let token = token_expiring_at(at);
        assert!(!token.is_expired(at - time::Duration::seconds(1)));
        assert!(token.is_expired(at));
        assert!(token.is_expired(at + time::Duration::seconds(1)));
    }
}
