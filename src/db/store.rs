use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::DatabaseError;
use super::models::{
    Advisory, AdvisoryStatus, AvailabilityWindow, DayOfWeek, NewAdvisory, NewAvailabilityWindow,
    NewNotificationLog, NewRefreshToken, NotificationLog, RefreshToken, UpdateAvailabilityWindow,
    User,
};

/// Keyed lookups into the identity store. User rows are owned by the profile
/// subsystem; the engine never writes them.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn insert(
        &self,
        owner_id: Uuid,
        window: &NewAvailabilityWindow,
        created_at: OffsetDateTime,
    ) -> Result<AvailabilityWindow, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, DatabaseError>;

    async fn update(
        &self,
        id: Uuid,
        window: &UpdateAvailabilityWindow,
    ) -> Result<Option<AvailabilityWindow>, DatabaseError>;

    /// Soft delete; a second call on an already inactive window is a no-op.
    async fn deactivate(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn active_for_owner(&self, owner_id: Uuid)
        -> Result<Vec<AvailabilityWindow>, DatabaseError>;

    async fn active_for_owner_on(
        &self,
        owner_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Vec<AvailabilityWindow>, DatabaseError>;
}

#[async_trait]
pub trait AdvisoryStore: Send + Sync {
    /// Persists a PENDING advisory. Fails with [`DatabaseError::Duplicate`]
    /// when another PENDING/APPROVED advisory already holds the exact
    /// (programmer, scheduled_at) slot.
    async fn insert(
        &self,
        external_id: Uuid,
        advisory: &NewAdvisory,
        now: OffsetDateTime,
    ) -> Result<Advisory, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<Advisory>, DatabaseError>;

    /// PENDING/APPROVED advisories at the exact slot.
    async fn find_live_at(
        &self,
        programmer_id: Uuid,
        scheduled_at: OffsetDateTime,
    ) -> Result<Vec<Advisory>, DatabaseError>;

    /// Conditional state transition: commits only if the row still holds
    /// `expected`, so two racing transitions cannot both succeed. Returns the
    /// updated row, or `None` when the precondition no longer holds.
    async fn transition(
        &self,
        id: Uuid,
        expected: AdvisoryStatus,
        next: AdvisoryStatus,
        response_message: Option<&str>,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Advisory>, DatabaseError>;

    async fn list_for_programmer(
        &self,
        programmer_id: Uuid,
        status: Option<AdvisoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Advisory>, DatabaseError>;

    async fn list_for_external(
        &self,
        external_id: Uuid,
        status: Option<AdvisoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Advisory>, DatabaseError>;

    /// APPROVED advisories with `start <= scheduled_at < end`.
    async fn approved_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Advisory>, DatabaseError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, token: &NewRefreshToken) -> Result<RefreshToken, DatabaseError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError>;

    /// Revokes `old_id` (recording its successor) and inserts the successor
    /// in one transaction; a crash cannot leave the chain half-rotated.
    async fn rotate(
        &self,
        old_id: Uuid,
        revoked_at: OffsetDateTime,
        successor: &NewRefreshToken,
    ) -> Result<RefreshToken, DatabaseError>;

    async fn revoke(&self, id: Uuid, revoked_at: OffsetDateTime) -> Result<(), DatabaseError>;

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        revoked_at: OffsetDateTime,
    ) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait NotificationLogStore: Send + Sync {
    async fn insert(&self, log: &NewNotificationLog) -> Result<NotificationLog, DatabaseError>;
}
