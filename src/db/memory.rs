//! In-memory store implementations backing the unit tests. They honor the
//! same contracts as the Postgres repositories: live-slot uniqueness on
//! insert, pre-state-guarded transitions, and atomic rotation (all
//! serialized through a mutex).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::DatabaseError;
use super::models::{
    Advisory, AdvisoryStatus, AvailabilityWindow, DayOfWeek, NewAdvisory, NewAvailabilityWindow,
    NewNotificationLog, NewRefreshToken, NotificationLog, RefreshToken, UpdateAvailabilityWindow,
    User,
};
use super::store::{
    AdvisoryStore, AvailabilityStore, NotificationLogStore, RefreshTokenStore, UserStore,
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn add(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryAvailabilityStore {
    windows: Mutex<HashMap<Uuid, AvailabilityWindow>>,
}

#[async_trait]
impl AvailabilityStore for MemoryAvailabilityStore {
    async fn insert(
        &self,
        owner_id: Uuid,
        window: &NewAvailabilityWindow,
        created_at: OffsetDateTime,
    ) -> Result<AvailabilityWindow, DatabaseError> {
        let row = AvailabilityWindow {
            id: Uuid::new_v4(),
            user_id: owner_id,
            day_of_week: window.day_of_week,
            start_time: window.start_time,
            end_time: window.end_time,
            is_active: true,
            created_at,
        };
        self.windows.lock().unwrap().insert(row.id, row.clone());
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, DatabaseError> {
        Ok(self.windows.lock().unwrap().get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        window: &UpdateAvailabilityWindow,
    ) -> Result<Option<AvailabilityWindow>, DatabaseError> {
        let mut windows = self.windows.lock().unwrap();
        Ok(windows.get_mut(&id).map(|row| {
            row.day_of_week = window.day_of_week;
            row.start_time = window.start_time;
            row.end_time = window.end_time;
            row.clone()
        }))
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), DatabaseError> {
        if let Some(row) = self.windows.lock().unwrap().get_mut(&id) {
            row.is_active = false;
        }
        Ok(())
    }

    async fn active_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<AvailabilityWindow>, DatabaseError> {
        Ok(self
            .windows
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.user_id == owner_id && w.is_active)
            .cloned()
            .collect())
    }

    async fn active_for_owner_on(
        &self,
        owner_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Vec<AvailabilityWindow>, DatabaseError> {
        Ok(self
            .windows
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.user_id == owner_id && w.day_of_week == day && w.is_active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAdvisoryStore {
    advisories: Mutex<HashMap<Uuid, Advisory>>,
}

#[async_trait]
impl AdvisoryStore for MemoryAdvisoryStore {
    async fn insert(
        &self,
        external_id: Uuid,
        advisory: &NewAdvisory,
        now: OffsetDateTime,
    ) -> Result<Advisory, DatabaseError> {
        let mut advisories = self.advisories.lock().unwrap();
        let slot_taken = advisories.values().any(|a| {
            a.programmer_id == advisory.programmer_id
                && a.scheduled_at == advisory.scheduled_at
                && matches!(a.status, AdvisoryStatus::Pending | AdvisoryStatus::Approved)
        });
        if slot_taken {
            return Err(DatabaseError::Duplicate);
        }
        let row = Advisory {
            id: Uuid::new_v4(),
            programmer_id: advisory.programmer_id,
            external_id,
            scheduled_at: advisory.scheduled_at,
            status: AdvisoryStatus::Pending,
            request_comment: advisory.comment.clone(),
            response_message: None,
            created_at: now,
            updated_at: now,
        };
        advisories.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Advisory>, DatabaseError> {
        Ok(self.advisories.lock().unwrap().get(&id).cloned())
    }

    async fn find_live_at(
        &self,
        programmer_id: Uuid,
        scheduled_at: OffsetDateTime,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        Ok(self
            .advisories
            .lock()
            .unwrap()
            .values()
            .filter(|a| {
                a.programmer_id == programmer_id
                    && a.scheduled_at == scheduled_at
                    && matches!(a.status, AdvisoryStatus::Pending | AdvisoryStatus::Approved)
            })
            .cloned()
            .collect())
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: AdvisoryStatus,
        next: AdvisoryStatus,
        response_message: Option<&str>,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Advisory>, DatabaseError> {
        let mut advisories = self.advisories.lock().unwrap();
        let Some(row) = advisories.get_mut(&id) else {
            return Ok(None);
        };
        if row.status != expected {
            return Ok(None);
        }
        row.status = next;
        if let Some(message) = response_message {
            row.response_message = Some(message.to_string());
        }
        row.updated_at = updated_at;
        Ok(Some(row.clone()))
    }

    async fn list_for_programmer(
        &self,
        programmer_id: Uuid,
        status: Option<AdvisoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let mut rows: Vec<Advisory> = self
            .advisories
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.programmer_id == programmer_id)
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_for_external(
        &self,
        external_id: Uuid,
        status: Option<AdvisoryStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let mut rows: Vec<Advisory> = self
            .advisories
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.external_id == external_id)
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn approved_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Advisory>, DatabaseError> {
        let mut rows: Vec<Advisory> = self
            .advisories
            .lock()
            .unwrap()
            .values()
            .filter(|a| {
                a.status == AdvisoryStatus::Approved
                    && a.scheduled_at >= start
                    && a.scheduled_at < end
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.scheduled_at);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: Mutex<HashMap<Uuid, RefreshToken>>,
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, token: &NewRefreshToken) -> Result<RefreshToken, DatabaseError> {
        let row = RefreshToken {
            id: Uuid::new_v4(),
            token: token.token.clone(),
            user_id: token.user_id,
            expires_at: token.expires_at,
            revoked_at: None,
            replaced_by_token: None,
            created_at: token.created_at,
        };
        self.tokens.lock().unwrap().insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .values()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn rotate(
        &self,
        old_id: Uuid,
        revoked_at: OffsetDateTime,
        successor: &NewRefreshToken,
    ) -> Result<RefreshToken, DatabaseError> {
        let mut tokens = self.tokens.lock().unwrap();
        let row = RefreshToken {
            id: Uuid::new_v4(),
            token: successor.token.clone(),
            user_id: successor.user_id,
            expires_at: successor.expires_at,
            revoked_at: None,
            replaced_by_token: None,
            created_at: successor.created_at,
        };
        tokens.insert(row.id, row.clone());
        if let Some(old) = tokens.get_mut(&old_id) {
            old.revoked_at = Some(revoked_at);
            old.replaced_by_token = Some(successor.token.clone());
        }
        Ok(row)
    }

    async fn revoke(&self, id: Uuid, revoked_at: OffsetDateTime) -> Result<(), DatabaseError> {
        if let Some(token) = self.tokens.lock().unwrap().get_mut(&id) {
            token.revoked_at = Some(revoked_at);
        }
        Ok(())
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        revoked_at: OffsetDateTime,
    ) -> Result<u64, DatabaseError> {
        let mut revoked = 0;
        for token in self.tokens.lock().unwrap().values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(revoked_at);
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

#[derive(Default)]
pub struct MemoryNotificationLogStore {
    logs: Mutex<Vec<NotificationLog>>,
}

impl MemoryNotificationLogStore {
    pub fn entries(&self) -> Vec<NotificationLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationLogStore for MemoryNotificationLogStore {
    async fn insert(&self, log: &NewNotificationLog) -> Result<NotificationLog, DatabaseError> {
        let row = NotificationLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            notification_type: log.notification_type,
            destination: log.destination.clone(),
            subject: log.subject.clone(),
            payload: log.payload.clone(),
            status: log.status,
            error_message: log.error_message.clone(),
            sent_at: log.sent_at,
            created_at: log.created_at,
        };
        self.logs.lock().unwrap().push(row.clone());
        Ok(row)
    }
}
