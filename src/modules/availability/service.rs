use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{
    AvailabilityStore, AvailabilityWindow, NewAvailabilityWindow, UpdateAvailabilityWindow,
    UserStore,
};
use crate::error::{AppError, AppResult};

/// Weekly availability windows of a provider. Windows may overlap; removal
/// is a soft deactivation so booked advisories keep their reference.
pub struct AvailabilityService {
    windows: Arc<dyn AvailabilityStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        windows: Arc<dyn AvailabilityStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            windows,
            users,
            clock,
        }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        request: &NewAvailabilityWindow,
    ) -> AppResult<AvailabilityWindow> {
        self.users
            .find(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {owner_id} not found")))?;

        check_time_range(request.start_time, request.end_time)?;

        let window = self.windows.insert(owner_id, request, self.clock.now()).await?;
        info!(
            "Created availability for user: {} on {:?}",
            owner_id, request.day_of_week
        );
        Ok(window)
    }

    pub async fn update(
        &self,
        window_id: Uuid,
        owner_id: Uuid,
        request: &UpdateAvailabilityWindow,
    ) -> AppResult<AvailabilityWindow> {
        let window = self.require(window_id).await?;
        if window.user_id != owner_id {
            return Err(AppError::Authorization(
                "You do not have permission to edit this availability".to_string(),
            ));
        }

        check_time_range(request.start_time, request.end_time)?;

        let updated = self
            .windows
            .update(window_id, request)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Availability {window_id} not found")))?;
        info!("Updated availability: {}", window_id);
        Ok(updated)
    }

    /// Idempotent soft delete.
    pub async fn deactivate(&self, window_id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let window = self.require(window_id).await?;
        if window.user_id != owner_id {
            return Err(AppError::Authorization(
                "You do not have permission to delete this availability".to_string(),
            ));
        }

        self.windows.deactivate(window_id).await?;
        info!("Deactivated availability: {}", window_id);
        Ok(())
    }

    pub async fn windows_for(&self, owner_id: Uuid) -> AppResult<Vec<AvailabilityWindow>> {
        Ok(self.windows.active_for_owner(owner_id).await?)
    }

    async fn require(&self, window_id: Uuid) -> AppResult<AvailabilityWindow> {
        self.windows
            .find(window_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Availability {window_id} not found")))
    }
}

fn check_time_range(start: time::Time, end: time::Time) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }
    Ok(())
}
