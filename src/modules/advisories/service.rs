use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{
    Advisory, AdvisoryAction, AdvisoryListParams, AdvisoryStatus, AdvisoryStore,
    AvailabilityStore, DatabaseError, DayOfWeek, NewAdvisory, Role, UserStore,
};
use crate::error::{AppError, AppResult};
use crate::modules::notifications::NotificationService;

/// Fixed length of one advisory session. A booking must leave this much room
/// before the window closes.
const SESSION_DURATION: Duration = Duration::minutes(30);

/// Booking engine: availability matching, conflict detection and the
/// advisory request state machine.
pub struct AdvisoryService {
    advisories: Arc<dyn AdvisoryStore>,
    users: Arc<dyn UserStore>,
    availability: Arc<dyn AvailabilityStore>,
    notifier: Arc<NotificationService>,
    clock: Arc<dyn Clock>,
}

impl AdvisoryService {
    pub fn new(
        advisories: Arc<dyn AdvisoryStore>,
        users: Arc<dyn UserStore>,
        availability: Arc<dyn AvailabilityStore>,
        notifier: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            advisories,
            users,
            availability,
            notifier,
            clock,
        }
    }

    pub async fn create(&self, external_id: Uuid, request: &NewAdvisory) -> AppResult<Advisory> {
        let external = self
            .users
            .find(external_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {external_id} not found")))?;

        let programmer = self.users.find(request.programmer_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Programmer {} not found", request.programmer_id))
        })?;

        if programmer.role != Role::Programmer {
            return Err(AppError::Validation(
                "The selected user is not a programmer".to_string(),
            ));
        }

        let now = self.clock.now();
        if request.scheduled_at <= now {
            return Err(AppError::Validation(
                "The advisory must be scheduled in the future".to_string(),
            ));
        }

        self.check_availability(programmer.id, request.scheduled_at)
            .await?;
        self.check_no_conflicts(programmer.id, request.scheduled_at)
            .await?;

        // The store enforces the live-slot uniqueness a concurrent writer
        // could still race us into after the pre-check above.
        let advisory = match self.advisories.insert(external_id, request, now).await {
            Ok(advisory) => advisory,
            Err(DatabaseError::Duplicate) => {
                return Err(AppError::Conflict(
                    "An advisory is already scheduled at that time".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            "Created advisory {} from {} to {} at {}",
            advisory.id, external.email, programmer.email, advisory.scheduled_at
        );

        self.notifier
            .advisory_requested(&programmer, &external, &advisory)
            .await;

        Ok(advisory)
    }

    pub async fn approve(
        &self,
        advisory_id: Uuid,
        programmer_id: Uuid,
        action: &AdvisoryAction,
    ) -> AppResult<Advisory> {
        let advisory = self
            .respond(advisory_id, programmer_id, AdvisoryStatus::Approved, action)
            .await?;
        info!("Approved advisory: {}", advisory_id);
        self.notify_decision(&advisory, true).await;
        Ok(advisory)
    }

    pub async fn reject(
        &self,
        advisory_id: Uuid,
        programmer_id: Uuid,
        action: &AdvisoryAction,
    ) -> AppResult<Advisory> {
        let advisory = self
            .respond(advisory_id, programmer_id, AdvisoryStatus::Rejected, action)
            .await?;
        info!("Rejected advisory: {}", advisory_id);
        self.notify_decision(&advisory, false).await;
        Ok(advisory)
    }

    pub async fn cancel(&self, advisory_id: Uuid, external_id: Uuid) -> AppResult<Advisory> {
        let advisory = self.require(advisory_id).await?;

        if advisory.external_id != external_id {
            return Err(AppError::Authorization(
                "You do not have permission to cancel this advisory".to_string(),
            ));
        }
        if !advisory.status.can_transition_to(AdvisoryStatus::Cancelled) {
            return Err(AppError::InvalidState(
                "Only pending advisories can be cancelled".to_string(),
            ));
        }

        let cancelled = self
            .transition(advisory_id, AdvisoryStatus::Pending, AdvisoryStatus::Cancelled, None)
            .await?;
        info!("Cancelled advisory: {}", advisory_id);
        Ok(cancelled)
    }

    pub async fn complete(&self, advisory_id: Uuid, programmer_id: Uuid) -> AppResult<Advisory> {
        let advisory = self.require(advisory_id).await?;

        if advisory.programmer_id != programmer_id {
            return Err(AppError::Authorization(
                "You do not have permission to complete this advisory".to_string(),
            ));
        }
        if !advisory.status.can_transition_to(AdvisoryStatus::Completed) {
            return Err(AppError::InvalidState(
                "Only approved advisories can be completed".to_string(),
            ));
        }

        let completed = self
            .transition(advisory_id, AdvisoryStatus::Approved, AdvisoryStatus::Completed, None)
            .await?;
        info!("Completed advisory: {}", advisory_id);
        Ok(completed)
    }

    pub async fn find(&self, advisory_id: Uuid) -> AppResult<Advisory> {
        self.require(advisory_id).await
    }

    pub async fn list_for_programmer(
        &self,
        programmer_id: Uuid,
        params: &AdvisoryListParams,
    ) -> AppResult<Vec<Advisory>> {
        Ok(self
            .advisories
            .list_for_programmer(programmer_id, params.status, params.limit(), params.offset())
            .await?)
    }

    pub async fn list_for_external(
        &self,
        external_id: Uuid,
        params: &AdvisoryListParams,
    ) -> AppResult<Vec<Advisory>> {
        Ok(self
            .advisories
            .list_for_external(external_id, params.status, params.limit(), params.offset())
            .await?)
    }

    /// Shared approve/reject path: ownership, pre-state, guarded transition.
    async fn respond(
        &self,
        advisory_id: Uuid,
        programmer_id: Uuid,
        next: AdvisoryStatus,
        action: &AdvisoryAction,
    ) -> AppResult<Advisory> {
        let advisory = self.require(advisory_id).await?;

        if advisory.programmer_id != programmer_id {
            return Err(AppError::Authorization(
                "You do not have permission to respond to this advisory".to_string(),
            ));
        }
        if !advisory.status.can_transition_to(next) {
            return Err(AppError::InvalidState(
                "Only pending advisories can be responded to".to_string(),
            ));
        }

        self.transition(advisory_id, AdvisoryStatus::Pending, next, action.message.as_deref())
            .await
    }

    async fn transition(
        &self,
        advisory_id: Uuid,
        expected: AdvisoryStatus,
        next: AdvisoryStatus,
        message: Option<&str>,
    ) -> AppResult<Advisory> {
        debug_assert!(expected.can_transition_to(next));
        self.advisories
            .transition(advisory_id, expected, next, message, self.clock.now())
            .await?
            // A concurrent transition won the race between our pre-read and
            // the guarded update.
            .ok_or_else(|| {
                AppError::InvalidState("The advisory is no longer in the expected state".to_string())
            })
    }

    async fn require(&self, advisory_id: Uuid) -> AppResult<Advisory> {
        self.advisories
            .find(advisory_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Advisory {advisory_id} not found")))
    }

    async fn check_availability(
        &self,
        programmer_id: Uuid,
        scheduled_at: OffsetDateTime,
    ) -> AppResult<()> {
        let day = DayOfWeek::from(scheduled_at.weekday());
        let slot = scheduled_at.time();

        let windows = self.availability.active_for_owner_on(programmer_id, day).await?;
        // The slot must leave a full session before the window closes.
        let available = windows
            .iter()
            .any(|w| w.start_time <= slot && slot <= w.end_time - SESSION_DURATION);

        if !available {
            return Err(AppError::Validation(
                "The programmer is not available at that time".to_string(),
            ));
        }
        Ok(())
    }

    async fn check_no_conflicts(
        &self,
        programmer_id: Uuid,
        scheduled_at: OffsetDateTime,
    ) -> AppResult<()> {
        let conflicts = self.advisories.find_live_at(programmer_id, scheduled_at).await?;
        if !conflicts.is_empty() {
            return Err(AppError::Conflict(
                "An advisory is already scheduled at that time".to_string(),
            ));
        }
        Ok(())
    }

    /// Best effort: a failed user lookup only costs the notification.
    async fn notify_decision(&self, advisory: &Advisory, approved: bool) {
        let external = match self.users.find(advisory.external_id).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(_) => {
                warn!("Skipping decision notification for advisory {}: requester not found", advisory.id);
                return;
            }
        };
        let programmer = match self.users.find(advisory.programmer_id).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(_) => {
                warn!("Skipping decision notification for advisory {}: programmer not found", advisory.id);
                return;
            }
        };

        if approved {
            self.notifier
                .advisory_approved(&external, &programmer, advisory)
                .await;
        } else {
            self.notifier
                .advisory_rejected(&external, &programmer, advisory)
                .await;
        }
    }
}
