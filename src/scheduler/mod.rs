use std::sync::Arc;

use sqlx::PgPool;
use time::macros::time;
use time::{Duration, OffsetDateTime, Time};
use tracing::{error, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{
    Advisory, AdvisoryRepository, AdvisoryStore, NotificationLogRepository, User, UserRepository,
    UserStore,
};
use crate::error::{AppError, AppResult};
use crate::modules::notifications::{LogSink, NotificationService};

/// Daily fire time for the reminder sweep.
const REMINDER_TIME: Time = time!(10:00);

/// Daily sweep over tomorrow's approved advisories: both parties get a
/// reminder. Re-running the sweep sends duplicates, which is acceptable; a
/// failure on one advisory never aborts the batch.
pub struct ReminderJob {
    advisories: Arc<dyn AdvisoryStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<NotificationService>,
    clock: Arc<dyn Clock>,
}

pub fn spawn(pool: PgPool, clock: Arc<dyn Clock>) -> tokio::task::JoinHandle<()> {
    let notifier = Arc::new(NotificationService::new(
        Arc::new(NotificationLogRepository::new(pool.clone())),
        Arc::new(LogSink::new(crate::config::get().mail.from.clone())),
        clock.clone(),
    ));
    let job = ReminderJob::new(
        Arc::new(AdvisoryRepository::new(pool.clone())),
        Arc::new(UserRepository::new(pool)),
        notifier,
        clock,
    );
    tokio::spawn(job.run())
}

impl ReminderJob {
    pub fn new(
        advisories: Arc<dyn AdvisoryStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            advisories,
            users,
            notifier,
            clock,
        }
    }

    pub async fn run(self) {
        loop {
            let delay = delay_until_next_run(self.clock.now());
            tokio::time::sleep(delay).await;
            self.send_daily_reminders().await;
        }
    }

    pub async fn send_daily_reminders(&self) {
        info!("Running daily advisory reminder job");

        let now = self.clock.now();
        let start_of_tomorrow = (now + Duration::days(1)).replace_time(Time::MIDNIGHT);
        let end_of_tomorrow = start_of_tomorrow + Duration::days(1);

        let advisories = match self
            .advisories
            .approved_between(start_of_tomorrow, end_of_tomorrow)
            .await
        {
            Ok(advisories) => advisories,
            Err(err) => {
                error!("Failed to load tomorrow's advisories: {}", err);
                return;
            }
        };

        info!("Found {} advisories scheduled for tomorrow", advisories.len());

        for advisory in &advisories {
            if let Err(err) = self.remind_both_parties(advisory).await {
                error!("Failed to send reminder for advisory {}: {}", advisory.id, err);
            }
        }

        info!("Completed daily advisory reminder job");
    }

    async fn remind_both_parties(&self, advisory: &Advisory) -> AppResult<()> {
        let programmer = self.require_user(advisory.programmer_id).await?;
        let external = self.require_user(advisory.external_id).await?;

        self.notifier.advisory_reminder(&programmer, advisory).await;
        self.notifier.advisory_reminder(&external, advisory).await;

        info!("Sent reminders for advisory: {}", advisory.id);
        Ok(())
    }

    async fn require_user(&self, id: Uuid) -> AppResult<User> {
        self.users
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
    }
}

/// Time left until the next daily fire, always strictly positive.
fn delay_until_next_run(now: OffsetDateTime) -> std::time::Duration {
    let mut next = now.replace_time(REMINDER_TIME);
    if next <= now {
        next += Duration::days(1);
    }
    std::time::Duration::try_from(next - now).unwrap_or(std::time::Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{datetime, time};
    use uuid::Uuid;

    use crate::clock::test::TestClock;
    use crate::db::memory::{
        MemoryAdvisoryStore, MemoryAvailabilityStore, MemoryNotificationLogStore, MemoryUserStore,
    };
    use crate::db::{
        AdvisoryAction, AdvisoryStore, AvailabilityStore, DayOfWeek, NewAdvisory,
        NewAvailabilityWindow, Role, User,
    };
    use crate::modules::notifications::{LogSink, NotificationService};

    use super::{delay_until_next_run, ReminderJob};

    #[test]
    fn delay_counts_down_to_ten_oclock() {
        let before = delay_until_next_run(datetime!(2025-06-02 08:00 UTC));
        assert_eq!(before.as_secs(), 2 * 3600);

        // Already past today's run; the next one is tomorrow.
        let after = delay_until_next_run(datetime!(2025-06-02 12:00 UTC));
        assert_eq!(after.as_secs(), 22 * 3600);

        // Exactly at the fire time: schedule the next day, never zero.
        let at = delay_until_next_run(datetime!(2025-06-02 10:00 UTC));
        assert_eq!(at.as_secs(), 24 * 3600);
    }

    struct Fixture {
        job: ReminderJob,
        users: Arc<MemoryUserStore>,
        advisories: Arc<MemoryAdvisoryStore>,
        availability: Arc<MemoryAvailabilityStore>,
        notifications: Arc<MemoryNotificationLogStore>,
        clock: Arc<TestClock>,
    }

    fn user(role: Role, phone: Option<&str>) -> User {
        let id = Uuid::new_v4();
        User {
            id,
            email: format!("{id}@example.com"),
            name: "Someone".to_string(),
            phone: phone.map(str::to_string),
            bio: None,
            avatar_url: None,
            role,
            is_active: true,
            created_at: datetime!(2025-01-01 00:00 UTC),
            updated_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(TestClock::at(datetime!(2025-06-01 10:00 UTC)));
        let users = Arc::new(MemoryUserStore::default());
        let advisories = Arc::new(MemoryAdvisoryStore::default());
        let availability = Arc::new(MemoryAvailabilityStore::default());
        let notifications = Arc::new(MemoryNotificationLogStore::default());

        let notifier = Arc::new(NotificationService::new(
            notifications.clone(),
            Arc::new(LogSink::new("noreply@portfolio.dev")),
            clock.clone(),
        ));
        let job = ReminderJob::new(
            advisories.clone(),
            users.clone(),
            notifier,
            clock.clone(),
        );

        Fixture {
            job,
            users,
            advisories,
            availability,
            notifications,
            clock,
        }
    }

    /// Books and approves an advisory at the given instant, bypassing none of
    /// the engine's checks.
    async fn approved_advisory(f: &Fixture, scheduled_at: time::OffsetDateTime) -> Uuid {
        use crate::modules::advisories::AdvisoryService;

        let programmer = user(Role::Programmer, None);
        let external = user(Role::External, None);
        f.users.add(programmer.clone());
        f.users.add(external.clone());
        f.availability
            .insert(
                programmer.id,
                &NewAvailabilityWindow {
                    day_of_week: DayOfWeek::from(scheduled_at.weekday()),
                    start_time: time!(00:00),
                    end_time: time!(23:59),
                },
                datetime!(2025-05-01 00:00 UTC),
            )
            .await
            .unwrap();

        let notifier = Arc::new(NotificationService::new(
            Arc::new(MemoryNotificationLogStore::default()),
            Arc::new(LogSink::new("noreply@portfolio.dev")),
            f.clock.clone(),
        ));
        let service = AdvisoryService::new(
            f.advisories.clone(),
            f.users.clone(),
            f.availability.clone(),
            notifier,
            f.clock.clone(),
        );
        let advisory = service
            .create(
                external.id,
                &NewAdvisory {
                    programmer_id: programmer.id,
                    scheduled_at,
                    comment: None,
                },
            )
            .await
            .unwrap();
        service
            .approve(advisory.id, programmer.id, &AdvisoryAction::default())
            .await
            .unwrap();
        advisory.id
    }

    #[tokio::test]
    async fn sweep_reminds_both_parties_of_tomorrows_advisories() {
        let f = fixture();
        // Tomorrow: in scope. The day after: out of scope.
        approved_advisory(&f, datetime!(2025-06-02 10:00 UTC)).await;
        approved_advisory(&f, datetime!(2025-06-03 10:00 UTC)).await;

        f.job.send_daily_reminders().await;

        // One email per party for the single in-scope advisory.
        let entries = f.notifications.entries();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn sweep_ignores_pending_advisories() {
        let f = fixture();
        let programmer = user(Role::Programmer, None);
        let external = user(Role::External, None);
        f.users.add(programmer.clone());
        f.users.add(external.clone());
        f.advisories
            .insert(
                external.id,
                &NewAdvisory {
                    programmer_id: programmer.id,
                    scheduled_at: datetime!(2025-06-02 10:00 UTC),
                    comment: None,
                },
                datetime!(2025-06-01 09:00 UTC),
            )
            .await
            .unwrap();

        f.job.send_daily_reminders().await;

        assert!(f.notifications.entries().is_empty());
    }

    #[tokio::test]
    async fn one_broken_advisory_does_not_abort_the_batch() {
        let f = fixture();
        let broken = approved_advisory(&f, datetime!(2025-06-02 09:00 UTC)).await;
        approved_advisory(&f, datetime!(2025-06-02 11:00 UTC)).await;

        // Orphan the first advisory's programmer; its reminder errors out.
        let advisory = f.advisories.find(broken).await.unwrap().unwrap();
        f.users.remove(advisory.programmer_id);

        f.job.send_daily_reminders().await;

        // The healthy advisory still got both of its reminders.
        let entries = f.notifications.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.user_id != Some(advisory.programmer_id)));
    }

    #[tokio::test]
    async fn rerunning_the_sweep_duplicates_reminders() {
        let f = fixture();
        approved_advisory(&f, datetime!(2025-06-02 10:00 UTC)).await;

        f.job.send_daily_reminders().await;
        f.job.send_daily_reminders().await;

        assert_eq!(f.notifications.entries().len(), 4);
    }
}
