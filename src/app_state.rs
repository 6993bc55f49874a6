use std::sync::Arc;

use sqlx::PgPool;

use crate::clock::{Clock, SystemClock};
use crate::config;
use crate::db::{
    AdvisoryRepository, AdvisoryStore, AvailabilityRepository, AvailabilityStore,
    NotificationLogRepository, RefreshTokenRepository, UserRepository, UserStore,
};
use crate::modules::advisories::AdvisoryService;
use crate::modules::auth::{JwtService, TokenService};
use crate::modules::availability::AvailabilityService;
use crate::modules::notifications::{LogSink, NotificationService};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub jwt: Arc<JwtService>,
    pub tokens: Arc<TokenService>,
    pub advisories: Arc<AdvisoryService>,
    pub availability: Arc<AvailabilityService>,
}

impl AppState {
    pub fn new(db: PgPool, env: config::Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.clone()));
        let advisory_store: Arc<dyn AdvisoryStore> = Arc::new(AdvisoryRepository::new(db.clone()));
        let availability_store: Arc<dyn AvailabilityStore> =
            Arc::new(AvailabilityRepository::new(db.clone()));

        let jwt = Arc::new(JwtService::from_config(&env.auth, clock.clone()));
        let tokens = Arc::new(TokenService::new(
            Arc::new(RefreshTokenRepository::new(db.clone())),
            users.clone(),
            jwt.clone(),
            env.auth.refresh_token_ttl(),
            clock.clone(),
        ));

        // No real delivery transport is wired in this deployment; the sink
        // logs messages and the notification log keeps the audit trail.
        if env.mail.enabled {
            tracing::warn!("MAIL_ENABLED is set but no delivery transport is configured; notifications go to the log");
        }
        let notifier = Arc::new(NotificationService::new(
            Arc::new(NotificationLogRepository::new(db.clone())),
            Arc::new(LogSink::new(env.mail.from.clone())),
            clock.clone(),
        ));
        let advisories = Arc::new(AdvisoryService::new(
            advisory_store,
            users.clone(),
            availability_store.clone(),
            notifier,
            clock.clone(),
        ));
        let availability = Arc::new(AvailabilityService::new(availability_store, users, clock));

        Self {
            db,
            env,
            jwt,
            tokens,
            advisories,
            availability,
        }
    }
}
